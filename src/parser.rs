use csv::Reader;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::schedule::{Day, SlotStatus, WeeklySchedule};

/// Loads a weekly schedule from a CSV file with `day,time,status` columns
pub fn load_schedule_csv<P: AsRef<Path>>(csv_path: P) -> Result<WeeklySchedule> {
    let reader = Reader::from_path(csv_path)?;
    read_schedule(reader)
}

/// Same as [`load_schedule_csv`] for any reader
pub fn parse_schedule_csv<R: Read>(input: R) -> Result<WeeklySchedule> {
    read_schedule(Reader::from_reader(input))
}

fn read_schedule<R: Read>(mut reader: Reader<R>) -> Result<WeeklySchedule> {
    let headers = reader.headers()?.clone();

    // Find column indices, falling back to positional order
    let find = |name: &str, default: usize| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .unwrap_or(default)
    };
    let day_col = find("day", 0);
    let time_col = find("time", 1);
    let status_col = find("status", 2);

    let mut schedule = WeeklySchedule::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;

        let day_str = record.get(day_col).unwrap_or("").trim();
        let time = record.get(time_col).unwrap_or("").trim();
        let status_str = record.get(status_col).unwrap_or("").trim();

        // Skip incomplete records
        if day_str.is_empty() || time.is_empty() {
            continue;
        }

        let day = match day_str.parse::<Day>() {
            Ok(day) => day,
            Err(e) => {
                warn!(row = line + 1, "{}, skipping row", e);
                continue;
            }
        };

        let status = status_str.parse::<SlotStatus>().unwrap_or_else(|e| {
            warn!(row = line + 1, "{}, treating as empty", e);
            SlotStatus::Empty
        });

        // Later rows win for the same slot
        schedule.set(day, time, status);
    }

    Ok(schedule)
}
