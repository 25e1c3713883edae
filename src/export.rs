use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::schedule::slot_utils::compare_times;
use crate::schedule::{Day, WeeklySchedule};

/// Exports a weekly schedule to CSV (`day,time,status`), one row per entry,
/// days in week order and times in clock order
pub fn export_schedule_to_csv(schedule: &WeeklySchedule, csv_path: &Path) -> Result<()> {
    let file = File::create(csv_path)?;
    write_schedule_csv(schedule, file)
}

pub fn write_schedule_csv<W: Write>(schedule: &WeeklySchedule, output: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(output);
    wtr.write_record(["day", "time", "status"])?;

    for day in Day::ALL {
        let Some(slots) = schedule.day(day) else {
            continue;
        };
        let mut times: Vec<&String> = slots.keys().collect();
        times.sort_by(|a, b| compare_times(a, b));

        for time in times {
            wtr.write_record([day.as_str(), time.as_str(), slots[time].as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
