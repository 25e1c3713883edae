use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::types::WeeklySchedule;
use crate::error::{AppError, Result};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight for a schedule time key such as `"09:00"` or
/// `" 9:05"`. Keys are free-form strings in stored schedules, so anything
/// that is not a 24-hour `H:MM`/`HH:MM` clock reading yields `None` and
/// sorts after every real time in [`compare_times`].
pub fn parse_time_to_minutes(key: &str) -> Option<u32> {
    let (hours, minutes) = key.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then(|| hours * 60 + minutes)
}

/// Canonical `HH:MM` key for a minute offset. Offsets past midnight wrap,
/// which is what lets [`fixed_time_grid`] run from 22:00 to 02:00.
pub fn minutes_to_time_string(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Canonical ordering for time keys: parsable times by minutes since
/// midnight, then anything unparsable, lexically
pub fn compare_times(a: &str, b: &str) -> Ordering {
    match (parse_time_to_minutes(a), parse_time_to_minutes(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Union of every time key in the schedule, canonically sorted
pub fn time_axis(schedule: &WeeklySchedule) -> Vec<String> {
    let unique: BTreeSet<&str> = schedule.entries().map(|(_, time, _)| time).collect();
    let mut times: Vec<String> = unique.into_iter().map(str::to_string).collect();
    times.sort_by(|a, b| compare_times(a, b));
    times
}

/// Builds a fixed time axis from `start` (inclusive) to `end` (exclusive)
/// in steps of `interval_minutes`. An `end` earlier than `start` wraps
/// past midnight.
pub fn fixed_time_grid(start: &str, end: &str, interval_minutes: u32) -> Result<Vec<String>> {
    let start_minutes = parse_time_to_minutes(start)
        .ok_or_else(|| AppError::Validation(format!("Invalid start time: {}", start)))?;
    let end_minutes = parse_time_to_minutes(end)
        .ok_or_else(|| AppError::Validation(format!("Invalid end time: {}", end)))?;
    if interval_minutes == 0 || interval_minutes > MINUTES_PER_DAY {
        return Err(AppError::Validation(format!(
            "Interval must be between 1 and {} minutes",
            MINUTES_PER_DAY
        )));
    }

    let span = if end_minutes > start_minutes {
        end_minutes - start_minutes
    } else {
        // Wrap-around (e.g. 22:00 to 02:00), or a full day when equal
        end_minutes + MINUTES_PER_DAY - start_minutes
    };

    let slots = (0..span)
        .step_by(interval_minutes as usize)
        .map(|offset| minutes_to_time_string((start_minutes + offset) % MINUTES_PER_DAY))
        .collect();
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{Day, SlotStatus};

    #[test]
    fn parses_and_formats_times() {
        assert_eq!(parse_time_to_minutes("09:30"), Some(570));
        assert_eq!(parse_time_to_minutes("9:05"), Some(545));
        assert_eq!(parse_time_to_minutes("24:00"), None);
        assert_eq!(parse_time_to_minutes("noon"), None);
        assert_eq!(minutes_to_time_string(570), "09:30");
        assert_eq!(minutes_to_time_string(1500), "01:00");
    }

    #[test]
    fn loose_time_keys_are_not_clock_times() {
        assert_eq!(parse_time_to_minutes(" 09:00 "), Some(540));
        assert_eq!(parse_time_to_minutes("09:00:00"), None);
        assert_eq!(parse_time_to_minutes("09:60"), None);
        assert_eq!(parse_time_to_minutes("-1:00"), None);
        assert_eq!(parse_time_to_minutes(""), None);
        assert_eq!(parse_time_to_minutes("99999999:00"), None);
        assert_eq!(compare_times("23:59", "lunch"), Ordering::Less);
        assert_eq!(minutes_to_time_string(MINUTES_PER_DAY), "00:00");
    }

    #[test]
    fn time_axis_orders_numerically_then_unparsable() {
        let schedule = WeeklySchedule::new()
            .with(Day::Monday, "13:00", SlotStatus::Booked)
            .with(Day::Tuesday, "9:00", SlotStatus::Available)
            .with(Day::Friday, "lunch", SlotStatus::Blocked)
            .with(Day::Sunday, "13:00", SlotStatus::Blocked);

        assert_eq!(time_axis(&schedule), vec!["9:00", "13:00", "lunch"]);
    }

    #[test]
    fn fixed_grid_steps_and_wraps() {
        assert_eq!(
            fixed_time_grid("09:00", "12:00", 60).unwrap(),
            vec!["09:00", "10:00", "11:00"]
        );
        assert_eq!(
            fixed_time_grid("23:00", "01:00", 30).unwrap(),
            vec!["23:00", "23:30", "00:00", "00:30"]
        );
        assert_eq!(fixed_time_grid("00:00", "00:00", 60).unwrap().len(), 24);
    }

    #[test]
    fn fixed_grid_rejects_bad_input() {
        assert!(matches!(fixed_time_grid("9am", "12:00", 60), Err(AppError::Validation(_))));
        assert!(matches!(fixed_time_grid("09:00", "12:00", 0), Err(AppError::Validation(_))));
    }
}
