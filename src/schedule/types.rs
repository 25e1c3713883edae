use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::view_model::{aggregate, TotalSlotsPolicy};

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Wire identifier, e.g. `monday`
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    /// Display name, e.g. `Monday`
    pub fn label(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == lower || (lower.len() == 3 && d.as_str().starts_with(&lower)))
            .ok_or_else(|| format!("Unknown day: {}", s))
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }
}

/// Status of a single (day, time) cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Booked,
    Available,
    Blocked,
    #[default]
    Empty,
}

impl SlotStatus {
    pub const ALL: [SlotStatus; 4] = [
        SlotStatus::Booked,
        SlotStatus::Available,
        SlotStatus::Blocked,
        SlotStatus::Empty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Booked => "booked",
            SlotStatus::Available => "available",
            SlotStatus::Blocked => "blocked",
            SlotStatus::Empty => "empty",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "booked" => Ok(SlotStatus::Booked),
            "available" => Ok(SlotStatus::Available),
            "blocked" => Ok(SlotStatus::Blocked),
            "empty" => Ok(SlotStatus::Empty),
            _ => Err(format!("Unknown slot status: {}", s)),
        }
    }
}

/// day -> time -> status. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: HashMap<Day, HashMap<String, SlotStatus>>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, day: Day, time: impl Into<String>, status: SlotStatus) {
        self.days.entry(day).or_default().insert(time.into(), status);
    }

    /// Builder form of [`WeeklySchedule::set`]
    pub fn with(mut self, day: Day, time: impl Into<String>, status: SlotStatus) -> Self {
        self.set(day, time, status);
        self
    }

    pub fn get(&self, day: Day, time: &str) -> Option<SlotStatus> {
        self.days.get(&day).and_then(|slots| slots.get(time)).copied()
    }

    pub fn day(&self, day: Day) -> Option<&HashMap<String, SlotStatus>> {
        self.days.get(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(|slots| slots.is_empty())
    }

    /// All (day, time, status) entries, unordered
    pub fn entries(&self) -> impl Iterator<Item = (Day, &str, SlotStatus)> + '_ {
        self.days.iter().flat_map(|(day, slots)| {
            slots.iter().map(move |(time, status)| (*day, time.as_str(), *status))
        })
    }
}

impl FromIterator<(Day, String, SlotStatus)> for WeeklySchedule {
    fn from_iter<I: IntoIterator<Item = (Day, String, SlotStatus)>>(iter: I) -> Self {
        let mut schedule = WeeklySchedule::new();
        for (day, time, status) in iter {
            schedule.set(day, time, status);
        }
        schedule
    }
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    /// Lenient: unknown days are dropped, unknown statuses become `empty`
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, Value> = HashMap::deserialize(deserializer)?;
        let mut schedule = WeeklySchedule::new();

        for (day_key, slots) in raw {
            let day = match day_key.parse::<Day>() {
                Ok(day) => day,
                Err(_) => {
                    warn!(day = %day_key, "Dropping unknown day from schedule");
                    continue;
                }
            };

            let Value::Object(slots) = slots else {
                warn!(day = %day_key, "Day entry is not a time map, treating as unscheduled");
                continue;
            };

            for (time, value) in slots {
                let status = value
                    .as_str()
                    .and_then(|s| s.parse::<SlotStatus>().ok())
                    .unwrap_or_else(|| {
                        warn!(day = %day_key, time = %time, value = %value, "Unknown slot status, treating as empty");
                        SlotStatus::Empty
                    });
                schedule.set(day, time, status);
            }
        }

        Ok(schedule)
    }
}

/// Aggregate counts shown on the stat cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleStats {
    pub total_slots: u32,
    pub available_slots: u32,
    pub booked_slots: u32,
    pub blocked_slots: u32,
}

/// What the query layer hands over; every field may be missing while loading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_schedule: Option<WeeklySchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ScheduleStats>,
}

/// One immutable fetched copy of the schedule plus its stats
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub weekly_schedule: WeeklySchedule,
    pub stats: ScheduleStats,
}

impl ScheduleSnapshot {
    /// Snapshot with stats derived from `schedule`
    pub fn new(weekly_schedule: WeeklySchedule, policy: TotalSlotsPolicy) -> Self {
        let stats = aggregate(&weekly_schedule, policy);
        Self {
            weekly_schedule,
            stats,
        }
    }

    /// Absent fields fall back to an empty schedule and all-zero stats
    pub fn from_payload(payload: Option<SchedulePayload>) -> Self {
        let payload = payload.unwrap_or_default();
        Self {
            weekly_schedule: payload.weekly_schedule.unwrap_or_default(),
            stats: payload.stats.unwrap_or_default(),
        }
    }

    pub fn to_payload(&self) -> SchedulePayload {
        SchedulePayload {
            weekly_schedule: Some(self.weekly_schedule.clone()),
            stats: Some(self.stats),
        }
    }
}
