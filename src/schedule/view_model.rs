use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::slot_utils::time_axis;
use super::types::{Day, ScheduleSnapshot, ScheduleStats, SlotStatus, WeeklySchedule};

pub const SLOT_PROMPT_TITLE: &str = "Time Slot";
pub const UNKNOWN_STATUS_MESSAGE: &str = "Unknown status";

const SCHEDULE_TIPS: [&str; 3] = [
    "Set your available hours to let people book with you",
    "Block time slots when you're not available",
    "Booked slots are automatically protected from double-booking",
];

/// What `totalSlots` counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalSlotsPolicy {
    /// booked + available + blocked
    #[default]
    NonEmpty,
    /// every cell of the 7-day grid over the schedule's time axis
    FullGrid,
}

impl FromStr for TotalSlotsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "non_empty" => Ok(TotalSlotsPolicy::NonEmpty),
            "full_grid" => Ok(TotalSlotsPolicy::FullGrid),
            other => Err(format!("Unknown total slots policy: {}", other)),
        }
    }
}

impl fmt::Display for TotalSlotsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalSlotsPolicy::NonEmpty => f.write_str("non_empty"),
            TotalSlotsPolicy::FullGrid => f.write_str("full_grid"),
        }
    }
}

/// Status at `schedule[day][time]`, `empty` when absent
pub fn classify(schedule: &WeeklySchedule, day: Day, time: &str) -> SlotStatus {
    schedule.get(day, time).unwrap_or(SlotStatus::Empty)
}

/// Like [`classify`] but for a raw day identifier; unknown days are `empty`
pub fn classify_str(schedule: &WeeklySchedule, day: &str, time: &str) -> SlotStatus {
    day.parse::<Day>()
        .map(|d| classify(schedule, d, time))
        .unwrap_or(SlotStatus::Empty)
}

fn capitalize(day: &str) -> String {
    let mut chars = day.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Message shown when a slot is tapped. `status` is the raw value the
/// renderer reports, so statuses this build doesn't know about still get
/// a message.
pub fn describe_slot(day: &str, time: &str, status: &str) -> String {
    // Only exact lowercase keys match the lookup table
    match SlotStatus::ALL.iter().find(|known| known.as_str() == status) {
        Some(&known) => describe_known(&capitalize(day), time, known),
        None => UNKNOWN_STATUS_MESSAGE.to_string(),
    }
}

/// Typed form of [`describe_slot`]
pub fn describe(day: Day, time: &str, status: SlotStatus) -> String {
    describe_known(day.label(), time, status)
}

fn describe_known(day: &str, time: &str, status: SlotStatus) -> String {
    match status {
        SlotStatus::Booked => format!("{} at {} is booked", day, time),
        SlotStatus::Available => format!("{} at {} is available for booking", day, time),
        SlotStatus::Blocked => format!("{} at {} is blocked", day, time),
        SlotStatus::Empty => format!("{} at {} is not scheduled", day, time),
    }
}

/// Counts slots per status. Explicit `empty` entries count towards nothing
/// except a `FullGrid` total.
pub fn aggregate(schedule: &WeeklySchedule, policy: TotalSlotsPolicy) -> ScheduleStats {
    let mut stats = ScheduleStats::default();
    for (_, _, status) in schedule.entries() {
        match status {
            SlotStatus::Booked => stats.booked_slots += 1,
            SlotStatus::Available => stats.available_slots += 1,
            SlotStatus::Blocked => stats.blocked_slots += 1,
            SlotStatus::Empty => {}
        }
    }

    stats.total_slots = match policy {
        TotalSlotsPolicy::NonEmpty => stats.booked_slots + stats.available_slots + stats.blocked_slots,
        TotalSlotsPolicy::FullGrid => (Day::ALL.len() * time_axis(schedule).len()) as u32,
    };
    stats
}

/// Buttons offered alongside a slot message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotAction {
    Acknowledge,
    Edit,
}

impl SlotAction {
    pub fn label(&self) -> &'static str {
        match self {
            SlotAction::Acknowledge => "OK",
            SlotAction::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptAction {
    pub action: SlotAction,
    pub label: &'static str,
}

/// A dialog-shaped answer to a slot tap; presenting it is up to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotPrompt {
    pub title: &'static str,
    pub message: String,
    pub actions: Vec<PromptAction>,
}

/// The raw (day, time, status) triple a renderer reports on tap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTap {
    pub day: String,
    pub time: String,
    pub status: String,
}

/// Emitted when the user picks `Edit`; the edit flow itself lives elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditRequest {
    pub day: String,
    pub time: String,
    pub status: String,
}

pub fn slot_prompt(day: &str, time: &str, status: &str) -> SlotPrompt {
    let message = describe_slot(day, time, status);
    debug!(day, time, status, text = %message, "Slot tapped");
    SlotPrompt {
        title: SLOT_PROMPT_TITLE,
        message,
        actions: [SlotAction::Acknowledge, SlotAction::Edit]
            .into_iter()
            .map(|action| PromptAction {
                action,
                label: action.label(),
            })
            .collect(),
    }
}

impl SlotTap {
    pub fn prompt(&self) -> SlotPrompt {
        slot_prompt(&self.day, &self.time, &self.status)
    }

    /// Resolves the chosen action; only `Edit` yields a request
    pub fn choose(&self, action: SlotAction) -> Option<EditRequest> {
        match action {
            SlotAction::Acknowledge => None,
            SlotAction::Edit => {
                info!(day = %self.day, time = %self.time, status = %self.status, "Edit slot requested");
                Some(EditRequest {
                    day: self.day.clone(),
                    time: self.time.clone(),
                    status: self.status.clone(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub time: String,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub day: Day,
    pub label: &'static str,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleHeader {
    pub title: &'static str,
    pub subtitle: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBookings {
    pub title: &'static str,
    pub empty_message: &'static str,
    pub empty_hint: &'static str,
}

/// Everything the renderer needs for one render pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub header: ScheduleHeader,
    pub stats: ScheduleStats,
    pub stat_cards: Vec<StatCard>,
    pub times: Vec<String>,
    pub grid: Vec<GridRow>,
    pub upcoming: UpcomingBookings,
    pub tips: Vec<&'static str>,
}

impl ScheduleView {
    /// Grid over the union of time keys present in the snapshot
    pub fn build(snapshot: &ScheduleSnapshot) -> Self {
        let times = time_axis(&snapshot.weekly_schedule);
        Self::build_with_times(snapshot, times)
    }

    /// Grid over a caller-supplied time axis (e.g. a fixed working-hours grid)
    pub fn build_with_times(snapshot: &ScheduleSnapshot, times: Vec<String>) -> Self {
        let schedule = &snapshot.weekly_schedule;
        let grid = Day::ALL
            .iter()
            .map(|&day| GridRow {
                day,
                label: day.label(),
                cells: times
                    .iter()
                    .map(|time| GridCell {
                        time: time.clone(),
                        status: classify(schedule, day, time),
                    })
                    .collect(),
            })
            .collect();

        let stats = snapshot.stats;
        Self {
            header: ScheduleHeader {
                title: "My Schedule",
                subtitle: "Manage your availability and view bookings",
            },
            stats,
            stat_cards: vec![
                StatCard {
                    label: "Available Slots",
                    value: stats.available_slots,
                },
                StatCard {
                    label: "Booked",
                    value: stats.booked_slots,
                },
                StatCard {
                    label: "Total Weekly Slots",
                    value: stats.total_slots,
                },
            ],
            times,
            grid,
            upcoming: UpcomingBookings {
                title: "Upcoming Bookings",
                empty_message: "No upcoming bookings",
                empty_hint: "Bookings will appear here when people schedule with you",
            },
            tips: SCHEDULE_TIPS.to_vec(),
        }
    }

    pub fn status_at(&self, day: Day, time: &str) -> SlotStatus {
        self.grid
            .iter()
            .find(|row| row.day == day)
            .and_then(|row| row.cells.iter().find(|cell| cell.time == time))
            .map(|cell| cell.status)
            .unwrap_or(SlotStatus::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday_booked() -> WeeklySchedule {
        WeeklySchedule::new().with(Day::Monday, "09:00", SlotStatus::Booked)
    }

    #[test]
    fn classify_returns_entry_or_empty() {
        let schedule = monday_booked();
        assert_eq!(classify(&schedule, Day::Monday, "09:00"), SlotStatus::Booked);
        assert_eq!(classify(&schedule, Day::Monday, "10:00"), SlotStatus::Empty);
        assert_eq!(classify(&schedule, Day::Sunday, "09:00"), SlotStatus::Empty);
        assert_eq!(classify_str(&schedule, "monday", "09:00"), SlotStatus::Booked);
        assert_eq!(classify_str(&schedule, "someday", "09:00"), SlotStatus::Empty);
    }

    #[test]
    fn empty_schedule_classifies_everything_empty() {
        let schedule = WeeklySchedule::new();
        for day in Day::ALL {
            assert_eq!(classify(&schedule, day, "00:00"), SlotStatus::Empty);
            assert_eq!(classify(&schedule, day, "23:59"), SlotStatus::Empty);
        }
        assert_eq!(aggregate(&schedule, TotalSlotsPolicy::NonEmpty), ScheduleStats::default());
        assert_eq!(aggregate(&schedule, TotalSlotsPolicy::FullGrid), ScheduleStats::default());
    }

    #[test]
    fn describe_slot_messages() {
        assert_eq!(describe_slot("monday", "09:00", "booked"), "Monday at 09:00 is booked");
        assert_eq!(
            describe_slot("tuesday", "10:30", "available"),
            "Tuesday at 10:30 is available for booking"
        );
        assert_eq!(describe_slot("friday", "14:00", "blocked"), "Friday at 14:00 is blocked");
        assert_eq!(describe_slot("sunday", "08:00", "empty"), "Sunday at 08:00 is not scheduled");
    }

    #[test]
    fn describe_slot_contains_day_and_time_for_every_status() {
        for day in Day::ALL {
            for status in SlotStatus::ALL {
                let message = describe_slot(day.as_str(), "07:45", status.as_str());
                assert!(message.starts_with(day.label()), "{}", message);
                assert!(message.contains("07:45"), "{}", message);
                assert_eq!(message, describe_slot(day.as_str(), "07:45", status.as_str()));
                assert_eq!(message, describe(day, "07:45", status));
            }
        }
    }

    #[test]
    fn describe_slot_unknown_status() {
        assert_eq!(describe_slot("monday", "09:00", "tentative"), "Unknown status");
        assert_eq!(describe_slot("monday", "09:00", ""), "Unknown status");
        assert_eq!(describe_slot("monday", "09:00", "Booked"), "Unknown status");
    }

    #[test]
    fn describe_slot_capitalizes_only_first_letter() {
        assert_eq!(describe_slot("mONDAY", "9", "blocked"), "MONDAY at 9 is blocked");
        assert_eq!(describe_slot("", "09:00", "booked"), " at 09:00 is booked");
    }

    #[test]
    fn aggregate_counts_per_status() {
        let schedule = WeeklySchedule::new()
            .with(Day::Monday, "09:00", SlotStatus::Booked)
            .with(Day::Monday, "10:00", SlotStatus::Available)
            .with(Day::Tuesday, "09:00", SlotStatus::Available)
            .with(Day::Wednesday, "11:00", SlotStatus::Blocked)
            .with(Day::Thursday, "11:00", SlotStatus::Empty);

        let stats = aggregate(&schedule, TotalSlotsPolicy::NonEmpty);
        assert_eq!(
            stats,
            ScheduleStats {
                total_slots: 4,
                available_slots: 2,
                booked_slots: 1,
                blocked_slots: 1,
            }
        );

        let grid_stats = aggregate(&schedule, TotalSlotsPolicy::FullGrid);
        assert_eq!(grid_stats.total_slots, 7 * 3);
        assert_eq!(grid_stats.available_slots, 2);
    }

    #[test]
    fn aggregate_is_order_independent() {
        let entries = vec![
            (Day::Saturday, "18:00".to_string(), SlotStatus::Booked),
            (Day::Monday, "09:00".to_string(), SlotStatus::Available),
            (Day::Friday, "12:00".to_string(), SlotStatus::Blocked),
            (Day::Monday, "10:00".to_string(), SlotStatus::Booked),
        ];
        let forward: WeeklySchedule = entries.iter().cloned().collect();
        let backward: WeeklySchedule = entries.iter().rev().cloned().collect();

        for policy in [TotalSlotsPolicy::NonEmpty, TotalSlotsPolicy::FullGrid] {
            assert_eq!(aggregate(&forward, policy), aggregate(&backward, policy));
        }
    }

    #[test]
    fn prompt_offers_acknowledge_and_edit() {
        let prompt = slot_prompt("monday", "09:00", "booked");
        assert_eq!(prompt.title, "Time Slot");
        assert_eq!(prompt.message, "Monday at 09:00 is booked");
        let labels: Vec<_> = prompt.actions.iter().map(|a| a.label).collect();
        assert_eq!(labels, vec!["OK", "Edit"]);
    }

    #[test]
    fn only_edit_produces_a_request() {
        let tap = SlotTap {
            day: "monday".into(),
            time: "09:00".into(),
            status: "booked".into(),
        };
        assert_eq!(tap.choose(SlotAction::Acknowledge), None);
        let request = tap.choose(SlotAction::Edit).unwrap();
        assert_eq!(request.day, "monday");
        assert_eq!(request.status, "booked");
    }

    #[test]
    fn view_has_seven_ordered_rows_over_time_axis() {
        let schedule = WeeklySchedule::new()
            .with(Day::Sunday, "14:00", SlotStatus::Blocked)
            .with(Day::Monday, "09:00", SlotStatus::Booked);
        let snapshot = ScheduleSnapshot::new(schedule, TotalSlotsPolicy::NonEmpty);
        let view = ScheduleView::build(&snapshot);

        let days: Vec<Day> = view.grid.iter().map(|row| row.day).collect();
        assert_eq!(days, Day::ALL.to_vec());
        assert_eq!(view.times, vec!["09:00", "14:00"]);
        assert!(view.grid.iter().all(|row| row.cells.len() == 2));
        assert_eq!(view.status_at(Day::Monday, "09:00"), SlotStatus::Booked);
        assert_eq!(view.status_at(Day::Monday, "14:00"), SlotStatus::Empty);
        assert_eq!(view.status_at(Day::Sunday, "14:00"), SlotStatus::Blocked);

        let cards: Vec<(&str, u32)> = view.stat_cards.iter().map(|c| (c.label, c.value)).collect();
        assert_eq!(
            cards,
            vec![("Available Slots", 0), ("Booked", 1), ("Total Weekly Slots", 2)]
        );
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("non_empty".parse::<TotalSlotsPolicy>().unwrap(), TotalSlotsPolicy::NonEmpty);
        assert_eq!("Full-Grid".parse::<TotalSlotsPolicy>().unwrap(), TotalSlotsPolicy::FullGrid);
        assert!("everything".parse::<TotalSlotsPolicy>().is_err());
    }
}
