pub mod types;
pub mod slot_utils;
pub mod view_model;
pub mod screen;

pub use types::{Day, SchedulePayload, ScheduleSnapshot, ScheduleStats, SlotStatus, WeeklySchedule};
pub use slot_utils::{fixed_time_grid, time_axis};
pub use view_model::{
    aggregate, classify, classify_str, describe, describe_slot, slot_prompt, EditRequest, ScheduleView,
    SlotAction, SlotPrompt, SlotTap, TotalSlotsPolicy,
};
pub use screen::{resolve_screen, QueryState, Screen};
