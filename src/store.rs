use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::schedule::{SchedulePayload, ScheduleSnapshot, TotalSlotsPolicy, WeeklySchedule};

/// Source of the current schedule snapshot. A save replaces the whole
/// snapshot; there is no per-slot patching.
pub trait ScheduleStore: Send + Sync {
    fn load(&self) -> Result<ScheduleSnapshot>;
    fn save(&self, schedule: WeeklySchedule) -> Result<ScheduleSnapshot>;
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("schedule store lock poisoned".to_string())
}

/// Keeps the current snapshot in memory
pub struct MemoryStore {
    current: Mutex<ScheduleSnapshot>,
    policy: TotalSlotsPolicy,
}

impl MemoryStore {
    pub fn new(policy: TotalSlotsPolicy) -> Self {
        Self::with_schedule(WeeklySchedule::new(), policy)
    }

    pub fn with_schedule(schedule: WeeklySchedule, policy: TotalSlotsPolicy) -> Self {
        Self {
            current: Mutex::new(ScheduleSnapshot::new(schedule, policy)),
            policy,
        }
    }
}

impl ScheduleStore for MemoryStore {
    fn load(&self) -> Result<ScheduleSnapshot> {
        Ok(self.current.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, schedule: WeeklySchedule) -> Result<ScheduleSnapshot> {
        let snapshot = ScheduleSnapshot::new(schedule, self.policy);
        *self.current.lock().map_err(poisoned)? = snapshot.clone();
        debug!(total = snapshot.stats.total_slots, "Replaced in-memory schedule");
        Ok(snapshot)
    }
}

/// Reads a JSON payload file. Stats are always recomputed under `policy`;
/// stored stats may have been written under a different one.
pub fn load_payload_file<P: AsRef<Path>>(path: P, policy: TotalSlotsPolicy) -> Result<ScheduleSnapshot> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let payload: SchedulePayload = serde_json::from_str(&text)?;
    let snapshot = ScheduleSnapshot::new(payload.weekly_schedule.unwrap_or_default(), policy);

    if let Some(stored) = payload.stats {
        if stored != snapshot.stats {
            debug!(
                path = %path.display(),
                stored_total = stored.total_slots,
                total = snapshot.stats.total_slots,
                %policy,
                "Stored stats differ from recomputed stats, using recomputed"
            );
        }
    }
    Ok(snapshot)
}

/// Writes a snapshot as a JSON payload, via a temp file and rename
pub fn write_payload_file<P: AsRef<Path>>(path: P, snapshot: &ScheduleSnapshot) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&snapshot.to_payload())?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Persists the snapshot as a JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,
    policy: TotalSlotsPolicy,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, policy: TotalSlotsPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScheduleStore for JsonFileStore {
    fn load(&self) -> Result<ScheduleSnapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No schedule file yet, starting empty");
            return Ok(ScheduleSnapshot::default());
        }
        load_payload_file(&self.path, self.policy)
    }

    fn save(&self, schedule: WeeklySchedule) -> Result<ScheduleSnapshot> {
        let snapshot = ScheduleSnapshot::new(schedule, self.policy);
        let _guard = self.write_lock.lock().map_err(poisoned)?;
        write_payload_file(&self.path, &snapshot)?;
        info!(path = %self.path.display(), total = snapshot.stats.total_slots, "Saved schedule");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Day, SlotStatus};

    fn sample() -> WeeklySchedule {
        WeeklySchedule::new()
            .with(Day::Monday, "09:00", SlotStatus::Booked)
            .with(Day::Tuesday, "10:00", SlotStatus::Available)
    }

    #[test]
    fn memory_store_replaces_wholesale() {
        let store = MemoryStore::with_schedule(sample(), TotalSlotsPolicy::NonEmpty);
        assert_eq!(store.load().unwrap().stats.total_slots, 2);

        let replacement = WeeklySchedule::new().with(Day::Friday, "15:00", SlotStatus::Blocked);
        let saved = store.save(replacement).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(saved, loaded);
        assert_eq!(loaded.weekly_schedule.get(Day::Monday, "09:00"), None);
        assert_eq!(loaded.stats.blocked_slots, 1);
        assert_eq!(loaded.stats.total_slots, 1);
    }

    #[test]
    fn file_store_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("schedule.json"), TotalSlotsPolicy::NonEmpty);
        assert_eq!(store.load().unwrap(), ScheduleSnapshot::default());
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let store = JsonFileStore::new(&path, TotalSlotsPolicy::FullGrid);

        let saved = store.save(sample()).unwrap();
        assert_eq!(saved.stats.total_slots, 14);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonFileStore::new(&path, TotalSlotsPolicy::FullGrid);
        assert_eq!(reopened.load().unwrap(), saved);
    }

    #[test]
    fn reload_under_another_policy_recomputes_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let schedule = WeeklySchedule::new()
            .with(Day::Monday, "09:00", SlotStatus::Booked)
            .with(Day::Monday, "10:00", SlotStatus::Available);

        let saved = JsonFileStore::new(&path, TotalSlotsPolicy::NonEmpty).save(schedule).unwrap();
        assert_eq!(saved.stats.total_slots, 2);

        let reloaded = JsonFileStore::new(&path, TotalSlotsPolicy::FullGrid).load().unwrap();
        assert_eq!(reloaded.stats.total_slots, 14);
        assert_eq!(reloaded.stats.booked_slots, 1);
        assert_eq!(reloaded.weekly_schedule, saved.weekly_schedule);
    }

    #[test]
    fn stale_stats_in_file_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(
            &path,
            r#"{"weeklySchedule":{"monday":{"09:00":"booked"}},"stats":{"totalSlots":99,"bookedSlots":42}}"#,
        )
        .unwrap();

        let snapshot = load_payload_file(&path, TotalSlotsPolicy::NonEmpty).unwrap();
        assert_eq!(snapshot.stats.total_slots, 1);
        assert_eq!(snapshot.stats.booked_slots, 1);
    }

    #[test]
    fn payload_without_stats_gets_them_computed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        fs::write(&path, r#"{"weeklySchedule":{"monday":{"09:00":"available"}}}"#).unwrap();

        let snapshot = load_payload_file(&path, TotalSlotsPolicy::NonEmpty).unwrap();
        assert_eq!(snapshot.stats.available_slots, 1);
        assert_eq!(snapshot.stats.total_slots, 1);
    }
}
