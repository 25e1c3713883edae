pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod web;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::Result;
use crate::schedule::{ScheduleSnapshot, ScheduleStats, TotalSlotsPolicy};
use crate::store::{JsonFileStore, MemoryStore, ScheduleStore};

pub fn init_logging() {
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,schedule_view=debug".into());

    // try_init: a second call (e.g. from tests) is a no-op
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .try_init();
}

/// Loads a schedule from a `.csv` or JSON payload file
pub fn load_schedule_file(path: &Path, policy: TotalSlotsPolicy) -> Result<ScheduleSnapshot> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let schedule = parser::load_schedule_csv(path)?;
        Ok(ScheduleSnapshot::new(schedule, policy))
    } else {
        store::load_payload_file(path, policy)
    }
}

/// Outcome of [`import_schedule_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Slots actually present in the source, independent of the total policy
    pub imported: usize,
    pub stats: ScheduleStats,
}

/// Converts a CSV or JSON schedule into a JSON payload file at `dest`
pub fn import_schedule_file(src: &Path, dest: &Path, policy: TotalSlotsPolicy) -> Result<ImportSummary> {
    let snapshot = load_schedule_file(src, policy)?;
    store::write_payload_file(dest, &snapshot)?;
    let summary = ImportSummary {
        imported: snapshot.weekly_schedule.entries().count(),
        stats: snapshot.stats,
    };
    info!(src = %src.display(), dest = %dest.display(), imported = summary.imported, "Imported schedule");
    Ok(summary)
}

/// Picks the store the config asks for
pub fn build_store(config: &Config) -> Arc<dyn ScheduleStore> {
    match &config.data_path {
        Some(path) => {
            info!(path = %path.display(), "Using JSON file store");
            Arc::new(JsonFileStore::new(path.clone(), config.total_policy))
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new(config.total_policy))
        }
    }
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    if config.uses_default_token() {
        warn!("SCHEDULE_AUTH_TOKEN is not set, using the default token. Change this!");
    }

    let store = build_store(&config);
    let state = web::AppState::new(store, config.auth_token.clone());
    web::start_server(config.port, state).await
}
