use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use schedule_view::config::Config;
use schedule_view::display::{print_week_schedule, write_schedule_to_file};
use schedule_view::export::export_schedule_to_csv;
use schedule_view::schedule::{
    classify_str, fixed_time_grid, slot_prompt, ScheduleView, TotalSlotsPolicy,
};
use schedule_view::{import_schedule_file, init_logging, load_schedule_file, run_server};

#[derive(Parser)]
#[command(name = "schedule-view")]
#[command(about = "Render and serve a weekly availability schedule", long_about = None)]
#[command(version)]
struct Cli {
    /// What "Total Weekly Slots" counts
    #[arg(long, env = "SCHEDULE_TOTAL_POLICY", default_value = "non_empty", global = true)]
    total_policy: TotalSlotsPolicy,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print stats and the weekly grid
    Show {
        /// Schedule file (.json payload or .csv)
        file: PathBuf,
        /// Fixed grid instead of the schedule's own times: START END INTERVAL_MINUTES
        #[arg(long, num_args = 3, value_names = ["START", "END", "INTERVAL"])]
        grid: Option<Vec<String>>,
        /// Also write the rendered text here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Describe what tapping a slot would show
    Slot {
        file: PathBuf,
        day: String,
        time: String,
        /// Use this status instead of looking it up
        #[arg(long)]
        status: Option<String>,
    },
    /// Convert a CSV schedule into a JSON payload
    Import { csv: PathBuf, json: PathBuf },
    /// Convert a schedule file into CSV
    Export { file: PathBuf, csv: PathBuf },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let policy = cli.total_policy;

    match cli.command {
        Commands::Show { file, grid, out } => {
            let snapshot = load_schedule_file(&file, policy)?;
            let view = match grid.as_deref() {
                Some([start, end, interval]) => {
                    let interval: u32 = interval
                        .parse()
                        .map_err(|_| format!("Invalid interval: {}", interval))?;
                    ScheduleView::build_with_times(&snapshot, fixed_time_grid(start, end, interval)?)
                }
                _ => ScheduleView::build(&snapshot),
            };

            print_week_schedule(&view);
            if let Some(out) = out {
                write_schedule_to_file(&view, &out)?;
                info!(path = %out.display(), "Schedule written");
            }
        }
        Commands::Slot {
            file,
            day,
            time,
            status,
        } => {
            let snapshot = load_schedule_file(&file, policy)?;
            let status = status
                .unwrap_or_else(|| classify_str(&snapshot.weekly_schedule, &day, &time).to_string());
            let prompt = slot_prompt(&day, &time, &status);

            println!("{}", prompt.title);
            println!("{}", prompt.message);
            let labels: Vec<&str> = prompt.actions.iter().map(|a| a.label).collect();
            println!("[{}]", labels.join("] ["));
        }
        Commands::Import { csv, json } => {
            let summary = import_schedule_file(&csv, &json, policy)?;
            println!(
                "Imported {} slots ({} available, {} booked, {} blocked) into {}",
                summary.imported,
                summary.stats.available_slots,
                summary.stats.booked_slots,
                summary.stats.blocked_slots,
                json.display()
            );
        }
        Commands::Export { file, csv } => {
            let snapshot = load_schedule_file(&file, policy)?;
            export_schedule_to_csv(&snapshot.weekly_schedule, &csv)?;
            println!("Schedule exported to {}", csv.display());
        }
        Commands::Serve { port } => {
            let mut config = Config::from_env()?;
            config.total_policy = policy;
            if let Some(port) = port {
                config.port = port;
            }
            run_server(config).await?;
        }
    }

    Ok(())
}
