use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::schedule::view_model::GridRow;
use crate::schedule::{ScheduleView, SlotStatus};

/// One-character marker used in the text grid
pub fn status_marker(status: SlotStatus) -> char {
    match status {
        SlotStatus::Booked => 'B',
        SlotStatus::Available => 'A',
        SlotStatus::Blocked => 'X',
        SlotStatus::Empty => '.',
    }
}

/// One grid row: padded day label, then ` HH:MM [m]` per cell
fn format_row(row: &GridRow) -> String {
    let mut line = format!("{:<10}", row.label);
    for cell in &row.cells {
        line.push_str(&format!(" {} [{}]", cell.time, status_marker(cell.status)));
    }
    line
}

/// Renders a view as plain text: header, stat cards, then one line per day
pub fn format_week_schedule(view: &ScheduleView) -> String {
    let mut out = format!("** {} **\n{}\n\n", view.header.title, view.header.subtitle);

    for card in &view.stat_cards {
        out.push_str(&format!("  {:<20} {:>4}\n", card.label, card.value));
    }
    out.push('\n');

    if view.times.is_empty() {
        out.push_str("No time slots scheduled this week\n");
        return out;
    }

    for row in &view.grid {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out.push_str("\nLegend: B=booked A=available X=blocked .=empty\n");
    out
}

/// Prints a week schedule in a readable format
pub fn print_week_schedule(view: &ScheduleView) {
    print!("{}", format_week_schedule(view));
}

/// Writes the same text as [`print_week_schedule`] to a file
pub fn write_schedule_to_file(view: &ScheduleView, filename: &Path) -> Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(format_week_schedule(view).as_bytes())?;
    Ok(())
}
