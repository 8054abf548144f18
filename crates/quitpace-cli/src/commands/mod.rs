pub mod achievements;
pub mod config;
pub mod log;
pub mod onboard;
pub mod plan;
pub mod reset;
pub mod stats;
pub mod status;
pub mod watch;

use quitpace_core::{Database, Tracker};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_tracker() -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    Ok(Tracker::new(Database::open()?))
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable wait, rounded up to the minute.
pub fn format_wait(ms: i64) -> String {
    if ms <= 0 {
        return "now".to_string();
    }
    let minutes = (ms + 59_999) / 60_000;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m:02}m"),
    }
}
