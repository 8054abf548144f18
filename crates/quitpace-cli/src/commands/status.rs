use chrono::Local;
use quitpace_core::KindStatus;

use super::{format_wait, open_tracker, print_json, CmdResult};

fn describe(kind: &KindStatus) -> String {
    match kind.remaining_ms {
        None => "none left this week".to_string(),
        Some(_) if kind.can_log => "ready".to_string(),
        Some(ms) => format!("wait {}", format_wait(ms)),
    }
}

pub fn run(json: bool) -> CmdResult {
    let tracker = open_tracker()?;
    let now = Local::now();
    let dashboard = tracker.status(&now)?;

    if json {
        return print_json(&dashboard);
    }

    match &dashboard.week {
        Some(week) if week.is_terminal() => {
            println!("Plan complete: no more uses are scheduled.");
        }
        Some(week) => {
            println!(
                "Week {} of {} (ends {})",
                week.week_number + 1,
                dashboard.total_weeks,
                week.week_end().with_timezone(&Local).format("%Y-%m-%d")
            );
        }
        None => println!("No active week."),
    }

    for kind in &dashboard.kinds {
        println!(
            "  {:<10} {:>4}/week  every {:>5}  {}",
            kind.kind.as_str(),
            kind.allowed_this_week,
            format!("{}m", kind.wait_minutes),
            describe(kind)
        );
    }
    println!("Today: {} logged", dashboard.today_count);
    println!(
        "Estimated quit date: {}",
        dashboard.estimated_quit_date.with_timezone(&Local).format("%Y-%m-%d")
    );
    Ok(())
}
