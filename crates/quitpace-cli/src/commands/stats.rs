use chrono::Local;
use quitpace_core::Config;

use super::{open_tracker, print_json, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let tracker = open_tracker()?;
    // Without a plan the numbers are all zero; say so instead.
    tracker.plan()?;
    let stats = tracker.stats(&Local::now())?;

    if json {
        return print_json(&stats);
    }

    let currency = Config::load_or_default().display.currency_symbol;
    println!("Days active:      {}", stats.days_active);
    println!("Weeks since start: {}", stats.weeks_since_start);
    println!(
        "Logged:           {} ({} cigarettes, {} vapes)",
        stats.total_logged, stats.cigarettes_logged, stats.vapes_logged
    );
    println!("Reduction:        {}%", stats.reduction_percentage);
    println!("Money saved:      {currency}{:.2}", stats.money_saved);
    println!("Current streak:   {} days", stats.current_streak);
    println!("Perfect days:     {}", stats.perfect_days);
    Ok(())
}
