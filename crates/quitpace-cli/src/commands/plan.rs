use chrono::{Local, Utc};
use quitpace_core::current_week;

use super::{open_tracker, print_json, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let tracker = open_tracker()?;
    let plan = tracker.plan()?;

    if json {
        return print_json(&plan);
    }

    let current = current_week(&plan, Utc::now()).map(|w| w.week_number);
    println!(
        "{} plan from {}, baseline {} cigarettes + {} vapes per week",
        plan.plan_speed,
        plan.start_date.with_timezone(&Local).format("%Y-%m-%d"),
        plan.original_cigarettes_per_week,
        plan.original_vapes_per_week
    );
    println!("  week  starts      total  cigs  vapes  cig wait  vape wait");
    for week in &plan.weeks {
        let marker = if Some(week.week_number) == current { '>' } else { ' ' };
        println!(
            "{marker} {:>4}  {}  {:>5}  {:>4}  {:>5}  {:>7}m  {:>8}m",
            week.week_number + 1,
            week.week_start.with_timezone(&Local).format("%Y-%m-%d"),
            week.total_allowed,
            week.cigarettes_allowed,
            week.vapes_allowed,
            week.wait_time_cigs,
            week.wait_time_vapes
        );
    }
    Ok(())
}
