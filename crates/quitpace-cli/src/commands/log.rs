use chrono::Local;
use clap::Args;
use quitpace_core::{LogOutcome, UnlockedAchievement, UsageKind};

use super::{format_wait, open_tracker, print_json, CmdResult};

/// Exit status when the plan refuses the log.
const REFUSED_EXIT_CODE: i32 = 2;

#[derive(Args)]
pub struct LogArgs {
    /// cigarette or vape
    kind: String,
    /// Record the use even if the wait has not elapsed
    #[arg(long)]
    force: bool,
    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn announce(unlocked: &[UnlockedAchievement]) {
    for a in unlocked {
        println!("Achievement unlocked: {} {} ({})", a.icon, a.title, a.description);
    }
}

pub fn run(args: LogArgs) -> CmdResult {
    let kind: UsageKind = args.kind.parse()?;
    let mut tracker = open_tracker()?;
    let now = Local::now();

    let outcome = if args.force {
        let (entry, unlocked) = tracker.record_use(kind, &now)?;
        LogOutcome::Logged { entry, unlocked }
    } else {
        tracker.log_use(kind, &now)?
    };

    if args.json {
        print_json(&outcome)?;
    } else {
        match &outcome {
            LogOutcome::Logged { entry, unlocked } => {
                println!(
                    "Logged {} at {}",
                    entry.kind,
                    entry.timestamp.with_timezone(&Local).format("%H:%M")
                );
                announce(unlocked);
            }
            LogOutcome::TooSoon { remaining_ms } => {
                println!("Too soon: next {kind} in {}", format_wait(*remaining_ms));
            }
            LogOutcome::Exhausted => {
                println!("No {kind}s left this week");
            }
        }
    }

    if !matches!(outcome, LogOutcome::Logged { .. }) {
        std::process::exit(REFUSED_EXIT_CODE);
    }
    Ok(())
}
