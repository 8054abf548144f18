use std::time::Duration;

use chrono::{Local, Utc};
use clap::Args;
use quitpace_core::{Config, Notifier, Reminder, ReminderScheduler};

use super::{open_tracker, print_json, CmdResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Arm reminders, print what is pending and exit
    #[arg(long)]
    once: bool,
    /// Print pending reminders as JSON (with --once)
    #[arg(long)]
    json: bool,
}

/// Prints reminders to stdout.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, reminder: &Reminder) -> quitpace_core::Result<()> {
        println!(
            "[{}] {}: {}",
            reminder.due_at.with_timezone(&Local).format("%H:%M"),
            reminder.title(),
            reminder.body()
        );
        Ok(())
    }
}

pub fn run(args: WatchArgs) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(args))
}

/// Deliver due reminders whose kind is still allowed, then rebuild the queue
/// from the current log. The log is reread every pass so uses recorded by
/// other processes are picked up.
fn tick(scheduler: &mut ReminderScheduler, notifier: &mut impl Notifier) -> CmdResult {
    let tracker = open_tracker()?;
    let now = Utc::now();
    let status = tracker.status(&now)?;

    for reminder in scheduler.poll_due(now) {
        let still_ready = status
            .kinds
            .iter()
            .any(|k| k.kind == reminder.kind && k.can_log);
        if still_ready {
            notifier.notify(&reminder)?;
        } else {
            tracing::debug!(kind = %reminder.kind, "dropping stale reminder");
        }
    }

    tracker.rearm_reminders(scheduler, now)?;
    Ok(())
}

async fn watch(args: WatchArgs) -> CmdResult {
    let config = Config::load()?;
    let mut scheduler = ReminderScheduler::new();
    let mut notifier = StdoutNotifier;

    tick(&mut scheduler, &mut notifier)?;

    if args.once {
        if args.json {
            return print_json(&scheduler.pending());
        }
        if scheduler.pending().is_empty() {
            println!("no reminders pending");
        }
        for reminder in scheduler.pending() {
            println!(
                "{} at {}",
                reminder.title(),
                reminder.due_at.with_timezone(&Local).format("%H:%M")
            );
        }
        return Ok(());
    }

    if !config.notifications.enabled {
        println!("notifications are disabled (set notifications.enabled = true)");
        return Ok(());
    }

    let poll = Duration::from_secs(config.notifications.poll_interval_secs.max(1));
    tracing::info!(poll_secs = poll.as_secs(), "watching for reminders");

    loop {
        let sleep_for = scheduler
            .next_due()
            .map(|due| (due - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            .map_or(poll, |until_due| until_due.min(poll));

        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch");
                scheduler.cancel_all();
                return Ok(());
            }
        }

        tick(&mut scheduler, &mut notifier)?;
    }
}
