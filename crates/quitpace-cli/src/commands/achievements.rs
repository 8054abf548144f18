use chrono::Local;

use super::{open_tracker, print_json, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let mut tracker = open_tracker()?;
    if tracker.is_onboarded()? {
        tracker.refresh_achievements(&Local::now())?;
    }
    let views = tracker.achievements()?;

    if json {
        return print_json(&views);
    }

    let earned = views.iter().filter(|v| v.unlocked_at.is_some()).count();
    println!("{earned}/{} unlocked", views.len());
    for view in &views {
        match view.unlocked_at {
            Some(at) => println!(
                "  [x] {} {:<18} {} (since {})",
                view.icon,
                view.title,
                view.description,
                at.with_timezone(&Local).format("%Y-%m-%d")
            ),
            None => println!("  [ ] {} {:<18} {}", view.icon, view.title, view.description),
        }
    }
    Ok(())
}
