use super::{open_tracker, CmdResult};

pub fn run(yes: bool) -> CmdResult {
    if !yes {
        return Err("refusing to delete tracker data without --yes".into());
    }
    let mut tracker = open_tracker()?;
    tracker.reset()?;
    println!("all tracker data deleted");
    Ok(())
}
