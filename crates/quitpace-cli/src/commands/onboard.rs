use chrono::{Local, Utc};
use clap::Args;
use quitpace_core::{Config, OnboardingInput, PlanSpeed};

use super::{open_tracker, print_json, CmdResult};

#[derive(Args)]
pub struct OnboardArgs {
    /// Cigarettes smoked in a typical week
    #[arg(long, default_value = "0")]
    cigarettes: u32,
    /// Vapes used in a typical week
    #[arg(long, default_value = "0")]
    vapes: u32,
    /// Reduction pace: slow, medium or quick (unknown values mean medium)
    #[arg(long)]
    speed: Option<String>,
    /// Price of a pack of 20 cigarettes
    #[arg(long)]
    pack_price: Option<f64>,
    /// Price of one vape pod
    #[arg(long)]
    vape_price: Option<f64>,
    /// Print the generated plan as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: OnboardArgs) -> CmdResult {
    let config = Config::load()?;
    let input = OnboardingInput {
        cigarettes_per_week: args.cigarettes,
        vapes_per_week: args.vapes,
        plan_speed: args.speed.as_deref().map(PlanSpeed::parse_lenient),
        cigarette_pack_price: args.pack_price,
        vape_price: args.vape_price,
    };

    let mut tracker = open_tracker()?;
    let plan = tracker.onboard(&input, &config.onboarding, Utc::now())?;

    if args.json {
        return print_json(&plan);
    }

    println!("Plan created ({})", plan.plan_speed.description());
    if let Some(first) = plan.weeks.first() {
        println!(
            "  Week 1: {} cigarettes, {} vapes",
            first.cigarettes_allowed, first.vapes_allowed
        );
    }
    println!("  Weeks: {}", plan.total_weeks);
    println!(
        "  Estimated quit date: {}",
        plan.estimated_quit_date.with_timezone(&Local).format("%Y-%m-%d")
    );
    Ok(())
}
