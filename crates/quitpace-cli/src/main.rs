use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "quitpace", version, about = "Taper off cigarettes and vapes, one week at a time")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the onboarding questions and generate a new plan
    Onboard(commands::onboard::OnboardArgs),
    /// Current week, wait times and today's count
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a cigarette or a vape
    Log(commands::log::LogArgs),
    /// Show the full weekly schedule
    Plan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Progress statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement catalog and unlocks
    Achievements {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Stay running and announce when the next use is allowed
    Watch(commands::watch::WatchArgs),
    /// Delete the plan, profile, log and achievements
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("QUITPACE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Onboard(args) => commands::onboard::run(args),
        Commands::Status { json } => commands::status::run(json),
        Commands::Log(args) => commands::log::run(args),
        Commands::Plan { json } => commands::plan::run(json),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Achievements { json } => commands::achievements::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Reset { yes } => commands::reset::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
