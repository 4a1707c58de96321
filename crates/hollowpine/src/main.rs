use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use hollowpine::headless::{self, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Ron,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Number of frames to simulate (16ms each)
    #[arg(long, default_value = "3600")]
    frames: u64,

    /// Scripted route for the player
    #[arg(long, value_enum, default_value = "square")]
    route: Route,

    /// Config file (RON); defaults to ./hollowpine.ron when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Report output format
    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = hollowpine::config::load(args.config.as_deref())?;

    if args.show_config {
        let text = config
            .to_ron_string()
            .context("Failed to serialize configuration")?;
        println!("{}", text);
        return Ok(());
    }

    log::info!("Starting Hollowpine headless run");
    log::info!("  Seed: {}", args.seed);
    log::info!("  Frames: {}", args.frames);
    log::info!("  Route: {:?}", args.route);

    let report = headless::run(config, args.seed, args.frames, args.route)?;

    match args.format {
        ReportFormat::Text => println!("{}", report),
        ReportFormat::Ron => println!("{}", report.to_ron()?),
    }
    Ok(())
}
