//! # orbit
//!
//! Command-line consumer of the ORBIT realtime client: follows a live room,
//! shows what the mode-aware resolver would render, and prints sandbox tips.

#![deny(unsafe_code)]

mod resolve;
mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orbit_logging::LogFormat;
use orbit_settings::OrbitSettings;

/// ORBIT realtime client.
#[derive(Parser, Debug)]
#[command(name = "orbit", about = "ORBIT realtime client")]
struct Cli {
    /// Settings file (defaults to `~/.orbit/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level filter (overrides settings; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Subscribe to a room and print every update as a JSON line.
    Watch(watch::WatchArgs),
    /// Print the data a page would render for a mode query.
    Resolve(resolve::ResolveArgs),
    /// Print sandbox workflow tips for a route.
    Tips {
        /// Route, e.g. `/crm/leads`.
        #[arg(long, default_value = "/")]
        path: String,
        /// Print a single random tip.
        #[arg(long)]
        random: bool,
    },
}

fn load_settings(path: Option<&PathBuf>) -> Result<OrbitSettings> {
    let settings = match path {
        Some(path) => orbit_settings::load_settings_from_path(path),
        None => orbit_settings::load_settings(),
    };
    settings.context("Failed to load settings")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.settings.as_ref())?;
    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    orbit_logging::init_subscriber(
        level,
        LogFormat::from_json_flag(cli.json_logs || settings.logging.json),
    );
    tracing::debug!(?settings, "settings loaded");

    match cli.command {
        Command::Watch(args) => watch::run(&settings, args).await,
        Command::Resolve(args) => resolve::run(&args),
        Command::Tips { path, random } => {
            if random {
                println!("{}", orbit_mode::simulation::random_tip(&path));
            } else {
                for tip in orbit_mode::simulation::tips_for_page(&path) {
                    println!("{tip}");
                }
            }
            Ok(())
        }
    }
}
