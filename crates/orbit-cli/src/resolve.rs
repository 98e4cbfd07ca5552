//! `orbit resolve`: show what a page renders for a given mode query.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use orbit_core::MemoryStore;
use orbit_mode::fixtures::FIXTURE_NAMES;
use orbit_mode::{HistoryNavigator, ModeProvider, SandboxFixtures};
use serde_json::{Value, json};

/// Arguments for `orbit resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// URL query the tab was opened with, e.g. `?mode=sandbox`.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Fixture dataset: workers, clients, stats, jobs, payroll or leads.
    #[arg(long, default_value = "stats")]
    pub fixture: String,

    /// JSON file holding the live dataset; absent means no live data.
    #[arg(long)]
    pub live: Option<PathBuf>,

    /// Treat live data as still loading.
    #[arg(long)]
    pub loading: bool,
}

fn resolve(args: &ResolveArgs, live: Option<&Value>) -> Result<Value> {
    let Some(sandbox) = SandboxFixtures::demo().by_name(&args.fixture) else {
        bail!(
            "Unknown fixture {:?} (expected one of {})",
            args.fixture,
            FIXTURE_NAMES.join(", ")
        );
    };

    let mode = ModeProvider::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HistoryNavigator::default()),
    )
    .initialize(&args.query);

    let resolved = mode.select_data_with_fallback(live, &sandbox, args.loading);
    Ok(json!({
        "mode": mode.mode(),
        "isLoading": resolved.is_loading,
        "isUsingDemo": resolved.is_using_demo,
        "data": resolved.data,
    }))
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let live = match &args.live {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value: Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?;
            Some(value)
        }
        None => None,
    };

    let output = resolve(args, live.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
