//! Deterministic scenario runner
//!
//! ```text
//! frontline-scenario <save_in.json> --turns N [--apply-breaches] [--apply-negotiation]
//!     --script <path.json> [--out <path>] [--summary <path>] [--config <path>]
//! ```
//!
//! Writes the final save (default `<save_in>.out.json`) and a per-turn summary
//! (default `data/derived/scenario_summary.json`). Logs go to stderr and are
//! filtered with `RUST_LOG`.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use frontline_core::{load_state, run_scenario, save_state, ScenarioScript, TurnConfig};
use tracing::info;

const DEFAULT_SUMMARY_PATH: &str = "data/derived/scenario_summary.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a scripted multi-turn scenario", long_about = None)]
struct Args {
    /// Save file to start from
    save_in: PathBuf,

    /// Number of turns to run
    #[arg(long)]
    turns: u32,

    /// Flip settlement control on breached edges
    #[arg(long)]
    apply_breaches: bool,

    /// Run the negotiation pressure and capital stage
    #[arg(long)]
    apply_negotiation: bool,

    /// Scenario script JSON
    #[arg(long)]
    script: PathBuf,

    /// Output save path (defaults to `<save_in>.out.json`)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Summary output path
    #[arg(long, default_value = DEFAULT_SUMMARY_PATH)]
    summary: PathBuf,

    /// Turn config JSON (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// `<save_in>.out.json`, keeping the input's own extension
fn default_out_path(save_in: &Path) -> PathBuf {
    let mut name = save_in.as_os_str().to_os_string();
    name.push(".out.json");
    PathBuf::from(name)
}

/// Usage errors exit 1 like runtime errors; help and version exit 0
fn exit_code_for(err: &clap::Error) -> ExitCode {
    if err.use_stderr() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let state = load_state(&args.save_in)
        .with_context(|| format!("Failed to load save {}", args.save_in.display()))?;
    let script = ScenarioScript::from_file(&args.script)
        .with_context(|| format!("Failed to load script {}", args.script.display()))?;

    let mut config = match &args.config {
        Some(path) => TurnConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TurnConfig::default(),
    };
    config.stages.apply_breaches = args.apply_breaches;
    config.stages.negotiation = args.apply_negotiation;

    let outcome = run_scenario(state, &script, config, args.turns)
        .with_context(|| format!("Scenario failed after loading {}", args.save_in.display()))?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&args.save_in));
    ensure_parent(&out)?;
    save_state(&outcome.final_state, &out)
        .with_context(|| format!("Failed to write save {}", out.display()))?;

    ensure_parent(&args.summary)?;
    let mut summary_json = serde_json::to_string_pretty(&outcome.summary)?;
    summary_json.push('\n');
    fs::write(&args.summary, summary_json)
        .with_context(|| format!("Failed to write summary {}", args.summary.display()))?;

    info!(
        turns = args.turns,
        events = outcome.event_log.len(),
        out = %out.display(),
        summary = %args.summary.display(),
        "scenario written"
    );
    println!(
        "scenario complete: turns={} apply_breaches={} apply_negotiation={}",
        args.turns, args.apply_breaches, args.apply_negotiation
    );
    println!("  out: {}", out.display());
    println!("  summary: {}", args.summary.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = exit_code_for(&err);
            // clap routes help/version to stdout and usage errors to stderr
            let _ = err.print();
            return code;
        }
    };
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
