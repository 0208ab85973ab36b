use std::path::PathBuf;

use clap::Args;
use glassmotion_core::{simulate_into, Script};

use super::load_config;
use super::output::JsonLines;

#[derive(Args)]
pub struct SimulateArgs {
    /// Script file (.toml or .json); defaults to the built-in demo
    #[arg(long)]
    script: Option<PathBuf>,
    /// Config file to use instead of the user's config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop the clock at this time (ms)
    #[arg(long)]
    until_ms: Option<u64>,
    /// Unmount the screen at this time (ms)
    #[arg(long)]
    unmount_at_ms: Option<u64>,
    /// Print a summary object after the frames
    #[arg(long)]
    summary: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let mut script = match &args.script {
        Some(path) => Script::from_path(path)?,
        None => Script::demo(),
    };
    if let Some(until) = args.until_ms {
        script.until_ms = Some(until);
    }
    if let Some(at) = args.unmount_at_ms {
        script.unmount_at_ms = Some(at);
    }

    let mut out = JsonLines::new(std::io::stdout().lock());
    let report = simulate_into(&script, &config, &mut out);
    tracing::debug!(frames = out.written(), "simulation finished");

    if args.summary {
        let summary = serde_json::json!({
            "type": "summary",
            "frames": report.frames.len(),
            "ended_at_ms": report.ended_at_ms,
            "unmounted_at_ms": report.unmounted_at_ms,
            "cancelled": report.cancelled,
            "pending_at_end": report.pending_at_end,
        });
        drop(out);
        println!("{summary}");
    }
    Ok(())
}
