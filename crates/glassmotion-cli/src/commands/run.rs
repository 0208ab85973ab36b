use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use glassmotion_core::{run_realtime, Input};
use tokio::sync::mpsc;

use super::load_config;
use super::output::JsonLines;

#[derive(Args)]
pub struct RunArgs {
    /// Config file to use instead of the user's config
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Read inputs line by line until EOF or `quit`.
///
/// Stdin is blocking, so this lives on its own thread and hands inputs to
/// the stage's task over a channel. Dropping the sender ends the session.
fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" || line == "q" {
                break;
            }
            match line.parse::<Input>() {
                Ok(input) => {
                    if tx.blocking_send(input).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{e} (expected one of: {})", input_names()),
            }
        }
    });
}

fn input_names() -> String {
    Input::ALL
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let (tx, rx) = mpsc::channel(32);
    spawn_stdin_reader(tx);

    let mut out = JsonLines::new(std::io::stdout()).with_wall_clock();
    let summary = runtime.block_on(run_realtime(&config, rx, &mut out));
    tracing::info!(
        inputs = summary.inputs,
        frames = summary.frames,
        cancelled = summary.cancelled,
        elapsed_ms = summary.elapsed_ms,
        "session ended"
    );
    Ok(())
}
