mod replay;
mod script;

use std::path::PathBuf;

use canvas::config::EngineConfig;
use clap::Parser;

use crate::replay::{Pacing, ReplayError};
use crate::script::Script;

#[derive(Parser, Debug)]
#[command(name = "mockup", about = "Replay customizer input against the transform engine and print the mockup")]
struct Cli {
    /// Script JSON: container, print area, elements and timed steps.
    #[arg(env = "MOCKUP_SCRIPT")]
    script: PathBuf,

    /// Wait out each step's `at_ms` instead of using a synthetic clock.
    #[arg(long, env = "MOCKUP_REALTIME")]
    realtime: bool,

    /// Pretty-print the JSON result.
    #[arg(long, env = "MOCKUP_PRETTY")]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = EngineConfig::from_env()?;
    let script = Script::load(&cli.script).await?;
    let pacing = if cli.realtime { Pacing::Realtime } else { Pacing::Synthetic };
    let outcome = replay::run(&script, config, pacing).await?;

    let json = if cli.pretty { serde_json::to_string_pretty(&outcome)? } else { serde_json::to_string(&outcome)? };
    println!("{json}");
    Ok(())
}
