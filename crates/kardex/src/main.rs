use std::process::ExitCode;

use crate::error::Failure;
use crate::prelude::*;
use crate::prelude::println;
use clap::Parser;

mod error;
mod extract;
mod plan;
mod prelude;
mod transcript;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn university transcript and study-plan PDFs into a single line of JSON"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Log classification decisions and counts to stderr.
    #[clap(long, env = "KARDEX_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Parse a student transcript (kárdex)
    Transcript(crate::transcript::App),

    /// Parse a study plan (curriculum)
    Plan(crate::plan::App),
}

fn init_logger(global: &Global) {
    let level = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let app = App::parse();
    init_logger(&app.global);

    let outcome = match app.command {
        SubCommands::Transcript(sub_app) => crate::transcript::run(sub_app),
        SubCommands::Plan(sub_app) => crate::plan::run(sub_app),
    };

    match outcome {
        Ok(line) => {
            println!("{line}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            log::debug!("{err:?}");
            let line = serde_json::to_string(&Failure::new(&err))
                .map_err(|e| eyre!("failed to serialize error: {e}"))?;
            println!("{line}");
            Ok(ExitCode::FAILURE)
        }
    }
}
