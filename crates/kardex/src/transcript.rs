use std::path::PathBuf;

use kardex_core::report::parse_transcript;

use crate::extract::load;
use crate::prelude::*;

#[derive(Debug, clap::Parser)]
#[command(name = "transcript")]
#[command(about = "Parse a student transcript (kárdex)")]
pub struct App {
    /// Path to the transcript PDF
    pub path: Option<PathBuf>,
}

/// Parse the transcript and return its JSON line.
pub fn run(app: App) -> Result<String> {
    let loaded = load(app.path.as_deref())?;
    let report = parse_transcript(&loaded.document);
    serde_json::to_string(&report).context("failed to serialize transcript report")
}
