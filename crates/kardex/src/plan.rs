use std::path::PathBuf;

use kardex_core::assembler::DEFAULT_CONTINUATION_BUDGET;
use kardex_core::report::{parse_plan, PlanOptions};
use log::info;

use crate::extract::load;
use crate::prelude::*;

#[derive(Debug, clap::Parser)]
#[command(name = "plan")]
#[command(about = "Parse a study plan (curriculum)")]
pub struct App {
    /// Path to the study-plan PDF
    pub path: Option<PathBuf>,

    /// Include the table extractor name and sample rows in the output
    #[arg(long, env = "KARDEX_DEBUG", default_value = "false")]
    pub debug: bool,

    /// Lines that may continue a course name after its code line
    #[arg(long = "cont", env = "KARDEX_CONT", default_value_t = DEFAULT_CONTINUATION_BUDGET)]
    pub continuation_budget: usize,
}

impl App {
    fn options(&self) -> PlanOptions {
        PlanOptions {
            continuation_budget: self.continuation_budget,
            debug: self.debug,
        }
    }
}

/// Parse the study plan and return its JSON line.
pub fn run(app: App) -> Result<String> {
    let loaded = load(app.path.as_deref())?;
    let report = parse_plan(&loaded.document, loaded.extractor, &app.options());
    if !report.ok {
        info!("{}", report.warnings.join("; "));
    }
    serde_json::to_string(&report).context("failed to serialize plan report")
}
