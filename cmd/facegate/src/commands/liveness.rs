//! Liveness command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use facegate_liveness::{LivenessReport, LivenessScorer};
use serde::Serialize;

use super::{get_config, output, read_frame};
use crate::Cli;

/// Score an image for passive liveness.
///
/// Prints the four sub-scores, the overall score, and the spoof verdict.
#[derive(Args)]
pub struct LivenessCommand {
    /// Image file (PNG or JPEG)
    image: PathBuf,
}

#[derive(Serialize)]
struct LivenessResult {
    #[serde(flatten)]
    report: LivenessReport,
    threshold: f64,
    passed: bool,
    spoof_score: f64,
    is_spoof: bool,
}

impl LivenessCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        let frame = read_frame(&cfg, &self.image)?;

        let scorer = LivenessScorer::with_config(cfg.liveness_config());
        let report = scorer.report(&frame);
        let (is_spoof, spoof_score) = scorer.detect_spoofing(&frame);
        let threshold = scorer.config().threshold;

        output(cli).write(&LivenessResult {
            report,
            threshold,
            passed: scorer.check(Some(&frame)),
            spoof_score,
            is_spoof,
        })?;
        Ok(ExitCode::SUCCESS)
    }
}
