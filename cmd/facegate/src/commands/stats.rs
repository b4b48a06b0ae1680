//! Stats command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use facegate_vecstore::VecIndex;
use serde::Serialize;

use super::{get_config, lock_data, open_index, output};
use crate::Cli;
use crate::lock::LockMode;

/// Show the number of enrolled faces and the index dimension.
#[derive(Args)]
pub struct StatsCommand {}

#[derive(Serialize)]
struct Stats {
    entries: usize,
    dimension: usize,
    index: PathBuf,
}

impl StatsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        let _lock = lock_data(&cfg, LockMode::Shared)?;
        let index = open_index(&cfg)?;
        output(cli).write(&Stats {
            entries: index.len(),
            dimension: index.dim(),
            index: index.path().to_path_buf(),
        })?;
        Ok(ExitCode::SUCCESS)
    }
}
