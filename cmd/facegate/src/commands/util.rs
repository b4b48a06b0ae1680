//! Utility functions for CLI commands.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use facegate_cli::{Config, Output, OutputFormat, Paths, load_config};
use facegate_faceid::{Decision, Engine};
use facegate_liveness::{Frame, LivenessReport, LivenessScorer};
use facegate_vecstore::{DiskIndex, VecIndex};
use serde::Serialize;

use crate::Cli;
use crate::lock::{DataLock, LockMode};
use crate::registry::FileRegistry;

/// Exit code for a request the engine rejected.
const EXIT_REJECTED: u8 = 2;

/// Gets the configuration, with defaults applied.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    let paths = Paths::new()?;
    load_config(&paths, cli.config.as_deref())
}

/// Output destination and format chosen on the command line.
pub fn output(cli: &Cli) -> Output {
    Output::new(OutputFormat::from_json_flag(cli.json), cli.output.clone())
}

/// Takes the data directory lock. Hold it for as long as the index or
/// registry opened under it is in use.
pub fn lock_data(cfg: &Config, mode: LockMode) -> anyhow::Result<DataLock> {
    DataLock::acquire(&cfg.lock_path(), mode)
}

/// Opens the on-disk index. The caller must hold the data lock.
pub fn open_index(cfg: &Config) -> anyhow::Result<Arc<DiskIndex>> {
    let path = cfg.index_path();
    let index = DiskIndex::open(&path, cfg.dimension)
        .with_context(|| format!("open index {}", path.display()))?;
    Ok(Arc::new(index))
}

/// Locks the data directory, then opens the index and registry and builds
/// an engine over them. Writers pass [`LockMode::Exclusive`] so that loading,
/// deciding and persisting happen as one step across processes.
pub fn open_engine(cfg: &Config, mode: LockMode) -> anyhow::Result<(DataLock, Engine)> {
    let lock = lock_data(cfg, mode)?;
    let index = open_index(cfg)?;
    let registry = FileRegistry::open(cfg.registry_path(), index.ids())?;
    if registry.len() != index.len() {
        tracing::warn!(
            registry = registry.len(),
            index = index.len(),
            path = %registry.path().display(),
            "registry and index sizes differ"
        );
    }
    let engine = Engine::new(cfg.engine_config(), index, Arc::new(registry))?;
    Ok((lock, engine))
}

/// Reads an embedding file: a JSON array of numbers, or `null` when the
/// extractor found no face.
pub fn read_embedding(path: &Path) -> anyhow::Result<Option<Vec<f32>>> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let embedding = serde_json::from_slice(&data)
        .with_context(|| format!("parse embedding {}", path.display()))?;
    Ok(embedding)
}

/// Decodes the image at `path`, downsized to the configured maximum size.
pub fn read_frame(cfg: &Config, path: &Path) -> anyhow::Result<Frame> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let frame = Frame::decode(&data, cfg.max_image_size)
        .with_context(|| format!("decode {}", path.display()))?;
    Ok(frame)
}

/// Scores the frame at `path` when one was given.
pub fn score_frame(cfg: &Config, path: Option<&Path>) -> anyhow::Result<Option<LivenessReport>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let frame = read_frame(cfg, path)?;
    Ok(Some(
        LivenessScorer::with_config(cfg.liveness_config()).report(&frame),
    ))
}

/// Result of a face command.
#[derive(Serialize)]
pub struct FaceResult {
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness: Option<LivenessReport>,
}

/// Prints a decision and maps it to the process exit code.
pub fn finish(
    cli: &Cli,
    decision: Decision,
    liveness: Option<LivenessReport>,
) -> anyhow::Result<ExitCode> {
    let accepted = decision.is_accepted();
    output(cli).write(&FaceResult { decision, liveness })?;
    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    })
}

/// Prints a success message to stderr.
pub fn print_success(msg: &str) {
    eprintln!("[ok] {}", msg);
}
