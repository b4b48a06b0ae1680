//! CLI utilities for facegate.
//!
//! Shared by the `facegate` binary: the YAML config file, the on-disk
//! layout under `~/.facegate`, and YAML/JSON output.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{Config, load_config, save_config};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
