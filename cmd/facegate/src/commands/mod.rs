//! CLI commands module.

mod config;
mod face;
mod liveness;
mod stats;
mod util;

pub use config::ConfigCommand;
pub use face::{EnrollCommand, IdentifyCommand, VerifyCommand};
pub use liveness::LivenessCommand;
pub use stats::StatsCommand;

pub(crate) use util::*;
