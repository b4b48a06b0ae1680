//! Enroll, verify and identify commands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use super::{finish, get_config, open_engine, read_embedding, score_frame};
use crate::Cli;
use crate::lock::LockMode;

/// Input shared by the face commands.
#[derive(Args)]
pub struct FaceInput {
    /// Embedding file: JSON array of numbers, or null when no face was found
    #[arg(short = 'e', long)]
    embedding: PathBuf,

    /// Frame image (PNG or JPEG) to score for liveness
    #[arg(long)]
    frame: Option<PathBuf>,
}

/// Enroll a new identity.
///
/// Fails with `already_enrolled` if the identity exists, and with
/// `fraud_alert` if the face already belongs to someone else.
#[derive(Args)]
pub struct EnrollCommand {
    /// Identity to enroll
    #[arg(short = 'i', long)]
    identity: String,

    #[command(flatten)]
    input: FaceInput,
}

impl EnrollCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        let embedding = read_embedding(&self.input.embedding)?;
        let liveness = score_frame(&cfg, self.input.frame.as_deref())?;

        let (_lock, engine) = open_engine(&cfg, LockMode::Exclusive)?;
        let decision = engine.enroll(
            embedding.as_deref(),
            &self.identity,
            liveness.map(|r| r.score),
        )?;
        finish(cli, decision, liveness)
    }
}

/// Verify a claimed identity.
///
/// An identity that is not registered yet is enrolled with this face,
/// unless the face matches another identity.
#[derive(Args)]
pub struct VerifyCommand {
    /// Claimed identity
    #[arg(short = 'i', long)]
    identity: String,

    #[command(flatten)]
    input: FaceInput,
}

impl VerifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        let embedding = read_embedding(&self.input.embedding)?;
        let liveness = score_frame(&cfg, self.input.frame.as_deref())?;

        let (_lock, engine) = open_engine(&cfg, LockMode::Exclusive)?;
        let decision = engine.authenticate(
            embedding.as_deref(),
            Some(&self.identity),
            liveness.map(|r| r.score),
        )?;
        finish(cli, decision, liveness)
    }
}

/// Find the enrolled identity matching a face. Never enrolls.
#[derive(Args)]
pub struct IdentifyCommand {
    #[command(flatten)]
    input: FaceInput,
}

impl IdentifyCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        let embedding = read_embedding(&self.input.embedding)?;
        let liveness = score_frame(&cfg, self.input.frame.as_deref())?;

        let (_lock, engine) = open_engine(&cfg, LockMode::Shared)?;
        let decision = engine.identify(embedding.as_deref(), liveness.map(|r| r.score))?;
        finish(cli, decision, liveness)
    }
}
