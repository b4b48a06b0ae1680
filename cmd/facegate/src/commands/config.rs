//! Configuration management commands.

use std::process::ExitCode;

use clap::{Args, Subcommand};
use facegate_cli::{Paths, save_config};

use super::{get_config, output, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.facegate/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// View the effective configuration, defaults included
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<ExitCode> {
        let cfg = get_config(cli)?;
        match &self.command {
            ConfigSubcommand::Show => {
                output(cli).write(&cfg)?;
            }
            ConfigSubcommand::Init { force } => {
                if cfg.path().exists() && !force {
                    anyhow::bail!(
                        "{} already exists, use --force to overwrite",
                        cfg.path().display()
                    );
                }
                let paths = Paths::new()?;
                let path = save_config(&paths, &cfg, cli.config.as_deref())?;
                print_success(&format!("wrote {}", path.display()));
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
