//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `migrate`: rewrite models and mixins into schema artifacts
//! - `init`: initialize a `.remodelrc.json` configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct MigrateArgs {
    /// Project root containing the sources to migrate (overrides config)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Plan everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip symbols whose artifacts already exist on disk
    #[arg(long)]
    pub skip_processed: bool,

    /// Only emit resources (models)
    #[arg(long, conflicts_with = "mixins_only")]
    pub models_only: bool,

    /// Only emit traits (mixins)
    #[arg(long)]
    pub mixins_only: bool,

    /// Print per-file progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the resolved schedule and every resolver decision
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args)]
pub struct MigrateCommand {
    #[command(flatten)]
    pub args: MigrateArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite legacy models and mixins into schema artifacts
    Migrate(MigrateCommand),
    /// Initialize a new .remodelrc.json configuration file
    Init,
}
