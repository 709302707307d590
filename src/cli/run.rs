//! Command dispatcher.
//!
//! Configuration priority is CLI arguments over `.remodelrc.json` over
//! built-in defaults; boolean flags are OR-ed so a config file cannot
//! disable an explicitly passed flag.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use colored::Colorize;

use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config};
use crate::core::{CancelToken, Engine, MigrationSummary};
use crate::reporter::Reporter;

use super::{
    args::{Arguments, Command, MigrateArgs},
    exit_status::ExitStatus,
};

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Migrate(cmd)) => migrate(cmd.args),
        Some(Command::Init) => {
            init()?;
            Ok(ExitStatus::Success)
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn migrate(args: MigrateArgs) -> Result<ExitStatus> {
    let base = args
        .input_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let load_result = load_config(&base)?;
    let mut config = load_result.config;

    // CLI overrides (CLI > config file > defaults)
    config.dry_run |= args.dry_run;
    config.skip_processed |= args.skip_processed;
    config.models_only |= args.models_only;
    config.mixins_only |= args.mixins_only;
    config.verbose |= args.verbose;
    config.debug |= args.debug;

    let reporter = Reporter::new(config.verbose, config.debug);

    if !load_result.from_file && config.verbose {
        eprintln!("Note: No {CONFIG_FILE_NAME} found, using default configuration");
    }
    for key in config.unknown.keys() {
        reporter.warn(format!("Unrecognized configuration option '{key}'; ignoring it"));
    }

    let resolved = config.resolve(&base)?;
    let engine = Engine::new(resolved, &reporter);
    let summary = engine.run(&CancelToken::new())?;

    print_summary(&summary);
    Ok(ExitStatus::Success)
}

fn print_summary(summary: &MigrationSummary) {
    let verb = if summary.dry_run {
        "planned"
    } else {
        "wrote"
    };
    let mark = if summary.warnings == 0 {
        "\u{2713}".green()
    } else {
        "\u{2713}".yellow()
    };

    println!(
        "{mark} indexed {} files ({} models, {} intermediate, {} mixins); {verb} {} resources, {} traits, {} extensions; {} skipped; {} warnings",
        summary.files_indexed,
        summary.models,
        summary.intermediate_models,
        summary.mixins,
        summary.outcome.resources,
        summary.outcome.traits,
        summary.outcome.extensions,
        summary.outcome.skipped,
        summary.warnings,
    );
    if summary.outcome.cancelled {
        println!("{}", "run was cancelled before completion".yellow());
    }
}

fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;
    Ok(())
}
