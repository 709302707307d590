//! Core migration engine: a five-stage pipeline run strictly in order.
//!
//! `index -> classify -> resolve -> plan -> emit`. Control is
//! single-threaded and deterministic; the planner needs global visibility
//! before emission, and emission order is part of the output contract.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::config::ResolvedConfig;
use crate::reporter::Reporter;

pub mod classify;
pub mod emit;
pub mod index;
pub mod plan;
pub mod resolve;

pub use classify::{Classification, classify_all};
pub use emit::{EmitOutcome, Emitter};
pub use index::SourceIndex;
pub use plan::plan as plan_symbols;
pub use resolve::{Materialize, Resolver};

/// Cooperative cancellation, checked between artifact plans.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a full run did, for the CLI summary line.
#[derive(Debug)]
pub struct MigrationSummary {
    pub files_indexed: usize,
    pub models: usize,
    pub intermediate_models: usize,
    pub mixins: usize,
    pub outcome: EmitOutcome,
    pub warnings: usize,
    pub dry_run: bool,
}

/// The migration engine. Owns the resolved configuration; everything
/// else lives for the duration of one [`Engine::run`].
pub struct Engine<'a> {
    config: ResolvedConfig,
    reporter: &'a Reporter,
}

impl<'a> Engine<'a> {
    pub fn new(config: ResolvedConfig, reporter: &'a Reporter) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Run the whole pipeline once.
    pub fn run(&self, cancel: &CancelToken) -> Result<MigrationSummary> {
        let index = SourceIndex::build(&self.config, self.reporter);
        let resolver = Resolver::new(&index, &self.config, self.reporter);
        let classified = classify_all(&index, &resolver, &self.config, self.reporter);

        let mut models = 0;
        let mut intermediate_models = 0;
        let mut mixins = 0;
        for file in classified.values() {
            match file.classification {
                Classification::Model(_) => models += 1,
                Classification::IntermediateModel(_) => intermediate_models += 1,
                Classification::Mixin(_) => mixins += 1,
                Classification::Ignored => {}
            }
        }

        let planned = plan::plan(&index, &classified, &resolver, &self.config, self.reporter);
        let emitter = Emitter::new(&self.config, &resolver, &planned.catalog, self.reporter);
        let outcome = emitter.emit(&planned.schedule, cancel)?;

        Ok(MigrationSummary {
            files_indexed: index.len(),
            models,
            intermediate_models,
            mixins,
            outcome,
            warnings: self.reporter.warning_count(),
            dry_run: self.config.dry_run,
        })
    }
}
