//! Emitter: renders and flushes the artifact families for each plan.
//!
//! A plan is atomic with respect to its files: all artifacts are rendered
//! to buffers before the first write, so cancellation or a render problem
//! never leaves a partial artifact set behind. Directories are created
//! lazily; a dry run suppresses writes and directory creation alike.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::ResolvedConfig;
use crate::core::plan::{ArtifactPlan, SymbolCatalog};
use crate::core::resolve::{Materialize, Resolver};
use crate::core::CancelToken;
use crate::reporter::Reporter;

pub mod extension;
pub mod schema;
pub mod types;

pub use extension::render_extension;
pub use schema::render_schema;
pub use types::render_types;

/// Tallies of one emission pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmitOutcome {
    pub resources: usize,
    pub traits: usize,
    pub extensions: usize,
    /// Plans skipped because every target already existed
    /// (`skipProcessed`).
    pub skipped: usize,
    pub cancelled: bool,
}

pub struct Emitter<'a> {
    config: &'a ResolvedConfig,
    resolver: &'a Resolver<'a>,
    catalog: &'a SymbolCatalog,
    reporter: &'a Reporter,
}

impl<'a> Emitter<'a> {
    pub fn new(
        config: &'a ResolvedConfig,
        resolver: &'a Resolver<'a>,
        catalog: &'a SymbolCatalog,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            config,
            resolver,
            catalog,
            reporter,
        }
    }

    /// Emit every plan in schedule order. Cancellation is honored between
    /// plans only.
    pub fn emit(&self, schedule: &[ArtifactPlan], cancel: &CancelToken) -> Result<EmitOutcome> {
        let mut outcome = EmitOutcome::default();

        for plan in schedule {
            if cancel.is_cancelled() {
                self.reporter.info("cancelled; stopping before next plan");
                outcome.cancelled = true;
                break;
            }
            self.emit_plan(plan, &mut outcome)?;
        }

        Ok(outcome)
    }

    fn emit_plan(&self, plan: &ArtifactPlan, outcome: &mut EmitOutcome) -> Result<()> {
        let targets = self.targets(plan);

        if self.config.skip_processed && targets.iter().all(|(path, _)| path.exists()) {
            self.reporter.info(format!("skipping {} (already processed)", plan.name));
            outcome.skipped += 1;
            return Ok(());
        }

        // Render everything before writing anything.
        let rendered: Vec<(PathBuf, String)> = targets
            .into_iter()
            .map(|(path, artifact)| {
                let content = match artifact {
                    Artifact::Schema => render_schema(plan),
                    Artifact::Types => render_types(
                        plan,
                        self.catalog,
                        self.resolver,
                        self.config,
                        self.reporter,
                    ),
                    Artifact::Extension => render_extension(plan, self.resolver),
                };
                (path, content)
            })
            .collect();

        match plan.materialize {
            Materialize::Resource => outcome.resources += 1,
            Materialize::Trait => outcome.traits += 1,
        }
        if plan.emit_extension {
            outcome.extensions += 1;
        }

        if self.config.dry_run {
            for (path, _) in &rendered {
                self.reporter.info(format!("would write {}", path.display()));
            }
            return Ok(());
        }

        for (path, content) in &rendered {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
            self.reporter.info(format!("wrote {}", path.display()));
        }

        Ok(())
    }

    /// Target paths in write order: schema, types, extension.
    fn targets(&self, plan: &ArtifactPlan) -> Vec<(PathBuf, Artifact)> {
        let dir = match plan.materialize {
            Materialize::Resource => &self.config.resources_dir,
            Materialize::Trait => &self.config.traits_dir,
        };

        let mut targets = vec![
            (
                dir.join(format!("{}.schema.{}", plan.name, plan.surface.extension())),
                Artifact::Schema,
            ),
            (
                dir.join(format!("{}.schema.types.ts", plan.name)),
                Artifact::Types,
            ),
        ];
        if plan.emit_extension {
            targets.push((
                self.config
                    .extensions_dir
                    .join(format!("{}.{}", plan.name, plan.surface.extension())),
                Artifact::Extension,
            ));
        }
        targets
    }
}

#[derive(Debug, Clone, Copy)]
enum Artifact {
    Schema,
    Types,
    Extension,
}
