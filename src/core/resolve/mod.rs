//! Resolver: bidirectional mapping between import specifiers and symbols.
//!
//! Forward direction: a specifier appearing in an input file is mapped to
//! the canonical import of an indexed file, via relative resolution or the
//! configured alias patterns. Inverse direction: given a symbol and its
//! materialization, compute the specifier an emitted artifact should use.

use std::path::{Component, Path, PathBuf};

use crate::config::{AliasSource, ResolvedConfig};
use crate::core::index::SourceIndex;
use crate::reporter::Reporter;
use crate::utils::strip_source_suffix;

/// How a symbol materializes after migration; decides which artifact
/// family its post-migration imports point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialize {
    Resource,
    Trait,
}

pub struct Resolver<'a> {
    index: &'a SourceIndex,
    config: &'a ResolvedConfig,
    reporter: &'a Reporter,
    /// Implicit primary aliases first, then the configured ones, in
    /// declaration order.
    aliases: Vec<AliasSource>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a SourceIndex,
        config: &'a ResolvedConfig,
        reporter: &'a Reporter,
    ) -> Self {
        let mut aliases = vec![
            AliasSource {
                import_pattern: format!("{}/*", config.model_import_source),
                dir_pattern: relative_dir_pattern(&config.model_source_dir, &config.root_dir),
            },
            AliasSource {
                import_pattern: format!("{}/*", config.mixin_import_source),
                dir_pattern: relative_dir_pattern(&config.mixin_source_dir, &config.root_dir),
            },
        ];
        aliases.extend(config.additional_model_sources.iter().cloned());
        aliases.extend(config.additional_mixin_sources.iter().cloned());

        Self {
            index,
            config,
            reporter,
            aliases,
        }
    }

    /// Map a specifier appearing in `from` to the canonical import of an
    /// indexed file, or `None` when nothing in the index answers to it.
    pub fn canonicalize(&self, from: &Path, specifier: &str) -> Option<String> {
        if specifier.starts_with('.') {
            return self.canonicalize_relative(from, specifier);
        }

        let normalized = strip_source_suffix(specifier);

        // Fast path: the specifier is already a canonical import.
        if self.index.get_by_import(normalized).is_some() {
            self.reporter
                .debug(format!("resolve {specifier} -> {normalized}"));
            return Some(normalized.to_string());
        }

        for alias in &self.aliases {
            match alias.import_pattern.strip_suffix('*') {
                None => {
                    if alias.import_pattern == normalized
                        && let Some(found) = self.canonicalize_alias_match(specifier, alias, "")
                    {
                        return Some(found);
                    }
                }
                Some(prefix) => {
                    if let Some(remainder) = normalized.strip_prefix(prefix)
                        && let Some(found) =
                            self.canonicalize_alias_match(specifier, alias, remainder)
                    {
                        return Some(found);
                    }
                }
            }
        }

        None
    }

    fn canonicalize_alias_match(
        &self,
        specifier: &str,
        alias: &AliasSource,
        remainder: &str,
    ) -> Option<String> {
        let dir_fixed = alias
            .dir_pattern
            .strip_suffix('*')
            .unwrap_or(&alias.dir_pattern);
        let dir_fixed = dir_fixed.strip_prefix("./").unwrap_or(dir_fixed);
        let candidate = self.config.root_dir.join(format!("{dir_fixed}{remainder}"));

        for ext in ["ts", "js"] {
            let with_ext = format!("{}.{ext}", candidate.display());
            let record = if with_ext.contains('*') {
                // Mid-path wildcard in the directory pattern: find the
                // concrete file on disk, then look it up in the index.
                glob::glob(&with_ext)
                    .ok()
                    .and_then(|entries| entries.flatten().find_map(|p| self.index.get(&p)))
            } else {
                self.index.get(&PathBuf::from(with_ext))
            };
            if let Some(record) = record {
                self.reporter.debug(format!(
                    "resolve {specifier} -> {} (via {})",
                    record.canonical_import, alias.import_pattern
                ));
                return Some(record.canonical_import.clone());
            }
        }
        None
    }

    fn canonicalize_relative(&self, from: &Path, specifier: &str) -> Option<String> {
        let base_dir = from.parent()?;
        let normalized = specifier.strip_prefix("./").unwrap_or(specifier);
        let joined = normalize_path(&base_dir.join(normalized));

        let stem = joined.to_string_lossy();
        let stem = strip_source_suffix(&stem);

        for ext in ["ts", "js"] {
            let candidate = PathBuf::from(format!("{stem}.{ext}"));
            if let Some(record) = self.index.get(&candidate) {
                self.reporter.debug(format!(
                    "resolve {specifier} -> {} (relative to {})",
                    record.canonical_import,
                    from.display()
                ));
                return Some(record.canonical_import.clone());
            }
        }
        for ext in ["ts", "js"] {
            let candidate = PathBuf::from(format!("{stem}/index.{ext}"));
            if let Some(record) = self.index.get(&candidate) {
                return Some(record.canonical_import.clone());
            }
        }
        None
    }

    /// Post-migration specifier for a symbol's types artifact.
    pub fn types_import(&self, name: &str, materialize: Materialize) -> String {
        match materialize {
            Materialize::Resource => {
                format!("{}/{}.schema.types", self.config.resources_import, name)
            }
            Materialize::Trait => {
                format!("{}/{}.schema.types", self.config.traits_import, name)
            }
        }
    }

    /// Post-migration specifier for a symbol's extension artifact.
    pub fn extension_import(&self, name: &str) -> String {
        format!("{}/{}", self.config.extensions_import, name)
    }

    /// Where the `Type` brand symbol is imported from.
    pub fn type_symbols_import(&self) -> &str {
        &self.config.type_symbols_import
    }

    /// Where `HasMany` / `AsyncHasMany` keep being imported from.
    pub fn relationship_helpers_import(&self) -> &str {
        &self.config.ember_data_import_source
    }
}

/// Resolve `..` and `.` components without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express a resolved primary source dir as a wildcard dir pattern
/// relative to the root, mirroring the alias-source shape.
fn relative_dir_pattern(dir: &Path, root: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    format!("{}/*", rel.to_string_lossy().replace('\\', "/"))
}
