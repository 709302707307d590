//! Source Index: discovery, parsing, and caching of input files.
//!
//! The index is built once per run and owns every file record and syntax
//! tree; downstream phases look records up by canonical path or canonical
//! import specifier and never mutate them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use swc_common::SourceMap;
use swc_ecma_ast::{DefaultDecl, ModuleDecl, ModuleItem};

use crate::config::ResolvedConfig;
use crate::reporter::Reporter;
use crate::utils::kebab_case_path;

pub mod parser;
pub mod scanner;

pub use parser::{ExtractedComments, ParsedSource, parse_source};
pub use scanner::{CandidateFile, SourceRoot, scan_roots, source_roots};

/// Surface language of a source file, derived from its filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// `.ts`
    Typed,
    /// `.js`
    Untyped,
}

impl Surface {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") => Some(Surface::Typed),
            Some("js") => Some(Surface::Untyped),
            _ => None,
        }
    }

    /// The emitted artifact extension for this surface.
    pub fn extension(&self) -> &'static str {
        match self {
            Surface::Typed => "ts",
            Surface::Untyped => "js",
        }
    }
}

/// Which kind of source root a file was discovered under.
///
/// Provenance only: the classifier decides what the file actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    ModelRoot,
    MixinRoot,
}

/// One discovered, parsed input file.
pub struct FileRecord {
    /// Canonical absolute path; unique within the index.
    pub path: PathBuf,
    /// The import specifier that resolves to this file today
    /// (e.g. `my-app/models/user`).
    pub canonical_import: String,
    /// Kebab-cased symbol name derived from the canonical import
    /// remainder (e.g. `admin/base-user`).
    pub name: String,
    pub surface: Surface,
    pub text: String,
    pub parsed: ParsedSource,
    /// Name bound by the default export, when one exists.
    pub default_export: Option<String>,
    pub origin: SourceOrigin,
    /// True when discovered under an alias source rather than a primary
    /// source dir.
    pub alias: bool,
}

/// The populated index: records by canonical path, with a secondary
/// lookup by canonical import specifier.
pub struct SourceIndex {
    records: BTreeMap<PathBuf, FileRecord>,
    by_import: BTreeMap<String, PathBuf>,
}

impl SourceIndex {
    /// Enumerate, read, and parse every candidate file under the
    /// configured roots.
    ///
    /// Parse failures and unreadable files are warnings; the run always
    /// continues with whatever parsed.
    pub fn build(config: &ResolvedConfig, reporter: &Reporter) -> Self {
        let roots = source_roots(config);
        let candidates = scan_roots(&roots, reporter);

        let mut records = BTreeMap::new();
        let mut by_import: BTreeMap<String, PathBuf> = BTreeMap::new();

        for candidate in candidates {
            if records.contains_key(&candidate.path) {
                continue;
            }
            if let Some(claimed) = by_import.get(&candidate.canonical_import) {
                reporter.warn(format!(
                    "{} and {} both answer to '{}'; keeping the first",
                    claimed.display(),
                    candidate.path.display(),
                    candidate.canonical_import
                ));
                continue;
            }

            let Some(record) = read_record(&candidate, reporter) else {
                continue;
            };

            reporter.info(format!("indexed {}", record.path.display()));
            by_import.insert(record.canonical_import.clone(), record.path.clone());
            records.insert(record.path.clone(), record);
        }

        Self { records, by_import }
    }

    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn get_by_import(&self, specifier: &str) -> Option<&FileRecord> {
        self.by_import
            .get(specifier)
            .and_then(|path| self.records.get(path))
    }

    /// Records in canonical-path order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_record(candidate: &CandidateFile, reporter: &Reporter) -> Option<FileRecord> {
    let surface = Surface::from_path(&candidate.path)?;

    let text = match fs::read_to_string(&candidate.path) {
        Ok(text) => text,
        Err(e) => {
            reporter.warn(format!("{}: {}", candidate.path.display(), e));
            return None;
        }
    };

    let source_map = Arc::new(SourceMap::default());
    let parsed = match parse_source(
        text.clone(),
        &candidate.path.to_string_lossy(),
        surface,
        source_map,
    ) {
        Ok(parsed) => parsed,
        Err(e) => {
            reporter.warn(format!("{}: {}", candidate.path.display(), e));
            return None;
        }
    };

    let default_export = default_export_name(&parsed);

    Some(FileRecord {
        path: candidate.path.clone(),
        canonical_import: candidate.canonical_import.clone(),
        name: kebab_case_path(&candidate.remainder),
        surface,
        text,
        parsed,
        default_export,
        origin: candidate.origin,
        alias: candidate.alias,
    })
}

fn default_export_name(parsed: &ParsedSource) -> Option<String> {
    for item in &parsed.module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(decl)) => {
                return match &decl.decl {
                    DefaultDecl::Class(class) => {
                        class.ident.as_ref().map(|i| i.sym.to_string())
                    }
                    DefaultDecl::Fn(f) => f.ident.as_ref().map(|i| i.sym.to_string()),
                    DefaultDecl::TsInterfaceDecl(i) => Some(i.id.sym.to_string()),
                };
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(expr)) => {
                return match &*expr.expr {
                    swc_ecma_ast::Expr::Ident(ident) => Some(ident.sym.to_string()),
                    _ => None,
                };
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::Config;

    use super::*;

    fn test_config(root: &Path) -> ResolvedConfig {
        let config = Config {
            resources_import: Some("my-app/data/resources".into()),
            traits_import: Some("my-app/data/traits".into()),
            extensions_import: Some("my-app/data/extensions".into()),
            model_import_source: Some("my-app/models".into()),
            mixin_import_source: Some("my-app/mixins".into()),
            ..Config::default()
        };
        config.resolve(root).unwrap()
    }

    #[test]
    fn builds_index_from_primary_roots() {
        let dir = tempdir().unwrap();
        let models = dir.path().join("app").join("models");
        fs::create_dir_all(&models).unwrap();
        fs::write(
            models.join("user.ts"),
            "import Model from '@ember-data/model';\nexport default class User extends Model {}\n",
        )
        .unwrap();

        let reporter = Reporter::default();
        let index = SourceIndex::build(&test_config(dir.path()), &reporter);

        assert_eq!(index.len(), 1);
        let record = index.get_by_import("my-app/models/user").unwrap();
        assert_eq!(record.name, "user");
        assert_eq!(record.surface, Surface::Typed);
        assert_eq!(record.default_export.as_deref(), Some("User"));
        assert!(!record.alias);
    }

    #[test]
    fn parse_failures_are_dropped_with_a_warning() {
        let dir = tempdir().unwrap();
        let models = dir.path().join("app").join("models");
        fs::create_dir_all(&models).unwrap();
        fs::write(models.join("broken.ts"), "export default class {").unwrap();
        fs::write(
            models.join("fine.ts"),
            "export default class Fine {}\n",
        )
        .unwrap();

        let reporter = Reporter::default();
        let index = SourceIndex::build(&test_config(dir.path()), &reporter);

        assert_eq!(index.len(), 1);
        assert_eq!(reporter.warning_count(), 1);
        assert!(index.get_by_import("my-app/models/broken").is_none());
    }

    #[test]
    fn unresolved_import_lookup_is_not_an_error() {
        let dir = tempdir().unwrap();
        let reporter = Reporter::default();
        let index = SourceIndex::build(&test_config(dir.path()), &reporter);
        assert!(index.get_by_import("my-app/models/ghost").is_none());
    }

    #[test]
    fn alias_sourced_records_kebab_their_remainder() {
        let dir = tempdir().unwrap();
        let core = dir.path().join("app").join("core");
        fs::create_dir_all(&core).unwrap();
        fs::write(core.join("BaseModel.ts"), "export default class BaseModel {}\n").unwrap();

        let mut config = Config {
            resources_import: Some("my-app/data/resources".into()),
            traits_import: Some("my-app/data/traits".into()),
            extensions_import: Some("my-app/data/extensions".into()),
            model_import_source: Some("my-app/models".into()),
            mixin_import_source: Some("my-app/mixins".into()),
            ..Config::default()
        };
        config.additional_model_sources =
            vec![("my-app/core/*".to_string(), "./app/core/*".to_string())];
        let resolved = config.resolve(dir.path()).unwrap();

        let reporter = Reporter::default();
        let index = SourceIndex::build(&resolved, &reporter);

        let record = index.get_by_import("my-app/core/BaseModel").unwrap();
        assert_eq!(record.name, "base-model");
        assert!(record.alias);
    }
}
