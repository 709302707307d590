use std::path::{Path, PathBuf};

use glob::glob;
use walkdir::WalkDir;

use crate::config::{AliasSource, ResolvedConfig};
use crate::reporter::Reporter;
use crate::utils::strip_source_suffix;

use super::SourceOrigin;

/// One concrete directory to enumerate, tied to the import-specifier
/// pattern that maps its files onto canonical import paths.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    /// Directory whose files are indexed (the fixed prefix of a wildcard
    /// directory pattern, or the primary source dir itself).
    pub base_dir: PathBuf,
    /// Import pattern; `*` (if present) captures the path remainder.
    pub import_pattern: String,
    pub origin: SourceOrigin,
    /// True when this root came from an alias source rather than a
    /// primary source dir.
    pub alias: bool,
}

/// A file discovered under a source root, not yet read or parsed.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// The canonical import specifier this file answers to today.
    pub canonical_import: String,
    /// The wildcard-captured path remainder naming the symbol, without
    /// its source suffix (e.g. `admin/BaseUser`).
    pub remainder: String,
    pub origin: SourceOrigin,
    pub alias: bool,
}

/// Expand the configured roots into concrete [`SourceRoot`]s, primary
/// sources first, alias sources in declaration order.
pub fn source_roots(config: &ResolvedConfig) -> Vec<SourceRoot> {
    let mut roots = vec![
        SourceRoot {
            base_dir: config.model_source_dir.clone(),
            import_pattern: format!("{}/*", config.model_import_source),
            origin: SourceOrigin::ModelRoot,
            alias: false,
        },
        SourceRoot {
            base_dir: config.mixin_source_dir.clone(),
            import_pattern: format!("{}/*", config.mixin_import_source),
            origin: SourceOrigin::MixinRoot,
            alias: false,
        },
    ];

    for alias in &config.additional_model_sources {
        roots.extend(alias_roots(alias, &config.root_dir, SourceOrigin::ModelRoot));
    }
    for alias in &config.additional_mixin_sources {
        roots.extend(alias_roots(alias, &config.root_dir, SourceOrigin::MixinRoot));
    }

    roots
}

/// Expand one alias source into concrete roots. The trailing `*` of the
/// directory pattern captures file paths; any wildcard before it (in-repo
/// addon layouts like `./lib/*/addon/models/*`) is expanded on disk.
fn alias_roots(alias: &AliasSource, root_dir: &Path, origin: SourceOrigin) -> Vec<SourceRoot> {
    let fixed = alias
        .dir_pattern
        .strip_suffix('*')
        .unwrap_or(&alias.dir_pattern);
    let fixed = fixed.trim_end_matches('/');
    let fixed = fixed.strip_prefix("./").unwrap_or(fixed);

    let make_root = |base_dir: PathBuf| SourceRoot {
        base_dir,
        import_pattern: alias.import_pattern.clone(),
        origin,
        alias: true,
    };

    if !fixed.contains('*') {
        return vec![make_root(root_dir.join(fixed))];
    }

    let pattern = root_dir.join(fixed);
    let Ok(entries) = glob(&pattern.to_string_lossy()) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries.flatten().filter(|p| p.is_dir()).collect();
    dirs.sort();
    dirs.into_iter().map(make_root).collect()
}

/// Walk every source root and list candidate files in a deterministic
/// order. Roots that do not exist are skipped silently (a project without
/// mixins is perfectly normal); unreadable entries are warned about.
pub fn scan_roots(roots: &[SourceRoot], reporter: &Reporter) -> Vec<CandidateFile> {
    let mut candidates = Vec::new();

    for root in roots {
        if !root.base_dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&root.base_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    reporter.warn(format!("Cannot access path: {}", e));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_candidate_file(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&root.base_dir) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            let remainder = strip_source_suffix(&relative).to_string();

            let canonical_import = match root.import_pattern.strip_suffix('*') {
                Some(prefix) => format!("{prefix}{remainder}"),
                None => root.import_pattern.clone(),
            };

            candidates.push(CandidateFile {
                path: path.to_path_buf(),
                canonical_import,
                remainder,
                origin: root.origin,
                alias: root.alias,
            });
        }
    }

    candidates
}

fn is_candidate_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".d.ts") {
        return false;
    }
    name.ends_with(".ts") || name.ends_with(".js")
}
