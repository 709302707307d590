use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".remodelrc.json";

/// Raw configuration as read from `.remodelrc.json`.
///
/// Every directory option is interpreted relative to `input_dir`; nothing
/// here touches the filesystem. Cross-field invariants are checked by
/// [`Config::validate`], path resolution happens in [`Config::resolve`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root for relative resolution of all other directory options.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Fallback output directory, used when a more specific one is absent.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_model_source_dir")]
    pub model_source_dir: String,
    #[serde(default = "default_mixin_source_dir")]
    pub mixin_source_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions_dir: Option<String>,

    /// Post-migration import prefix for resource schemas and types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_import: Option<String>,
    /// Post-migration import prefix for trait schemas and types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits_import: Option<String>,
    /// Post-migration import prefix for extension classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions_import: Option<String>,

    /// Import prefix that currently resolves to `model_source_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_import_source: Option<String>,
    /// Import prefix that currently resolves to `mixin_source_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixin_import_source: Option<String>,

    /// The legacy framework's import specifier; also the base the `Type`
    /// brand path is derived from.
    #[serde(default = "default_ember_data_import_source")]
    pub ember_data_import_source: String,

    /// Specifiers that export the legacy `Mixin` constructor.
    #[serde(default = "default_mixin_import_sources")]
    pub mixin_import_sources: Vec<String>,

    /// Alias `(importPattern, dirPattern)` pairs for models living outside
    /// the primary root (addons, engines, in-repo packages).
    #[serde(default)]
    pub additional_model_sources: Vec<(String, String)>,
    #[serde(default)]
    pub additional_mixin_sources: Vec<(String, String)>,

    /// Canonical import paths of models materialized as traits.
    #[serde(default)]
    pub intermediate_model_paths: Vec<String>,

    /// Custom type-name to TypeScript type mappings.
    #[serde(default)]
    pub type_mapping: BTreeMap<String, String>,

    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub skip_processed: bool,
    #[serde(default)]
    pub models_only: bool,
    #[serde(default)]
    pub mixins_only: bool,
    #[serde(default = "default_true")]
    pub generate_external_resources: bool,

    /// Unrecognized keys end up here; the caller warns about each one.
    #[serde(flatten)]
    pub unknown: serde_json::Map<String, serde_json::Value>,
}

fn default_input_dir() -> String {
    ".".to_string()
}

fn default_output_dir() -> String {
    "./app/data".to_string()
}

fn default_model_source_dir() -> String {
    "./app/models".to_string()
}

fn default_mixin_source_dir() -> String {
    "./app/mixins".to_string()
}

fn default_ember_data_import_source() -> String {
    "@ember-data/model".to_string()
}

fn default_mixin_import_sources() -> Vec<String> {
    vec!["@ember/object/mixin".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            model_source_dir: default_model_source_dir(),
            mixin_source_dir: default_mixin_source_dir(),
            resources_dir: None,
            traits_dir: None,
            extensions_dir: None,
            resources_import: None,
            traits_import: None,
            extensions_import: None,
            model_import_source: None,
            mixin_import_source: None,
            ember_data_import_source: default_ember_data_import_source(),
            mixin_import_sources: default_mixin_import_sources(),
            additional_model_sources: Vec::new(),
            additional_mixin_sources: Vec::new(),
            intermediate_model_paths: Vec::new(),
            type_mapping: BTreeMap::new(),
            dry_run: false,
            verbose: false,
            debug: false,
            skip_processed: false,
            models_only: false,
            mixins_only: false,
            generate_external_resources: true,
            unknown: serde_json::Map::new(),
        }
    }
}

/// An alias source: an import-pattern half and a directory-pattern half,
/// each carrying at most one trailing `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSource {
    pub import_pattern: String,
    pub dir_pattern: String,
}

impl Config {
    /// Validate cross-field invariants.
    ///
    /// Returns an error for contradictory flags or malformed alias
    /// patterns; these abort the run before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.models_only && self.mixins_only {
            bail!("'modelsOnly' and 'mixinsOnly' are mutually exclusive");
        }

        for (import_pattern, dir_pattern) in self
            .additional_model_sources
            .iter()
            .chain(&self.additional_mixin_sources)
        {
            validate_alias_pair(import_pattern, dir_pattern)?;
        }

        Ok(())
    }

    /// Resolve the configuration against a base directory.
    ///
    /// All relative paths are rewritten against `<base>/<input_dir>` here,
    /// once; no component downstream reads process state.
    pub fn resolve(&self, base: &Path) -> Result<ResolvedConfig> {
        self.validate()?;

        let root_dir = join_dir(base, &self.input_dir);

        let resources_import = require(&self.resources_import, "resourcesImport")?;
        let traits_import = require(&self.traits_import, "traitsImport")?;
        let extensions_import = require(&self.extensions_import, "extensionsImport")?;
        let model_import_source = require(&self.model_import_source, "modelImportSource")?;
        let mixin_import_source = require(&self.mixin_import_source, "mixinImportSource")?;

        let output_dir = join_dir(&root_dir, &self.output_dir);
        let subdir = |specific: &Option<String>, fallback: &str| match specific {
            Some(dir) => join_dir(&root_dir, dir),
            None => output_dir.join(fallback),
        };

        Ok(ResolvedConfig {
            model_source_dir: join_dir(&root_dir, &self.model_source_dir),
            mixin_source_dir: join_dir(&root_dir, &self.mixin_source_dir),
            resources_dir: subdir(&self.resources_dir, "resources"),
            traits_dir: subdir(&self.traits_dir, "traits"),
            extensions_dir: subdir(&self.extensions_dir, "extensions"),
            root_dir,
            resources_import,
            traits_import,
            extensions_import,
            model_import_source,
            mixin_import_source,
            type_symbols_import: derive_type_symbols_import(&self.ember_data_import_source),
            ember_data_import_source: self.ember_data_import_source.clone(),
            mixin_import_sources: self.mixin_import_sources.clone(),
            additional_model_sources: to_alias_sources(&self.additional_model_sources),
            additional_mixin_sources: to_alias_sources(&self.additional_mixin_sources),
            intermediate_model_paths: self.intermediate_model_paths.clone(),
            type_mapping: self.type_mapping.clone(),
            dry_run: self.dry_run,
            skip_processed: self.skip_processed,
            models_only: self.models_only,
            mixins_only: self.mixins_only,
            generate_external_resources: self.generate_external_resources,
        })
    }
}

/// Configuration after path resolution, consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root_dir: PathBuf,
    pub model_source_dir: PathBuf,
    pub mixin_source_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub traits_dir: PathBuf,
    pub extensions_dir: PathBuf,
    pub resources_import: String,
    pub traits_import: String,
    pub extensions_import: String,
    pub model_import_source: String,
    pub mixin_import_source: String,
    pub ember_data_import_source: String,
    /// Derived path the `Type` brand symbol is imported from.
    pub type_symbols_import: String,
    pub mixin_import_sources: Vec<String>,
    pub additional_model_sources: Vec<AliasSource>,
    pub additional_mixin_sources: Vec<AliasSource>,
    pub intermediate_model_paths: Vec<String>,
    pub type_mapping: BTreeMap<String, String>,
    pub dry_run: bool,
    pub skip_processed: bool,
    pub models_only: bool,
    pub mixins_only: bool,
    pub generate_external_resources: bool,
}

fn require(value: &Option<String>, key: &str) -> Result<String> {
    value
        .clone()
        .with_context(|| format!("Missing required configuration value '{key}'"))
}

fn validate_alias_pair(import_pattern: &str, dir_pattern: &str) -> Result<()> {
    let import_wildcards = import_pattern.matches('*').count();

    if import_wildcards > 1 {
        bail!("Alias import pattern \"{import_pattern}\" may carry at most one wildcard");
    }
    if import_wildcards == 1 && !import_pattern.ends_with('*') {
        bail!("Alias import pattern \"{import_pattern}\" must end with its wildcard");
    }
    // The directory half may carry extra mid-path wildcards (in-repo addon
    // layouts), but the trailing capture has to line up with the import
    // half.
    if (import_wildcards == 1) != dir_pattern.ends_with('*') {
        bail!(
            "Alias pattern pair (\"{import_pattern}\", \"{dir_pattern}\") must capture on both halves or neither"
        );
    }
    Pattern::new(dir_pattern)
        .with_context(|| format!("Invalid alias directory pattern \"{dir_pattern}\""))?;

    Ok(())
}

fn to_alias_sources(pairs: &[(String, String)]) -> Vec<AliasSource> {
    pairs
        .iter()
        .map(|(import_pattern, dir_pattern)| AliasSource {
            import_pattern: import_pattern.clone(),
            dir_pattern: dir_pattern.clone(),
        })
        .collect()
}

/// Derive the core-types symbols path from the legacy import source:
/// the last segment is replaced with `core-types/symbols`.
fn derive_type_symbols_import(ember_data_import_source: &str) -> String {
    let base = match ember_data_import_source.rsplit_once('/') {
        Some((head, _)) => head,
        None => ember_data_import_source,
    };
    format!("{base}/core-types/symbols")
}

/// Join a possibly-relative, possibly-`./`-prefixed path onto a root.
fn join_dir(root: &Path, dir: &str) -> PathBuf {
    let p = Path::new(dir);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    // Strip a leading "./" so joins become "<root>/app" instead of
    // "<root>/./app" in diagnostics and snapshots.
    let rel = p.strip_prefix(Path::new(".")).unwrap_or(p);
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
