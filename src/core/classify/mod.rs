//! Classifier: structural summaries of models, mixins, and intermediate
//! models.
//!
//! Only the top of each syntax tree is inspected; decorators are treated
//! as pattern matches over the AST, never evaluated. Anything that is not
//! a recognized field declaration survives verbatim as a residual member.

use std::collections::BTreeMap;

use crate::config::ResolvedConfig;
use crate::core::index::SourceIndex;
use crate::core::resolve::Resolver;
use crate::reporter::Reporter;

pub mod imports;
pub mod members;
pub mod mixin;
pub mod model;

pub use imports::{ImportInfo, LegacyBindings, collect_imports};

/// Field kind, matching the three legacy field decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Attribute,
    BelongsTo,
    HasMany,
}

impl FieldKind {
    /// The kind string used in emitted schemas.
    pub fn schema_name(self) -> &'static str {
        match self {
            FieldKind::Attribute => "attribute",
            FieldKind::BelongsTo => "belongsTo",
            FieldKind::HasMany => "hasMany",
        }
    }

    pub fn is_relationship(self) -> bool {
        matches!(self, FieldKind::BelongsTo | FieldKind::HasMany)
    }
}

/// A field option value, preserved as literally as possible.
///
/// `Raw` carries the original source text of values the engine does not
/// model (identifiers, nested objects), passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
    Null,
    Raw(String),
}

/// The semantic content of a single declared field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// The string argument of the field decorator; absent for a bare
    /// `@attr`.
    pub type_name: Option<String>,
    /// Options in source order; serialization reorders them.
    pub options: Vec<(String, OptionValue)>,
}

impl FieldDescriptor {
    fn bool_option(&self, key: &str) -> Option<bool> {
        self.options.iter().find_map(|(k, v)| match v {
            OptionValue::Bool(b) if k == key => Some(*b),
            _ => None,
        })
    }

    /// Whether the relationship is async. The legacy default for a
    /// relationship without an explicit option is async.
    pub fn is_async(&self) -> bool {
        self.kind.is_relationship() && self.bool_option("async").unwrap_or(true)
    }

    pub fn is_polymorphic(&self) -> bool {
        self.bool_option("polymorphic").unwrap_or(false)
    }
}

/// A class-body or object-literal member that is not a recognized field
/// declaration, captured verbatim for relocation.
#[derive(Debug, Clone)]
pub struct ResidualMember {
    pub name: String,
    /// Dedented source text including decorators and leading comments.
    pub text: String,
}

/// What a model's extends clause bottoms out at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelBase {
    /// The legacy `Model` class itself.
    Model,
    /// An intermediate model, by canonical import.
    Intermediate(String),
}

#[derive(Debug)]
pub struct ModelSummary {
    pub base: ModelBase,
    /// Local identifiers passed to `.extend(...)`, in source order.
    pub mixin_locals: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub residuals: Vec<ResidualMember>,
    /// Type-only imports of this file; the planner connects those that
    /// point at mixins.
    pub type_only_imports: Vec<ImportInfo>,
}

#[derive(Debug)]
pub struct MixinSummary {
    /// Local identifiers of base mixins, in source order.
    pub base_locals: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub residuals: Vec<ResidualMember>,
}

#[derive(Debug)]
pub enum Classification {
    Model(ModelSummary),
    IntermediateModel(ModelSummary),
    Mixin(MixinSummary),
    Ignored,
}

/// Classification outcome for one indexed file.
#[derive(Debug)]
pub struct ClassifiedFile {
    pub canonical_import: String,
    pub imports: Vec<ImportInfo>,
    pub classification: Classification,
}

/// Classify every indexed file, keyed by canonical import.
pub fn classify_all(
    index: &SourceIndex,
    resolver: &Resolver,
    config: &ResolvedConfig,
    reporter: &Reporter,
) -> BTreeMap<String, ClassifiedFile> {
    let mut classified = BTreeMap::new();

    for record in index.records() {
        let file_imports = collect_imports(&record.parsed.module);
        let bindings = LegacyBindings::from_imports(&file_imports, config);

        let classification = if let Some(summary) =
            mixin::classify_mixin(record, &bindings, reporter)
        {
            Classification::Mixin(summary)
        } else if let Some(summary) =
            model::classify_model(record, &file_imports, &bindings, resolver, config, reporter)
        {
            if config
                .intermediate_model_paths
                .contains(&record.canonical_import)
            {
                Classification::IntermediateModel(summary)
            } else {
                Classification::Model(summary)
            }
        } else {
            Classification::Ignored
        };

        match &classification {
            Classification::Model(_) => reporter.info(format!("model {}", record.name)),
            Classification::IntermediateModel(_) => {
                reporter.info(format!("intermediate model {}", record.name))
            }
            Classification::Mixin(_) => reporter.info(format!("mixin {}", record.name)),
            Classification::Ignored => {
                reporter.debug(format!("ignored {}", record.path.display()))
            }
        }

        classified.insert(
            record.canonical_import.clone(),
            ClassifiedFile {
                canonical_import: record.canonical_import.clone(),
                imports: file_imports,
                classification,
            },
        );
    }

    classified
}
