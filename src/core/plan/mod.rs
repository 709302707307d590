//! Dependency Planner: connectivity, processing schedule, and
//! materialization decisions.
//!
//! Consumes the classified summaries and produces the ordered list of
//! artifact plans the emitter works through, plus a catalog for resolving
//! relationship targets to emitted artifacts.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::ResolvedConfig;
use crate::core::classify::{
    Classification, ClassifiedFile, FieldDescriptor, FieldKind, ImportInfo, MixinSummary,
    ModelBase, ModelSummary, ResidualMember,
};
use crate::core::index::{FileRecord, SourceIndex, Surface};
use crate::core::resolve::{Materialize, Resolver};
use crate::reporter::Reporter;
use crate::utils::pascal_case;

/// What kind of symbol a plan originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Model,
    IntermediateModel,
    Mixin,
}

/// A composition reference to a trait, kept on the plan in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitRef {
    pub canonical_import: String,
    /// Kebab name, as listed in `traits` arrays.
    pub name: String,
}

/// The emitter's input unit: everything needed to render one symbol's
/// artifacts.
#[derive(Debug)]
pub struct ArtifactPlan {
    pub canonical_import: String,
    pub name: String,
    pub pascal: String,
    pub kind: SymbolKind,
    pub materialize: Materialize,
    pub surface: Surface,
    /// Origin file, for diagnostics.
    pub origin: PathBuf,
    pub fields: Vec<FieldDescriptor>,
    /// Base-before-extends composition refs, deduplicated preserving
    /// first occurrence.
    pub trait_refs: Vec<TraitRef>,
    pub residuals: Vec<ResidualMember>,
    pub emit_extension: bool,
}

impl ArtifactPlan {
    pub fn extension_name(&self) -> String {
        format!("{}Extension", self.pascal)
    }
}

/// Where a materialized symbol's types artifact lives, for relationship
/// target resolution.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub pascal: String,
    pub materialize: Materialize,
}

/// Lookup from kebab type names to materialized symbols.
///
/// Built over every materializable symbol of the run, before emission
/// filters, so incremental runs (`modelsOnly`, `mixinsOnly`) still type
/// against artifacts produced by the complementary run.
#[derive(Debug, Default)]
pub struct SymbolCatalog {
    resources: BTreeMap<String, CatalogEntry>,
    traits: BTreeMap<String, CatalogEntry>,
}

impl SymbolCatalog {
    /// A relationship target matching both a resource and a trait
    /// (polymorphic) prefers the trait.
    pub fn lookup(&self, type_name: &str) -> Option<&CatalogEntry> {
        self.traits
            .get(type_name)
            .or_else(|| self.resources.get(type_name))
    }

    fn insert(&mut self, entry: CatalogEntry) {
        let bucket = match entry.materialize {
            Materialize::Resource => &mut self.resources,
            Materialize::Trait => &mut self.traits,
        };
        bucket.entry(entry.name.clone()).or_insert(entry);
    }
}

/// The planner's output: plans in emission order plus the catalog.
pub struct Plan {
    pub schedule: Vec<ArtifactPlan>,
    pub catalog: SymbolCatalog,
}

/// One classified symbol with its resolved references, planner-internal.
struct Symbol<'a> {
    record: &'a FileRecord,
    kind: SymbolKind,
    fields: &'a [FieldDescriptor],
    residuals: &'a [ResidualMember],
    /// Composition refs: base intermediate first, then extend/base mixins.
    composition: Vec<TraitRef>,
    /// Mixins referenced only through type-only imports.
    type_only: Vec<String>,
}

pub fn plan(
    index: &SourceIndex,
    classified: &BTreeMap<String, ClassifiedFile>,
    resolver: &Resolver,
    config: &ResolvedConfig,
    reporter: &Reporter,
) -> Plan {
    let symbols = collect_symbols(index, classified, resolver, reporter);
    let connected = connected_mixins(&symbols, reporter);

    let mut catalog = SymbolCatalog::default();
    for symbol in symbols.values() {
        let materialize = match symbol.kind {
            SymbolKind::Model => Materialize::Resource,
            SymbolKind::IntermediateModel => Materialize::Trait,
            SymbolKind::Mixin => {
                if !connected.contains(&symbol.record.canonical_import) {
                    continue;
                }
                Materialize::Trait
            }
        };
        catalog.insert(CatalogEntry {
            name: symbol.record.name.clone(),
            pascal: pascal_case(&symbol.record.name),
            materialize,
        });
    }

    let mut plans = build_plans(&symbols, &connected, config, reporter);
    break_mixin_cycles(&mut plans, reporter);
    order_schedule(&mut plans);

    if reporter.is_debug() {
        for plan in &plans {
            reporter.debug(format!(
                "schedule {:?} {} -> {:?}",
                plan.kind, plan.canonical_import, plan.materialize
            ));
        }
    }

    Plan {
        schedule: plans,
        catalog,
    }
}

fn collect_symbols<'a>(
    index: &'a SourceIndex,
    classified: &'a BTreeMap<String, ClassifiedFile>,
    resolver: &Resolver,
    reporter: &Reporter,
) -> BTreeMap<String, Symbol<'a>> {
    let mut symbols = BTreeMap::new();

    for (canonical, file) in classified {
        let Some(record) = index.get_by_import(canonical) else {
            continue;
        };

        let symbol = match &file.classification {
            Classification::Model(summary) => model_symbol(
                record,
                SymbolKind::Model,
                summary,
                file,
                index,
                classified,
                resolver,
                reporter,
            ),
            Classification::IntermediateModel(summary) => model_symbol(
                record,
                SymbolKind::IntermediateModel,
                summary,
                file,
                index,
                classified,
                resolver,
                reporter,
            ),
            Classification::Mixin(summary) => mixin_symbol(
                record,
                summary,
                file,
                index,
                classified,
                resolver,
                reporter,
            ),
            Classification::Ignored => continue,
        };

        symbols.insert(canonical.clone(), symbol);
    }

    symbols
}

#[allow(clippy::too_many_arguments)]
fn model_symbol<'a>(
    record: &'a FileRecord,
    kind: SymbolKind,
    summary: &'a ModelSummary,
    file: &ClassifiedFile,
    index: &SourceIndex,
    classified: &BTreeMap<String, ClassifiedFile>,
    resolver: &Resolver,
    reporter: &Reporter,
) -> Symbol<'a> {
    let mut composition = Vec::new();

    if let ModelBase::Intermediate(base) = &summary.base {
        match index.get_by_import(base) {
            Some(base_record) => composition.push(TraitRef {
                canonical_import: base.clone(),
                name: base_record.name.clone(),
            }),
            None => reporter.warn(format!(
                "{}: base '{base}' is not in the source index; omitting it",
                record.name
            )),
        }
    }

    composition.extend(resolve_mixin_locals(
        record,
        &summary.mixin_locals,
        &file.imports,
        index,
        classified,
        resolver,
        reporter,
    ));

    let type_only = summary
        .type_only_imports
        .iter()
        .filter_map(|import| {
            let canonical = resolver.canonicalize(&record.path, &import.module_path)?;
            is_mixin(classified, &canonical).then_some(canonical)
        })
        .collect();

    Symbol {
        record,
        kind,
        fields: &summary.fields,
        residuals: &summary.residuals,
        composition,
        type_only,
    }
}

fn mixin_symbol<'a>(
    record: &'a FileRecord,
    summary: &'a MixinSummary,
    file: &ClassifiedFile,
    index: &SourceIndex,
    classified: &BTreeMap<String, ClassifiedFile>,
    resolver: &Resolver,
    reporter: &Reporter,
) -> Symbol<'a> {
    let composition = resolve_mixin_locals(
        record,
        &summary.base_locals,
        &file.imports,
        index,
        classified,
        resolver,
        reporter,
    );

    Symbol {
        record,
        kind: SymbolKind::Mixin,
        fields: &summary.fields,
        residuals: &summary.residuals,
        composition,
        type_only: Vec::new(),
    }
}

/// Resolve local identifiers from an extends expression to mixin refs,
/// dropping (with a warning) anything that does not land on a mixin.
fn resolve_mixin_locals(
    record: &FileRecord,
    locals: &[String],
    imports: &[ImportInfo],
    index: &SourceIndex,
    classified: &BTreeMap<String, ClassifiedFile>,
    resolver: &Resolver,
    reporter: &Reporter,
) -> Vec<TraitRef> {
    let mut refs = Vec::new();

    for local in locals {
        let Some(import) = imports
            .iter()
            .find(|i| i.local_name == *local && !i.type_only)
        else {
            reporter.warn(format!(
                "{}: '{local}' in the extends expression is not an import; omitting it",
                record.name
            ));
            continue;
        };
        let Some(canonical) = resolver.canonicalize(&record.path, &import.module_path) else {
            reporter.warn(format!(
                "{}: cannot resolve '{}'; omitting '{local}'",
                record.name, import.module_path
            ));
            continue;
        };
        if !is_mixin(classified, &canonical) {
            reporter.warn(format!(
                "{}: '{canonical}' is not a mixin; omitting '{local}'",
                record.name
            ));
            continue;
        }
        let Some(target) = index.get_by_import(&canonical) else {
            continue;
        };
        refs.push(TraitRef {
            canonical_import: canonical,
            name: target.name.clone(),
        });
    }

    refs
}

fn is_mixin(classified: &BTreeMap<String, ClassifiedFile>, canonical: &str) -> bool {
    matches!(
        classified.get(canonical).map(|f| &f.classification),
        Some(Classification::Mixin(_))
    )
}

/// Least fixed point of the connectivity rule: a mixin is connected iff
/// referenced by a model, an intermediate model, another connected mixin,
/// or a polymorphic relationship target.
fn connected_mixins(symbols: &BTreeMap<String, Symbol>, reporter: &Reporter) -> BTreeSet<String> {
    // Polymorphic targets are named by kebab name, not canonical import.
    let mixins_by_name: BTreeMap<&str, &str> = symbols
        .values()
        .filter(|s| s.kind == SymbolKind::Mixin)
        .map(|s| {
            (
                s.record.name.as_str(),
                s.record.canonical_import.as_str(),
            )
        })
        .collect();

    let references = |symbol: &Symbol| -> Vec<String> {
        let mut out: Vec<String> = symbol
            .composition
            .iter()
            .map(|r| r.canonical_import.clone())
            .chain(symbol.type_only.iter().cloned())
            .collect();
        for field in symbol.fields {
            if field.kind == FieldKind::BelongsTo
                && field.is_polymorphic()
                && let Some(type_name) = &field.type_name
                && let Some(target) = mixins_by_name.get(type_name.as_str())
            {
                out.push((*target).to_string());
            }
        }
        out
    };

    let mut connected = BTreeSet::new();
    let mut frontier: Vec<String> = Vec::new();

    for symbol in symbols.values() {
        if symbol.kind != SymbolKind::Mixin {
            frontier.extend(references(symbol));
        }
    }

    while let Some(canonical) = frontier.pop() {
        let Some(symbol) = symbols.get(&canonical) else {
            continue;
        };
        if symbol.kind != SymbolKind::Mixin || !connected.insert(canonical) {
            continue;
        }
        frontier.extend(references(symbol));
    }

    for symbol in symbols.values() {
        if symbol.kind == SymbolKind::Mixin
            && !connected.contains(&symbol.record.canonical_import)
        {
            reporter.info(format!(
                "mixin {} is not referenced by any model; skipping",
                symbol.record.name
            ));
        }
    }

    connected
}

fn build_plans(
    symbols: &BTreeMap<String, Symbol>,
    connected: &BTreeSet<String>,
    config: &ResolvedConfig,
    reporter: &Reporter,
) -> Vec<ArtifactPlan> {
    let mut plans = Vec::new();

    for symbol in symbols.values() {
        let materialize = match symbol.kind {
            SymbolKind::Model => Materialize::Resource,
            SymbolKind::IntermediateModel => Materialize::Trait,
            SymbolKind::Mixin => {
                if !connected.contains(&symbol.record.canonical_import) {
                    continue;
                }
                Materialize::Trait
            }
        };

        match symbol.kind {
            SymbolKind::Mixin if config.models_only => continue,
            SymbolKind::Model | SymbolKind::IntermediateModel if config.mixins_only => continue,
            _ => {}
        }
        if symbol.record.alias && !config.generate_external_resources {
            reporter.debug(format!(
                "skipping external symbol {}",
                symbol.record.canonical_import
            ));
            continue;
        }

        let mut fields = symbol.fields.to_vec();
        if symbol.kind == SymbolKind::IntermediateModel {
            // Extension code referencing `this.id` must type-check against
            // the trait, so the identity column is materialized as a field.
            fields.retain(|f| f.name != "id");
            fields.insert(0, synthetic_id_field());
        }

        let mut trait_refs = Vec::new();
        for r in &symbol.composition {
            if !trait_refs.contains(r) {
                trait_refs.push(r.clone());
            }
        }

        let emit_extension = !symbol.residuals.is_empty();

        plans.push(ArtifactPlan {
            canonical_import: symbol.record.canonical_import.clone(),
            name: symbol.record.name.clone(),
            pascal: pascal_case(&symbol.record.name),
            kind: symbol.kind,
            materialize,
            surface: symbol.record.surface,
            origin: symbol.record.path.clone(),
            fields,
            trait_refs,
            residuals: symbol.residuals.to_vec(),
            emit_extension,
        });
    }

    plans
}

fn synthetic_id_field() -> FieldDescriptor {
    FieldDescriptor {
        name: "id".to_string(),
        kind: FieldKind::Attribute,
        type_name: Some("string".to_string()),
        options: Vec::new(),
    }
}

/// Break cycles among mixin base references: drop the lexicographically
/// largest edge of each cycle, removing the trait ref from the dependent
/// side, until a topological order exists.
fn break_mixin_cycles(plans: &mut [ArtifactPlan], reporter: &Reporter) {
    loop {
        let mixins: BTreeSet<&str> = plans
            .iter()
            .filter(|p| p.kind == SymbolKind::Mixin)
            .map(|p| p.canonical_import.as_str())
            .collect();

        let mut deps: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for plan in plans.iter().filter(|p| p.kind == SymbolKind::Mixin) {
            let entry = deps.entry(plan.canonical_import.as_str()).or_default();
            for r in &plan.trait_refs {
                if mixins.contains(r.canonical_import.as_str()) {
                    entry.insert(r.canonical_import.as_str());
                }
            }
        }

        // Kahn's algorithm; whatever survives is cyclic.
        let mut remaining = deps.clone();
        loop {
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|(_, d)| d.is_empty())
                .map(|(n, _)| *n)
                .collect();
            if ready.is_empty() {
                break;
            }
            for node in ready {
                remaining.remove(node);
                for d in remaining.values_mut() {
                    d.remove(node);
                }
            }
        }

        if remaining.is_empty() {
            return;
        }

        let Some((from, to)) = remaining
            .iter()
            .flat_map(|(n, d)| d.iter().map(move |t| (*n, *t)))
            .max()
        else {
            return;
        };

        reporter.warn(format!(
            "cycle among mixin base references; dropping '{to}' from '{from}'"
        ));
        let (from, to) = (from.to_string(), to.to_string());
        if let Some(plan) = plans
            .iter_mut()
            .find(|p| p.canonical_import == from)
        {
            plan.trait_refs.retain(|r| r.canonical_import != to);
        }
    }
}

/// Order: intermediate models, then mixins (bases before dependents),
/// then models; alphabetical by canonical path within a layer.
fn order_schedule(plans: &mut Vec<ArtifactPlan>) {
    let mut intermediates = Vec::new();
    let mut mixins = Vec::new();
    let mut models = Vec::new();

    for plan in plans.drain(..) {
        match plan.kind {
            SymbolKind::IntermediateModel => intermediates.push(plan),
            SymbolKind::Mixin => mixins.push(plan),
            SymbolKind::Model => models.push(plan),
        }
    }

    intermediates.sort_by(|a, b| a.canonical_import.cmp(&b.canonical_import));
    models.sort_by(|a, b| a.canonical_import.cmp(&b.canonical_import));

    plans.extend(intermediates);
    plans.extend(topo_sort_mixins(mixins));
    plans.extend(models);
}

fn topo_sort_mixins(mut mixins: Vec<ArtifactPlan>) -> Vec<ArtifactPlan> {
    mixins.sort_by(|a, b| a.canonical_import.cmp(&b.canonical_import));

    let names: BTreeSet<String> = mixins.iter().map(|p| p.canonical_import.clone()).collect();
    let mut deps: BTreeMap<String, BTreeSet<String>> = mixins
        .iter()
        .map(|p| {
            let d = p
                .trait_refs
                .iter()
                .filter(|r| names.contains(&r.canonical_import))
                .map(|r| r.canonical_import.clone())
                .collect();
            (p.canonical_import.clone(), d)
        })
        .collect();

    let mut ordered = Vec::new();
    while !deps.is_empty() {
        let Some(next) = deps
            .iter()
            .find(|(_, d)| d.is_empty())
            .map(|(n, _)| n.clone())
        else {
            // Cycles were broken beforehand; defensively flush the rest in
            // alphabetical order if one slipped through.
            let mut rest: Vec<String> = deps.keys().cloned().collect();
            rest.sort();
            for name in rest {
                deps.remove(&name);
                if let Some(idx) = mixins.iter().position(|p| p.canonical_import == name) {
                    ordered.push(mixins.remove(idx));
                }
            }
            break;
        };

        deps.remove(&next);
        for d in deps.values_mut() {
            d.remove(&next);
        }
        if let Some(idx) = mixins.iter().position(|p| p.canonical_import == next) {
            ordered.push(mixins.remove(idx));
        }
    }

    ordered
}
