//! Types artifact rendering: the compile-time interface for each symbol.
//!
//! Always emitted as TypeScript, whatever the origin surface.

use std::collections::BTreeSet;

use crate::config::ResolvedConfig;
use crate::core::classify::{FieldDescriptor, FieldKind};
use crate::core::plan::{ArtifactPlan, SymbolCatalog};
use crate::core::resolve::{Materialize, Resolver};
use crate::reporter::Reporter;
use crate::utils::pascal_case;

/// Render the `.schema.types.ts` artifact for one plan.
pub fn render_types(
    plan: &ArtifactPlan,
    catalog: &SymbolCatalog,
    resolver: &Resolver,
    config: &ResolvedConfig,
    reporter: &Reporter,
) -> String {
    let mut imports = ImportList::default();
    let mut helpers: BTreeSet<&'static str> = BTreeSet::new();

    let mut extends = Vec::new();
    for r in &plan.trait_refs {
        let pascal = pascal_case(&r.name);
        imports.add(
            resolver.types_import(&r.name, Materialize::Trait),
            pascal.clone(),
            true,
        );
        extends.push(pascal);
    }
    if plan.emit_extension {
        let signature = format!("{}Signature", plan.extension_name());
        imports.add(resolver.extension_import(&plan.name), signature.clone(), true);
        extends.push(signature);
    }

    let mut members = Vec::new();
    for field in &plan.fields {
        members.push(render_field(
            field,
            plan,
            catalog,
            resolver,
            config,
            reporter,
            &mut imports,
            &mut helpers,
        ));
    }
    if plan.materialize == Materialize::Resource {
        members.push(format!("readonly [Type]: '{}';", plan.name));
    }

    let mut out = String::new();
    if !helpers.is_empty() {
        let names: Vec<&str> = helpers.iter().copied().collect();
        out.push_str(&format!(
            "import type {{ {} }} from '{}';\n",
            names.join(", "),
            resolver.relationship_helpers_import()
        ));
    }
    if plan.materialize == Materialize::Resource {
        out.push_str(&format!(
            "import {{ Type }} from '{}';\n",
            resolver.type_symbols_import()
        ));
    }
    out.push_str(&imports.render());

    if !out.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("export interface {}", plan.pascal));
    if !extends.is_empty() {
        out.push_str(&format!(" extends {}", extends.join(", ")));
    }
    if members.is_empty() {
        out.push_str(" {}\n");
    } else {
        out.push_str(" {\n");
        for member in &members {
            out.push_str(&format!("  {member}\n"));
        }
        out.push_str("}\n");
    }

    out
}

#[allow(clippy::too_many_arguments)]
fn render_field(
    field: &FieldDescriptor,
    plan: &ArtifactPlan,
    catalog: &SymbolCatalog,
    resolver: &Resolver,
    config: &ResolvedConfig,
    reporter: &Reporter,
    imports: &mut ImportList,
    helpers: &mut BTreeSet<&'static str>,
) -> String {
    match field.kind {
        FieldKind::Attribute => {
            let ts = attribute_type(field, config);
            format!("readonly {}: {} | null;", field.name, ts)
        }
        FieldKind::BelongsTo => {
            let target = target_type(field, plan, catalog, resolver, reporter, imports);
            format!("readonly {}: {} | null;", field.name, target)
        }
        FieldKind::HasMany => {
            let helper = if field.is_async() {
                "AsyncHasMany"
            } else {
                "HasMany"
            };
            helpers.insert(helper);
            let target = target_type(field, plan, catalog, resolver, reporter, imports);
            format!("readonly {}: {}<{}>;", field.name, helper, target)
        }
    }
}

/// Map an attribute type name to TypeScript: built-ins, then the config
/// mapping, then a PascalCase external type reference.
fn attribute_type(field: &FieldDescriptor, config: &ResolvedConfig) -> String {
    let Some(type_name) = &field.type_name else {
        return "unknown".to_string();
    };
    match type_name.as_str() {
        "string" => "string".to_string(),
        "number" => "number".to_string(),
        "boolean" => "boolean".to_string(),
        "date" => "Date".to_string(),
        other => config
            .type_mapping
            .get(other)
            .cloned()
            .unwrap_or_else(|| pascal_case(other)),
    }
}

/// The interface name of a relationship target, importing its types
/// artifact unless the target is the emitting symbol itself.
fn target_type(
    field: &FieldDescriptor,
    plan: &ArtifactPlan,
    catalog: &SymbolCatalog,
    resolver: &Resolver,
    reporter: &Reporter,
    imports: &mut ImportList,
) -> String {
    let Some(type_name) = &field.type_name else {
        reporter.warn(format!(
            "{}: relationship '{}' has no target type; using unknown",
            plan.name, field.name
        ));
        return "unknown".to_string();
    };
    let Some(entry) = catalog.lookup(type_name) else {
        reporter.warn(format!(
            "{}: relationship target '{type_name}' does not materialize in this run; \
             using unknown",
            plan.name
        ));
        return "unknown".to_string();
    };

    let specifier = resolver.types_import(&entry.name, entry.materialize);
    let own = resolver.types_import(&plan.name, plan.materialize);
    if specifier != own {
        imports.add(specifier, entry.pascal.clone(), true);
    }
    entry.pascal.clone()
}

/// Named type imports in first-use order, deduplicated by specifier.
#[derive(Debug, Default)]
struct ImportList {
    entries: Vec<(String, String, bool)>,
}

impl ImportList {
    fn add(&mut self, specifier: String, name: String, type_only: bool) {
        if self.entries.iter().any(|(s, n, _)| *s == specifier && *n == name) {
            return;
        }
        self.entries.push((specifier, name, type_only));
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (specifier, name, type_only) in &self.entries {
            let kw = if *type_only { "import type" } else { "import" };
            out.push_str(&format!("{kw} {{ {name} }} from '{specifier}';\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::Config;
    use crate::core::classify::classify_all;
    use crate::core::index::SourceIndex;
    use crate::core::plan::plan;

    use super::*;

    fn render_project(files: &[(&str, &str)], target: &str) -> String {
        let dir = tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let mut raw = Config {
            resources_import: Some("my-app/data/resources".into()),
            traits_import: Some("my-app/data/traits".into()),
            extensions_import: Some("my-app/data/extensions".into()),
            model_import_source: Some("my-app/models".into()),
            mixin_import_source: Some("my-app/mixins".into()),
            ..Config::default()
        };
        raw.type_mapping
            .insert("uuid".to_string(), "string".to_string());
        let config = raw.resolve(dir.path()).unwrap();

        let reporter = crate::reporter::Reporter::default();
        let index = SourceIndex::build(&config, &reporter);
        let resolver = Resolver::new(&index, &config, &reporter);
        let classified = classify_all(&index, &resolver, &config, &reporter);
        let planned = plan(&index, &classified, &resolver, &config, &reporter);

        let plan = planned
            .schedule
            .iter()
            .find(|p| p.name == target)
            .expect("target plan");
        render_types(plan, &planned.catalog, &resolver, &config, &reporter)
    }

    #[test]
    fn renders_resource_interface_with_brand() {
        let rendered = render_project(
            &[
                (
                    "app/models/user.ts",
                    "import Model, { attr, belongsTo, hasMany } from '@ember-data/model';\n\
                     export default class User extends Model {\n\
                     \x20 @attr('string') declare name;\n\
                     \x20 @belongsTo('company', { async: false, inverse: null }) declare company;\n\
                     \x20 @hasMany('post', { async: true, inverse: 'author' }) declare posts;\n\
                     \x20 get displayName() { return this.name; }\n\
                     }\n",
                ),
                (
                    "app/models/company.ts",
                    "import Model from '@ember-data/model';\nexport default class Company extends Model {}\n",
                ),
                (
                    "app/models/post.ts",
                    "import Model from '@ember-data/model';\nexport default class Post extends Model {}\n",
                ),
            ],
            "user",
        );

        assert_eq!(
            rendered,
            "import type { AsyncHasMany } from '@ember-data/model';\n\
             import { Type } from '@ember-data/core-types/symbols';\n\
             import type { UserExtensionSignature } from 'my-app/data/extensions/user';\n\
             import type { Company } from 'my-app/data/resources/company.schema.types';\n\
             import type { Post } from 'my-app/data/resources/post.schema.types';\n\
             \n\
             export interface User extends UserExtensionSignature {\n\
             \x20 readonly name: string | null;\n\
             \x20 readonly company: Company | null;\n\
             \x20 readonly posts: AsyncHasMany<Post>;\n\
             \x20 readonly [Type]: 'user';\n\
             }\n"
        );
    }

    #[test]
    fn trait_interface_has_no_brand() {
        let rendered = render_project(
            &[
                (
                    "app/models/user.ts",
                    "import Model from '@ember-data/model';\n\
                     import Auditable from 'my-app/mixins/auditable';\n\
                     export default class User extends Model.extend(Auditable) {}\n",
                ),
                (
                    "app/mixins/auditable.ts",
                    "import Mixin from '@ember/object/mixin';\n\
                     import { attr } from '@ember-data/model';\n\
                     export default Mixin.create({ createdAt: attr('date') });\n",
                ),
            ],
            "auditable",
        );

        assert_eq!(
            rendered,
            "export interface Auditable {\n\
             \x20 readonly createdAt: Date | null;\n\
             }\n"
        );
    }

    #[test]
    fn extends_traits_in_composition_order() {
        let rendered = render_project(
            &[
                (
                    "app/models/user.ts",
                    "import Model from '@ember-data/model';\n\
                     import Taggable from 'my-app/mixins/taggable';\n\
                     import Auditable from 'my-app/mixins/auditable';\n\
                     export default class User extends Model.extend(Taggable, Auditable) {}\n",
                ),
                (
                    "app/mixins/auditable.ts",
                    "import Mixin from '@ember/object/mixin';\nexport default Mixin.create({});\n",
                ),
                (
                    "app/mixins/taggable.ts",
                    "import Mixin from '@ember/object/mixin';\nexport default Mixin.create({});\n",
                ),
            ],
            "user",
        );

        assert!(rendered.contains("export interface User extends Taggable, Auditable {"));
        assert!(
            rendered.contains(
                "import type { Taggable } from 'my-app/data/traits/taggable.schema.types';"
            )
        );
    }

    #[test]
    fn custom_type_mapping_and_external_fallback() {
        let rendered = render_project(
            &[(
                "app/models/device.ts",
                "import Model, { attr } from '@ember-data/model';\n\
                 export default class Device extends Model {\n\
                 \x20 @attr('uuid') declare serial;\n\
                 \x20 @attr('geo-point') declare location;\n\
                 }\n",
            )],
            "device",
        );

        assert!(rendered.contains("readonly serial: string | null;"));
        assert!(rendered.contains("readonly location: GeoPoint | null;"));
    }

    #[test]
    fn self_referential_relationship_needs_no_import() {
        let rendered = render_project(
            &[(
                "app/models/category.ts",
                "import Model, { belongsTo } from '@ember-data/model';\n\
                 export default class Category extends Model {\n\
                 \x20 @belongsTo('category', { async: false, inverse: null }) declare parent;\n\
                 }\n",
            )],
            "category",
        );

        assert!(rendered.contains("readonly parent: Category | null;"));
        assert!(!rendered.contains("category.schema.types'"));
    }

    #[test]
    fn unresolved_target_falls_back_to_unknown() {
        let rendered = render_project(
            &[(
                "app/models/user.ts",
                "import Model, { belongsTo } from '@ember-data/model';\n\
                 export default class User extends Model {\n\
                 \x20 @belongsTo('company', { async: false, inverse: null }) declare company;\n\
                 }\n",
            )],
            "user",
        );

        assert!(rendered.contains("readonly company: unknown | null;"));
    }

    #[test]
    fn sync_has_many_uses_has_many_helper() {
        let rendered = render_project(
            &[
                (
                    "app/models/user.ts",
                    "import Model, { hasMany } from '@ember-data/model';\n\
                     export default class User extends Model {\n\
                     \x20 @hasMany('post', { async: false, inverse: null }) declare posts;\n\
                     }\n",
                ),
                (
                    "app/models/post.ts",
                    "import Model from '@ember-data/model';\nexport default class Post extends Model {}\n",
                ),
            ],
            "user",
        );

        assert!(rendered.contains("import type { HasMany } from '@ember-data/model';"));
        assert!(rendered.contains("readonly posts: HasMany<Post>;"));
    }
}
