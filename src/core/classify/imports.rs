use swc_ecma_ast::{Module, ModuleDecl, ModuleExportName, ModuleItem};

use crate::config::ResolvedConfig;

use super::FieldKind;

/// Import statement information for cross-file resolution.
///
/// Tracks how names are imported so references like a renamed field
/// decorator or an aliased mixin still resolve:
/// ```typescript
/// import { attr as field } from '@ember-data/model';
/// ```
#[derive(Debug, Clone)]
pub struct ImportInfo {
    /// Local name in the importing file.
    pub local_name: String,
    /// Original name in the imported module (`default` for default
    /// imports, `*` for namespace imports).
    pub imported_name: String,
    /// Import source specifier as written.
    pub module_path: String,
    /// True for `import type ...` or an `import { type ... }` specifier.
    pub type_only: bool,
}

/// Collect every import binding of a module.
pub fn collect_imports(module: &Module) -> Vec<ImportInfo> {
    let mut imports = Vec::new();

    for item in &module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        let Some(module_path) = import.src.value.as_str() else {
            continue;
        };

        for specifier in &import.specifiers {
            match specifier {
                swc_ecma_ast::ImportSpecifier::Named(named) => {
                    let imported_name = match &named.imported {
                        Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                        Some(ModuleExportName::Str(s)) => {
                            s.value.as_str().unwrap_or_default().to_string()
                        }
                        None => named.local.sym.to_string(),
                    };
                    imports.push(ImportInfo {
                        local_name: named.local.sym.to_string(),
                        imported_name,
                        module_path: module_path.to_string(),
                        type_only: import.type_only || named.is_type_only,
                    });
                }
                swc_ecma_ast::ImportSpecifier::Default(default) => {
                    imports.push(ImportInfo {
                        local_name: default.local.sym.to_string(),
                        imported_name: "default".to_string(),
                        module_path: module_path.to_string(),
                        type_only: import.type_only,
                    });
                }
                swc_ecma_ast::ImportSpecifier::Namespace(ns) => {
                    imports.push(ImportInfo {
                        local_name: ns.local.sym.to_string(),
                        imported_name: "*".to_string(),
                        module_path: module_path.to_string(),
                        type_only: import.type_only,
                    });
                }
            }
        }
    }

    imports
}

/// Local bindings of the legacy framework's exports within one file.
///
/// All field/base recognition goes through these so renamed imports are
/// honored and identically-named locals from other packages are not.
#[derive(Debug, Default)]
pub struct LegacyBindings {
    /// Local name of the default `Model` import.
    pub model: Option<String>,
    /// Local name of the default `Mixin` constructor import.
    pub mixin: Option<String>,
    attr: Option<String>,
    belongs_to: Option<String>,
    has_many: Option<String>,
}

impl LegacyBindings {
    pub fn from_imports(imports: &[ImportInfo], config: &ResolvedConfig) -> Self {
        let mut bindings = Self::default();

        for import in imports {
            if import.type_only {
                continue;
            }
            if import.module_path == config.ember_data_import_source {
                match import.imported_name.as_str() {
                    "default" => fill(&mut bindings.model, &import.local_name),
                    "attr" => fill(&mut bindings.attr, &import.local_name),
                    "belongsTo" => fill(&mut bindings.belongs_to, &import.local_name),
                    "hasMany" => fill(&mut bindings.has_many, &import.local_name),
                    _ => {}
                }
            } else if config.mixin_import_sources.contains(&import.module_path)
                && import.imported_name == "default"
            {
                fill(&mut bindings.mixin, &import.local_name);
            }
        }

        bindings
    }

    /// The field kind a local identifier stands for, if any.
    pub fn field_kind(&self, local: &str) -> Option<FieldKind> {
        if self.attr.as_deref() == Some(local) {
            Some(FieldKind::Attribute)
        } else if self.belongs_to.as_deref() == Some(local) {
            Some(FieldKind::BelongsTo)
        } else if self.has_many.as_deref() == Some(local) {
            Some(FieldKind::HasMany)
        } else {
            None
        }
    }

    pub fn is_model(&self, local: &str) -> bool {
        self.model.as_deref() == Some(local)
    }

    pub fn is_mixin_constructor(&self, local: &str) -> bool {
        self.mixin.as_deref() == Some(local)
    }
}

fn fill(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}
