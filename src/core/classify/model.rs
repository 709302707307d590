//! Model classification: default-export classes rooted in the legacy
//! `Model` class or an intermediate model.

use swc_ecma_ast::{
    Callee, Class, ClassMember, Decl, DefaultDecl, Expr, MemberProp, ModuleDecl, ModuleItem, Stmt,
};

use crate::config::ResolvedConfig;
use crate::core::index::FileRecord;
use crate::core::resolve::Resolver;
use crate::reporter::Reporter;

use super::members::{
    FieldArgError, Snips, decorator_parts, decorators_lo, field_from_args, prop_name, push_field,
    warn_shadowed_fields,
};
use super::{ImportInfo, LegacyBindings, ModelBase, ModelSummary, ResidualMember};

/// Try to classify a file as a model. Returns `None` when the file does
/// not default-export a class rooted in `Model` or an intermediate model.
pub fn classify_model(
    record: &FileRecord,
    imports: &[ImportInfo],
    bindings: &LegacyBindings,
    resolver: &Resolver,
    config: &ResolvedConfig,
    reporter: &Reporter,
) -> Option<ModelSummary> {
    let class = default_export_class(record)?;
    let super_class = class.super_class.as_deref()?;

    let (base_expr, mixin_locals) = unwrap_extends(super_class);
    let Expr::Ident(base_ident) = base_expr else {
        return None;
    };

    let base = if bindings.is_model(base_ident.sym.as_str()) {
        ModelBase::Model
    } else {
        let canonical =
            resolve_local(record, imports, resolver, base_ident.sym.as_str())?;
        if !config.intermediate_model_paths.contains(&canonical) {
            reporter.debug(format!(
                "{}: base '{}' is not Model or an intermediate model",
                record.name, base_ident.sym
            ));
            return None;
        }
        ModelBase::Intermediate(canonical)
    };

    let snips = Snips {
        source_map: &record.parsed.source_map,
        comments: &record.parsed.comments,
    };

    let mut fields = Vec::new();
    let mut residuals = Vec::new();

    for member in &class.body {
        extract_member(
            member,
            bindings,
            &snips,
            reporter,
            &record.name,
            &mut fields,
            &mut residuals,
        );
    }

    warn_shadowed_fields(&fields, &residuals, reporter, &record.name);

    let type_only_imports = imports
        .iter()
        .filter(|i| i.type_only)
        .cloned()
        .collect();

    Some(ModelSummary {
        base,
        mixin_locals,
        fields,
        residuals,
        type_only_imports,
    })
}

/// The default-exported class of a module: either
/// `export default class ...` or a named class followed by
/// `export default Name;`.
fn default_export_class(record: &FileRecord) -> Option<&Class> {
    let module = &record.parsed.module;

    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(decl)) => {
                if let DefaultDecl::Class(class_expr) = &decl.decl {
                    return Some(&class_expr.class);
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(expr)) => {
                let Expr::Ident(ident) = &*expr.expr else {
                    return None;
                };
                for candidate in &module.body {
                    if let ModuleItem::Stmt(Stmt::Decl(Decl::Class(class_decl))) = candidate
                        && class_decl.ident.sym == ident.sym
                    {
                        return Some(&class_decl.class);
                    }
                }
                return None;
            }
            _ => {}
        }
    }
    None
}

/// Flatten an extends expression into its base and the mixin identifiers
/// passed to any chained `.extend(...)` calls, in source order.
fn unwrap_extends(expr: &Expr) -> (&Expr, Vec<String>) {
    match expr {
        Expr::Call(call) => {
            let Callee::Expr(callee) = &call.callee else {
                return (expr, Vec::new());
            };
            let Expr::Member(member) = &**callee else {
                return (expr, Vec::new());
            };
            let MemberProp::Ident(prop) = &member.prop else {
                return (expr, Vec::new());
            };
            if prop.sym.as_str() != "extend" {
                return (expr, Vec::new());
            }

            let (base, mut locals) = unwrap_extends(&member.obj);
            for arg in &call.args {
                if arg.spread.is_none()
                    && let Expr::Ident(ident) = &*arg.expr
                {
                    locals.push(ident.sym.to_string());
                }
            }
            (base, locals)
        }
        _ => (expr, Vec::new()),
    }
}

fn resolve_local(
    record: &FileRecord,
    imports: &[ImportInfo],
    resolver: &Resolver,
    local: &str,
) -> Option<String> {
    let import = imports
        .iter()
        .find(|i| i.local_name == local && !i.type_only)?;
    resolver.canonicalize(&record.path, &import.module_path)
}

fn extract_member(
    member: &ClassMember,
    bindings: &LegacyBindings,
    snips: &Snips,
    reporter: &Reporter,
    context: &str,
    fields: &mut Vec<super::FieldDescriptor>,
    residuals: &mut Vec<ResidualMember>,
) {
    match member {
        ClassMember::ClassProp(prop) => {
            let name = prop_name(&prop.key).unwrap_or_default();
            let deco_lo = decorators_lo(&prop.decorators);

            if let Some(decorator) = prop.decorators.first()
                && let Some((deco_name, args)) = decorator_parts(decorator)
                && let Some(kind) = bindings.field_kind(deco_name)
            {
                if name.is_empty() {
                    reporter.warn(format!(
                        "{context}: computed member name cannot become a field; keeping as \
                         extension member"
                    ));
                } else {
                    match field_from_args(name.clone(), kind, args, snips, reporter, context) {
                        Ok(field) => {
                            push_field(fields, field, reporter, context);
                            return;
                        }
                        Err(FieldArgError::NotAStringLiteral) => {
                            reporter.warn(format!(
                                "{context}: first argument of '{deco_name}' on '{name}' is not \
                                 a string literal; keeping as extension member"
                            ));
                        }
                    }
                }
            }

            residuals.push(ResidualMember {
                name,
                text: snips.member_text(prop.span, deco_lo),
            });
        }
        ClassMember::Method(method) => {
            residuals.push(ResidualMember {
                name: prop_name(&method.key).unwrap_or_default(),
                text: snips
                    .member_text(method.span, decorators_lo(&method.function.decorators)),
            });
        }
        ClassMember::Constructor(ctor) => {
            residuals.push(ResidualMember {
                name: "constructor".to_string(),
                text: snips.member_text(ctor.span, None),
            });
        }
        ClassMember::PrivateMethod(method) => {
            residuals.push(ResidualMember {
                name: format!("#{}", method.key.name),
                text: snips
                    .member_text(method.span, decorators_lo(&method.function.decorators)),
            });
        }
        ClassMember::PrivateProp(prop) => {
            residuals.push(ResidualMember {
                name: format!("#{}", prop.key.name),
                text: snips.member_text(prop.span, decorators_lo(&prop.decorators)),
            });
        }
        ClassMember::StaticBlock(block) => {
            residuals.push(ResidualMember {
                name: "static".to_string(),
                text: snips.member_text(block.span, None),
            });
        }
        ClassMember::AutoAccessor(accessor) => {
            use swc_common::Spanned;
            residuals.push(ResidualMember {
                name: String::new(),
                text: snips.member_text(accessor.span(), decorators_lo(&accessor.decorators)),
            });
        }
        ClassMember::TsIndexSignature(sig) => {
            residuals.push(ResidualMember {
                name: String::new(),
                text: snips.member_text(sig.span, None),
            });
        }
        ClassMember::Empty(_) => {}
    }
}
