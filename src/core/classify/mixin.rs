//! Mixin classification: default exports of `Mixin.create(...)` or
//! `Mixin.createWithMixins(...)`.

use swc_common::Spanned;
use swc_ecma_ast::{
    Callee, Expr, MemberProp, ModuleDecl, ModuleItem, ObjectLit, Prop, PropOrSpread,
};

use crate::core::index::FileRecord;
use crate::reporter::Reporter;

use super::members::{
    FieldArgError, Snips, field_from_args, options_from_object, prop_name, push_field,
    warn_shadowed_fields,
};
use super::{FieldDescriptor, LegacyBindings, MixinSummary, ResidualMember};

/// Try to classify a file as a mixin. Returns `None` when the default
/// export is not a recognized mixin constructor call.
pub fn classify_mixin(
    record: &FileRecord,
    bindings: &LegacyBindings,
    reporter: &Reporter,
) -> Option<MixinSummary> {
    let call = default_export_call(record)?;

    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    let Expr::Ident(object) = &*member.obj else {
        return None;
    };
    let MemberProp::Ident(method) = &member.prop else {
        return None;
    };
    if !bindings.is_mixin_constructor(object.sym.as_str())
        || !matches!(method.sym.as_str(), "create" | "createWithMixins")
    {
        return None;
    }

    let snips = Snips {
        source_map: &record.parsed.source_map,
        comments: &record.parsed.comments,
    };

    let mut base_locals = Vec::new();
    let mut fields = Vec::new();
    let mut residuals = Vec::new();

    for arg in &call.args {
        if arg.spread.is_some() {
            reporter.warn(format!(
                "{}: spread argument to {} is dropped",
                record.name, method.sym
            ));
            continue;
        }
        match &*arg.expr {
            Expr::Ident(ident) => base_locals.push(ident.sym.to_string()),
            Expr::Object(object) => extract_body(
                object,
                bindings,
                &snips,
                reporter,
                &record.name,
                &mut fields,
                &mut residuals,
            ),
            other => {
                reporter.warn(format!(
                    "{}: unsupported argument to {} is dropped",
                    record.name, method.sym
                ));
                reporter.debug(format!("{}: {}", record.name, snips.text(other.span())));
            }
        }
    }

    warn_shadowed_fields(&fields, &residuals, reporter, &record.name);

    Some(MixinSummary {
        base_locals,
        fields,
        residuals,
    })
}

fn default_export_call(record: &FileRecord) -> Option<&swc_ecma_ast::CallExpr> {
    for item in &record.parsed.module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(expr)) = item
            && let Expr::Call(call) = &*expr.expr
        {
            return Some(call);
        }
    }
    None
}

/// Split a mixin body object literal into fields and residual members.
fn extract_body(
    object: &ObjectLit,
    bindings: &LegacyBindings,
    snips: &Snips,
    reporter: &Reporter,
    context: &str,
    fields: &mut Vec<FieldDescriptor>,
    residuals: &mut Vec<ResidualMember>,
) {
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            residuals.push(ResidualMember {
                name: "...".to_string(),
                text: snips.member_text(prop.span(), None),
            });
            continue;
        };

        if let Prop::KeyValue(kv) = &**prop
            && let Some(name) = prop_name(&kv.key)
            && let Expr::Call(call) = &*kv.value
            && let Callee::Expr(callee) = &call.callee
            && let Expr::Ident(ident) = &**callee
            && let Some(kind) = bindings.field_kind(ident.sym.as_str())
        {
            match field_from_args(name.clone(), kind, &call.args, snips, reporter, context) {
                Ok(field) => {
                    push_field(fields, field, reporter, context);
                    continue;
                }
                Err(FieldArgError::NotAStringLiteral) => {
                    reporter.warn(format!(
                        "{context}: first argument of '{}' on '{name}' is not a string \
                         literal; keeping as extension member",
                        ident.sym
                    ));
                }
            }
        }

        residuals.push(ResidualMember {
            name: residual_name(prop),
            text: snips.member_text(prop.span(), None),
        });
    }
}

fn residual_name(prop: &Prop) -> String {
    let key = match prop {
        Prop::KeyValue(kv) => prop_name(&kv.key),
        Prop::Method(m) => prop_name(&m.key),
        Prop::Getter(g) => prop_name(&g.key),
        Prop::Setter(s) => prop_name(&s.key),
        Prop::Shorthand(ident) => Some(ident.sym.to_string()),
        Prop::Assign(_) => None,
    };
    key.unwrap_or_default()
}
