//! Shared extraction helpers: decorator shapes, field options, and
//! verbatim member snippets.

use swc_common::{BytePos, SourceMap, SourceMapper, Span};
use swc_ecma_ast::{
    Callee, Decorator, Expr, ExprOrSpread, Lit, ObjectLit, Prop, PropName, PropOrSpread,
};

use crate::core::index::ExtractedComments;
use crate::reporter::Reporter;
use crate::utils::dedent;

use super::{FieldDescriptor, FieldKind, OptionValue};

/// Source-text slicing for one file.
pub struct Snips<'a> {
    pub source_map: &'a SourceMap,
    pub comments: &'a ExtractedComments,
}

impl<'a> Snips<'a> {
    /// Raw source text of a span, or empty when lookup fails.
    pub fn text(&self, span: Span) -> String {
        self.source_map.span_to_snippet(span).unwrap_or_default()
    }

    /// Member text widened to cover decorators and leading comments,
    /// dedented for relocation.
    pub fn member_text(&self, span: Span, decorator_lo: Option<BytePos>) -> String {
        let mut lo = span.lo;
        if let Some(deco) = decorator_lo
            && deco < lo
        {
            lo = deco;
        }
        // Leading comments attach at the first token of the member, which
        // is the decorator when one exists.
        for key in [span.lo, lo] {
            if let Some(comment_lo) = self.comments.leading_start(key)
                && comment_lo < lo
            {
                lo = comment_lo;
            }
        }

        let mut widened = span;
        widened.lo = self.line_start(lo);
        dedent(&self.text(widened))
    }

    /// Pull a position back to the start of its line when only whitespace
    /// precedes it, so dedenting sees a uniform first line.
    fn line_start(&self, pos: BytePos) -> BytePos {
        let loc = self.source_map.lookup_char_pos(pos);
        let Some(line) = loc.file.get_line(loc.line - 1) else {
            return pos;
        };

        let prefix: String = line.chars().take(loc.col.0).collect();
        if !prefix.chars().all(char::is_whitespace) {
            return pos;
        }
        BytePos(pos.0 - prefix.len() as u32)
    }
}

/// The identifier a decorator invokes and its call arguments, for the two
/// recognized shapes `@name` and `@name(...)`.
pub fn decorator_parts(decorator: &Decorator) -> Option<(&str, &[ExprOrSpread])> {
    match &*decorator.expr {
        Expr::Ident(ident) => Some((ident.sym.as_str(), &[])),
        Expr::Call(call) => {
            let Callee::Expr(callee) = &call.callee else {
                return None;
            };
            let Expr::Ident(ident) = &**callee else {
                return None;
            };
            Some((ident.sym.as_str(), call.args.as_slice()))
        }
        _ => None,
    }
}

/// Earliest decorator start position, if any.
pub fn decorators_lo(decorators: &[Decorator]) -> Option<BytePos> {
    decorators.iter().map(|d| d.span.lo).min()
}

/// Why a recognized field decoration could not be turned into a field.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldArgError {
    /// First argument present but not a string literal.
    NotAStringLiteral,
}

/// Build a field descriptor from a recognized decorator/call argument
/// list. `@attr` with no arguments yields a field without a type name.
pub fn field_from_args(
    name: String,
    kind: FieldKind,
    args: &[ExprOrSpread],
    snips: &Snips,
    reporter: &Reporter,
    context: &str,
) -> Result<FieldDescriptor, FieldArgError> {
    let mut type_name = None;

    if let Some(first) = args.first() {
        if first.spread.is_some() {
            return Err(FieldArgError::NotAStringLiteral);
        }
        match &*first.expr {
            Expr::Lit(Lit::Str(s)) => {
                type_name = s.value.as_str().map(|v| v.to_string());
            }
            _ => return Err(FieldArgError::NotAStringLiteral),
        }
    }

    let mut options = Vec::new();
    if let Some(second) = args.get(1) {
        match &*second.expr {
            Expr::Object(obj) => {
                options = options_from_object(obj, snips, reporter, context);
            }
            _ => {
                reporter.warn(format!(
                    "{context}: options of '{name}' are not an object literal; dropping them"
                ));
            }
        }
    }

    Ok(FieldDescriptor {
        name,
        kind,
        type_name,
        options,
    })
}

/// Fold an options object literal into ordered key/value pairs.
///
/// Recognized scalar shapes keep their type; anything else passes through
/// as raw source text.
pub fn options_from_object(
    obj: &ObjectLit,
    snips: &Snips,
    reporter: &Reporter,
    context: &str,
) -> Vec<(String, OptionValue)> {
    let mut options = Vec::new();

    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else {
            reporter.warn(format!("{context}: spread in field options is dropped"));
            continue;
        };
        match &**prop {
            Prop::KeyValue(kv) => {
                let Some(key) = prop_name(&kv.key) else {
                    reporter.warn(format!("{context}: computed option key is dropped"));
                    continue;
                };
                let value = match &*kv.value {
                    Expr::Lit(Lit::Bool(b)) => OptionValue::Bool(b.value),
                    Expr::Lit(Lit::Str(s)) => {
                        OptionValue::Str(s.value.as_str().unwrap_or_default().to_string())
                    }
                    Expr::Lit(Lit::Null(_)) => OptionValue::Null,
                    other => OptionValue::Raw(snips.text(span_of(other))),
                };
                options.push((key, value));
            }
            Prop::Shorthand(ident) => {
                options.push((
                    ident.sym.to_string(),
                    OptionValue::Raw(ident.sym.to_string()),
                ));
            }
            _ => {
                reporter.warn(format!(
                    "{context}: unsupported field option shape is dropped"
                ));
            }
        }
    }

    options
}

fn span_of(expr: &Expr) -> Span {
    use swc_common::Spanned;
    expr.span()
}

/// A property or member name usable as a field name.
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|v| v.to_string()),
        _ => None,
    }
}

/// Append a field, keeping the first occurrence on duplicate names.
pub fn push_field(
    fields: &mut Vec<FieldDescriptor>,
    field: FieldDescriptor,
    reporter: &Reporter,
    context: &str,
) {
    if fields.iter().any(|f| f.name == field.name) {
        reporter.warn(format!(
            "{context}: field '{}' is declared twice; keeping the first declaration",
            field.name
        ));
        return;
    }
    fields.push(field);
}

/// Warn about residual members that shadow a declared field name; the
/// member is still relocated and the field still emitted.
pub fn warn_shadowed_fields(
    fields: &[FieldDescriptor],
    residuals: &[super::ResidualMember],
    reporter: &Reporter,
    context: &str,
) {
    for residual in residuals {
        if fields.iter().any(|f| f.name == residual.name) {
            reporter.warn(format!(
                "{context}: member '{}' shadows a schema field of the same name; \
                 both are kept",
                residual.name
            ));
        }
    }
}
