//! Schema artifact rendering: the runtime descriptor object literals.

use crate::core::classify::{FieldDescriptor, OptionValue};
use crate::core::plan::ArtifactPlan;
use crate::core::resolve::Materialize;

/// Render the schema artifact for one plan.
///
/// Resources carry `type` / `legacy: true` / `identity`; traits carry
/// `name` / `mode: 'legacy'` and never an identity entry.
pub fn render_schema(plan: &ArtifactPlan) -> String {
    let mut out = String::new();

    match plan.materialize {
        Materialize::Resource => {
            out.push_str(&format!("export const {}Schema = {{\n", plan.pascal));
            out.push_str(&format!("  type: '{}',\n", plan.name));
            out.push_str("  legacy: true,\n");
            out.push_str("  identity: { kind: '@id', name: 'id' },\n");
        }
        Materialize::Trait => {
            out.push_str(&format!("export const {}Trait = {{\n", plan.pascal));
            out.push_str(&format!("  name: '{}',\n", plan.name));
            out.push_str("  mode: 'legacy',\n");
        }
    }

    render_fields(&mut out, &plan.fields);

    if !plan.trait_refs.is_empty() {
        let names: Vec<String> = plan
            .trait_refs
            .iter()
            .map(|r| format!("'{}'", r.name))
            .collect();
        out.push_str(&format!("  traits: [{}],\n", names.join(", ")));
    }

    if plan.materialize == Materialize::Resource && plan.emit_extension {
        out.push_str(&format!(
            "  objectExtensions: ['{}'],\n",
            plan.extension_name()
        ));
    }

    out.push_str("};\n");
    out
}

fn render_fields(out: &mut String, fields: &[FieldDescriptor]) {
    if fields.is_empty() {
        out.push_str("  fields: [],\n");
        return;
    }

    out.push_str("  fields: [\n");
    for field in fields {
        out.push_str("    { ");
        out.push_str(&format!("name: '{}', ", field.name));
        out.push_str(&format!("kind: '{}', ", field.kind.schema_name()));
        match &field.type_name {
            Some(type_name) => out.push_str(&format!("type: '{}'", quote_safe(type_name))),
            None => out.push_str("type: null"),
        }
        if !field.options.is_empty() {
            out.push_str(", options: { ");
            let ordered = ordered_options(field);
            let rendered: Vec<String> = ordered
                .iter()
                .map(|(key, value)| format!("{key}: {}", render_value(value)))
                .collect();
            out.push_str(&rendered.join(", "));
            out.push_str(" }");
        }
        out.push_str(" },\n");
    }
    out.push_str("  ],\n");
}

/// Stable option order: `async`, `inverse`, `polymorphic`, then the rest
/// alphabetically.
fn ordered_options(field: &FieldDescriptor) -> Vec<(String, OptionValue)> {
    let mut known = Vec::new();
    let mut rest = Vec::new();

    for key in ["async", "inverse", "polymorphic"] {
        if let Some((k, v)) = field.options.iter().find(|(k, _)| k == key) {
            known.push((k.clone(), v.clone()));
        }
    }
    for (k, v) in &field.options {
        if !matches!(k.as_str(), "async" | "inverse" | "polymorphic") {
            rest.push((k.clone(), v.clone()));
        }
    }
    rest.sort_by(|a, b| a.0.cmp(&b.0));

    known.extend(rest);
    known
}

fn render_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Str(s) => format!("'{}'", quote_safe(s)),
        OptionValue::Null => "null".to_string(),
        OptionValue::Raw(raw) => raw.clone(),
    }
}

fn quote_safe(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
