//! Extension artifact rendering: the residual behavioral code lifted out
//! of a model or mixin.
//!
//! Typed surfaces use declaration merging (an interface and a class
//! sharing one identifier); untyped surfaces get the JSDoc equivalent.
//! Residual member bodies are relocated verbatim, never re-analyzed.

use crate::core::index::Surface;
use crate::core::plan::ArtifactPlan;
use crate::core::resolve::Resolver;
use crate::utils::indent;

/// Render the extension artifact for one plan, in the origin surface.
pub fn render_extension(plan: &ArtifactPlan, resolver: &Resolver) -> String {
    match plan.surface {
        Surface::Typed => render_typed(plan, resolver),
        Surface::Untyped => render_untyped(plan, resolver),
    }
}

fn members(plan: &ArtifactPlan) -> String {
    plan.residuals
        .iter()
        .map(|member| indent(&member.text, 2))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_typed(plan: &ArtifactPlan, resolver: &Resolver) -> String {
    let name = &plan.pascal;
    let extension = plan.extension_name();
    let types_import = resolver.types_import(&plan.name, plan.materialize);

    let mut out = String::new();
    out.push_str(&format!("import type {{ {name} }} from '{types_import}';\n\n"));
    out.push_str(&format!(
        "export interface {extension} extends {name} {{}}\n"
    ));
    out.push_str(&format!("export class {extension} {{\n"));
    out.push_str(&members(plan));
    out.push_str("\n}\n\n");
    out.push_str(&format!(
        "export type {extension}Signature = typeof {extension};\n"
    ));
    out
}

fn render_untyped(plan: &ArtifactPlan, resolver: &Resolver) -> String {
    let name = &plan.pascal;
    let extension = plan.extension_name();
    let types_import = resolver.types_import(&plan.name, plan.materialize);

    let mut out = String::new();
    out.push_str(&format!(
        "/** @typedef {{import('{types_import}').{name}}} {name} */\n"
    ));
    out.push_str(&format!("/** @type {{{{ new(): {name} }}}} */\n"));
    out.push_str("const Base = class {};\n\n");
    out.push_str(&format!("export class {extension} extends Base {{\n"));
    out.push_str(&members(plan));
    out.push_str("\n}\n\n");
    out.push_str(&format!(
        "/** @typedef {{typeof {extension}}} {extension}Signature */\n"
    ));
    out
}
