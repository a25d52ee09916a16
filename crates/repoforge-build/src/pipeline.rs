//! The per-run generation pipeline: extract, validate, plan, fan out to
//! every enabled backend, fan in per entity. Failures scope to the
//! smallest failing unit (entity, or entity×backend) and never abort the
//! remaining entities; only internal emitter defects abort the run.

use crate::{
    backend::{Backend, CodeFragment, EmitError},
    unit::{self, GeneratedUnit},
};
use convert_case::{Case, Casing};
use repoforge_schema::{
    decl::SchemaDecl,
    extract,
    node::Entity,
    plan,
    registry::Capability,
    validate::{self, Diagnostic, DiagnosticCode},
};
use std::collections::BTreeMap;

///
/// RunReport
///
/// Everything a generation run produced: units in (entity discovery,
/// backend registration) order and diagnostics concatenated in
/// discovery order, both reproducible across runs.
///

#[derive(Debug, Default)]
pub struct RunReport {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Whether any fatal diagnostic occurred; drives the run exit status.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    #[must_use]
    pub fn unit_for(&self, entity: &str, backend: &str) -> Option<&GeneratedUnit> {
        self.units
            .iter()
            .find(|u| u.entity == entity && u.backend == backend)
    }
}

/// Run the whole pipeline over a schema description.
///
/// `Err` is reserved for internal emitter defects; every user-input
/// problem comes back inside the report's diagnostics instead.
pub fn generate(schema: &SchemaDecl, backends: &[&dyn Backend]) -> Result<RunReport, EmitError> {
    let capabilities: Vec<Capability> = backends.iter().map(|b| *b.capability()).collect();
    let mut report = RunReport::default();

    // entity names must stay unique after the snake_case fold that
    // derives unit file names, or later units overwrite earlier ones
    let mut seen_names: BTreeMap<String, String> = BTreeMap::new();

    for decl in &schema.entities {
        let normalized = decl.name.to_case(Case::Snake);
        if let Some(first) = seen_names.get(&normalized) {
            report.diagnostics.push(Diagnostic::fatal(
                &decl.name,
                DiagnosticCode::DuplicateEntity,
                format!("entity name '{}' collides with '{first}'", decl.name),
            ));
            continue;
        }
        seen_names.insert(normalized, decl.name.clone());

        let entity = match extract::extract(decl) {
            Ok(entity) => entity,
            Err(err) => {
                report
                    .diagnostics
                    .push(Diagnostic::from_extract(&decl.name, &err));
                continue;
            }
        };

        if let Some(diag) = check_identifiers(&entity) {
            report.diagnostics.push(diag);
            continue;
        }

        let diags = validate::validate_entity(&entity, &capabilities);
        let entity_blocked = diags.iter().any(Diagnostic::blocks_entity);
        report.diagnostics.extend(diags);
        if entity_blocked {
            continue;
        }

        let plans = match plan::plan_methods(&entity) {
            Ok(plans) => plans,
            Err(err) => {
                report
                    .diagnostics
                    .push(Diagnostic::from_plan(&entity.name, &err));
                continue;
            }
        };

        for backend in backends {
            let blocked = report
                .diagnostics
                .iter()
                .filter(|d| d.entity == entity.name)
                .any(|d| d.blocks_backend(backend.id()));
            if blocked {
                continue;
            }

            match emit_unit(&entity, &plans, *backend)? {
                Ok(generated) => report.units.push(generated),
                Err(diag) => report.diagnostics.push(diag),
            }
        }
    }

    Ok(report)
}

// Every name becomes a Rust identifier in the generated unit, so names
// the tokenizer rejects must be refused before emission.
fn check_identifiers(entity: &Entity) -> Option<Diagnostic> {
    let bad = std::iter::once(entity.name.as_str())
        .chain(entity.fields.iter().map(|f| f.name.as_str()))
        .find(|name| syn::parse_str::<syn::Ident>(name).is_err())?;

    Some(Diagnostic::fatal(
        &entity.name,
        DiagnosticCode::InvalidIdentifier,
        format!("'{bad}' is not usable as a generated identifier"),
    ))
}

// One entity×backend pair. The outer Result is the loud internal-defect
// path; the inner one scopes capability mismatches to the pair.
fn emit_unit(
    entity: &Entity,
    plans: &[plan::MethodPlan],
    backend: &dyn Backend,
) -> Result<Result<GeneratedUnit, Diagnostic>, EmitError> {
    let mut fragments: Vec<CodeFragment> = vec![backend.emit_setup(entity)?];

    for method_plan in plans {
        match backend.emit(entity, method_plan) {
            Ok(fragment) => fragments.push(fragment),
            Err(err @ EmitError::UnsupportedMethodShape { .. }) => {
                // a partial repository would be a silent capability
                // mismatch across backends; fail the whole pair instead
                let diag = Diagnostic::fatal(
                    &entity.name,
                    DiagnosticCode::UnsupportedMethodShape,
                    err.to_string(),
                )
                .with_backend(backend.id());

                return Ok(Err(diag));
            }
            Err(err @ EmitError::Internal(_)) => return Err(err),
        }
    }

    let scaffold = backend.scaffold(entity);
    let generated = unit::assemble(entity, backend.id(), &scaffold, &fragments)?;

    Ok(Ok(generated))
}
