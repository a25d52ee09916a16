//! Semantic validation: cross-field invariants checked against the
//! enabled backend capability set. All rules run independently and the
//! findings are collected; nothing here is fail-fast within one entity.

mod constraint;
mod keys;
mod support;

use crate::{extract::ExtractError, node::Entity, plan::PlanError, registry::Capability};
use derive_more::Display;
use serde::Serialize;

///
/// Severity
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Severity {
    Fatal,
    Advisory,
}

///
/// DiagnosticCode
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum DiagnosticCode {
    AmbiguousMethodSignature,
    DuplicateEntity,
    DuplicateField,
    InvalidIdentifier,
    NameTooLong,
    NoFields,
    NoKeyFields,
    NullableKeyField,
    PartiallyGeneratedKey,
    RedundantConstraint,
    UnknownType,
    UnsupportedMethodShape,
    UnsupportedType,
}

///
/// Diagnostic
///
/// One validation finding. A fatal diagnostic scoped to a backend
/// (`backend: Some(_)`) blocks only that entity×backend pair; with no
/// backend scope it blocks the whole entity.
///

#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub entity: String,
    pub code: DiagnosticCode,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
}

impl Diagnostic {
    #[must_use]
    pub fn fatal(entity: &str, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            entity: entity.to_string(),
            code,
            message: message.into(),
            field: None,
            backend: None,
        }
    }

    #[must_use]
    pub fn advisory(entity: &str, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Advisory,
            ..Self::fatal(entity, code, message)
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }

    /// Whether this finding blocks generation for the whole entity.
    #[must_use]
    pub const fn blocks_entity(&self) -> bool {
        self.is_fatal() && self.backend.is_none()
    }

    /// Whether this finding blocks generation for one entity×backend pair.
    #[must_use]
    pub fn blocks_backend(&self, backend: &str) -> bool {
        self.is_fatal() && (self.backend.is_none() || self.backend == Some(backend))
    }

    /// Map an extraction failure into the diagnostics channel.
    #[must_use]
    pub fn from_extract(entity: &str, err: &ExtractError) -> Self {
        let code = match err {
            ExtractError::UnknownType { .. } => DiagnosticCode::UnknownType,
            ExtractError::NoFields { .. } => DiagnosticCode::NoFields,
            ExtractError::NoKeyFields { .. } => DiagnosticCode::NoKeyFields,
            ExtractError::DuplicateField { .. } => DiagnosticCode::DuplicateField,
            ExtractError::NameTooLong { .. } => DiagnosticCode::NameTooLong,
        };

        Self::fatal(entity, code, err.to_string())
    }

    /// Map a planning failure into the diagnostics channel.
    #[must_use]
    pub fn from_plan(entity: &str, err: &PlanError) -> Self {
        let PlanError::AmbiguousMethodSignature { .. } = err;

        Self::fatal(entity, DiagnosticCode::AmbiguousMethodSignature, err.to_string())
    }
}

/// Validate one entity against every enabled backend capability.
///
/// Returns all findings; an empty list means the entity generates for
/// every enabled backend.
#[must_use]
pub fn validate_entity(entity: &Entity, capabilities: &[Capability]) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    keys::check_nullable_keys(entity, &mut diags);
    keys::check_generated_keys(entity, &mut diags);
    constraint::check_redundant_constraints(entity, &mut diags);
    for capability in capabilities {
        support::check_type_support(entity, capability, &mut diags);
    }

    diags
}
