pub mod decl;
pub mod extract;
pub mod node;
pub mod plan;
pub mod registry;
pub mod types;
pub mod validate;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for field schema identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

use crate::{extract::ExtractError, plan::PlanError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        node::{Entity, Field, FieldConstraints, FieldList},
        types::{AbstractType, ScalarType},
        validate::{Diagnostic, DiagnosticCode, Severity},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    ExtractError(#[from] ExtractError),

    #[error(transparent)]
    PlanError(#[from] PlanError),
}
