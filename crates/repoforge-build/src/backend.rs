use proc_macro2::{Ident, TokenStream};
use repoforge_schema::{
    node::Entity,
    plan::{MethodKind, MethodPlan},
    registry::Capability,
};
use thiserror::Error as ThisError;

///
/// CodeFragment
///
/// One backend-emitted method body, still in token form. Fragments are
/// assembled into a source unit in planner emission order.
///

#[derive(Clone, Debug)]
pub struct CodeFragment {
    pub method: String,

    /// `None` for the storage bootstrap fragment, which is not a
    /// planned repository operation.
    pub kind: Option<MethodKind>,

    pub tokens: TokenStream,
}

impl CodeFragment {
    #[must_use]
    pub fn new(method: impl Into<String>, kind: MethodKind, tokens: TokenStream) -> Self {
        Self {
            method: method.into(),
            kind: Some(kind),
            tokens,
        }
    }

    #[must_use]
    pub fn setup(tokens: TokenStream) -> Self {
        Self {
            method: "setup".to_string(),
            kind: None,
            tokens,
        }
    }
}

///
/// UnitScaffold
///
/// The backend-specific boilerplate the code emitter wraps around the
/// fragments: imports, repository struct name, and the client contract
/// the generated type is generic over.
///

#[derive(Clone, Debug)]
pub struct UnitScaffold {
    pub struct_ident: Ident,
    pub client_field: Ident,
    pub client_bound: TokenStream,
    pub imports: TokenStream,
}

///
/// EmitError
///

#[derive(Debug, ThisError)]
pub enum EmitError {
    #[error("backend '{backend}' does not support method shape {kind} planned as '{entity}.{method}'")]
    UnsupportedMethodShape {
        backend: &'static str,
        entity: String,
        method: String,
        kind: MethodKind,
    },

    /// A malformed fragment reached the code emitter. This is a defect
    /// in the pipeline itself, not a user input error, and aborts the
    /// run instead of being scoped away.
    #[error("internal emitter defect: {0}")]
    Internal(String),
}

///
/// Backend
///
/// The capability contract a storage backend implements to participate
/// in generation. The core pipeline is closed over the entity/plan IR
/// and open over backends through this trait.
///

pub trait Backend {
    /// The capability table: backend id, type mapping, supported shapes.
    fn capability(&self) -> &'static Capability;

    /// Backend identifier used in diagnostics and output file names.
    fn id(&self) -> &'static str {
        self.capability().backend
    }

    /// Emit the code fragment for one planned method.
    fn emit(&self, entity: &Entity, plan: &MethodPlan) -> Result<CodeFragment, EmitError>;

    /// Emit the storage bootstrap fragment (table/collection creation).
    fn emit_setup(&self, entity: &Entity) -> Result<CodeFragment, EmitError>;

    /// The boilerplate wrapped around this backend's fragments.
    fn scaffold(&self, entity: &Entity) -> UnitScaffold;

    /// Guard helper: error unless the capability table declares support.
    fn require_shape(&self, entity: &Entity, plan: &MethodPlan) -> Result<(), EmitError> {
        if self.capability().supports(plan.kind) {
            Ok(())
        } else {
            Err(EmitError::UnsupportedMethodShape {
                backend: self.id(),
                entity: entity.name.clone(),
                method: plan.name.clone(),
                kind: plan.kind,
            })
        }
    }
}
