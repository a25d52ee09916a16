use crate::{
    node::Entity,
    registry::Capability,
    validate::{Diagnostic, DiagnosticCode},
};

/// Every field must be representable by the backend's type-mapping
/// table. Fatal, scoped to the entity×backend pair: other backends that
/// do map the type keep generating.
pub fn check_type_support(entity: &Entity, capability: &Capability, diags: &mut Vec<Diagnostic>) {
    for field in entity.fields.iter() {
        if capability.types.native_for(field).is_none() {
            diags.push(
                Diagnostic::fatal(
                    &entity.name,
                    DiagnosticCode::UnsupportedType,
                    format!(
                        "backend '{}' cannot represent type '{}' of field '{}'",
                        capability.backend, field.ty, field.name
                    ),
                )
                .with_field(&field.name)
                .with_backend(capability.backend),
            );
        }
    }
}
