use crate::{
    node::Entity,
    validate::{Diagnostic, DiagnosticCode},
};

/// A nullable key field can never satisfy key equality; fatal for the
/// whole entity, every backend.
pub fn check_nullable_keys(entity: &Entity, diags: &mut Vec<Diagnostic>) {
    for field in entity.key_columns() {
        if field.nullable {
            diags.push(
                Diagnostic::fatal(
                    &entity.name,
                    DiagnosticCode::NullableKeyField,
                    format!("key field '{}' must not be nullable", field.name),
                )
                .with_field(&field.name),
            );
        }
    }
}

/// A composite key mixing store-generated and caller-supplied parts has
/// no coherent insert: the store mints the generated part, so the
/// caller-supplied parts would vanish from the key it writes. Generated
/// keys must be the entire key. Fatal for the whole entity.
pub fn check_generated_keys(entity: &Entity, diags: &mut Vec<Diagnostic>) {
    let keys = entity.key_columns();
    if keys.len() < 2 {
        return;
    }

    for field in keys {
        if field.constraints.auto_generated {
            diags.push(
                Diagnostic::fatal(
                    &entity.name,
                    DiagnosticCode::PartiallyGeneratedKey,
                    format!(
                        "composite key field '{}' is auto-generated; a generated key must be the whole key",
                        field.name
                    ),
                )
                .with_field(&field.name),
            );
        }
    }
}
