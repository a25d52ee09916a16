use crate::{
    node::Entity,
    validate::{Diagnostic, DiagnosticCode},
};

/// `unique` on an auto-generated non-key field adds nothing: the store
/// already hands out distinct values. Advisory only.
pub fn check_redundant_constraints(entity: &Entity, diags: &mut Vec<Diagnostic>) {
    for field in entity.fields.iter() {
        if field.constraints.unique
            && field.constraints.auto_generated
            && !entity.is_key(&field.name)
        {
            diags.push(
                Diagnostic::advisory(
                    &entity.name,
                    DiagnosticCode::RedundantConstraint,
                    format!(
                        "field '{}' is auto-generated; the unique constraint is redundant",
                        field.name
                    ),
                )
                .with_field(&field.name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Field, FieldConstraints, FieldList};
    use crate::types::{AbstractType, ScalarType};

    #[test]
    fn redundant_constraint_is_advisory() {
        let entity = Entity {
            name: "User".to_string(),
            fields: FieldList::new(vec![
                Field {
                    name: "id".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Long),
                    nullable: false,
                    constraints: FieldConstraints::default(),
                },
                Field {
                    name: "serial".to_string(),
                    ty: AbstractType::Scalar(ScalarType::Long),
                    nullable: false,
                    constraints: FieldConstraints {
                        unique: true,
                        auto_generated: true,
                        max_length: None,
                    },
                },
            ]),
            key_fields: vec!["id".to_string()],
        };

        let mut diags = Vec::new();
        check_redundant_constraints(&entity, &mut diags);

        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_fatal());
        assert_eq!(diags[0].code, DiagnosticCode::RedundantConstraint);
    }
}
