use crate::{
    MAX_ENTITY_NAME_LEN, MAX_FIELD_NAME_LEN,
    decl::EntityDecl,
    node::{Entity, Field, FieldConstraints, FieldList},
    types::AbstractType,
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// ExtractError
///
/// Fatal per entity; anything here halts that entity's pipeline before
/// validation. Every variant names the offending entity.
///

#[derive(Debug, ThisError)]
pub enum ExtractError {
    #[error("entity '{entity}': unknown abstract type '{token}' on field '{field}'")]
    UnknownType {
        entity: String,
        field: String,
        token: String,
    },

    #[error("entity '{entity}' declares no fields")]
    NoFields { entity: String },

    #[error("entity '{entity}' declares no key fields")]
    NoKeyFields { entity: String },

    #[error("entity '{entity}': duplicate field name '{field}'")]
    DuplicateField { entity: String, field: String },

    #[error("identifier '{name}' exceeds {max} characters")]
    NameTooLong { name: String, max: usize },
}

/// Turn one raw entity declaration into a normalized `Entity`.
///
/// Pure transformation: declaration order of fields (and of key fields)
/// is preserved exactly, because generated output ordering depends on it.
pub fn extract(decl: &EntityDecl) -> Result<Entity, ExtractError> {
    if decl.name.len() > MAX_ENTITY_NAME_LEN {
        return Err(ExtractError::NameTooLong {
            name: decl.name.clone(),
            max: MAX_ENTITY_NAME_LEN,
        });
    }
    if decl.fields.is_empty() {
        return Err(ExtractError::NoFields {
            entity: decl.name.clone(),
        });
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut fields = Vec::with_capacity(decl.fields.len());
    let mut key_fields = Vec::new();

    for raw in &decl.fields {
        if raw.name.len() > MAX_FIELD_NAME_LEN {
            return Err(ExtractError::NameTooLong {
                name: raw.name.clone(),
                max: MAX_FIELD_NAME_LEN,
            });
        }

        // field names are case-sensitively unique
        if !seen.insert(raw.name.as_str()) {
            return Err(ExtractError::DuplicateField {
                entity: decl.name.clone(),
                field: raw.name.clone(),
            });
        }

        let ty: AbstractType = raw.ty.parse().map_err(|_| ExtractError::UnknownType {
            entity: decl.name.clone(),
            field: raw.name.clone(),
            token: raw.ty.clone(),
        })?;

        fields.push(Field {
            name: raw.name.clone(),
            ty,
            nullable: raw.nullable,
            constraints: FieldConstraints {
                unique: raw.unique,
                auto_generated: raw.auto_generated,
                max_length: raw.max_length,
            },
        });

        if raw.key {
            key_fields.push(raw.name.clone());
        }
    }

    if key_fields.is_empty() {
        return Err(ExtractError::NoKeyFields {
            entity: decl.name.clone(),
        });
    }

    Ok(Entity {
        name: decl.name.clone(),
        fields: FieldList::new(fields),
        key_fields,
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::FieldDecl;

    fn field(name: &str, ty: &str) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            ty: ty.to_string(),
            nullable: false,
            key: false,
            unique: false,
            auto_generated: false,
            max_length: None,
        }
    }

    fn decl(name: &str, fields: Vec<FieldDecl>) -> EntityDecl {
        EntityDecl {
            name: name.to_string(),
            fields,
        }
    }

    #[test]
    fn preserves_declaration_order() {
        let mut id = field("id", "long");
        id.key = true;
        let entity = extract(&decl(
            "Order",
            vec![id, field("zeta", "text"), field("alpha", "text")],
        ))
        .unwrap();

        let names: Vec<_> = entity.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "zeta", "alpha"]);
    }

    #[test]
    fn rejects_unknown_type() {
        let mut id = field("id", "varchar2");
        id.key = true;
        let err = extract(&decl("User", vec![id])).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownType { .. }));
    }

    #[test]
    fn rejects_zero_fields_and_zero_keys() {
        assert!(matches!(
            extract(&decl("User", vec![])).unwrap_err(),
            ExtractError::NoFields { .. }
        ));
        assert!(matches!(
            extract(&decl("User", vec![field("id", "integer")])).unwrap_err(),
            ExtractError::NoKeyFields { .. }
        ));
    }

    #[test]
    fn rejects_duplicate_names_case_sensitively() {
        let mut id = field("id", "integer");
        id.key = true;
        let err = extract(&decl(
            "User",
            vec![id.clone(), field("name", "text"), field("name", "text")],
        ))
        .unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateField { .. }));

        // different case is a different field at this stage
        assert!(extract(&decl("User", vec![id, field("name", "text"), field("Name", "text")])).is_ok());
    }

    #[test]
    fn composite_key_order_follows_declaration() {
        let mut user_id = field("userId", "integer");
        user_id.key = true;
        let mut product_id = field("productId", "integer");
        product_id.key = true;

        let entity = extract(&decl(
            "Order",
            vec![user_id, product_id, field("quantity", "integer")],
        ))
        .unwrap();

        assert_eq!(entity.key_fields, ["userId", "productId"]);
        assert_eq!(entity.non_key_columns()[0].name, "quantity");
    }
}
