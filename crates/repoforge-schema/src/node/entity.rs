use crate::node::{Field, FieldList};
use serde::Serialize;

///
/// Entity
///
/// One logical record type, immutable once extracted. `key_fields` is a
/// non-empty ordered subset of `fields`; its order drives composite-key
/// equality, document identifier encoding and finder naming.
///

#[derive(Clone, Debug, Serialize)]
pub struct Entity {
    pub name: String,
    pub fields: FieldList,
    pub key_fields: Vec<String>,
}

impl Entity {
    /// Key fields, resolved in key declaration order.
    #[must_use]
    pub fn key_columns(&self) -> Vec<&Field> {
        self.key_fields
            .iter()
            .filter_map(|name| self.fields.get(name))
            .collect()
    }

    /// Fields that are not part of the key, in declaration order.
    #[must_use]
    pub fn non_key_columns(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| !self.is_key(&f.name))
            .collect()
    }

    /// Fields carried by insert parameter/column lists: everything except
    /// auto-generated ones.
    #[must_use]
    pub fn insert_columns(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| !f.constraints.auto_generated)
            .collect()
    }

    #[must_use]
    pub fn is_key(&self, field_name: &str) -> bool {
        self.key_fields.iter().any(|k| k == field_name)
    }

    /// Whether any key field is auto-generated by the store.
    #[must_use]
    pub fn has_generated_key(&self) -> bool {
        self.key_columns()
            .iter()
            .any(|f| f.constraints.auto_generated)
    }
}
