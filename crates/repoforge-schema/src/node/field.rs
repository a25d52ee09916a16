use crate::types::AbstractType;
use serde::Serialize;

///
/// FieldList
///
/// Ordered field sequence; declaration order is load-bearing for
/// generated output, so this never sorts.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    #[must_use]
    pub const fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

///
/// Field
///

#[derive(Clone, Debug, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: AbstractType,
    pub nullable: bool,
    pub constraints: FieldConstraints,
}

///
/// FieldConstraints
///
/// The per-field constraint set: unique, maxLength(n), autoGenerated.
///

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct FieldConstraints {
    pub unique: bool,
    pub auto_generated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}
