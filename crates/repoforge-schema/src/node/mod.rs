mod entity;
mod field;

pub use entity::Entity;
pub use field::{Field, FieldConstraints, FieldList};
