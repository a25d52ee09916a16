use serde::Deserialize;

///
/// SchemaDecl
///
/// The raw, serializable entity-description format consumed by the
/// extractor. This is the whole input surface of a generation run: one
/// ordered entity list, each with an ordered field list.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SchemaDecl {
    pub entities: Vec<EntityDecl>,
}

///
/// EntityDecl
///

#[derive(Clone, Debug, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

///
/// FieldDecl
///
/// One declared field. `ty` stays a raw token here; the extractor parses
/// it so unknown types surface as extraction errors, not serde errors.
///

#[derive(Clone, Debug, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub key: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub auto_generated: bool,

    #[serde(default)]
    pub max_length: Option<u32>,
}

///
/// TESTS
///
