use crate::{
    node::Field,
    plan::MethodKind,
    types::{AbstractType, ScalarType},
};

///
/// TypeMapping
///
/// Static per-backend tables mapping abstract types to native type
/// tokens. Constructed as constants, passed by reference, never mutated
/// after a run starts.
///

#[derive(Clone, Copy, Debug)]
pub struct TypeMapping {
    pub scalars: &'static [(ScalarType, &'static str)],

    /// Token base used instead of the plain scalar token when a
    /// maxLength(n) constraint is present, e.g. `varchar` -> `varchar(n)`.
    pub sized_scalars: &'static [(ScalarType, &'static str)],

    /// Whether collection-of types have a native representation.
    pub lists: bool,

    /// Whether nested entity references have a native representation.
    pub refs: bool,
}

impl TypeMapping {
    /// Resolve the backend-native type token for a field, or `None` when
    /// the backend cannot represent it.
    #[must_use]
    pub fn native_for(&self, field: &Field) -> Option<String> {
        self.native(&field.ty, field.constraints.max_length)
    }

    #[must_use]
    pub fn native(&self, ty: &AbstractType, max_length: Option<u32>) -> Option<String> {
        match ty {
            AbstractType::Scalar(kind) => {
                if let Some(len) = max_length
                    && let Some(base) = lookup(self.sized_scalars, *kind)
                {
                    return Some(format!("{base}({len})"));
                }
                lookup(self.scalars, *kind).map(str::to_string)
            }
            AbstractType::List(item) => {
                if !self.lists {
                    return None;
                }
                let inner = self.native(item, None)?;
                Some(format!("array<{inner}>"))
            }
            AbstractType::Ref(_) => self.refs.then(|| "document".to_string()),
        }
    }
}

fn lookup(table: &'static [(ScalarType, &'static str)], kind: ScalarType) -> Option<&'static str> {
    table
        .iter()
        .find(|(entry, _)| *entry == kind)
        .map(|(_, token)| *token)
}

///
/// Capability
///
/// The contract instance one backend registers with the pipeline: its
/// identifier, its type-mapping table and the method shapes it supports.
///

#[derive(Clone, Copy, Debug)]
pub struct Capability {
    pub backend: &'static str,
    pub types: TypeMapping,
    pub shapes: &'static [MethodKind],
}

impl Capability {
    #[must_use]
    pub fn supports(&self, kind: MethodKind) -> bool {
        self.shapes.contains(&kind)
    }
}

///
/// SQL
///
/// Relational mapping. Collections and nested references have no
/// relational representation here, so they surface as unsupported types
/// rather than being silently flattened.
///

pub const SQL: Capability = Capability {
    backend: "sql",
    types: TypeMapping {
        scalars: &[
            (ScalarType::Bool, "boolean"),
            (ScalarType::Bytes, "varbinary"),
            (ScalarType::Double, "double precision"),
            (ScalarType::Float, "real"),
            (ScalarType::Int, "int"),
            (ScalarType::Long, "bigint"),
            (ScalarType::Text, "text"),
            (ScalarType::Timestamp, "timestamp"),
            (ScalarType::Uuid, "uuid"),
        ],
        sized_scalars: &[
            (ScalarType::Bytes, "varbinary"),
            (ScalarType::Text, "varchar"),
        ],
        lists: false,
        refs: false,
    },
    shapes: MethodKind::ALL,
};

///
/// DOCUMENT
///

pub const DOCUMENT: Capability = Capability {
    backend: "document",
    types: TypeMapping {
        scalars: &[
            (ScalarType::Bool, "bool"),
            (ScalarType::Bytes, "binary"),
            (ScalarType::Double, "double"),
            (ScalarType::Float, "double"),
            (ScalarType::GeoPoint, "geo_point"),
            (ScalarType::Int, "int32"),
            (ScalarType::Long, "int64"),
            (ScalarType::Text, "string"),
            (ScalarType::Timestamp, "date"),
            (ScalarType::Uuid, "uuid"),
        ],
        sized_scalars: &[],
        lists: true,
        refs: true,
    },
    shapes: MethodKind::ALL,
};

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_rejects_geo_point_document_accepts_it() {
        let geo = AbstractType::Scalar(ScalarType::GeoPoint);

        assert_eq!(SQL.types.native(&geo, None), None);
        assert_eq!(
            DOCUMENT.types.native(&geo, None),
            Some("geo_point".to_string())
        );
    }

    #[test]
    fn max_length_parameterizes_sql_text() {
        let text = AbstractType::Scalar(ScalarType::Text);

        assert_eq!(SQL.types.native(&text, None), Some("text".to_string()));
        assert_eq!(
            SQL.types.native(&text, Some(320)),
            Some("varchar(320)".to_string())
        );
    }

    #[test]
    fn composites_map_only_on_document() {
        let tags = AbstractType::List(Box::new(AbstractType::Scalar(ScalarType::Text)));
        let owner = AbstractType::Ref("User".to_string());

        assert_eq!(SQL.types.native(&tags, None), None);
        assert_eq!(SQL.types.native(&owner, None), None);
        assert_eq!(
            DOCUMENT.types.native(&tags, None),
            Some("array<string>".to_string())
        );
        assert_eq!(
            DOCUMENT.types.native(&owner, None),
            Some("document".to_string())
        );
    }
}
