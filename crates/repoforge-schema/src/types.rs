use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// ScalarType
///
/// The closed set of backend-neutral scalar field types. Token forms are
/// the spellings accepted by the entity description file.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ScalarType {
    Bool,
    Bytes,
    Double,
    Float,
    GeoPoint,
    Int,
    Long,
    Text,
    Timestamp,
    Uuid,
}

impl ScalarType {
    /// Every scalar kind, in token order.
    pub const ALL: &'static [Self] = &[
        Self::Bool,
        Self::Bytes,
        Self::Double,
        Self::Float,
        Self::GeoPoint,
        Self::Int,
        Self::Long,
        Self::Text,
        Self::Timestamp,
        Self::Uuid,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Bytes => "bytes",
            Self::Double => "double",
            Self::Float => "float",
            Self::GeoPoint => "geo-point",
            Self::Int => "integer",
            Self::Long => "long",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ScalarType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.token() == s)
            .ok_or_else(|| ParseTypeError::UnknownToken(s.to_string()))
    }
}

///
/// AbstractType
///
/// A scalar, a homogeneous collection, or a reference to another entity.
/// Token syntax: `integer`, `list<text>`, `ref<Order>`, nested as needed.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AbstractType {
    Scalar(ScalarType),
    List(Box<AbstractType>),
    Ref(String),
}

impl AbstractType {
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// The referenced entity name, if this is a reference type.
    #[must_use]
    pub fn ref_target(&self) -> Option<&str> {
        match self {
            Self::Ref(name) => Some(name),
            Self::Scalar(_) | Self::List(_) => None,
        }
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => kind.fmt(f),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Ref(name) => write!(f, "ref<{name}>"),
        }
    }
}

impl FromStr for AbstractType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(inner) = bracketed(s, "list") {
            return Ok(Self::List(Box::new(inner.parse()?)));
        }
        if let Some(inner) = bracketed(s, "ref") {
            if inner.is_empty() {
                return Err(ParseTypeError::EmptyRef);
            }
            return Ok(Self::Ref(inner.to_string()));
        }

        s.parse::<ScalarType>().map(Self::Scalar)
    }
}

// Strip `head<` and a trailing `>`, returning the inner token.
fn bracketed<'a>(s: &'a str, head: &str) -> Option<&'a str> {
    s.strip_prefix(head)
        .and_then(|rest| rest.strip_prefix('<'))
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
}

///
/// ParseTypeError
///

#[derive(Debug, ThisError)]
pub enum ParseTypeError {
    #[error("unknown abstract type token '{0}'")]
    UnknownToken(String),

    #[error("ref<> requires a target entity name")]
    EmptyRef,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_tokens_round_trip() {
        for kind in ScalarType::ALL {
            let parsed: ScalarType = kind.token().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn parses_nested_composites() {
        let ty: AbstractType = "list<list<integer>>".parse().unwrap();
        assert_eq!(ty.to_string(), "list<list<integer>>");

        let ty: AbstractType = "ref<Order>".parse().unwrap();
        assert_eq!(ty.ref_target(), Some("Order"));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!("varchar".parse::<AbstractType>().is_err());
        assert!("list<varchar>".parse::<AbstractType>().is_err());
        assert!("ref<>".parse::<AbstractType>().is_err());
    }
}
