use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// ID that deserializes from a JSON number, string, or null.
/// Xtream providers are inconsistent about `stream_id`/`category_id` types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FlexId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

impl FlexId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlexId::Number(n) => Some(*n),
            FlexId::String(s) => s.parse().ok(),
            FlexId::Null => None,
        }
    }

    /// Canonical string form used for map keys and URL segments
    pub fn key(&self) -> Option<String> {
        match self {
            FlexId::Number(n) => Some(n.to_string()),
            FlexId::String(s) => Some(s.clone()),
            FlexId::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FlexId::Null)
    }
}

impl fmt::Display for FlexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexId::Number(n) => write!(f, "{}", n),
            FlexId::String(s) => write!(f, "{}", s),
            FlexId::Null => write!(f, "null"),
        }
    }
}

impl Serialize for FlexId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FlexId::Number(n) => serializer.serialize_i64(*n),
            FlexId::String(s) => serializer.serialize_str(s),
            FlexId::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FlexId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct FlexIdVisitor;

        impl<'de> Visitor<'de> for FlexIdVisitor {
            type Value = FlexId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, string, or null")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FlexId::Number(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FlexId::Number(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                // Numeric strings collapse to numbers so "12" and 12 compare equal
                match v.parse::<i64>() {
                    Ok(n) => Ok(FlexId::Number(n)),
                    Err(_) => Ok(FlexId::String(v.to_string())),
                }
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexId::Null)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexId::Null)
            }
        }

        deserializer.deserialize_any(FlexIdVisitor)
    }
}
