//! Photo and group records as returned in Flickr list payloads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A photo entry from a Flickr photo list (`photos.photo[*]`).
///
/// Only the fields needed to build image and page URLs are mandatory.
/// Flickr encodes some numeric fields as strings depending on the method,
/// so `farm` and `views` accept either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub secret: String,
    pub server: String,
    #[serde(deserialize_with = "number_from_any")]
    pub farm: u64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_number_from_any")]
    pub views: Option<u64>,
}

/// A group membership entry (`groups.group[*]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(alias = "nsid")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "optional_number_from_any")]
    pub members: Option<u64>,
    #[serde(default, alias = "pool_count", deserialize_with = "optional_number_from_any")]
    pub photos: Option<u64>,
}

fn parse_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn number_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_number(&value).ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {value}")))
}

fn optional_number_from_any<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}
