//! Cached per-person Flickr metadata.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Age after which a cached [`Person`] is refreshed from Flickr.
pub const PERSON_STALENESS_HOURS: i64 = 24;

/// Locally cached profile and photo list for one Flickr account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Flickr NSID; unique key of the cache.
    pub flickr_id: String,
    /// Last time the record was written.
    pub updated_at: DateTime<Utc>,
    /// Raw `photos.photo` list from the last refresh.
    #[serde(default = "empty_photos")]
    pub photos: Value,
    /// Raw `person` object from `flickr.people.getInfo`.
    pub info: Value,
}

fn empty_photos() -> Value {
    Value::Array(Vec::new())
}

impl Person {
    pub fn new(flickr_id: impl Into<String>, info: Value, photos: Value) -> Self {
        Self {
            flickr_id: flickr_id.into(),
            updated_at: Utc::now(),
            photos,
            info,
        }
    }

    /// Whether the record is older than the staleness window at `now`.
    pub fn needs_update_at(&self, now: DateTime<Utc>) -> bool {
        self.updated_at < now - Duration::hours(PERSON_STALENESS_HOURS)
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update_at(Utc::now())
    }

    /// Display name from the cached profile, falling back to the NSID.
    pub fn display_name(&self) -> &str {
        ["realname", "username"]
            .iter()
            .filter_map(|key| self.info.get(*key).and_then(|field| field.get("_content")).and_then(Value::as_str))
            .find(|name| !name.trim().is_empty())
            .unwrap_or(self.flickr_id.as_str())
    }
}
