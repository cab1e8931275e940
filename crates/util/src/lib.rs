//! Helpers shared by the Flickrview crates: URL builders for Flickr photo
//! resources, configuration loading, the person cache and text/HTTP
//! utilities.

pub mod config;
pub mod http;
pub mod path_processing;
pub mod person_store;
pub mod photo_urls;
pub mod text_processing;

pub use config::{AppConfig, ConfigError, default_config_path};
pub use path_processing::expand_tilde;
pub use person_store::{InMemoryPersonStore, JsonPersonStore, PersonStore, PersonStoreError};
pub use photo_urls::*;
pub use text_processing::redact_sensitive;
