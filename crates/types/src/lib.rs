//! Shared type definitions for Flickrview.
//!
//! The explorer types describe a remote operation discovered at runtime
//! ([`MethodDescriptor`]) and the form synthesized from it ([`Form`]). The
//! photo and person types mirror the subset of Flickr payloads the web
//! views consume.

pub mod auth;
pub mod explorer;
pub mod person;
pub mod photo;

pub use auth::{AccessToken, Credentials, Permission, RequestToken};
pub use explorer::{ArgumentSpec, FieldKind, Form, FormField, MethodDescriptor};
pub use person::{PERSON_STALENESS_HOURS, Person};
pub use photo::{Group, Photo};
