//! # Flickrview Explorer
//!
//! Builds an input form for any Flickr API method at request time and
//! dispatches it generically.
//!
//! The accepted parameters of a method are unknown until the remote
//! reflection call answers, so the explorer works in three steps:
//!
//! - **`descriptor`**: fetch and parse the method descriptor
//! - **`form`**: build one text field per argument, validate submissions
//! - **`invoke`**: dispatch the validated arguments to the remote method
//!
//! [`Explorer`] drives the steps as a small state machine
//! ([`ExplorerState`]). All remote access goes through the
//! [`RemoteEndpoint`] trait, implemented for [`flickrview_api::FlickrClient`].

mod descriptor;
mod error;
mod form;
mod invoke;
mod remote;
mod session;

pub use descriptor::{REFLECTION_METHOD, fetch_descriptor, parse_method_info};
pub use error::ExplorerError;
pub use form::{CREDENTIAL_ARGUMENT, REQUIRED_FIELD_MESSAGE, SubmittedArguments, ValidationError, build_form, prefill, validate};
pub use invoke::invoke;
pub use remote::{RemoteEndpoint, RemoteError};
pub use session::{Explorer, ExplorerState};
