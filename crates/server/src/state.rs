use std::sync::Arc;

use flickrview_explorer::{Explorer, RemoteEndpoint};
use flickrview_types::Person;
use flickrview_util::{PersonStore, PersonStoreError};
use indexmap::IndexMap;
use serde_json::Value;

use crate::AppError;

/// Shared handler state. Cloned per request; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub explorer: Explorer,
    pub remote: Arc<dyn RemoteEndpoint>,
    pub people: Arc<dyn PersonStore>,
    /// NSID of the account the access token belongs to, if any.
    pub authenticated_user: Option<String>,
}

impl AppState {
    pub fn new(remote: Arc<dyn RemoteEndpoint>, people: Arc<dyn PersonStore>, authenticated_user: Option<String>) -> Self {
        Self {
            explorer: Explorer::new(remote.clone()),
            remote,
            people,
            authenticated_user,
        }
    }

    /// Call a Flickr method with literal arguments. `what` names the
    /// subject in a not-found message.
    pub async fn call(&self, method: &str, arguments: &[(&str, &str)], what: &str) -> Result<Value, AppError> {
        let arguments: IndexMap<String, String> = arguments
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.remote
            .dispatch(method, &arguments)
            .await
            .map_err(|error| AppError::from_remote(error, what))
    }

    /// Cached record for `nsid`, read off the async workers.
    pub async fn cached_person(&self, nsid: &str) -> Result<Option<Person>, AppError> {
        let nsid = nsid.to_string();
        self.with_people(move |people| people.get(&nsid)).await
    }

    /// Store a refreshed record; the file store writes to disk here.
    pub async fn save_person(&self, person: Person) -> Result<Person, AppError> {
        self.with_people(move |people| people.upsert(person)).await
    }

    async fn with_people<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PersonStore) -> Result<T, PersonStoreError> + Send + 'static,
    {
        let people = self.people.clone();
        let value = tokio::task::spawn_blocking(move || f(people.as_ref()))
            .await
            .map_err(|e| AppError::Internal(format!("person store task failed: {e}")))??;
        Ok(value)
    }
}
