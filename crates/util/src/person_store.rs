//! Persistence for cached [`Person`] records.
//!
//! The store abstracts the local record cache used by the people views. A
//! JSON-backed implementation keeps records in a single file, mirroring the
//! config file conventions (tilde expansion, config directory fallback); an
//! in-memory variant backs tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use dirs_next::config_dir;
use flickrview_types::Person;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::PEOPLE_PATH_ENV;
use crate::expand_tilde;

/// Default filename for the persisted person cache.
pub const PEOPLE_FILE_NAME: &str = "people.json";

/// Errors surfaced by person store operations.
#[derive(Debug, Error)]
pub enum PersonStoreError {
    #[error("person cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("person cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shared trait implemented by person cache backends.
pub trait PersonStore: Send + Sync {
    /// Retrieve the cached record for a Flickr NSID.
    fn get(&self, flickr_id: &str) -> Result<Option<Person>, PersonStoreError>;

    /// Insert or replace a record; `updated_at` is stamped with the current time.
    fn upsert(&self, person: Person) -> Result<Person, PersonStoreError>;

    /// Drop a record, returning whether one existed.
    fn remove(&self, flickr_id: &str) -> Result<bool, PersonStoreError>;
}

#[derive(Default, Serialize, Deserialize)]
struct PeopleFile {
    people: IndexMap<String, Person>,
}

impl PeopleFile {
    fn upsert(&mut self, mut person: Person) -> Person {
        person.updated_at = Utc::now();
        self.people.insert(person.flickr_id.clone(), person.clone());
        person
    }
}

/// JSON-backed person store persisted on disk.
pub struct JsonPersonStore {
    path: PathBuf,
    people: Mutex<PeopleFile>,
}

impl JsonPersonStore {
    /// Open the store at `path`, or at the default location when omitted.
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, PersonStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde(&path.to_string_lossy()),
            None => default_people_path(),
        };
        let file = load_people_file(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            people: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, file: &PeopleFile) -> Result<(), PersonStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PersonStore for JsonPersonStore {
    fn get(&self, flickr_id: &str) -> Result<Option<Person>, PersonStoreError> {
        let people = self.people.lock().expect("person cache lock poisoned");
        Ok(people.people.get(flickr_id).cloned())
    }

    fn upsert(&self, person: Person) -> Result<Person, PersonStoreError> {
        let mut people = self.people.lock().expect("person cache lock poisoned");
        let stored = people.upsert(person);
        self.save_locked(&people)?;
        Ok(stored)
    }

    fn remove(&self, flickr_id: &str) -> Result<bool, PersonStoreError> {
        let mut people = self.people.lock().expect("person cache lock poisoned");
        let removed = people.people.shift_remove(flickr_id).is_some();
        if removed {
            self.save_locked(&people)?;
        }
        Ok(removed)
    }
}

/// In-memory person store primarily used for unit testing.
#[derive(Default)]
pub struct InMemoryPersonStore {
    people: Mutex<PeopleFile>,
}

impl InMemoryPersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record verbatim, keeping its `updated_at`.
    pub fn seed(&self, person: Person) {
        let mut people = self.people.lock().expect("person cache lock poisoned");
        people.people.insert(person.flickr_id.clone(), person);
    }
}

impl PersonStore for InMemoryPersonStore {
    fn get(&self, flickr_id: &str) -> Result<Option<Person>, PersonStoreError> {
        let people = self.people.lock().expect("person cache lock poisoned");
        Ok(people.people.get(flickr_id).cloned())
    }

    fn upsert(&self, person: Person) -> Result<Person, PersonStoreError> {
        let mut people = self.people.lock().expect("person cache lock poisoned");
        Ok(people.upsert(person))
    }

    fn remove(&self, flickr_id: &str) -> Result<bool, PersonStoreError> {
        let mut people = self.people.lock().expect("person cache lock poisoned");
        Ok(people.people.shift_remove(flickr_id).is_some())
    }
}

fn default_people_path() -> PathBuf {
    if let Ok(path) = env::var(PEOPLE_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flickrview")
        .join(PEOPLE_FILE_NAME)
}

fn load_people_file(path: &Path) -> Result<PeopleFile, PersonStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<PeopleFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!("Failed to parse person cache at {}: {}", path.display(), error);
                Ok(PeopleFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PeopleFile::default()),
        Err(error) => Err(PersonStoreError::Io(error)),
    }
}
