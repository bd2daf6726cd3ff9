//! Client trait and implementations for the vTM configuration API.
//!
//! [`Client`] is the capability the reconciler consumes: fetch one object
//! by name, upsert a full object, delete an object. [`http::HttpClient`]
//! talks to a real traffic manager.
//!
//! # Testing
//!
//! Use [`MockClient`] for tests without a traffic manager. It stores every
//! written document and echoes it back on read, unchanged:
//!
//! ```
//! use stingray::client::{Client, MockClient};
//! use stingray::{ConfigResource, Pool};
//!
//! let mock = MockClient::new();
//! let mut pool = Pool::named("web");
//! pool.properties.basic.note = Some("frontend".to_string());
//! mock.set(&pool).unwrap();
//!
//! let fetched: Pool = mock.get("web").unwrap();
//! assert_eq!(fetched, pool);
//! assert!(mock.get::<Pool>("missing").unwrap_err().is_not_found());
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::ConfigResource;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Blocking access to configuration objects of any [`ConfigResource`] kind.
///
/// A failed call returns an [`Error`] that keeps the HTTP status, so
/// `get` callers detect a deleted object with [`Error::is_not_found`].
pub trait Client: Send + Sync {
    /// Fetch the object called `name`.
    fn get<R: ConfigResource>(&self, name: &str) -> Result<R>;

    /// Create or replace the object, returning the stored document.
    fn set<R: ConfigResource>(&self, resource: &R) -> Result<R>;

    /// Delete the object, returning the response status.
    fn delete<R: ConfigResource>(&self, resource: &R) -> Result<u16>;
}

/// REST operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Set,
    Delete,
}

/// A document written through [`MockClient::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub collection: String,
    pub name: String,
    pub body: Value,
}

type StoreHook = Arc<dyn Fn(&str, &mut Value) + Send + Sync>;

/// In-memory traffic manager for tests.
///
/// Documents are kept as JSON per collection and name. Clones share the
/// same store.
#[derive(Clone, Default)]
pub struct MockClient {
    objects: Arc<Mutex<HashMap<(String, String), Value>>>,
    writes: Arc<Mutex<Vec<RecordedWrite>>>,
    failures: Arc<Mutex<HashMap<Operation, Option<u16>>>>,
    on_store: Arc<Mutex<Option<StoreHook>>>,
}

impl MockClient {
    /// Create a new empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object as if it had been configured elsewhere.
    pub fn insert<R: ConfigResource>(&self, resource: &R) {
        let body = serde_json::to_value(resource).expect("resource serializes to JSON");
        self.insert_raw(R::COLLECTION, resource.name(), body);
    }

    /// Seed a raw document, bypassing the typed model.
    pub fn insert_raw(&self, collection: &str, name: &str, body: Value) {
        let mut objects = self.objects.lock().unwrap();
        objects.insert((collection.to_string(), name.to_string()), body);
    }

    /// Remove an object as if it had been deleted elsewhere.
    pub fn remove(&self, collection: &str, name: &str) -> Option<Value> {
        let mut objects = self.objects.lock().unwrap();
        objects.remove(&(collection.to_string(), name.to_string()))
    }

    /// Stored document, if any.
    #[must_use]
    pub fn document(&self, collection: &str, name: &str) -> Option<Value> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(&(collection.to_string(), name.to_string()))
            .cloned()
    }

    /// Whether an object of kind `R` named `name` exists.
    #[must_use]
    pub fn contains<R: ConfigResource>(&self, name: &str) -> bool {
        self.document(R::COLLECTION, name).is_some()
    }

    /// Every document written so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    /// The most recent written document.
    #[must_use]
    pub fn last_write(&self) -> Option<RecordedWrite> {
        self.writes.lock().unwrap().last().cloned()
    }

    /// Make every `op` call fail with the given HTTP status.
    pub fn fail_with_status(&self, op: Operation, status: u16) {
        self.failures.lock().unwrap().insert(op, Some(status));
    }

    /// Make every `op` call fail as if the server were unreachable.
    pub fn fail_unreachable(&self, op: Operation) {
        self.failures.lock().unwrap().insert(op, None);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Rewrite every stored document before it is kept, e.g. to fill in
    /// attributes the traffic manager would populate itself.
    pub fn on_store(&self, hook: impl Fn(&str, &mut Value) + Send + Sync + 'static) {
        *self.on_store.lock().unwrap() = Some(Arc::new(hook));
    }

    fn check(&self, op: Operation) -> Result<()> {
        match self.failures.lock().unwrap().get(&op) {
            None => Ok(()),
            Some(Some(status)) => Err(Error::status(*status)),
            Some(None) => Err(Error::http("connection refused", None)),
        }
    }
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClient")
            .field("objects", &self.objects.lock().unwrap().len())
            .field("writes", &self.writes.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl Client for MockClient {
    fn get<R: ConfigResource>(&self, name: &str) -> Result<R> {
        self.check(Operation::Get)?;
        let body = self
            .document(R::COLLECTION, name)
            .ok_or_else(|| Error::status(404))?;

        let mut resource: R = serde_json::from_value(body)?;
        resource.set_name(name.to_string());
        Ok(resource)
    }

    fn set<R: ConfigResource>(&self, resource: &R) -> Result<R> {
        self.check(Operation::Set)?;
        let body = serde_json::to_value(resource)?;
        self.writes.lock().unwrap().push(RecordedWrite {
            collection: R::COLLECTION.to_string(),
            name: resource.name().to_string(),
            body: body.clone(),
        });

        let mut stored = body;
        if let Some(hook) = self.on_store.lock().unwrap().as_ref() {
            hook(R::COLLECTION, &mut stored);
        }
        self.insert_raw(R::COLLECTION, resource.name(), stored.clone());

        let mut echoed: R = serde_json::from_value(stored)?;
        echoed.set_name(resource.name().to_string());
        Ok(echoed)
    }

    fn delete<R: ConfigResource>(&self, resource: &R) -> Result<u16> {
        self.check(Operation::Delete)?;
        match self.remove(R::COLLECTION, resource.name()) {
            Some(_) => Ok(204),
            None => Err(Error::status(404)),
        }
    }
}
