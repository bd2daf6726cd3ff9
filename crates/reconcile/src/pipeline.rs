//! Reconcile pipeline - create-or-update, read and delete for one instance.
//!
//! The pipeline keeps nothing between calls. The caller owns the desired
//! record, the last observed record and the [`Handle`], and hands them in on
//! every call.

use crate::error::{Error, Result};
use crate::kinds::Kind;
use crate::record::Record;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use stingray::Client;

/// Identity of the remote object an instance is bound to.
///
/// Set when a write succeeds. Cleared only when a read finds the object
/// gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle {
    id: Option<String>,
}

impl Handle {
    /// A handle bound to `name`.
    pub fn tracking(name: impl Into<String>) -> Self {
        Self {
            id: Some(name.into()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    fn set(&mut self, name: impl Into<String>) {
        self.id = Some(name.into());
    }

    fn clear(&mut self) {
        self.id = None;
    }
}

/// Runs the per-instance operations against a [`Client`].
pub struct Reconciler<'a, C> {
    client: &'a C,
}

impl<'a, C: Client> Reconciler<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Write a new object and read it back.
    pub fn create<K: Kind>(&self, handle: &mut Handle, desired: &Record) -> Result<Option<Record>> {
        self.write::<K>(handle, desired)
    }

    /// Rewrite an existing object and read it back.
    ///
    /// The object name is immutable; a desired record naming a different
    /// object than the handle is rejected before anything is sent.
    pub fn update<K: Kind>(&self, handle: &mut Handle, desired: &Record) -> Result<Option<Record>> {
        if let (Some(from), Some(to)) = (handle.id(), desired.name())
            && from != to
        {
            return Err(Error::NameChanged {
                kind: K::KIND,
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.write::<K>(handle, desired)
    }

    fn write<K: Kind>(&self, handle: &mut Handle, desired: &Record) -> Result<Option<Record>> {
        let remote = K::table().to_remote(desired)?;
        let name = remote.name().to_string();

        debug!("Writing {} '{}'", K::KIND, name);
        self.client
            .set(&remote)
            .map_err(|source| Error::RemoteWrite {
                kind: K::KIND,
                name: name.clone(),
                source,
            })?;
        info!("Wrote {} '{}'", K::KIND, name);

        handle.set(name);
        self.read::<K>(handle)
    }

    /// Refresh the observed record of the object behind `handle`.
    ///
    /// Returns `None` for an untracked handle. When the object was deleted
    /// out-of-band the handle is cleared and `None` returned; any other
    /// failure leaves the handle as it was.
    pub fn read<K: Kind>(&self, handle: &mut Handle) -> Result<Option<Record>> {
        let Some(name) = handle.id() else {
            return Ok(None);
        };

        match self.fetch::<K>(name)? {
            Some(observed) => Ok(Some(observed)),
            None => {
                warn!("{} '{}' no longer exists, forgetting it", K::KIND, name);
                handle.clear();
                Ok(None)
            }
        }
    }

    /// Fetch one object by name; `None` if the server reports it missing.
    pub fn fetch<K: Kind>(&self, name: &str) -> Result<Option<Record>> {
        debug!("Reading {} '{}'", K::KIND, name);
        match self.client.get::<K>(name) {
            Ok(remote) => K::table().to_observed(&remote).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(source) => Err(Error::RemoteRead {
                kind: K::KIND,
                name: name.to_string(),
                source,
            }),
        }
    }

    /// Delete the object called `name`.
    ///
    /// A missing object is an error. The handle is not touched; the caller
    /// drops the whole instance after a successful delete.
    pub fn delete<K: Kind>(&self, name: &str) -> Result<()> {
        debug!("Deleting {} '{}'", K::KIND, name);
        self.client
            .delete(&K::named(name))
            .map_err(|source| Error::RemoteDelete {
                kind: K::KIND,
                name: name.to_string(),
                source,
            })?;
        info!("Deleted {} '{}'", K::KIND, name);
        Ok(())
    }
}
