//! Shared handle over one underlying store.

use std::sync::{Arc, Mutex};

use crate::{Error, KeyValueStore};

/// A cloneable handle to a single underlying [`KeyValueStore`].
///
/// The session and each execution context's mock backend persist through the
/// same medium; this handle lets them share it without threading lifetimes
/// through every component. Operations lock per call, which is all the
/// "last writer wins" policy needs.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<dyn KeyValueStore>>,
}

impl SharedStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.lock().map_err(|_| Error::LockPoisoned)?.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.inner
            .lock()
            .map_err(|_| Error::LockPoisoned)?
            .set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.inner
            .lock()
            .map_err(|_| Error::LockPoisoned)?
            .remove(key)
    }
}
