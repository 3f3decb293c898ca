//! Disk-backed store: one JSON-bearing file per key under a root directory.

use std::{fs, io, path};

use crate::{validate_key, Error, KeyValueStore};

/// A `KeyValueStore` that keeps each key in `<root>/<key>.json`.
///
/// The key grammar (no separators, no leading dot) makes keys safe to use as
/// file names directly. Each `set` rewrites the whole file, which gives the
/// full-overwrite semantics the harness relies on.
pub struct JsonFileStore {
    root: path::PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`. The directory must exist, be a
    /// directory, and be writable.
    pub fn new(root: path::PathBuf) -> Result<JsonFileStore, Error> {
        let attr = fs::metadata(&root).map_err(|error| Error::RootUnusable {
            path: root.display().to_string(),
            message: error.to_string(),
        })?;

        if !attr.is_dir() {
            return Err(Error::RootUnusable {
                path: root.display().to_string(),
                message: "root path must be a directory".to_string(),
            });
        }

        if attr.permissions().readonly() {
            return Err(Error::RootUnusable {
                path: root.display().to_string(),
                message: "root directory must be writable".to_string(),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(JsonFileStore { root }),
            Err(error) => Err(Error::RootUnusable {
                path: root.display().to_string(),
                message: error.to_string(),
            }),
        }
    }

    fn file_path(&self, key: &str) -> Result<path::PathBuf, Error> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let file_path = self.file_path(key)?;
        log::debug!("Reading {}...", file_path.display());

        match fs::read_to_string(&file_path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::Io {
                key: key.to_string(),
                source: error,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let file_path = self.file_path(key)?;
        log::debug!("Writing {}...", file_path.display());

        fs::write(&file_path, value).map_err(|error| Error::Io {
            key: key.to_string(),
            source: error,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        let file_path = self.file_path(key)?;

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Error::Io {
                key: key.to_string(),
                source: error,
            }),
        }
    }
}
