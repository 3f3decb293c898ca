//! Storage key validation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::Error;

/// Check that `key` is a usable storage key.
///
/// Keys are dotted identifiers like `edits.intro-fetch-001` or
/// `mockdb.JS.AS.FET-001`: ASCII letters, digits, `.`, `_` and `-`, starting
/// with a letter or digit. The same grammar works as a file name for
/// [`crate::JsonFileStore`], so validation lives here rather than in each
/// implementation.
pub fn validate_key(key: &str) -> Result<(), Error> {
    lazy_static! {
        static ref STORAGE_KEY: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    }

    if STORAGE_KEY.is_match(key) {
        Ok(())
    } else {
        Err(Error::InvalidKey {
            key: key.to_string(),
            message: "keys are dotted identifiers of letters, digits, '.', '_' and '-'"
                .to_string(),
        })
    }
}
