//! Root-relative virtual paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors related to virtual path parsing and normalization.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VirtualPathError {
    #[error("empty virtual path")]
    Empty,

    #[error("parent traversal is not supported in '{path}'")]
    ParentTraversal { path: String },

    #[error("invalid virtual path '{path}': {message}")]
    Invalid { path: String, message: String },
}

/// A normalized root-relative path inside an exercise's virtual file set.
///
/// All paths render with a single leading `/` (`/main.js`, `/styles/app.css`).
/// Bare and `./`-prefixed references normalize to root-relative, matching how
/// script and link references are resolved during assembly:
///
/// ```rust
/// use sandbench_files::VirtualPath;
///
/// let a = VirtualPath::parse("/main.js").unwrap();
/// let b = VirtualPath::parse("main.js").unwrap();
/// let c = VirtualPath::parse("./main.js").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// ```
///
/// Parent traversal (`..`) is rejected outright rather than resolved; the
/// assembly contract treats such references as unresolvable.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualPath {
    normalized: String,
}

impl VirtualPath {
    /// Parse and normalize a path reference.
    ///
    /// - A leading `/` or `./` is stripped; empty components collapse.
    /// - The result is stored (and displayed) with one leading `/`.
    /// - `..` anywhere in the path is an error.
    pub fn parse(s: &str) -> Result<Self, VirtualPathError> {
        let trimmed = s.strip_prefix("./").unwrap_or(s);
        let components: Vec<&str> = trimmed.split('/').filter(|c| !c.is_empty()).collect();

        if components.is_empty() {
            return Err(VirtualPathError::Empty);
        }
        if components.iter().any(|c| *c == "." || *c == "..") {
            return Err(VirtualPathError::ParentTraversal {
                path: s.to_string(),
            });
        }
        if let Some(bad) = components.iter().find(|c| c.contains(char::is_whitespace)) {
            return Err(VirtualPathError::Invalid {
                path: s.to_string(),
                message: format!("component '{}' contains whitespace", bad),
            });
        }

        Ok(VirtualPath {
            normalized: format!("/{}", components.join("/")),
        })
    }

    /// The normalized root-relative form, always starting with `/`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// Whether this path selects the HTML-entry assembly path.
    pub fn is_html(&self) -> bool {
        let lower = self.normalized.to_ascii_lowercase();
        lower.ends_with(".html") || lower.ends_with(".htm")
    }

    /// Whether this path names a stylesheet.
    pub fn is_css(&self) -> bool {
        self.normalized.to_ascii_lowercase().ends_with(".css")
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

impl TryFrom<String> for VirtualPath {
    type Error = VirtualPathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        VirtualPath::parse(&s)
    }
}

impl From<VirtualPath> for String {
    fn from(p: VirtualPath) -> String {
        p.normalized
    }
}
