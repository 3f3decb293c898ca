//! Exercise manifests: the curriculum-side interface.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use sandbench_files::{FileRecord, FileSet, VirtualPath};
use sandbench_mockapi::{ChaosConfig, CollectionRules, MockDb};

use crate::Error;

/// One file in a manifest, in the curriculum data format
/// (`{"code": "...", "readOnly": true}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    pub code: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub active: bool,
}

/// Mock-network section: seed data, chaos parameters and per-collection
/// shape rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MockSection {
    pub api_seed: Option<MockDb>,
    pub mock_net: Option<ChaosConfig>,
    pub collections: BTreeMap<String, CollectionRules>,
}

/// Which output panel a workbench shows first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PanelView {
    #[default]
    Preview,
    Console,
}

/// Initial workbench layout preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SandboxPrefs {
    pub default_panel: PanelView,
    pub show_right_panel: Option<bool>,
    pub show_explorer: Option<bool>,
}

/// One exercise, as produced by the (out-of-scope) curriculum system.
///
/// File paths are a JSON object in the manifest; they deserialize into an
/// ordered map, so seeding order (and with it the "first non-hidden file is
/// active" fallback) is deterministic across loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseManifest {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub files: BTreeMap<VirtualPath, ManifestFile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<VirtualPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock: Option<MockSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxPrefs>,
}

impl ExerciseManifest {
    /// Parse a manifest from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(Error::Manifest)
    }

    /// The entry path used as the root for document assembly.
    pub fn entry(&self) -> VirtualPath {
        lazy_static! {
            static ref DEFAULT_ENTRY: VirtualPath = VirtualPath::parse("/main.js").unwrap();
        }
        self.entry.clone().unwrap_or_else(|| DEFAULT_ENTRY.clone())
    }

    /// Build the seed file set.
    pub fn seed_files(&self) -> FileSet {
        FileSet::from_seed(self.files.iter().map(|(path, file)| FileRecord {
            path: path.clone(),
            content: file.code.clone(),
            read_only: file.read_only,
            hidden: file.hidden,
            active: file.active,
        }))
    }

    pub fn chaos(&self) -> ChaosConfig {
        self.mock
            .as_ref()
            .and_then(|m| m.mock_net.clone())
            .unwrap_or_default()
    }

    pub fn api_seed(&self) -> Option<MockDb> {
        self.mock.as_ref().and_then(|m| m.api_seed.clone())
    }

    pub fn collection_rules(&self) -> BTreeMap<String, CollectionRules> {
        self.mock
            .as_ref()
            .map(|m| m.collections.clone())
            .unwrap_or_default()
    }

    pub fn default_panel(&self) -> PanelView {
        self.sandbox
            .as_ref()
            .map(|s| s.default_panel)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "id": "intro-fetch-001",
        "title": "Fetch & Render (GET)",
        "files": {
            "/index.html": {
                "code": "<!DOCTYPE html><html><head></head><body><ul id=\"product-list\"></ul><script type=\"module\" src=\"/main.js\"></script></body></html>",
                "readOnly": true
            },
            "/main.js": { "code": "loadProducts();" }
        },
        "entry": "/index.html",
        "mock": {
            "apiSeed": {
                "products": [
                    { "id": 1, "name": "Colombian Coffee", "price": 1299 }
                ]
            },
            "mockNet": { "slowMs": 0, "failOnFirst": false }
        },
        "sandbox": { "defaultPanel": "console" }
    }"#;

    #[test]
    fn parses_the_curriculum_format() {
        let manifest = ExerciseManifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.id, "intro-fetch-001");
        assert_eq!(manifest.entry().as_str(), "/index.html");
        assert_eq!(manifest.chaos().slow_ms, 0);
        assert_eq!(manifest.default_panel(), PanelView::Console);

        let seed = manifest.api_seed().unwrap();
        assert_eq!(seed.records("products").len(), 1);
    }

    #[test]
    fn seed_files_carry_flags() {
        let manifest = ExerciseManifest::from_json(MANIFEST).unwrap();
        let files = manifest.seed_files();
        assert_eq!(files.len(), 2);

        let index = files
            .get(&VirtualPath::parse("/index.html").unwrap())
            .unwrap();
        assert!(index.read_only);
        // No file marked active: the first non-hidden record wins.
        assert_eq!(files.active_file().unwrap().path.as_str(), "/index.html");
    }

    #[test]
    fn defaults_for_optional_sections() {
        let manifest =
            ExerciseManifest::from_json(r#"{ "id": "bare", "files": { "/main.js": { "code": "" } } }"#)
                .unwrap();
        assert_eq!(manifest.entry().as_str(), "/main.js");
        assert!(manifest.api_seed().is_none());
        // Unconfigured chaos keeps the reference default latency.
        assert_eq!(manifest.chaos().slow_ms, 300);
        assert_eq!(manifest.default_panel(), PanelView::Preview);
    }

    #[test]
    fn bad_manifests_are_a_typed_error() {
        assert!(matches!(
            ExerciseManifest::from_json("{"),
            Err(Error::Manifest(_))
        ));
    }
}
