//! The document assembler.

use std::fmt;
use std::ops::Range;

use sandbench_files::{FileSet, VirtualPath};

use crate::scan::{scan_start_tags, ScannedTag};

/// Fallback document used when the entry path resolves to no content, so the
/// host can still mount an (empty) execution context.
const EMPTY_SHELL: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Preview</title></head><body></body></html>";

/// Instrumentation injected ahead of any exercise code.
///
/// The assembler never reaches for ambient state: the console bridge source,
/// the serialized bootstrap payload (exercise id, seed data, chaos config)
/// and the network mock source are all passed in here by the host.
#[derive(Debug, Clone, Default)]
pub struct Instrumentation {
    /// Console/error bridge source. Always installed first.
    pub console_bridge: String,
    /// Serialized initialization data consumed by an explicit bootstrap call
    /// inside the document. `None` when the exercise has no mock seeding.
    pub bootstrap: Option<String>,
    /// Network mock layer source. Installed after the bootstrap payload so it
    /// can read its configuration, before any exercise fetch call.
    pub mock_layer: String,
}

impl Instrumentation {
    /// The three generated script blocks, in their fixed order.
    fn blocks(&self) -> String {
        let mut out = String::new();
        out.push_str(&inline_script(&self.console_bridge, None));
        out.push('\n');
        if let Some(bootstrap) = &self.bootstrap {
            out.push_str(&inline_script(bootstrap, None));
            out.push('\n');
        }
        out.push_str(&inline_script(&self.mock_layer, None));
        out
    }
}

/// The single HTML string produced by assembly. Immutable once built; a rerun
/// regenerates it in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument(String);

impl AssembledDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AssembledDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn inline_script(code: &str, script_type: Option<&str>) -> String {
    match script_type {
        Some(t) => format!("<script type=\"{}\">\n{}\n</script>", t, code),
        None => format!("<script>\n{}\n</script>", code),
    }
}

fn inline_style(code: &str) -> String {
    format!("<style>\n{}\n</style>", code)
}

/// Append the source-name marker used for stack-trace attribution.
fn with_source_name(code: &str, path: &VirtualPath) -> String {
    format!("{}\n//# sourceURL={}", code, path)
}

/// Assemble `files` into one executable document rooted at `entry`.
///
/// An HTML entry is rewritten in place (scripts and stylesheets inlined,
/// instrumentation injected); any other entry is wrapped in a minimal shell
/// that inlines every stylesheet in the set and runs the entry as a module.
pub fn assemble(
    files: &FileSet,
    entry: &VirtualPath,
    instrumentation: &Instrumentation,
) -> AssembledDocument {
    let document = if entry.is_html() {
        match files.content(entry) {
            Some(html) => rewrite_html(html, files, instrumentation),
            None => {
                log::warn!("entry '{}' has no content; assembling empty shell", entry);
                rewrite_html(EMPTY_SHELL, files, instrumentation)
            }
        }
    } else {
        match files.content(entry) {
            Some(code) => module_shell(code, entry, files, instrumentation),
            None => {
                log::warn!("entry '{}' has no content; assembling empty shell", entry);
                rewrite_html(EMPTY_SHELL, files, instrumentation)
            }
        }
    };

    AssembledDocument(document)
}

/// Resolve a script/link reference against the file set. References that do
/// not normalize (e.g. parent traversal) or name no file resolve to `None`
/// and the tag is left untouched, assumed to be a real external asset.
fn resolve(reference: &str, files: &FileSet) -> Option<(VirtualPath, String)> {
    let path = VirtualPath::parse(reference).ok()?;
    let content = files.content(&path)?.to_string();
    Some((path, content))
}

/// One pending span replacement.
struct Splice {
    span: Range<usize>,
    replacement: String,
}

fn apply_splices(source: &str, mut splices: Vec<Splice>) -> String {
    splices.sort_by_key(|s| s.span.start);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for splice in splices {
        out.push_str(&source[cursor..splice.span.start]);
        out.push_str(&splice.replacement);
        cursor = splice.span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Inline known scripts and stylesheets, then inject the instrumentation
/// blocks immediately after `<head>`, else after `<body>`, else prepended.
fn rewrite_html(html: &str, files: &FileSet, instrumentation: &Instrumentation) -> String {
    let mut splices = Vec::new();

    for tag in scan_start_tags(html) {
        match tag.name.as_str() {
            "script" => {
                if let Some(splice) = inline_script_tag(&tag, files) {
                    splices.push(splice);
                }
            }
            "link" => {
                if let Some(splice) = inline_link_tag(&tag, files) {
                    splices.push(splice);
                }
            }
            _ => {}
        }
    }

    let inlined = apply_splices(html, splices);
    inject_blocks(&inlined, instrumentation)
}

fn inline_script_tag(tag: &ScannedTag, files: &FileSet) -> Option<Splice> {
    let src = tag.attribute("src")?;
    // Replacing just the start tag would orphan the closing tag.
    tag.close.as_ref()?;
    let (path, content) = resolve(src, files)?;
    let script_type = tag.attribute("type").unwrap_or("module");
    Some(Splice {
        span: tag.element_span(),
        replacement: inline_script(&with_source_name(&content, &path), Some(script_type)),
    })
}

fn inline_link_tag(tag: &ScannedTag, files: &FileSet) -> Option<Splice> {
    if !tag
        .attribute("rel")
        .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
    {
        return None;
    }
    let href = tag.attribute("href")?;
    let (_, content) = resolve(href, files)?;
    Some(Splice {
        span: tag.span.clone(),
        replacement: inline_style(&content),
    })
}

fn inject_blocks(html: &str, instrumentation: &Instrumentation) -> String {
    let blocks = instrumentation.blocks();
    let tags = scan_start_tags(html);

    let insert_after = tags
        .iter()
        .find(|t| t.name == "head")
        .or_else(|| tags.iter().find(|t| t.name == "body"))
        .map(|t| t.span.end);

    match insert_after {
        Some(at) => format!("{}\n{}\n{}", &html[..at], blocks, &html[at..]),
        None => format!("{}\n{}", blocks, html),
    }
}

/// Minimal shell for a bare-script entry: one root container, every
/// stylesheet in the set inlined, the entry running as a module.
fn module_shell(
    code: &str,
    entry: &VirtualPath,
    files: &FileSet,
    instrumentation: &Instrumentation,
) -> String {
    let styles = files
        .iter()
        .filter(|r| r.path.is_css())
        .map(|r| inline_style(&r.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"UTF-8\" />\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
            "<title>Preview</title>\n",
            "{blocks}\n",
            "{styles}\n",
            "</head>\n",
            "<body>\n",
            "<div id=\"app\"></div>\n",
            "{entry}\n",
            "</body>\n",
            "</html>"
        ),
        blocks = instrumentation.blocks(),
        styles = styles,
        entry = inline_script(&with_source_name(code, entry), Some("module")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbench_files::FileRecord;

    fn path(s: &str) -> VirtualPath {
        VirtualPath::parse(s).unwrap()
    }

    fn instrumentation() -> Instrumentation {
        Instrumentation {
            console_bridge: "/* console bridge */".to_string(),
            bootstrap: Some("/* bootstrap */".to_string()),
            mock_layer: "/* mock layer */".to_string(),
        }
    }

    fn exercise_files() -> FileSet {
        FileSet::from_seed(vec![
            FileRecord::new(
                path("/index.html"),
                concat!(
                    "<!DOCTYPE html><html><head><title>Products</title>\n",
                    "<link rel=\"stylesheet\" href=\"/styles.css\">\n",
                    "</head><body>\n",
                    "<ul id=\"product-list\"></ul>\n",
                    "<script type=\"module\" src=\"/main.js\"></script>\n",
                    "</body></html>"
                ),
            ),
            FileRecord::new(path("/main.js"), "console.log('loaded');"),
            FileRecord::new(path("/styles.css"), "body { margin: 0; }"),
        ])
    }

    #[test]
    fn assembly_is_idempotent() {
        let files = exercise_files();
        let instr = instrumentation();
        let first = assemble(&files, &path("/index.html"), &instr);
        let second = assemble(&files, &path("/index.html"), &instr);
        assert_eq!(first, second);
    }

    #[test]
    fn inlines_known_scripts_and_styles() {
        let doc = assemble(&exercise_files(), &path("/index.html"), &instrumentation());
        let html = doc.as_str();

        assert!(!html.contains("src=\"/main.js\""));
        assert!(!html.contains("href=\"/styles.css\""));
        assert!(html.contains("console.log('loaded');"));
        assert!(html.contains("//# sourceURL=/main.js"));
        assert!(html.contains("body { margin: 0; }"));
        // The inlined script keeps its declared type.
        assert!(html.contains("<script type=\"module\">"));
    }

    #[test]
    fn unknown_references_are_left_untouched() {
        let files = FileSet::from_seed(vec![FileRecord::new(
            path("/index.html"),
            concat!(
                "<html><head></head><body>",
                "<script src=\"https://cdn.example/lib.js\"></script>",
                "<link rel=\"stylesheet\" href=\"/missing.css\">",
                "<script src=\"../outside.js\"></script>",
                "</body></html>"
            ),
        )]);
        let doc = assemble(&files, &path("/index.html"), &instrumentation());
        let html = doc.as_str();

        assert!(html.contains("src=\"https://cdn.example/lib.js\""));
        assert!(html.contains("href=\"/missing.css\""));
        assert!(html.contains("src=\"../outside.js\""));
    }

    #[test]
    fn bridge_installs_before_any_exercise_script() {
        let doc = assemble(&exercise_files(), &path("/index.html"), &instrumentation());
        let html = doc.as_str();

        let bridge_at = html.find("/* console bridge */").unwrap();
        let bootstrap_at = html.find("/* bootstrap */").unwrap();
        let mock_at = html.find("/* mock layer */").unwrap();
        let app_at = html.find("console.log('loaded');").unwrap();

        assert!(bridge_at < bootstrap_at);
        assert!(bootstrap_at < mock_at);
        assert!(mock_at < app_at);
    }

    #[test]
    fn injection_falls_back_to_body_then_prepend() {
        let files = FileSet::from_seed(vec![FileRecord::new(
            path("/index.html"),
            "<body><p>no head</p></body>",
        )]);
        let doc = assemble(&files, &path("/index.html"), &instrumentation());
        let html = doc.as_str();
        let body_at = html.find("<body>").unwrap();
        let bridge_at = html.find("/* console bridge */").unwrap();
        assert!(body_at < bridge_at);
        assert!(bridge_at < html.find("<p>no head</p>").unwrap());

        let files = FileSet::from_seed(vec![FileRecord::new(path("/index.html"), "<p>bare</p>")]);
        let doc = assemble(&files, &path("/index.html"), &instrumentation());
        assert!(doc.as_str().starts_with("<script>"));
    }

    #[test]
    fn js_entry_gets_module_shell() {
        let files = FileSet::from_seed(vec![
            FileRecord::new(path("/main.js"), "document.querySelector('#app');"),
            FileRecord::new(path("/styles.css"), ".app { color: red; }"),
        ]);
        let doc = assemble(&files, &path("/main.js"), &instrumentation());
        let html = doc.as_str();

        assert!(html.contains("<div id=\"app\"></div>"));
        assert!(html.contains(".app { color: red; }"));
        assert!(html.contains("document.querySelector('#app');"));
        assert!(html.contains("//# sourceURL=/main.js"));
        // Instrumentation sits in the head, before the body script.
        assert!(html.find("/* mock layer */").unwrap() < html.find("sourceURL=/main.js").unwrap());
    }

    #[test]
    fn missing_entry_yields_empty_shell() {
        let files = FileSet::from_seed(vec![]);
        let doc = assemble(&files, &path("/index.html"), &instrumentation());
        assert!(doc.as_str().contains("<title>Preview</title>"));
        assert!(doc.as_str().contains("/* console bridge */"));

        let doc_js = assemble(&files, &path("/main.js"), &instrumentation());
        assert!(doc_js.as_str().contains("<title>Preview</title>"));
    }

    #[test]
    fn bootstrap_block_is_optional() {
        let instr = Instrumentation {
            console_bridge: "/* console bridge */".to_string(),
            bootstrap: None,
            mock_layer: "/* mock layer */".to_string(),
        };
        let doc = assemble(&exercise_files(), &path("/index.html"), &instr);
        assert!(!doc.as_str().contains("/* bootstrap */"));
        assert!(doc.as_str().contains("/* mock layer */"));
    }
}
