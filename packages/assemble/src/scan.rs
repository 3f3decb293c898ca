//! Start-tag scanner with byte spans.
//!
//! A simplified HTML tokenizer that walks the source once and reports every
//! start tag with its attributes and byte range, so callers can rewrite the
//! document by splicing spans. Comments, doctypes and end tags are skipped;
//! the raw text of `<script>` and `<style>` elements is never tokenized, and
//! their closing tag span is reported alongside the start tag.

use std::ops::Range;

/// An attribute captured from a start tag. Names are lowercased; values are
/// unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAttribute {
    pub name: String,
    pub value: String,
}

/// A start tag found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag {
    /// Lowercased tag name.
    pub name: String,
    pub attributes: Vec<ScannedAttribute>,
    /// Byte range of the start tag itself, `<` through `>` inclusive.
    pub span: Range<usize>,
    /// For raw-text elements (`script`, `style`): byte range of the matching
    /// closing tag, when one exists.
    pub close: Option<Range<usize>>,
}

impl ScannedTag {
    /// Get an attribute value by (lowercase) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// The byte range covering the whole element: the start tag alone, or
    /// start tag through closing tag for raw-text elements.
    pub fn element_span(&self) -> Range<usize> {
        match &self.close {
            Some(close) => self.span.start..close.end,
            None => self.span.clone(),
        }
    }
}

fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Scan `html` and return every start tag in source order.
pub fn scan_start_tags(html: &str) -> Vec<ScannedTag> {
    // ASCII-lowercased copy for case-insensitive searches; byte offsets are
    // identical because ASCII case folding never changes encoding lengths.
    let lower = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        if lower[i..].starts_with("<!--") {
            i = match lower[i + 4..].find("-->") {
                Some(j) => i + 4 + j + 3,
                None => bytes.len(),
            };
            continue;
        }

        match bytes.get(i + 1) {
            // Doctype, processing instruction, end tag: skip to '>'.
            Some(b'!') | Some(b'?') | Some(b'/') => {
                i = match lower[i + 1..].find('>') {
                    Some(j) => i + 1 + j + 1,
                    None => bytes.len(),
                };
                continue;
            }
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => {
                i += 1;
                continue;
            }
        }

        match parse_start_tag(html, i) {
            Some(mut tag) => {
                let mut resume = tag.span.end;
                if is_raw_text(&tag.name) {
                    if let Some(close) = find_closing_tag(&lower, tag.span.end, &tag.name) {
                        resume = close.end;
                        tag.close = Some(close);
                    }
                }
                i = resume;
                tags.push(tag);
            }
            // Unterminated tag: nothing more to scan.
            None => break,
        }
    }

    tags
}

/// Find the closing `</name ...>` tag at or after `from`.
fn find_closing_tag(lower: &str, from: usize, name: &str) -> Option<Range<usize>> {
    let needle = format!("</{}", name);
    let start = from + lower[from..].find(&needle)?;
    let end = start + lower[start..].find('>')? + 1;
    Some(start..end)
}

/// Parse one start tag beginning at `start` (which holds `<`). Returns `None`
/// if the tag never terminates.
fn parse_start_tag(html: &str, start: usize) -> Option<ScannedTag> {
    let bytes = html.as_bytes();
    let mut j = start + 1;

    while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'-') {
        j += 1;
    }
    let name = html[start + 1..j].to_ascii_lowercase();
    let mut attributes = Vec::new();

    loop {
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        match bytes.get(j) {
            None => return None,
            Some(b'>') => {
                return Some(ScannedTag {
                    name,
                    attributes,
                    span: start..j + 1,
                    close: None,
                });
            }
            Some(b'/') => {
                j += 1;
                continue;
            }
            _ => {}
        }

        // Attribute name.
        let name_start = j;
        while j < bytes.len()
            && !bytes[j].is_ascii_whitespace()
            && !matches!(bytes[j], b'=' | b'>' | b'/')
        {
            j += 1;
        }
        if j == name_start {
            // Stray character; step over it rather than loop forever.
            j += 1;
            continue;
        }
        let attr_name = html[name_start..j].to_ascii_lowercase();

        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j) {
                Some(&q @ (b'"' | b'\'')) => {
                    let value_start = j + 1;
                    let rel = html[value_start..].find(q as char)?;
                    let value = html[value_start..value_start + rel].to_string();
                    j = value_start + rel + 1;
                    value
                }
                _ => {
                    let value_start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    html[value_start..j].to_string()
                }
            }
        } else {
            String::new()
        };

        attributes.push(ScannedAttribute {
            name: attr_name,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tags_with_spans() {
        let html = r#"<html><head><title>t</title></head><body><div id="app"></div></body></html>"#;
        let tags = scan_start_tags(html);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["html", "head", "title", "body", "div"]);

        let div = tags.iter().find(|t| t.name == "div").unwrap();
        assert_eq!(&html[div.span.clone()], r#"<div id="app">"#);
        assert_eq!(div.attribute("id"), Some("app"));
    }

    #[test]
    fn attribute_order_and_quoting_do_not_matter() {
        let variants = [
            r#"<script src="/main.js" type="module"></script>"#,
            r#"<script type='module' src='/main.js'></script>"#,
            r#"<script type=module src=/main.js></script>"#,
            "<script  type=\"module\"\n  src=\"/main.js\" ></script>",
        ];
        for html in variants {
            let tags = scan_start_tags(html);
            assert_eq!(tags.len(), 1, "in {:?}", html);
            assert_eq!(tags[0].attribute("src"), Some("/main.js"), "in {:?}", html);
            assert_eq!(tags[0].attribute("type"), Some("module"), "in {:?}", html);
        }
    }

    #[test]
    fn script_raw_text_is_not_tokenized() {
        let html = r#"<script>if (a < b) { document.write("</div>"); }</script><p>after</p>"#;
        let tags = scan_start_tags(html);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["script", "p"]);

        let script = &tags[0];
        let close = script.close.clone().unwrap();
        assert_eq!(&html[close], "</script>");
        assert!(html[script.element_span()].ends_with("</script>"));
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let html = "<!doctype html><!-- <script src=\"/x.js\"></script> --><p>hi</p>";
        let tags = scan_start_tags(html);
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["p"]);
    }

    #[test]
    fn boolean_attributes_and_self_closing() {
        let tags = scan_start_tags(r#"<input disabled type="text" /><link rel=stylesheet href="/a.css">"#);
        assert_eq!(tags[0].attribute("disabled"), Some(""));
        assert_eq!(tags[1].attribute("rel"), Some("stylesheet"));
        assert_eq!(tags[1].attribute("href"), Some("/a.css"));
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        let tags = scan_start_tags("<p>ok</p><div class=");
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["p"]);
    }

    #[test]
    fn unclosed_script_keeps_start_tag_only() {
        let tags = scan_start_tags("<script>let x = 1;");
        assert_eq!(tags.len(), 1);
        assert!(tags[0].close.is_none());
    }
}
