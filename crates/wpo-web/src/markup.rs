//! Locating and rewriting resource-reference elements in page markup.
//!
//! The scanner works on the raw text of a page fragment. It finds `script`
//! and `link` elements outside HTML comments, reads their attributes and
//! decides which ones may be merged. Rewriting swaps the first mergeable
//! element for a reference to the merged artifact and deletes the rest,
//! leaving every other byte of the page where it was.

use crate::{OptimizeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use wpo_types::{ResourceKind, ResourceReference};

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid regex"));

static SCRIPT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script((?:[\s/](?:[^>"']|"[^"]*"|'[^']*')*)?)>"#).expect("Invalid regex")
});

static SCRIPT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</script\s*>").expect("Invalid regex"));

static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link((?:[\s/](?:[^>"']|"[^"]*"|'[^']*')*)?)>"#).expect("Invalid regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("Invalid regex")
});

/// Attribute marking an element as excluded from optimization.
const OPT_OUT_ATTRIBUTE: &str = "noopt";

/// A resource-reference element found in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag {
    /// Byte range of the whole element, closing tag included.
    pub range: Range<usize>,
    /// The reference the element carries.
    pub reference: ResourceReference,
    /// True if a script element has inline content.
    pub inline: bool,
    /// True if the element will be folded into the merged artifact.
    pub eligible: bool,
}

/// Finds mergeable elements and rewrites markup around them.
#[derive(Debug, Clone, Default)]
pub struct TagScanner {
    exclude: Vec<String>,
}

impl TagScanner {
    /// Creates a scanner skipping references that contain any of `exclude`.
    pub fn new(exclude: Vec<String>) -> Self {
        Self { exclude }
    }

    /// Returns true if `id` matches an exclusion keyword.
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude.iter().any(|keyword| id.contains(keyword.as_str()))
    }

    /// Returns every element of `kind` in document order.
    ///
    /// Fails if a `script` element is never closed.
    pub fn scan(&self, kind: ResourceKind, markup: &str) -> Result<Vec<ScannedTag>> {
        let comments: Vec<Range<usize>> = COMMENT.find_iter(markup).map(|m| m.range()).collect();
        let in_comment = |at: usize| comments.iter().any(|r| r.contains(&at));

        let mut tags = Vec::new();
        match kind {
            ResourceKind::Script => {
                let mut pos = 0;
                while let Some(caps) = SCRIPT_OPEN.captures_at(markup, pos) {
                    let (Some(open), Some(attrs)) = (caps.get(0), caps.get(1)) else {
                        break;
                    };
                    if in_comment(open.start()) {
                        pos = open.end();
                        continue;
                    }

                    let attrs = attrs.as_str();
                    let (end, inline) = if attrs.trim_end().ends_with('/') {
                        (open.end(), false)
                    } else {
                        let close = SCRIPT_CLOSE.find_at(markup, open.end()).ok_or_else(|| {
                            OptimizeError::Markup(format!(
                                "unterminated <script> element at byte {}",
                                open.start()
                            ))
                        })?;
                        let body = &markup[open.end()..close.start()];
                        (close.end(), !body.trim().is_empty())
                    };

                    tags.push(self.tag(kind, open.start()..end, attrs, inline));
                    pos = end;
                }
            }
            ResourceKind::Style => {
                for caps in LINK.captures_iter(markup) {
                    let (Some(whole), Some(attrs)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    if in_comment(whole.start()) {
                        continue;
                    }
                    tags.push(self.tag(kind, whole.range(), attrs.as_str(), false));
                }
            }
        }
        Ok(tags)
    }

    fn tag(&self, kind: ResourceKind, range: Range<usize>, attrs: &str, inline: bool) -> ScannedTag {
        let attributes = parse_attributes(attrs);
        let get = |name: &str| {
            attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        let mut reference = ResourceReference::new(get(kind.source_attribute()).unwrap_or_default());
        if let Some(media_type) = get("type") {
            reference = reference.with_media_type(media_type);
        }
        if let Some(rel) = get("rel") {
            reference = reference.with_rel(rel);
        }
        if get(OPT_OUT_ATTRIBUTE).is_some_and(|v| v.trim().eq_ignore_ascii_case("true")) {
            reference = reference.opted_out();
        }

        let eligible =
            !inline && reference.is_mergeable_as(kind) && !self.is_excluded(&reference.id);
        ScannedTag {
            range,
            reference,
            inline,
            eligible,
        }
    }

    /// Replaces the first eligible tag with a merged element pointing at
    /// `src` and removes the other eligible tags.
    ///
    /// `tags` must come from [`TagScanner::scan`] over the same `markup`.
    pub fn rewrite(kind: ResourceKind, markup: &str, tags: &[ScannedTag], src: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut cursor = 0;
        let mut placed = false;
        for tag in tags.iter().filter(|t| t.eligible) {
            out.push_str(&markup[cursor..tag.range.start]);
            if !placed {
                out.push_str(&merged_element(kind, src));
                placed = true;
            }
            cursor = tag.range.end;
        }
        out.push_str(&markup[cursor..]);
        out
    }
}

/// Renders the element referencing a merged artifact.
pub fn merged_element(kind: ResourceKind, src: &str) -> String {
    let mut element = format!("<{}", kind.tag_name());
    for (name, value) in kind.merged_attributes() {
        element.push_str(&format!(" {name}=\"{value}\""));
    }
    element.push_str(&format!(
        " {}=\"{}\">",
        kind.source_attribute(),
        escape_attribute(src)
    ));
    if kind == ResourceKind::Script {
        element.push_str("</script>");
    }
    element
}

/// Parses an attribute list. Names are lowercased; the first occurrence of
/// a name wins.
fn parse_attributes(attrs: &str) -> Vec<(String, String)> {
    let mut parsed: Vec<(String, String)> = Vec::new();
    for caps in ATTRIBUTE.captures_iter(attrs) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        if parsed.iter().any(|(n, _)| *n == name) {
            continue;
        }
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| unescape_attribute(m.as_str()))
            .unwrap_or_default();
        parsed.push((name, value));
    }
    parsed
}

fn unescape_attribute(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(tags: &[ScannedTag]) -> Vec<(&str, bool)> {
        tags.iter()
            .map(|t| (t.reference.id.as_str(), t.eligible))
            .collect()
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" type="text/javascript" SRC='/js/a.js' defer data-x=1 src="/b.js""#);
        assert_eq!(
            attrs,
            vec![
                ("type".to_string(), "text/javascript".to_string()),
                ("src".to_string(), "/js/a.js".to_string()),
                ("defer".to_string(), String::new()),
                ("data-x".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(
            parse_attributes(r#"href="/a.css?x=1&amp;y=2""#)[0].1,
            "/a.css?x=1&y=2"
        );
    }

    #[test]
    fn test_scan_scripts() {
        let markup = r#"
<script type="text/javascript" src="/js/a.js"></script>
<script src="/js/b.js"></script>
<script type="text/template" src="/js/t.html"></script>
<script>var inline = 1;</script>
<script src="/js/c.js" noOpt="TRUE"></script>
<script type="application/javascript" src="/js/d.js" />
"#;
        let tags = TagScanner::default().scan(ResourceKind::Script, markup).unwrap();
        assert_eq!(
            ids(&tags),
            vec![
                ("/js/a.js", true),
                ("/js/b.js", true),
                ("/js/t.html", false),
                ("", false),
                ("/js/c.js", false),
                ("/js/d.js", true),
            ]
        );
        assert!(tags[3].inline);
    }

    #[test]
    fn test_inline_script_with_src_is_not_eligible() {
        let markup = r#"<script src="/js/a.js">init();</script>"#;
        let tags = TagScanner::default().scan(ResourceKind::Script, markup).unwrap();
        assert!(tags[0].inline);
        assert!(!tags[0].eligible);
    }

    #[test]
    fn test_script_body_is_not_rescanned() {
        let markup = r#"<script>document.write('<script src="/js/x.js"></scr' + 'ipt>');</script>"#;
        let tags = TagScanner::default().scan(ResourceKind::Script, markup).unwrap();
        assert_eq!(tags.len(), 1);
        assert!(!tags[0].eligible);
    }

    #[test]
    fn test_commented_out_elements_ignored() {
        let markup = r#"<!-- <script src="/js/old.js"></script> --><script src="/js/a.js"></script>"#;
        let tags = TagScanner::default().scan(ResourceKind::Script, markup).unwrap();
        assert_eq!(ids(&tags), vec![("/js/a.js", true)]);
    }

    #[test]
    fn test_custom_elements_sharing_a_prefix_ignored() {
        let markup = r#"<script-loader src="/js/x.js"></script-loader><script src="/js/a.js"></script>
<link-preview href="/style/x.css"><LINK REL="stylesheet" HREF="/style/a.css"/>"#;
        let scanner = TagScanner::default();
        assert_eq!(
            ids(&scanner.scan(ResourceKind::Script, markup).unwrap()),
            vec![("/js/a.js", true)]
        );
        assert_eq!(
            ids(&scanner.scan(ResourceKind::Style, markup).unwrap()),
            vec![("/style/a.css", true)]
        );
    }

    #[test]
    fn test_unterminated_script_is_an_error() {
        let err = TagScanner::default()
            .scan(ResourceKind::Script, r#"<script src="/js/a.js">"#)
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Markup(_)));
    }

    #[test]
    fn test_scan_links() {
        let markup = r#"<link rel="stylesheet" type="text/css" href="/style/a.css">
<link rel="icon" href="/favicon.ico">
<link rel="stylesheet" href="/style/b.css" />
<link type="text/css" href="/vendor/c.css">"#;
        let scanner = TagScanner::new(vec!["vendor".to_string()]);
        let tags = scanner.scan(ResourceKind::Style, markup).unwrap();
        assert_eq!(
            ids(&tags),
            vec![
                ("/style/a.css", true),
                ("/favicon.ico", false),
                ("/style/b.css", true),
                ("/vendor/c.css", false),
            ]
        );
    }

    #[test]
    fn test_rewrite_replaces_first_and_removes_rest() {
        let markup = "<p>x</p><script src=\"/js/a.js\"></script><script src=\"/js/lib/vendor.js\"></script><script src=\"/js/b.js\"></script>";
        let scanner = TagScanner::new(vec!["vendor".to_string()]);
        let tags = scanner.scan(ResourceKind::Script, markup).unwrap();

        let out = TagScanner::rewrite(ResourceKind::Script, markup, &tags, "/app/js/Opt_static_x.js");

        assert_eq!(
            out,
            "<p>x</p><script type=\"text/javascript\" src=\"/app/js/Opt_static_x.js\"></script><script src=\"/js/lib/vendor.js\"></script>"
        );
    }

    #[test]
    fn test_rewrite_without_eligible_tags_is_identity() {
        let markup = "<script>var a;</script>";
        let tags = TagScanner::default().scan(ResourceKind::Script, markup).unwrap();
        assert_eq!(TagScanner::rewrite(ResourceKind::Script, markup, &tags, "/x.js"), markup);
    }

    #[test]
    fn test_merged_element_shape() {
        assert_eq!(
            merged_element(ResourceKind::Style, "/style/Opt_static_x.css"),
            r#"<link type="text/css" rel="stylesheet" href="/style/Opt_static_x.css">"#
        );
        assert_eq!(
            merged_element(ResourceKind::Script, "/a.js?v=\"1\""),
            r#"<script type="text/javascript" src="/a.js?v=&quot;1&quot;"></script>"#
        );
    }
}
