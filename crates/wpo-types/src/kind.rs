//! Resource kinds and their capability table.

use serde::{Deserialize, Serialize};
use std::fmt;

const TEXT_JAVASCRIPT: &str = "text/javascript";
const APPLICATION_JAVASCRIPT: &str = "application/javascript";
const TEXT_CSS: &str = "text/css";

/// The kind of resource an aggregator handles.
///
/// Each variant supplies the shape of the markup element that references it,
/// the media types it accepts, and how its merged artifact is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// JavaScript referenced by `<script src>`.
    Script,
    /// Style sheets referenced by `<link href>`.
    Style,
}

impl ResourceKind {
    /// All kinds, in the order optimizers usually run.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Script, ResourceKind::Style];

    /// Returns the element name that references this kind.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "link",
        }
    }

    /// Returns the attribute holding the resource identifier.
    #[must_use]
    pub const fn source_attribute(self) -> &'static str {
        match self {
            Self::Script => "src",
            Self::Style => "href",
        }
    }

    /// Returns the fixed attributes written on a merged element, in order.
    #[must_use]
    pub const fn merged_attributes(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Script => &[("type", TEXT_JAVASCRIPT)],
            Self::Style => &[("type", TEXT_CSS), ("rel", "stylesheet")],
        }
    }

    /// Returns whether an element with the given `type` and `rel` attributes
    /// references this kind of resource.
    ///
    /// A script without a `type` and a link with `rel="stylesheet"` but no
    /// `type` fall back to the HTML defaults.
    #[must_use]
    pub fn accepts_media_type(self, media_type: Option<&str>, rel: Option<&str>) -> bool {
        let media_type = media_type.map(str::trim);
        match self {
            Self::Script => match media_type {
                None | Some("") => true,
                Some(t) => {
                    t.eq_ignore_ascii_case(TEXT_JAVASCRIPT)
                        || t.eq_ignore_ascii_case(APPLICATION_JAVASCRIPT)
                }
            },
            Self::Style => match media_type {
                None | Some("") => rel
                    .map(str::trim)
                    .is_some_and(|r| r.eq_ignore_ascii_case("stylesheet")),
                Some(t) => t.eq_ignore_ascii_case(TEXT_CSS),
            },
        }
    }

    /// Returns the file extension of merged artifacts, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
        }
    }

    /// Returns the web-root-relative directory merged artifacts go to by default.
    #[must_use]
    pub const fn default_directory(self) -> &'static str {
        match self {
            Self::Script => "/js",
            Self::Style => "/style",
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }

    /// Parses a kind from its name, accepting the extension as an alias.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "script" | "js" => Some(Self::Script),
            "style" | "css" => Some(Self::Style),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_media_types() {
        let kind = ResourceKind::Script;
        assert!(kind.accepts_media_type(Some("text/javascript"), None));
        assert!(kind.accepts_media_type(Some(" Application/JavaScript "), None));
        assert!(kind.accepts_media_type(None, None));
        assert!(!kind.accepts_media_type(Some("text/template"), None));
        assert!(!kind.accepts_media_type(Some("module"), None));
    }

    #[test]
    fn test_style_media_types() {
        let kind = ResourceKind::Style;
        assert!(kind.accepts_media_type(Some("TEXT/CSS"), Some("stylesheet")));
        assert!(kind.accepts_media_type(None, Some("stylesheet")));
        assert!(!kind.accepts_media_type(None, Some("icon")));
        assert!(!kind.accepts_media_type(None, None));
        assert!(!kind.accepts_media_type(Some("text/plain"), Some("stylesheet")));
    }

    #[test]
    fn test_tag_shape() {
        assert_eq!(ResourceKind::Script.tag_name(), "script");
        assert_eq!(ResourceKind::Script.source_attribute(), "src");
        assert_eq!(ResourceKind::Style.tag_name(), "link");
        assert_eq!(ResourceKind::Style.source_attribute(), "href");
        assert_eq!(ResourceKind::Style.merged_attributes().len(), 2);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ResourceKind::parse("JS"), Some(ResourceKind::Script));
        assert_eq!(ResourceKind::parse("style"), Some(ResourceKind::Style));
        assert_eq!(ResourceKind::parse("html"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ResourceKind::Style).unwrap();
        assert_eq!(json, "\"style\"");
    }
}
