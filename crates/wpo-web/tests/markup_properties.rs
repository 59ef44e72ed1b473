//! Property tests for tag scanning and rewriting.

use proptest::prelude::*;
use wpo_types::ResourceKind;
use wpo_web::{merged_element, TagScanner};

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Script(String),
    Vendor(String),
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop_oneof![
        "[a-z >/=\"\n]{0,16}".prop_map(Piece::Text),
        "[a-z]{1,8}".prop_map(|n| Piece::Script(format!("/js/{}.js", n))),
        "[a-z]{1,8}".prop_map(|n| Piece::Vendor(format!("/js/vendor/{}.js", n))),
    ]
}

fn render(pieces: &[Piece], keep_eligible: bool) -> String {
    pieces
        .iter()
        .map(|p| match p {
            Piece::Text(t) => t.clone(),
            Piece::Script(src) if keep_eligible => format!(r#"<script src="{}"></script>"#, src),
            Piece::Script(_) => String::new(),
            Piece::Vendor(src) => format!(r#"<script src="{}"></script>"#, src),
        })
        .collect()
}

proptest! {
    /// Property: rewriting leaves exactly one merged element and keeps everything else in place.
    #[test]
    fn prop_rewrite_keeps_ineligible_content(pieces in prop::collection::vec(piece_strategy(), 0..24)) {
        let scanner = TagScanner::new(vec!["vendor".to_string()]);
        let markup = render(&pieces, true);
        let tags = scanner.scan(ResourceKind::Script, &markup).unwrap();

        let eligible = pieces.iter().filter(|p| matches!(p, Piece::Script(_))).count();
        prop_assert_eq!(tags.iter().filter(|t| t.eligible).count(), eligible);

        let rewritten = TagScanner::rewrite(ResourceKind::Script, &markup, &tags, "/merged.js");
        let merged = merged_element(ResourceKind::Script, "/merged.js");

        if eligible == 0 {
            prop_assert_eq!(&rewritten, &markup);
        } else {
            prop_assert_eq!(rewritten.matches(&merged).count(), 1);
            prop_assert_eq!(rewritten.replacen(&merged, "", 1), render(&pieces, false));
        }
    }

    /// Property: a rewritten page scans back to the merged element plus the excluded tags.
    #[test]
    fn prop_rewritten_page_rescans_cleanly(pieces in prop::collection::vec(piece_strategy(), 0..24)) {
        let scanner = TagScanner::new(vec!["vendor".to_string()]);
        let markup = render(&pieces, true);
        let tags = scanner.scan(ResourceKind::Script, &markup).unwrap();
        let rewritten = TagScanner::rewrite(ResourceKind::Script, &markup, &tags, "/merged.js");

        let rescanned = scanner.scan(ResourceKind::Script, &rewritten).unwrap();
        let vendors: Vec<&str> = pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Vendor(src) => Some(src.as_str()),
                _ => None,
            })
            .collect();
        let excluded: Vec<&str> = rescanned
            .iter()
            .filter(|t| !t.eligible)
            .map(|t| t.reference.id.as_str())
            .collect();
        prop_assert_eq!(excluded, vendors);
        prop_assert!(rescanned.iter().filter(|t| t.eligible).count() <= 1);
    }
}
