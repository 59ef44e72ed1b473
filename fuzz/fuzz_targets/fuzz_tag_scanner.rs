#![no_main]

use libfuzzer_sys::fuzz_target;
use wpo_types::ResourceKind;
use wpo_web::TagScanner;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let scanner = TagScanner::new(vec!["vendor".to_string()]);

    for kind in ResourceKind::ALL {
        // Malformed markup is an error, never a panic
        let Ok(tags) = scanner.scan(kind, markup) else {
            continue;
        };
        for pair in tags.windows(2) {
            assert!(pair[0].range.end <= pair[1].range.start);
        }

        let rewritten = TagScanner::rewrite(kind, markup, &tags, "/merged");
        if tags.iter().all(|t| !t.eligible) {
            assert_eq!(rewritten, markup);
        }
    }
});
