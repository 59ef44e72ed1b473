#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wpo_types::{artifact_path, BuildMode, ResourceKind, ResourceReferenceSet};

#[derive(Arbitrary, Debug)]
struct Input {
    ids: Vec<String>,
    servlet: bool,
    style: bool,
}

fuzz_target!(|input: Input| {
    let mode = if input.servlet { BuildMode::Servlet } else { BuildMode::Static };
    let kind = if input.style { ResourceKind::Style } else { ResourceKind::Script };

    let set = ResourceReferenceSet::new(input.ids.iter().cloned());
    let reversed = ResourceReferenceSet::new(input.ids.iter().rev().cloned());

    assert_eq!(set, reversed);
    assert!(set.len() <= input.ids.len());
    for id in &input.ids {
        assert!(set.contains(id));
    }

    let path = artifact_path(kind.default_directory(), mode, kind, &set);
    assert!(path.starts_with(kind.default_directory()));
    assert!(path.ends_with(kind.extension()));
    assert_eq!(
        path,
        artifact_path(kind.default_directory(), mode, kind, &reversed)
    );
});
