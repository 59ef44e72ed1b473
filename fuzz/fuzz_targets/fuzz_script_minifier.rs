#![no_main]

use libfuzzer_sys::fuzz_target;
use wpo_minify::ScriptMinifier;

fuzz_target!(|input: (u8, &[u8])| {
    let (chunk, data) = input;

    let mut whole = ScriptMinifier::new(Vec::new());
    whole.feed(data).unwrap();
    let whole = whole.finish().unwrap();

    // Chunk boundaries must not change the output
    let mut chunked = ScriptMinifier::new(Vec::new());
    for part in data.chunks(usize::from(chunk.max(1))) {
        chunked.feed(part).unwrap();
    }
    let chunked = chunked.finish().unwrap();

    assert_eq!(whole, chunked);
    assert!(whole.len() <= data.len());
});
