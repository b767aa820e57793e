#![no_main]

use codec::{decode_map, encode_map, DecodeOptions, EncodeOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions::for_testing();
    let Ok(map) = decode_map(data, &options) else {
        return;
    };

    // Anything that decodes must survive a re-encode and decode unchanged,
    // unless the tree holds text the run-length coder cannot store.
    let Ok(bytes) = encode_map(&map.root, &map.package, &EncodeOptions::keep_all_attributes())
    else {
        return;
    };
    let again = decode_map(&bytes, &DecodeOptions::unlimited()).expect("re-decode");
    assert_eq!(again.root.name, map.root.name);
    assert_eq!(again.root.count_elements(), map.root.count_elements());
});
