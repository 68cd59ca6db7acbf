#![no_main]

use libfuzzer_sys::fuzz_target;
use sheaf_codec::{FieldFilterer, SchemaTree};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (namespace, config) = text.split_once('\n').unwrap_or(("ns", text));

    let Ok(filterer) = FieldFilterer::from_config(config) else {
        return;
    };
    let Ok(mut tree) = SchemaTree::from_descriptor([
        ("a.b.c", "string"),
        ("a.b.d", "int"),
        ("a.e", "long"),
        ("f", "date"),
    ]) else {
        return;
    };

    let before = tree.node_count();
    let removed = filterer.apply_to_tree(namespace, &mut tree);
    assert!(removed <= before);
});
