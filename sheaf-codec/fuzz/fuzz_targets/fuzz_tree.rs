#![no_main]

use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};
use sheaf_codec::{PhysicalSchema, SchemaTreeBuilder};

#[derive(Debug, Arbitrary)]
struct Input {
    underscore: bool,
    entries: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    let delimiter = if input.underscore { '_' } else { '.' };
    let mut builder = SchemaTreeBuilder::new().with_delimiter(delimiter);
    for (path, type_name) in &input.entries {
        let _ = builder.insert(path, type_name);
    }
    let tree = builder.build();

    // Every flattened leaf must rebuild to the same tree.
    let flattened = tree.flatten(delimiter);
    let mut rebuilt = SchemaTreeBuilder::new().with_delimiter(delimiter);
    for (path, type_name) in &flattened {
        let _ = rebuilt.insert(path, type_name);
    }
    assert_eq!(rebuilt.build().flatten(delimiter), flattened);

    let _ = PhysicalSchema::from_tree(&tree);
});
