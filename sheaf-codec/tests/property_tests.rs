//! Property-based tests for tree building, filtering and nesting

use proptest::prelude::*;
use serde_json::Value;
use sheaf_codec::{FieldFilterer, FilterSpec, RowNester, SchemaTree, SchemaTreeBuilder};
use sheaf_format::TraversablePath;

const TYPES: &[&str] = &["string", "int", "long", "date", "boolean", "double"];

fn token() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn descriptor() -> impl Strategy<Value = Vec<(Vec<String>, &'static str)>> {
    prop::collection::vec(
        (
            prop::collection::vec(token(), 1..5),
            prop::sample::select(TYPES),
        ),
        1..24,
    )
}

fn build(entries: &[(Vec<String>, &'static str)], delimiter: char) -> SchemaTree {
    let mut builder = SchemaTreeBuilder::new().with_delimiter(delimiter);
    for (tokens, type_name) in entries {
        let path = tokens.join(&delimiter.to_string());
        builder.insert(&path, type_name).unwrap();
    }
    builder.build()
}

fn lookup<'a>(record: &'a serde_json::Map<String, Value>, path: &TraversablePath) -> Option<&'a Value> {
    let (terminal, parents) = path.split_last()?;
    let mut container = record;
    for token in parents {
        container = container.get(token)?.as_object()?;
    }
    container.get(terminal)
}

proptest! {
    #[test]
    fn flatten_then_rebuild_is_identity(entries in descriptor()) {
        let tree = build(&entries, '.');
        let flattened = tree.flatten('.');

        let rebuilt = SchemaTree::from_descriptor(flattened.clone()).unwrap();
        prop_assert_eq!(rebuilt.flatten('.'), flattened);
        prop_assert_eq!(rebuilt.node_count(), tree.node_count());
    }

    #[test]
    fn delimiter_does_not_change_shape(entries in descriptor()) {
        let dotted = build(&entries, '.');
        let underscored = build(&entries, '_');
        prop_assert_eq!(dotted.leaf_paths(), underscored.leaf_paths());
    }

    #[test]
    fn siblings_have_unique_keys(entries in descriptor()) {
        fn check(node: &sheaf_codec::SchemaNode) -> bool {
            let mut keys: Vec<&str> = node.children().iter().map(|c| c.key()).collect();
            let total = keys.len();
            keys.sort_unstable();
            keys.dedup();
            keys.len() == total && node.children().iter().all(check)
        }
        let tree = build(&entries, '.');
        prop_assert!(check(tree.root()));
    }

    #[test]
    fn nested_values_land_at_their_paths(entries in descriptor()) {
        let tree = build(&entries, '.');
        let paths = tree.leaf_paths();
        let values: Vec<Value> = (0..paths.len()).map(|i| Value::from(i as u64)).collect();

        let record = RowNester::new(paths.clone()).nest(values).unwrap();
        for (i, path) in paths.iter().enumerate() {
            prop_assert_eq!(lookup(&record, path), Some(&Value::from(i as u64)));
        }
        prop_assert_eq!(record.len(), tree.fields().len());
    }

    #[test]
    fn filtered_branch_disappears(entries in descriptor(), pick in any::<prop::sample::Index>()) {
        let mut tree = build(&entries, '.');
        let paths = tree.leaf_paths();
        let target = pick.get(&paths).clone();

        let filterer = FieldFilterer::new(vec![FilterSpec::new("ns", target.clone())]);
        filterer.apply_to_tree("NS", &mut tree);

        prop_assert!(tree.find(&target).is_none());
        for path in tree.leaf_paths() {
            prop_assert!(paths.contains(&path));
        }
    }
}
