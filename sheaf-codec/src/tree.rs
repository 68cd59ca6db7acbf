//! Schema tree builder for flattened field-path descriptors
//!
//! A descriptor is an ordered list of `path -> type name` entries such as
//! `"profile.identities.primary" -> "string"`. The builder splits every path
//! on its delimiter and merges shared prefixes into group nodes, producing an
//! ordered n-ary tree rooted at a synthetic node with an empty key.
//!
//! Entry order is significant: children keep first-seen order, and leaf order
//! becomes column order for the physical schema and the row nester. Callers
//! must hand entries over in the order the columns are expected.

use serde::Serialize;
use sheaf_format::constants::{DEFAULT_PATH_DELIMITER, GROUP_TYPE_NAME};
use sheaf_format::{Constraint, Limits, Result, SheafError, TraversablePath};
use tracing::{debug, warn};

/// Whether a node was created as an intermediate group or a typed leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Created for a non-terminal path token
    Group,
    /// Created for a terminal path token
    Leaf,
}

/// One node of a schema tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaNode {
    key: String,
    kind: NodeKind,
    declared_type: String,
    depth: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint: Option<Constraint>,
}

impl SchemaNode {
    /// Create a group node
    pub fn group(key: impl Into<String>, depth: usize) -> Self {
        Self {
            key: key.into(),
            kind: NodeKind::Group,
            declared_type: GROUP_TYPE_NAME.to_string(),
            depth,
            children: Vec::new(),
            constraint: None,
        }
    }

    /// Create a leaf node
    pub fn leaf(key: impl Into<String>, declared_type: impl Into<String>, depth: usize) -> Self {
        Self {
            key: key.into(),
            kind: NodeKind::Leaf,
            declared_type: declared_type.into(),
            depth,
            children: Vec::new(),
            constraint: None,
        }
    }

    /// Attach a constraint block
    pub fn with_constraint(mut self, constraint: Option<Constraint>) -> Self {
        self.constraint = constraint.filter(|c| !c.is_empty());
        self
    }

    /// Append a child, replacing nothing. Returns false if the key is taken.
    pub fn push_child(&mut self, mut child: SchemaNode) -> bool {
        if self.child(&child.key).is_some() {
            return false;
        }
        child.set_depth(self.depth + 1);
        self.children.push(child);
        true
    }

    /// Field name (empty for the synthetic root)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// How the node was created
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Source-vocabulary type name, or `"group"` for group nodes.
    ///
    /// A leaf may carry any declared name, `"group"` included; use
    /// [`SchemaNode::is_group`] to tell the two apart.
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// Distance from the synthetic root (root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Ordered children
    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    /// Mutable access to the ordered children list
    pub fn children_mut(&mut self) -> &mut Vec<SchemaNode> {
        &mut self.children
    }

    /// Constraint block, if the leaf carries one
    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    /// Direct child by key
    pub fn child(&self, key: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.key == key)
    }

    /// Whether this node is a group (nested object)
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Whether this node is a leaf carrying a value type
    pub fn is_leaf(&self) -> bool {
        !self.is_group()
    }

    /// Number of nodes in this subtree, excluding self
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        for child in &mut self.children {
            child.set_depth(depth + 1);
        }
    }

    fn collect_leaves<'a>(&'a self, prefix: &mut TraversablePath, out: &mut Vec<Leaf<'a>>) {
        for child in &self.children {
            prefix.push(child.key.clone());
            if child.is_leaf() {
                out.push(Leaf {
                    path: prefix.clone(),
                    node: child,
                });
            } else {
                child.collect_leaves(prefix, out);
            }
            prefix.pop();
        }
    }
}

/// A leaf together with its root-to-leaf path
#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    /// Path from the root to this leaf
    pub path: TraversablePath,
    /// The leaf node
    pub node: &'a SchemaNode,
}

/// Result of inserting one descriptor entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new leaf was created
    Inserted,
    /// The same path was already present; the first declaration was kept
    Duplicate {
        /// Type kept from the first occurrence
        kept: String,
        /// Type carried by the ignored entry
        ignored: String,
    },
    /// The path runs through an existing leaf, or ends on an existing group
    Conflict {
        /// Prefix at which the conflict was detected
        at: TraversablePath,
    },
}

/// Builder assembling a [`SchemaTree`] from ordered descriptor entries
#[derive(Debug, Clone)]
pub struct SchemaTreeBuilder {
    delimiter: char,
    limits: Limits,
    root: SchemaNode,
    node_count: usize,
}

impl Default for SchemaTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTreeBuilder {
    /// Create a builder splitting paths on `.`
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_PATH_DELIMITER,
            limits: Limits::default(),
            root: SchemaNode::group("", 0),
            node_count: 0,
        }
    }

    /// Split paths on a different delimiter (e.g. `_`)
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Use custom structural limits
    pub fn with_limits(mut self, limits: Limits) -> Result<Self> {
        limits.validate()?;
        self.limits = limits;
        Ok(self)
    }

    /// Insert an unconstrained entry
    pub fn insert(&mut self, path: &str, type_name: &str) -> Result<InsertOutcome> {
        self.insert_constrained(path, type_name, None)
    }

    /// Insert an entry, attaching an optional constraint to its leaf.
    ///
    /// Later entries never override earlier ones: a repeated path keeps its
    /// first declared type, and a path that would turn a leaf into a group
    /// (or the reverse) is skipped.
    pub fn insert_constrained(
        &mut self,
        path: &str,
        type_name: &str,
        constraint: Option<Constraint>,
    ) -> Result<InsertOutcome> {
        if path.len() > self.limits.max_path_length {
            return Err(SheafError::LimitExceeded(format!(
                "path length {} exceeds {}",
                path.len(),
                self.limits.max_path_length
            )));
        }

        let tokens = TraversablePath::parse(path, self.delimiter)?;
        if tokens.len() > self.limits.max_depth {
            return Err(SheafError::LimitExceeded(format!(
                "path '{}' has depth {} (max: {})",
                path,
                tokens.len(),
                self.limits.max_depth
            )));
        }

        let (terminal, parents) = tokens
            .split_last()
            .ok_or_else(|| SheafError::Internal("parsed path has no tokens".to_string()))?;

        // Classify before mutating so a rejected entry leaves no partial groups.
        let mut node = &self.root;
        let mut new_nodes = 0;
        for (idx, token) in parents.iter().enumerate() {
            match node.child(token) {
                Some(child) if child.is_leaf() => {
                    let at: TraversablePath = tokens[..=idx].iter().cloned().collect();
                    warn!(path, at = %at, "path runs through an existing leaf; entry ignored");
                    return Ok(InsertOutcome::Conflict { at });
                }
                Some(child) => node = child,
                None => {
                    new_nodes = parents.len() - idx + 1;
                    break;
                }
            }
        }

        if new_nodes == 0 {
            match node.child(terminal) {
                Some(existing) if existing.is_group() => {
                    warn!(path, "path names an existing group; entry ignored");
                    return Ok(InsertOutcome::Conflict { at: tokens.clone() });
                }
                Some(existing) => {
                    let kept = existing.declared_type.clone();
                    if kept != type_name {
                        debug!(path, kept = %kept, ignored = type_name, "duplicate path; first declaration wins");
                    }
                    return Ok(InsertOutcome::Duplicate {
                        kept,
                        ignored: type_name.to_string(),
                    });
                }
                None => new_nodes = 1,
            }
        }

        if self.node_count + new_nodes > self.limits.max_fields {
            return Err(SheafError::LimitExceeded(format!(
                "schema exceeds {} fields",
                self.limits.max_fields
            )));
        }

        let mut node = &mut self.root;
        for token in parents {
            let idx = match node.children.iter().position(|c| &c.key == token) {
                Some(idx) => idx,
                None => {
                    let depth = node.depth + 1;
                    node.children.push(SchemaNode::group(token.clone(), depth));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }

        let depth = node.depth + 1;
        node.children
            .push(SchemaNode::leaf(terminal.clone(), type_name, depth).with_constraint(constraint));
        self.node_count += new_nodes;

        Ok(InsertOutcome::Inserted)
    }

    /// Finish building
    pub fn build(self) -> SchemaTree {
        SchemaTree { root: self.root }
    }
}

/// Ordered schema tree with a synthetic root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaTree {
    root: SchemaNode,
}

impl Default for SchemaTree {
    fn default() -> Self {
        Self {
            root: SchemaNode::group("", 0),
        }
    }
}

impl SchemaTree {
    /// Build a tree from ordered `path -> type` entries using `.` as delimiter
    pub fn from_descriptor<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = SchemaTreeBuilder::new();
        for (path, type_name) in entries {
            builder.insert(path.as_ref(), type_name.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Wrap a top-level field list back into a tree, recomputing depths
    pub fn from_fields(fields: Vec<SchemaNode>) -> Self {
        let mut root = SchemaNode::group("", 0);
        root.children = fields;
        root.set_depth(0);
        Self { root }
    }

    /// The synthetic root
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Top-level fields
    pub fn fields(&self) -> &[SchemaNode] {
        &self.root.children
    }

    /// Mutable top-level field list
    pub fn fields_mut(&mut self) -> &mut Vec<SchemaNode> {
        &mut self.root.children
    }

    /// Surrender the top-level field list
    pub fn into_fields(self) -> Vec<SchemaNode> {
        self.root.children
    }

    /// True when the root has no children
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        self.root.descendant_count()
    }

    /// Leaves in depth-first, first-seen order
    pub fn leaves(&self) -> Vec<Leaf<'_>> {
        let mut out = Vec::new();
        let mut prefix = TraversablePath::root();
        self.root.collect_leaves(&mut prefix, &mut out);
        out
    }

    /// Leaf paths in column order
    pub fn leaf_paths(&self) -> Vec<TraversablePath> {
        self.leaves().into_iter().map(|leaf| leaf.path).collect()
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Look up a node by exact path
    pub fn find(&self, path: &[String]) -> Option<&SchemaNode> {
        let mut node = &self.root;
        for token in path {
            node = node.child(token)?;
        }
        Some(node)
    }

    /// Flatten back to ordered `path -> type` pairs
    pub fn flatten(&self, delimiter: char) -> Vec<(String, String)> {
        self.leaves()
            .into_iter()
            .map(|leaf| (leaf.path.join(delimiter), leaf.node.declared_type.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn keys(nodes: &[SchemaNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.key()).collect()
    }

    #[test]
    fn test_empty_descriptor_yields_bare_root() {
        let tree = SchemaTree::from_descriptor(Vec::<(&str, &str)>::new()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root().key(), "");
        assert_eq!(tree.root().depth(), 0);
        assert_eq!(tree.leaf_count(), 0);
    }

    #[test]
    fn test_flatten_roundtrip() {
        let entries = vec![
            ("a.b.c", "string"),
            ("a.b.d", "string"),
            ("e.f", "string"),
        ];
        let tree = SchemaTree::from_descriptor(entries.clone()).unwrap();

        let flattened: BTreeSet<(String, String)> = tree.flatten('.').into_iter().collect();
        let original: BTreeSet<(String, String)> = entries
            .into_iter()
            .map(|(p, t)| (p.to_string(), t.to_string()))
            .collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_shared_prefix_merge() {
        let tree = SchemaTree::from_descriptor([("a.b.c", "string"), ("a.b.d", "long")]).unwrap();

        assert_eq!(keys(tree.fields()), vec!["a"]);
        let a = &tree.fields()[0];
        assert!(a.is_group());
        assert_eq!(a.depth(), 1);
        assert_eq!(keys(a.children()), vec!["b"]);

        let b = &a.children()[0];
        assert_eq!(b.depth(), 2);
        assert_eq!(keys(b.children()), vec!["c", "d"]);
        assert_eq!(b.children()[0].declared_type(), "string");
        assert_eq!(b.children()[1].declared_type(), "long");
        assert_eq!(b.children()[1].depth(), 3);
    }

    #[test]
    fn test_merge_is_scoped_to_parent() {
        let tree = SchemaTree::from_descriptor([("a.x", "string"), ("b.x", "string")]).unwrap();
        assert_eq!(keys(tree.fields()), vec!["a", "b"]);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_duplicate_path_first_wins() {
        let mut builder = SchemaTreeBuilder::new();
        assert_eq!(builder.insert("a.b", "string").unwrap(), InsertOutcome::Inserted);
        assert_eq!(
            builder.insert("a.b", "long").unwrap(),
            InsertOutcome::Duplicate {
                kept: "string".to_string(),
                ignored: "long".to_string()
            }
        );
        let tree = builder.build();
        assert_eq!(tree.flatten('.'), vec![("a.b".to_string(), "string".to_string())]);
    }

    #[test]
    fn test_structural_conflicts_are_ignored() {
        let mut builder = SchemaTreeBuilder::new();
        builder.insert("a", "string").unwrap();
        builder.insert("b.c", "string").unwrap();

        let through_leaf = builder.insert("a.x", "string").unwrap();
        assert!(matches!(through_leaf, InsertOutcome::Conflict { ref at } if at.dotted() == "a"));

        let onto_group = builder.insert("b", "string").unwrap();
        assert!(matches!(onto_group, InsertOutcome::Conflict { .. }));

        let tree = builder.build();
        assert_eq!(tree.leaf_count(), 2);
        assert!(tree.find(&["a".to_string()]).unwrap().children().is_empty());
    }

    #[test]
    fn test_leaf_typed_group_stays_a_leaf() {
        let mut builder = SchemaTreeBuilder::new();
        builder.insert("a", "string").unwrap();
        assert_eq!(builder.insert("b", "group").unwrap(), InsertOutcome::Inserted);

        let through_leaf = builder.insert("b.c", "string").unwrap();
        assert!(matches!(through_leaf, InsertOutcome::Conflict { ref at } if at.dotted() == "b"));

        let tree = builder.build();
        let b = tree.find(&["b".to_string()]).unwrap();
        assert_eq!(b.kind(), NodeKind::Leaf);
        assert!(b.is_leaf());
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(
            tree.flatten('.'),
            vec![
                ("a".to_string(), "string".to_string()),
                ("b".to_string(), "group".to_string())
            ]
        );
    }

    #[test]
    fn test_underscore_delimiter() {
        let mut builder = SchemaTreeBuilder::new().with_delimiter('_');
        builder.insert("person_name_first", "string").unwrap();
        builder.insert("person_age", "int").unwrap();
        let tree = builder.build();

        assert_eq!(
            tree.flatten('.'),
            vec![
                ("person.name.first".to_string(), "string".to_string()),
                ("person.age".to_string(), "int".to_string()),
            ]
        );
    }

    #[test]
    fn test_leaf_order_follows_first_seen_order() {
        let tree = SchemaTree::from_descriptor([
            ("z.b", "string"),
            ("a", "int"),
            ("z.a", "string"),
        ])
        .unwrap();

        let paths: Vec<String> = tree.leaf_paths().iter().map(|p| p.dotted()).collect();
        assert_eq!(paths, vec!["z.b", "z.a", "a"]);
    }

    #[test]
    fn test_invalid_path_rejected() {
        let mut builder = SchemaTreeBuilder::new();
        assert!(matches!(
            builder.insert("a..b", "string"),
            Err(SheafError::InvalidPath { .. })
        ));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_limits_enforced_without_partial_insert() {
        let limits = Limits {
            max_depth: 2,
            max_fields: 3,
            ..Limits::default()
        };
        let mut builder = SchemaTreeBuilder::new().with_limits(limits).unwrap();

        assert!(matches!(
            builder.insert("a.b.c", "string"),
            Err(SheafError::LimitExceeded(_))
        ));

        builder.insert("a.b", "string").unwrap();
        builder.insert("a.c", "string").unwrap();
        assert!(matches!(
            builder.insert("d.e", "string"),
            Err(SheafError::LimitExceeded(_))
        ));

        let tree = builder.build();
        assert_eq!(tree.node_count(), 3);
        assert!(tree.find(&["d".to_string()]).is_none());
    }

    #[test]
    fn test_constraint_attached_to_leaf() {
        let mut builder = SchemaTreeBuilder::new();
        builder
            .insert_constrained("a.n", "int", Some(Constraint::numeric(Some(1), Some(9))))
            .unwrap();
        builder
            .insert_constrained("a.s", "string", Some(Constraint::default()))
            .unwrap();
        let tree = builder.build();

        let n = tree.find(&["a".to_string(), "n".to_string()]).unwrap();
        assert_eq!(
            n.constraint().and_then(|c| c.maximum.as_ref()).and_then(|m| m.as_i64()),
            Some(9)
        );
        let s = tree.find(&["a".to_string(), "s".to_string()]).unwrap();
        assert!(s.constraint().is_none());
    }

    #[test]
    fn test_from_fields_recomputes_depth() {
        let mut group = SchemaNode::group("outer", 7);
        assert!(group.push_child(SchemaNode::leaf("inner", "string", 0)));
        assert!(!group.push_child(SchemaNode::leaf("inner", "long", 0)));

        let tree = SchemaTree::from_fields(vec![group]);
        let inner = tree
            .find(&["outer".to_string(), "inner".to_string()])
            .unwrap();
        assert_eq!(tree.fields()[0].depth(), 1);
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.declared_type(), "string");
    }
}
