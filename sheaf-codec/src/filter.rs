//! Namespaced branch filters that prune schema fields
//!
//! A filter configuration string lists entries such as
//! `profile/identities.primary`: the namespace the filter belongs to, then the
//! dot-separated branch to remove. Filters only act when invoked for a
//! namespace they apply to (case-insensitive). A branch that does not match
//! the tree is ignored.

use sheaf_format::constants::{
    FILTER_BRANCH_DELIMITER, FILTER_ENTRY_SEPARATOR, FILTER_NAMESPACE_SEPARATOR,
};
use sheaf_format::{Result, SheafError, TraversablePath};
use tracing::{debug, trace};

use crate::tree::{SchemaNode, SchemaTree};

/// One configured filter: namespace id plus branch tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    namespace_id: String,
    branch: TraversablePath,
}

impl FilterSpec {
    /// Create a filter from parts
    pub fn new(namespace_id: impl Into<String>, branch: TraversablePath) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            branch,
        }
    }

    /// Parse one `namespace/branch.path` entry
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let (namespace, branch) = entry
            .split_once(FILTER_NAMESPACE_SEPARATOR)
            .ok_or_else(|| SheafError::MalformedFilter(entry.to_string()))?;

        let namespace = namespace.trim();
        if namespace.is_empty() {
            return Err(SheafError::MalformedFilter(entry.to_string()));
        }

        let branch = TraversablePath::parse(branch.trim(), FILTER_BRANCH_DELIMITER)
            .map_err(|_| SheafError::MalformedFilter(entry.to_string()))?;

        Ok(Self::new(namespace, branch))
    }

    /// Namespace this filter belongs to
    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// Branch tokens, root first
    pub fn branch(&self) -> &TraversablePath {
        &self.branch
    }

    /// Case-insensitive namespace match
    pub fn can_apply(&self, namespace_id: &str) -> bool {
        self.namespace_id.eq_ignore_ascii_case(namespace_id)
    }
}

/// Parse a comma-separated filter configuration string.
///
/// Blank entries are skipped; an entry without a namespace separator is
/// rejected.
pub fn parse_filter_config(config: &str) -> Result<Vec<FilterSpec>> {
    config
        .split(FILTER_ENTRY_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(FilterSpec::parse)
        .collect()
}

/// Applies configured filters to a field list
#[derive(Debug, Clone, Default)]
pub struct FieldFilterer {
    filters: Vec<FilterSpec>,
}

impl FieldFilterer {
    /// Create a filterer from ordered filters
    pub fn new(filters: Vec<FilterSpec>) -> Self {
        Self { filters }
    }

    /// Create a filterer from a configuration string
    pub fn from_config(config: &str) -> Result<Self> {
        Ok(Self::new(parse_filter_config(config)?))
    }

    /// Configured filters
    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    /// Apply every filter matching `namespace_id` to `fields` in place.
    ///
    /// Returns the number of fields removed (a removed group counts once).
    pub fn apply(&self, namespace_id: &str, fields: &mut Vec<SchemaNode>) -> usize {
        let mut removed = 0;
        for filter in self.filters.iter().filter(|f| f.can_apply(namespace_id)) {
            if remove_branch(fields, &filter.branch) {
                debug!(namespace = namespace_id, branch = %filter.branch, "removed branch");
                removed += 1;
            } else {
                trace!(namespace = namespace_id, branch = %filter.branch, "branch not present");
            }
        }
        removed
    }

    /// Apply to a tree's top-level field list
    pub fn apply_to_tree(&self, namespace_id: &str, tree: &mut SchemaTree) -> usize {
        self.apply(namespace_id, tree.fields_mut())
    }
}

fn remove_branch(fields: &mut Vec<SchemaNode>, tokens: &[String]) -> bool {
    let Some((head, rest)) = tokens.split_first() else {
        return false;
    };

    let Some(idx) = fields.iter().position(|f| f.key() == head.as_str()) else {
        return false;
    };

    if rest.is_empty() {
        fields.remove(idx);
        true
    } else {
        remove_branch(fields[idx].children_mut(), rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SchemaTree {
        SchemaTree::from_descriptor([
            ("identities.primary", "string"),
            ("identities.secondary", "string"),
            ("name", "string"),
        ])
        .unwrap()
    }

    fn dotted_leaves(tree: &SchemaTree) -> Vec<String> {
        tree.leaf_paths().iter().map(|p| p.dotted()).collect()
    }

    #[test]
    fn test_parse_entry() {
        let spec = FilterSpec::parse(" profile/identities.primary ").unwrap();
        assert_eq!(spec.namespace_id(), "profile");
        assert_eq!(spec.branch().dotted(), "identities.primary");
    }

    #[test]
    fn test_parse_config_skips_blank_entries() {
        let filters = parse_filter_config("profile/a.b, ,events/c,").unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].namespace_id(), "events");
    }

    #[test]
    fn test_malformed_entries_rejected() {
        for bad in ["profile.a.b", "/a.b", "profile/", "profile/a..b"] {
            assert!(
                matches!(FilterSpec::parse(bad), Err(SheafError::MalformedFilter(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_can_apply_is_case_insensitive() {
        let spec = FilterSpec::parse("Profile/a").unwrap();
        assert!(spec.can_apply("profile"));
        assert!(spec.can_apply("PROFILE"));
        assert!(!spec.can_apply("events"));
    }

    #[test]
    fn test_removes_only_targeted_leaf() {
        let mut tree = sample_tree();
        let filterer = FieldFilterer::from_config("profile/identities.primary").unwrap();

        assert_eq!(filterer.apply_to_tree("profile", &mut tree), 1);
        assert_eq!(dotted_leaves(&tree), vec!["identities.secondary", "name"]);
    }

    #[test]
    fn test_non_matching_namespace_is_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let filterer = FieldFilterer::from_config("profile/identities.primary").unwrap();

        assert_eq!(filterer.apply_to_tree("events", &mut tree), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_unmatched_token_is_silent_noop() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let filterer =
            FieldFilterer::from_config("profile/identities.tertiary,profile/missing.x").unwrap();

        assert_eq!(filterer.apply_to_tree("profile", &mut tree), 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_removing_group_drops_subtree() {
        let mut tree = sample_tree();
        let filterer = FieldFilterer::from_config("profile/identities").unwrap();

        filterer.apply_to_tree("profile", &mut tree);
        assert_eq!(dotted_leaves(&tree), vec!["name"]);
    }

    #[test]
    fn test_branch_through_leaf_is_noop() {
        let mut tree = sample_tree();
        let filterer = FieldFilterer::from_config("profile/name.first").unwrap();

        assert_eq!(filterer.apply_to_tree("profile", &mut tree), 0);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_filters_apply_in_order() {
        let mut tree = sample_tree();
        let filterer = FieldFilterer::from_config(
            "profile/identities.primary,profile/identities.secondary,events/name",
        )
        .unwrap();

        assert_eq!(filterer.apply_to_tree("PROFILE", &mut tree), 2);
        assert_eq!(dotted_leaves(&tree), vec!["name"]);
        assert!(tree.find(&["identities".to_string()]).unwrap().children().is_empty());
    }
}
