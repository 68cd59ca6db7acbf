//! Path-keyed validation rule resolution
//!
//! The registry is built once from a filtered schema tree and is read-only
//! afterwards; lookups require an exact root-to-leaf path match.

use ahash::AHashMap;
use serde_json::{Number, Value};
use sheaf_codec::{canonical_type, SchemaNode, SchemaTree};
use sheaf_format::{CanonicalType, Constraint, Result, SheafError, TraversablePath};
use thiserror::Error;
use tracing::{debug, warn};

use crate::builder::RuleBuilder;
use crate::failure::ValidationFailure;
use crate::rule::{Rule, RuleValue};

/// Ordered rules for one value type
pub type RuleList<T> = Vec<Box<dyn Rule<T>>>;

/// Rule family a constrained leaf resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    /// Rules over strings
    String,
    /// Rules over 32-bit integers (also short and byte leaves)
    Integer,
    /// Rules over 64-bit integers
    Long,
}

impl RuleFamily {
    fn for_canonical(canonical: CanonicalType) -> Option<Self> {
        match canonical {
            CanonicalType::String => Some(RuleFamily::String),
            CanonicalType::Integer | CanonicalType::Short | CanonicalType::Byte => {
                Some(RuleFamily::Integer)
            }
            CanonicalType::Long => Some(RuleFamily::Long),
            _ => None,
        }
    }
}

/// Why a JSON value was rejected at a constrained path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The first rule that failed
    #[error(transparent)]
    Failure(#[from] ValidationFailure),
    /// The value has the wrong JSON kind for the path's rules
    #[error("value {found} cannot be checked by {family:?} rules")]
    Mismatch {
        /// Family registered at the path
        family: RuleFamily,
        /// Rendering of the value found
        found: String,
    },
}

/// Validation rules for every constrained leaf of a schema
#[derive(Debug, Default)]
pub struct ValidationRegistry {
    string_rules: AHashMap<TraversablePath, RuleList<String>>,
    integer_rules: AHashMap<TraversablePath, RuleList<i32>>,
    long_rules: AHashMap<TraversablePath, RuleList<i64>>,
    order: Vec<(TraversablePath, RuleFamily)>,
}

impl ValidationRegistry {
    /// Resolve rules for every constrained leaf below `root`
    pub fn get(root: &SchemaNode) -> Result<Self> {
        let mut registry = Self::default();
        let mut path = TraversablePath::root();
        registry.visit(root, &mut path)?;
        debug!(paths = registry.order.len(), "validation registry built");
        Ok(registry)
    }

    /// Resolve rules for a whole tree
    pub fn from_tree(tree: &SchemaTree) -> Result<Self> {
        Self::get(tree.root())
    }

    /// String rules at exactly `path` (empty if none)
    pub fn get_string_validation_rule(&self, path: &TraversablePath) -> &[Box<dyn Rule<String>>] {
        self.string_rules.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Integer rules at exactly `path` (empty if none)
    pub fn get_integer_validation_rule(&self, path: &TraversablePath) -> &[Box<dyn Rule<i32>>] {
        self.integer_rules.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Long rules at exactly `path` (empty if none)
    pub fn get_long_validation_rule(&self, path: &TraversablePath) -> &[Box<dyn Rule<i64>>] {
        self.long_rules.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rule family registered at `path`
    pub fn family(&self, path: &TraversablePath) -> Option<RuleFamily> {
        if self.string_rules.contains_key(path) {
            Some(RuleFamily::String)
        } else if self.integer_rules.contains_key(path) {
            Some(RuleFamily::Integer)
        } else if self.long_rules.contains_key(path) {
            Some(RuleFamily::Long)
        } else {
            None
        }
    }

    /// Run the rules at `path` against a JSON value.
    ///
    /// Null values and paths without rules pass. Rules run in order and the
    /// first failure is returned.
    pub fn validate(&self, path: &TraversablePath, value: &Value) -> std::result::Result<(), Rejection> {
        if value.is_null() {
            return Ok(());
        }
        let Some(family) = self.family(path) else {
            return Ok(());
        };
        let mismatch = || Rejection::Mismatch {
            family,
            found: value.to_string(),
        };

        match family {
            RuleFamily::String => {
                let Value::String(text) = value else {
                    return Err(mismatch());
                };
                apply_all(self.get_string_validation_rule(path), text)
            }
            RuleFamily::Integer => {
                let number = value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(mismatch)?;
                apply_all(self.get_integer_validation_rule(path), &number)
            }
            RuleFamily::Long => {
                let number = value.as_i64().ok_or_else(mismatch)?;
                apply_all(self.get_long_validation_rule(path), &number)
            }
        }
    }

    /// Constrained paths in leaf order
    pub fn paths(&self) -> impl Iterator<Item = (&TraversablePath, RuleFamily)> {
        self.order.iter().map(|(path, family)| (path, *family))
    }

    /// Descriptions of the rules at `path`
    pub fn describe(&self, path: &TraversablePath) -> Vec<String> {
        match self.family(path) {
            Some(RuleFamily::String) => self
                .get_string_validation_rule(path)
                .iter()
                .map(|r| r.describe())
                .collect(),
            Some(RuleFamily::Integer) => self
                .get_integer_validation_rule(path)
                .iter()
                .map(|r| r.describe())
                .collect(),
            Some(RuleFamily::Long) => self
                .get_long_validation_rule(path)
                .iter()
                .map(|r| r.describe())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of constrained paths
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no path carries rules
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn visit(&mut self, node: &SchemaNode, path: &mut TraversablePath) -> Result<()> {
        for child in node.children() {
            path.push(child.key());
            if child.is_group() {
                self.visit(child, path)?;
            } else if let Some(constraint) = child.constraint() {
                self.register(path, child.declared_type(), constraint)?;
            }
            path.pop();
        }
        Ok(())
    }

    fn register(
        &mut self,
        path: &TraversablePath,
        declared_type: &str,
        constraint: &Constraint,
    ) -> Result<()> {
        let Some(family) = canonical_type(declared_type).and_then(RuleFamily::for_canonical) else {
            debug!(path = %path, declared_type, "no rule family for constrained leaf");
            return Ok(());
        };

        let registered = match family {
            RuleFamily::String => {
                let rules = string_rules(path, constraint)?;
                insert_non_empty(&mut self.string_rules, path, rules)
            }
            RuleFamily::Integer => {
                let rules = integer_rules(path, constraint)?;
                insert_non_empty(&mut self.integer_rules, path, rules)
            }
            RuleFamily::Long => {
                let rules = long_rules(path, constraint)?;
                insert_non_empty(&mut self.long_rules, path, rules)
            }
        };

        if registered {
            self.order.push((path.clone(), family));
        }
        Ok(())
    }
}

fn apply_all<T: ?Sized>(rules: &[Box<dyn Rule<T>>], value: &T) -> std::result::Result<(), Rejection> {
    rules
        .iter()
        .try_for_each(|rule| rule.apply(value))
        .map_err(Rejection::from)
}

fn insert_non_empty<T: ?Sized>(
    table: &mut AHashMap<TraversablePath, Vec<Box<dyn Rule<T>>>>,
    path: &TraversablePath,
    rules: Vec<Box<dyn Rule<T>>>,
) -> bool {
    if rules.is_empty() {
        return false;
    }
    table.insert(path.clone(), rules);
    true
}

fn string_rules(path: &TraversablePath, constraint: &Constraint) -> Result<RuleList<String>> {
    if constraint.has_numeric_bounds() {
        warn!(path = %path, "numeric bounds on a string leaf are ignored");
    }

    let mut builder = RuleBuilder::<String>::new();
    if let Some(min) = constraint.min_length {
        builder = builder.min_length(min);
    }
    if let Some(max) = constraint.max_length {
        builder = builder.max_length(max);
    }
    if let Some(values) = &constraint.enum_values {
        builder = builder.allowed_values(values.iter().cloned());
    }
    if let Some(format) = &constraint.format {
        builder = builder.format(format.clone());
    }
    if let Some(pattern) = &constraint.pattern {
        builder = builder.pattern(pattern.clone());
    }

    builder.build_all().map_err(|e| match e {
        SheafError::InvalidConstraint { reason, .. } => SheafError::InvalidConstraint {
            path: path.dotted(),
            reason,
        },
        other => other,
    })
}

fn integer_rules(path: &TraversablePath, constraint: &Constraint) -> Result<RuleList<i32>> {
    warn_string_keys(path, constraint);

    let narrow = |bound: &Number| {
        let wide = integral_bound(path, bound)?;
        i32::try_from(wide).map_err(|_| SheafError::InvalidConstraint {
            path: path.dotted(),
            reason: format!("bound {} does not fit a 32-bit integer", wide),
        })
    };

    let mut builder = RuleBuilder::<i32>::new();
    if let Some(min) = &constraint.minimum {
        builder = builder.lower_bound(narrow(min)?);
    }
    if let Some(max) = &constraint.maximum {
        builder = builder.upper_bound(narrow(max)?);
    }

    Ok(numeric_rule_list(builder))
}

fn long_rules(path: &TraversablePath, constraint: &Constraint) -> Result<RuleList<i64>> {
    warn_string_keys(path, constraint);

    let mut builder = RuleBuilder::<i64>::new();
    if let Some(min) = &constraint.minimum {
        builder = builder.lower_bound(integral_bound(path, min)?);
    }
    if let Some(max) = &constraint.maximum {
        builder = builder.upper_bound(integral_bound(path, max)?);
    }

    Ok(numeric_rule_list(builder))
}

fn integral_bound(path: &TraversablePath, bound: &Number) -> Result<i64> {
    bound.as_i64().ok_or_else(|| SheafError::InvalidConstraint {
        path: path.dotted(),
        reason: format!("bound {} is not a 64-bit integer", bound),
    })
}

fn numeric_rule_list<T: RuleValue>(builder: RuleBuilder<T>) -> RuleList<T> {
    let rule = builder.build();
    if rule.is_empty() {
        return Vec::new();
    }
    let boxed: Box<dyn Rule<T>> = Box::new(rule);
    vec![boxed]
}

fn warn_string_keys(path: &TraversablePath, constraint: &Constraint) {
    if constraint.has_string_bounds() {
        warn!(path = %path, "string constraints on a numeric leaf are ignored");
    }
}
