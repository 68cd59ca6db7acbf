//! Per-leaf constraint blocks

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Optional bounds attached to a leaf field.
///
/// Numeric leaves use `minimum`/`maximum`; string leaves use the length,
/// enumeration and format keys. Keys follow JSON Schema naming.
///
/// Numeric bounds keep the JSON number as written. Narrowing to the leaf's
/// integer width happens when rules are resolved, so a fractional bound on a
/// floating-point leaf loads fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Constraint {
    /// Inclusive lower bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Inclusive upper bound for numeric values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Minimum string length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed string values
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Named string format (`date`, `date-time`, or a custom name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Regular expression backing `format`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraint {
    /// Constraint with integer bounds only
    pub fn numeric(minimum: Option<i64>, maximum: Option<i64>) -> Self {
        Self {
            minimum: minimum.map(Number::from),
            maximum: maximum.map(Number::from),
            ..Self::default()
        }
    }

    /// Constraint with string length bounds only
    pub fn length(min_length: Option<usize>, max_length: Option<usize>) -> Self {
        Self {
            min_length,
            max_length,
            ..Self::default()
        }
    }

    /// Restrict to an enumerated set of values
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a named format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Attach a regular expression pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// True when no key is set
    pub fn is_empty(&self) -> bool {
        !self.has_numeric_bounds() && !self.has_string_bounds()
    }

    /// True when `minimum` or `maximum` is set
    pub fn has_numeric_bounds(&self) -> bool {
        self.minimum.is_some() || self.maximum.is_some()
    }

    /// True when any string-only key is set
    pub fn has_string_bounds(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.enum_values.is_some()
            || self.format.is_some()
            || self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case_keys() {
        let constraint: Constraint = serde_json::from_value(json!({
            "minLength": 4,
            "maxLength": 8,
            "enum": ["value1", "value2"]
        }))
        .unwrap();

        assert_eq!(constraint.min_length, Some(4));
        assert_eq!(constraint.max_length, Some(8));
        assert_eq!(
            constraint.enum_values,
            Some(vec!["value1".to_string(), "value2".to_string()])
        );
        assert!(constraint.has_string_bounds());
        assert!(!constraint.has_numeric_bounds());
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        let result: Result<Constraint, _> = serde_json::from_value(json!({"minimun": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_fractional_bounds_load() {
        let constraint: Constraint =
            serde_json::from_value(json!({"minimum": 0.5, "maximum": 10})).unwrap();

        assert_eq!(constraint.minimum.as_ref().and_then(|n| n.as_f64()), Some(0.5));
        assert_eq!(constraint.minimum.as_ref().and_then(|n| n.as_i64()), None);
        assert_eq!(constraint.maximum.as_ref().and_then(|n| n.as_i64()), Some(10));
        assert!(constraint.has_numeric_bounds());
    }

    #[test]
    fn test_empty_constraint() {
        assert!(Constraint::default().is_empty());
        assert!(!Constraint::numeric(Some(1), None).is_empty());
        assert!(!Constraint::default().with_format("date").is_empty());
    }
}
