//! Immutable rule builder
//!
//! Every setter returns a new builder and leaves the receiver untouched, so a
//! partially configured builder can serve as a template for several rules.

use regex::Regex;
use sheaf_format::{Result, SheafError};

use crate::rule::{FormatRule, Rule, RuleValue, ValueRule};

/// Builder for [`ValueRule`] and, for strings, [`FormatRule`]
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct RuleBuilder<T> {
    lower: Option<T>,
    upper: Option<T>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    allowed: Option<Vec<T>>,
    format: Option<String>,
    pattern: Option<String>,
}

impl<T> Default for RuleBuilder<T> {
    fn default() -> Self {
        Self {
            lower: None,
            upper: None,
            min_length: None,
            max_length: None,
            allowed: None,
            format: None,
            pattern: None,
        }
    }
}

impl<T: RuleValue> RuleBuilder<T> {
    /// Builder with no condition configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound
    pub fn lower_bound(&self, lower: T) -> Self {
        Self {
            lower: Some(lower),
            ..self.clone()
        }
    }

    /// Inclusive upper bound
    pub fn upper_bound(&self, upper: T) -> Self {
        Self {
            upper: Some(upper),
            ..self.clone()
        }
    }

    /// Restrict values to an enumerated set
    pub fn allowed_values<I: IntoIterator<Item = T>>(&self, values: I) -> Self {
        Self {
            allowed: Some(values.into_iter().collect()),
            ..self.clone()
        }
    }

    /// Build the bounded-value rule
    pub fn build(&self) -> ValueRule<T> {
        ValueRule {
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            min_length: self.min_length,
            max_length: self.max_length,
            allowed: self.allowed.clone(),
        }
    }
}

impl RuleBuilder<String> {
    /// Minimum length in characters
    pub fn min_length(&self, min: usize) -> Self {
        Self {
            min_length: Some(min),
            ..self.clone()
        }
    }

    /// Maximum length in characters
    pub fn max_length(&self, max: usize) -> Self {
        Self {
            max_length: Some(max),
            ..self.clone()
        }
    }

    /// Named format (`date`, `date-time`, ...)
    pub fn format(&self, format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            ..self.clone()
        }
    }

    /// Regular expression backing the format; ignored without a format
    pub fn pattern(&self, pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..self.clone()
        }
    }

    /// Build the format rule, if a format is configured
    pub fn build_format(&self) -> Result<Option<FormatRule>> {
        let Some(format) = &self.format else {
            return Ok(None);
        };

        let pattern = self
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| SheafError::InvalidConstraint {
                path: String::new(),
                reason: format!("invalid pattern: {}", e),
            })?;

        Ok(Some(FormatRule::new(format.clone(), pattern)))
    }

    /// Build every configured string rule in evaluation order
    pub fn build_all(&self) -> Result<Vec<Box<dyn Rule<String>>>> {
        let mut rules: Vec<Box<dyn Rule<String>>> = Vec::new();

        let value_rule = self.build();
        if !value_rule.is_empty() {
            rules.push(Box::new(value_rule));
        }
        if let Some(format_rule) = self.build_format()? {
            rules.push(Box::new(format_rule));
        }

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;

    #[test]
    fn test_numeric_rule_from_builder() {
        let rule = RuleBuilder::<i32>::new().lower_bound(4).upper_bound(8).build();

        assert!(rule.apply(&3).is_err());
        assert!(rule.apply(&9).is_err());
        assert!(rule.apply(&6).is_ok());
    }

    #[test]
    fn test_string_rule_from_builder() {
        let rule = RuleBuilder::<String>::new()
            .min_length(4)
            .max_length(8)
            .allowed_values(["value1".to_string(), "value2".to_string()])
            .build();

        let too_short = rule.apply(&"ab".to_string()).unwrap_err();
        assert_eq!(too_short.kind(), FailureKind::LowerBound);

        let too_long = rule.apply(&"ababababa".to_string()).unwrap_err();
        assert_eq!(too_long.kind(), FailureKind::UpperBound);

        let not_enumerated = rule.apply(&"value3".to_string()).unwrap_err();
        assert_eq!(not_enumerated.kind(), FailureKind::Range);

        assert!(rule.apply(&"value1".to_string()).is_ok());
    }

    #[test]
    fn test_builder_is_immutable() {
        let base = RuleBuilder::<i64>::new().lower_bound(0);
        let capped = base.upper_bound(10);

        assert!(base.build().apply(&1_000).is_ok());
        assert!(capped.build().apply(&1_000).is_err());
        assert!(base.build().apply(&-1).is_err());
    }

    #[test]
    fn test_pattern_without_format_is_unused() {
        let rules = RuleBuilder::<String>::new().pattern("^x$").build_all().unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_build_all_orders_value_rule_first() {
        let rules = RuleBuilder::<String>::new()
            .max_length(4)
            .format("date")
            .build_all()
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].describe(), "maxLength=4");
        assert_eq!(rules[1].describe(), "format=date");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RuleBuilder::<String>::new()
            .format("code")
            .pattern("(unclosed")
            .build_format();
        assert!(matches!(result, Err(SheafError::InvalidConstraint { .. })));
    }
}
