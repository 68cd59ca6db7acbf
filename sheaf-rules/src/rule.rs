//! Rule variants evaluated against a single leaf value

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::fmt::{Debug, Display};

use crate::failure::ValidationFailure;

/// A reusable, path-independent predicate over one value
pub trait Rule<T: ?Sized>: Debug + Send + Sync {
    /// Check `value`, returning the first violated condition
    fn apply(&self, value: &T) -> Result<(), ValidationFailure>;

    /// Human-readable summary of the configured conditions
    fn describe(&self) -> String;
}

/// Values a [`ValueRule`] can bound
pub trait RuleValue: PartialOrd + Display + Debug + Clone + Send + Sync + 'static {
    /// Length checked by min/max length conditions, if the type has one
    fn measure(&self) -> Option<usize> {
        None
    }

    /// Rendering used inside failure messages
    fn render(&self) -> String {
        self.to_string()
    }
}

impl RuleValue for i32 {}

impl RuleValue for i64 {}

impl RuleValue for String {
    fn measure(&self) -> Option<usize> {
        Some(self.chars().count())
    }

    fn render(&self) -> String {
        format!("{:?}", self)
    }
}

/// Bounded-value rule shared by strings and integral types.
///
/// Conditions are checked in a fixed order and the first one met fails:
/// lower bound, upper bound, minimum length, maximum length, allowed set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRule<T> {
    pub(crate) lower: Option<T>,
    pub(crate) upper: Option<T>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) allowed: Option<Vec<T>>,
}

impl<T: RuleValue> ValueRule<T> {
    /// True when the rule has no condition configured
    pub fn is_empty(&self) -> bool {
        self.lower.is_none()
            && self.upper.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.allowed.is_none()
    }
}

fn render_set<T: RuleValue>(values: &[T]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.render()).collect();
    format!("[{}]", rendered.join(", "))
}

impl<T: RuleValue> Rule<T> for ValueRule<T> {
    fn apply(&self, value: &T) -> Result<(), ValidationFailure> {
        if let Some(lower) = &self.lower {
            if value < lower {
                return Err(ValidationFailure::builder()
                    .lower_bound()
                    .value(value.render())
                    .bound(lower.render())
                    .finish());
            }
        }

        if let Some(upper) = &self.upper {
            if value > upper {
                return Err(ValidationFailure::builder()
                    .upper_bound()
                    .value(value.render())
                    .bound(upper.render())
                    .finish());
            }
        }

        if let Some(length) = value.measure() {
            if let Some(min) = self.min_length {
                if length < min {
                    return Err(ValidationFailure::builder()
                        .lower_bound()
                        .value(value.render())
                        .bound(format!("minLength={}", min))
                        .finish());
                }
            }
            if let Some(max) = self.max_length {
                if length > max {
                    return Err(ValidationFailure::builder()
                        .upper_bound()
                        .value(value.render())
                        .bound(format!("maxLength={}", max))
                        .finish());
                }
            }
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(value) {
                return Err(ValidationFailure::builder()
                    .out_of_range()
                    .value(value.render())
                    .bound(render_set(allowed))
                    .finish());
            }
        }

        Ok(())
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(lower) = &self.lower {
            parts.push(format!("minimum={}", lower.render()));
        }
        if let Some(upper) = &self.upper {
            parts.push(format!("maximum={}", upper.render()));
        }
        if let Some(min) = self.min_length {
            parts.push(format!("minLength={}", min));
        }
        if let Some(max) = self.max_length {
            parts.push(format!("maxLength={}", max));
        }
        if let Some(allowed) = &self.allowed {
            parts.push(format!("enum={}", render_set(allowed)));
        }
        parts.join(" ")
    }
}

/// Named string format check, optionally backed by a regular expression.
///
/// With a pattern the value must match it. Without one, `date` and
/// `date-time` are checked natively; other format names accept any value.
#[derive(Debug, Clone)]
pub struct FormatRule {
    format: String,
    pattern: Option<Regex>,
}

impl FormatRule {
    pub(crate) fn new(format: String, pattern: Option<Regex>) -> Self {
        Self { format, pattern }
    }

    /// Configured format name
    pub fn format(&self) -> &str {
        &self.format
    }

    fn accepts(&self, value: &str) -> bool {
        if let Some(pattern) = &self.pattern {
            return pattern.is_match(value);
        }
        match self.format.as_str() {
            "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            "date-time" => DateTime::parse_from_rfc3339(value).is_ok(),
            _ => true,
        }
    }
}

impl Rule<String> for FormatRule {
    fn apply(&self, value: &String) -> Result<(), ValidationFailure> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(ValidationFailure::builder()
            .out_of_range()
            .value(value.render())
            .bound(format!("format={}", self.format))
            .finish())
    }

    fn describe(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!("format={} pattern={}", self.format, pattern.as_str()),
            None => format!("format={}", self.format),
        }
    }
}
