//! Sheaf Test Utilities
//!
//! This crate provides shared descriptor and row fixtures for the Sheaf
//! project's tests and benchmarks.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Map, Value};

/// Builder for ordered schema descriptors
pub struct DescriptorBuilder {
    entries: Vec<(String, Value)>,
}

impl DescriptorBuilder {
    /// Create an empty descriptor builder
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an unconstrained field
    pub fn field(mut self, path: &str, type_name: &str) -> Self {
        self.entries
            .push((path.to_string(), Value::String(type_name.to_string())));
        self
    }

    /// Add a field with constraint keys (`minimum`, `maxLength`, `enum`, ...)
    pub fn constrained(mut self, path: &str, type_name: &str, constraint: Value) -> Self {
        let mut entry = Map::new();
        entry.insert("type".to_string(), Value::String(type_name.to_string()));
        if let Value::Object(keys) = constraint {
            entry.extend(keys);
        }
        self.entries.push((path.to_string(), Value::Object(entry)));
        self
    }

    /// Ordered `path -> type` pairs, constraints dropped
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(path, entry)| {
                let type_name = match entry {
                    Value::String(s) => s.clone(),
                    other => other["type"].as_str().unwrap_or_default().to_string(),
                };
                (path.clone(), type_name)
            })
            .collect()
    }

    /// Descriptor as an insertion-ordered JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().cloned().collect())
    }

    /// Descriptor serialized as a JSON string
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl Default for DescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate descriptors and rows with common shapes
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// Profile schema with constraints on several leaves.
    ///
    /// Leaf order: `identities.primary`, `identities.secondary`, `person.name`,
    /// `person.age`, `person.visits`, `person.born`, `status`, `updated`.
    pub fn profile_descriptor() -> DescriptorBuilder {
        DescriptorBuilder::new()
            .constrained(
                "identities.primary",
                "string",
                json!({"minLength": 4, "maxLength": 16}),
            )
            .field("identities.secondary", "string")
            .constrained("person.name", "string", json!({"maxLength": 32}))
            .constrained("person.age", "int", json!({"minimum": 0, "maximum": 150}))
            .constrained("person.visits", "long", json!({"minimum": 0}))
            .constrained("person.born", "date", json!({"format": "date"}))
            .constrained(
                "status",
                "string",
                json!({"enum": ["active", "inactive"]}),
            )
            .field("updated", "date-time")
    }

    /// Valid rows aligned with [`TestDataGenerator::profile_descriptor`]
    pub fn profile_rows(count: usize) -> Vec<Vec<Value>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        (0..count)
            .map(|i| {
                let updated = base + Duration::minutes(i as i64);
                vec![
                    json!(format!("user{:04}", i)),
                    if i % 2 == 0 {
                        Value::Null
                    } else {
                        json!(format!("alt{}", i))
                    },
                    json!(format!("Person {}", i)),
                    json!((i % 90) as i64),
                    json!((i as i64) * 1_000_000_000),
                    json!(format!("19{:02}-0{}-1{}", 50 + i % 40, 1 + i % 9, i % 10)),
                    json!(if i % 3 == 0 { "inactive" } else { "active" }),
                    json!(updated.to_rfc3339()),
                ]
            })
            .collect()
    }

    /// A profile row whose `person.age` exceeds its upper bound
    pub fn invalid_profile_row() -> Vec<Value> {
        let mut row = Self::profile_rows(1).remove(0);
        row[3] = json!(151);
        row
    }

    /// Wide descriptor: `groups` top-level groups with `leaves` string leaves each
    pub fn wide_descriptor(groups: usize, leaves: usize) -> DescriptorBuilder {
        let mut builder = DescriptorBuilder::new();
        for g in 0..groups {
            for l in 0..leaves {
                builder = builder.constrained(
                    &format!("group{}.sub{}.leaf{}", g, l % 4, l),
                    "string",
                    json!({"maxLength": 64}),
                );
            }
        }
        builder
    }

    /// Rows aligned with [`TestDataGenerator::wide_descriptor`]
    pub fn wide_rows(groups: usize, leaves: usize, count: usize) -> Vec<Vec<Value>> {
        (0..count)
            .map(|row| {
                (0..groups * leaves)
                    .map(|col| json!(format!("r{}c{}", row, col)))
                    .collect()
            })
            .collect()
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use serde_json::Value;

    /// Assert that two JSON values are semantically equal (ignoring formatting)
    pub fn assert_json_equal(actual: &Value, expected: &Value, context: &str) {
        if actual != expected {
            panic!(
                "JSON assertion failed in {}:\nExpected: {}\nActual: {}",
                context,
                serde_json::to_string_pretty(expected).unwrap(),
                serde_json::to_string_pretty(actual).unwrap()
            );
        }
    }

    /// Assert the top-level key order of a JSON object
    pub fn assert_key_order(actual: &Value, expected: &[&str], context: &str) {
        let keys: Vec<&str> = actual
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        if keys != expected {
            panic!(
                "Key order assertion failed in {}:\nExpected: {:?}\nActual: {:?}",
                context, expected, keys
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder_preserves_order() {
        let descriptor = DescriptorBuilder::new()
            .field("z.a", "string")
            .constrained("a", "int", json!({"minimum": 1}))
            .field("m", "long");

        let pairs = descriptor.pairs();
        assert_eq!(pairs[0], ("z.a".to_string(), "string".to_string()));
        assert_eq!(pairs[1], ("a".to_string(), "int".to_string()));

        let json = descriptor.to_json();
        assertions::assert_key_order(&json, &["z.a", "a", "m"], "descriptor json");
        assert_eq!(json["a"]["minimum"], json!(1));
    }

    #[test]
    fn test_profile_rows_align_with_descriptor() {
        let width = TestDataGenerator::profile_descriptor().pairs().len();
        for row in TestDataGenerator::profile_rows(25) {
            assert_eq!(row.len(), width);
        }
    }

    #[test]
    fn test_wide_rows_dimensions() {
        let descriptor = TestDataGenerator::wide_descriptor(3, 5);
        assert_eq!(descriptor.pairs().len(), 15);
        let rows = TestDataGenerator::wide_rows(3, 5, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 15);
    }
}
