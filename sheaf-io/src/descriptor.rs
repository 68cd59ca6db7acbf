//! Ordered schema descriptors
//!
//! A descriptor is a JSON object mapping flattened paths to leaf types. An
//! entry is either a bare type name or an object carrying the type under
//! `"type"` alongside constraint keys:
//!
//! ```json
//! {
//!   "person.name": "string",
//!   "person.age": { "type": "int", "minimum": 0, "maximum": 150 }
//! }
//! ```
//!
//! Entry order is significant: it fixes the first-seen order of the tree and
//! therefore the column order of every row.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};
use sheaf_codec::{SchemaTree, SchemaTreeBuilder};
use sheaf_format::{Constraint, Limits, Result, SheafError};
use std::fmt;
use std::io::Read;

/// One `path -> type` entry with its optional constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEntry {
    /// Flattened path
    pub path: String,
    /// Source type name
    pub type_name: String,
    /// Constraint keys, if any were given
    pub constraint: Option<Constraint>,
}

/// Ordered collection of descriptor entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescriptor {
    entries: Vec<DescriptorEntry>,
}

impl SchemaDescriptor {
    /// Wrap already-parsed entries
    pub fn new(entries: Vec<DescriptorEntry>) -> Self {
        Self { entries }
    }

    /// Unconstrained descriptor from ordered `path -> type` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(path, type_name)| DescriptorEntry {
                path: path.into(),
                type_name: type_name.into(),
                constraint: None,
            })
            .collect();
        Self { entries }
    }

    /// Read a descriptor from JSON.
    ///
    /// A repeated key is kept as a separate entry so that the tree builder
    /// sees every declaration in order.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawEntries = serde_json::from_reader(reader)?;
        Self::from_raw(raw.0)
    }

    /// Parse a descriptor from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawEntries = serde_json::from_str(json)?;
        Self::from_raw(raw.0)
    }

    /// Interpret an already parsed JSON object as a descriptor
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(SheafError::Json(serde::de::Error::custom(
                "descriptor must be a JSON object",
            )));
        };
        Self::from_raw(object.into_iter().collect())
    }

    fn from_raw(raw: Vec<(String, Value)>) -> Result<Self> {
        let entries = raw
            .into_iter()
            .map(|(path, entry)| parse_entry(path, entry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[DescriptorEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the descriptor has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the schema tree, splitting paths on `delimiter`
    pub fn build_tree(&self, delimiter: char, limits: Limits) -> Result<SchemaTree> {
        let mut builder = SchemaTreeBuilder::new()
            .with_delimiter(delimiter)
            .with_limits(limits)?;
        for entry in &self.entries {
            builder.insert_constrained(&entry.path, &entry.type_name, entry.constraint.clone())?;
        }
        Ok(builder.build())
    }
}

/// Top-level object entries in document order, duplicates included
struct RawEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping paths to types")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RawEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn parse_entry(path: String, entry: Value) -> Result<DescriptorEntry> {
    match entry {
        Value::String(type_name) => Ok(DescriptorEntry {
            path,
            type_name,
            constraint: None,
        }),
        Value::Object(mut keys) => {
            let type_name = match keys.remove("type") {
                Some(Value::String(type_name)) => type_name,
                _ => {
                    return Err(SheafError::InvalidConstraint {
                        path,
                        reason: "entry object needs a string \"type\"".to_string(),
                    })
                }
            };
            let constraint = parse_constraint(&path, keys)?;
            Ok(DescriptorEntry {
                path,
                type_name,
                constraint,
            })
        }
        other => Err(SheafError::InvalidConstraint {
            path,
            reason: format!("expected a type name or an object, found {}", other),
        }),
    }
}

fn parse_constraint(path: &str, keys: Map<String, Value>) -> Result<Option<Constraint>> {
    if keys.is_empty() {
        return Ok(None);
    }
    let constraint: Constraint =
        serde_json::from_value(Value::Object(keys)).map_err(|e| SheafError::InvalidConstraint {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    Ok((!constraint.is_empty()).then_some(constraint))
}
