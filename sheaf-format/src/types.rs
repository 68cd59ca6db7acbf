//! Type vocabularies bridging source schemas and destination physical types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal type enumeration bridging source schema vocabulary and
/// destination physical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    /// UTF-8 string (also used for raw `date` passthrough)
    String,
    /// 32-bit signed integer
    Integer,
    /// 16-bit signed integer
    Short,
    /// 8-bit signed integer
    Byte,
    /// 64-bit signed integer
    Long,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Boolean
    Boolean,
    /// Opaque bytes
    Binary,
    /// Calendar date
    Date,
    /// Timestamp
    DateTime,
    /// Nested object
    Object,
    /// Repeated values
    Array,
}

impl CanonicalType {
    /// Get the display name of this canonical type
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::String => "String",
            CanonicalType::Integer => "Integer",
            CanonicalType::Short => "Short",
            CanonicalType::Byte => "Byte",
            CanonicalType::Long => "Long",
            CanonicalType::Float => "Float",
            CanonicalType::Double => "Double",
            CanonicalType::Boolean => "Boolean",
            CanonicalType::Binary => "Binary",
            CanonicalType::Date => "Date",
            CanonicalType::DateTime => "DateTime",
            CanonicalType::Object => "Object",
            CanonicalType::Array => "Array",
        }
    }

    /// Whether values of this type are integral numbers
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            CanonicalType::Integer | CanonicalType::Short | CanonicalType::Byte | CanonicalType::Long
        )
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination primitive types understood by the columnar writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhysicalType {
    /// UTF-8 string
    String,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 16-bit signed integer
    Short,
    /// 8-bit signed integer
    Byte,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Boolean
    Boolean,
    /// Opaque bytes
    Binary,
    /// Calendar date
    Date,
    /// Timestamp
    Timestamp,
    /// Nested group of fields
    Group,
}

impl PhysicalType {
    /// Get the wire name of this physical type
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicalType::String => "STRING",
            PhysicalType::Integer => "INTEGER",
            PhysicalType::Long => "LONG",
            PhysicalType::Short => "SHORT",
            PhysicalType::Byte => "BYTE",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Binary => "BINARY",
            PhysicalType::Date => "DATE",
            PhysicalType::Timestamp => "TIMESTAMP",
            PhysicalType::Group => "GROUP",
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repetition of a physical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repetition {
    /// Zero or one value per record
    #[default]
    Optional,
    /// Zero or more values per record
    Repeated,
}
