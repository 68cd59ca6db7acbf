//! Two-stage type reconciliation and physical schema construction
//!
//! Stage 1 maps a source-vocabulary type name onto a [`CanonicalType`];
//! stage 2 maps the canonical type onto the writer's [`PhysicalType`]. Both
//! stages are pure lookups. A name or canonical type without a mapping is a
//! hard failure: the physical schema never substitutes a fallback type.

use serde::Serialize;
use sheaf_format::constants::*;
use sheaf_format::{
    CanonicalType, PhysicalType, Repetition, Result, SheafError, TraversablePath,
};
use tracing::debug;

use crate::tree::{SchemaNode, SchemaTree};

/// Stage 1: source type name to canonical type.
///
/// `date` deliberately maps to [`CanonicalType::String`]; dates are passed
/// through as raw strings rather than converted to a native date.
pub fn canonical_type(source_name: &str) -> Option<CanonicalType> {
    match source_name {
        SOURCE_STRING => Some(CanonicalType::String),
        SOURCE_LONG => Some(CanonicalType::Long),
        SOURCE_DATE => Some(CanonicalType::String),
        SOURCE_DATE_TIME => Some(CanonicalType::DateTime),
        SOURCE_INTEGER | SOURCE_INT => Some(CanonicalType::Integer),
        SOURCE_BYTE => Some(CanonicalType::Byte),
        SOURCE_SHORT => Some(CanonicalType::Short),
        SOURCE_NUMBER | SOURCE_DOUBLE => Some(CanonicalType::Double),
        SOURCE_FLOAT => Some(CanonicalType::Float),
        SOURCE_BOOLEAN => Some(CanonicalType::Boolean),
        SOURCE_BINARY => Some(CanonicalType::Binary),
        _ => None,
    }
}

/// Stage 2: canonical type to physical type. `Array` has no mapping.
pub fn physical_type(canonical: CanonicalType) -> Option<PhysicalType> {
    match canonical {
        CanonicalType::String => Some(PhysicalType::String),
        CanonicalType::Boolean => Some(PhysicalType::Boolean),
        CanonicalType::Integer => Some(PhysicalType::Integer),
        CanonicalType::Long => Some(PhysicalType::Long),
        CanonicalType::Float => Some(PhysicalType::Float),
        CanonicalType::Double => Some(PhysicalType::Double),
        CanonicalType::DateTime => Some(PhysicalType::Timestamp),
        CanonicalType::Object => Some(PhysicalType::Group),
        CanonicalType::Short => Some(PhysicalType::Short),
        CanonicalType::Byte => Some(PhysicalType::Byte),
        CanonicalType::Binary => Some(PhysicalType::Binary),
        CanonicalType::Date => Some(PhysicalType::Date),
        CanonicalType::Array => None,
    }
}

/// Run both stages for a source type name
pub fn reconcile(source_name: &str) -> Result<PhysicalType> {
    reconcile_at(&TraversablePath::root(), source_name)
}

fn reconcile_at(path: &TraversablePath, source_name: &str) -> Result<PhysicalType> {
    let canonical = canonical_type(source_name).ok_or_else(|| SheafError::UnknownSourceType {
        path: path.dotted(),
        type_name: source_name.to_string(),
    })?;

    physical_type(canonical).ok_or_else(|| SheafError::UnsupportedCanonicalType {
        path: path.dotted(),
        canonical: canonical.to_string(),
    })
}

/// Typed field descriptor handed to the columnar writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalField {
    /// Field name
    pub name: String,
    /// Destination type
    pub physical_type: PhysicalType,
    /// Repetition level
    pub repetition: Repetition,
    /// Nested fields (GROUP only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PhysicalField>,
}

/// Leaf column of a physical schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Root-to-leaf path
    pub path: TraversablePath,
    /// Destination type
    pub physical_type: PhysicalType,
}

/// Physical schema consumed by an external columnar writer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhysicalSchema {
    /// Top-level fields in column order
    pub fields: Vec<PhysicalField>,
}

impl PhysicalSchema {
    /// Reconcile every node of a (filtered) schema tree.
    ///
    /// Groups left without children are omitted since a writer cannot
    /// materialise an empty group.
    pub fn from_tree(tree: &SchemaTree) -> Result<Self> {
        let mut path = TraversablePath::root();
        let fields = reconcile_children(tree.fields(), &mut path)?;
        Ok(Self { fields })
    }

    /// Leaf columns in depth-first order
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        let mut out = Vec::new();
        let mut path = TraversablePath::root();
        collect_columns(&self.fields, &mut path, &mut out);
        out
    }

    /// True when no field survived reconciliation
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn reconcile_children(
    nodes: &[SchemaNode],
    path: &mut TraversablePath,
) -> Result<Vec<PhysicalField>> {
    let mut fields = Vec::with_capacity(nodes.len());

    for node in nodes {
        path.push(node.key());
        let field = if node.is_group() {
            let children = reconcile_children(node.children(), path)?;
            if children.is_empty() {
                debug!(path = %path, "dropping empty group");
                None
            } else {
                let group_type = physical_type(CanonicalType::Object).ok_or_else(|| {
                    SheafError::Internal("object has no physical mapping".to_string())
                })?;
                Some(PhysicalField {
                    name: node.key().to_string(),
                    physical_type: group_type,
                    repetition: Repetition::Optional,
                    children,
                })
            }
        } else {
            Some(PhysicalField {
                name: node.key().to_string(),
                physical_type: reconcile_at(path, node.declared_type())?,
                repetition: Repetition::Optional,
                children: Vec::new(),
            })
        };
        path.pop();

        fields.extend(field);
    }

    Ok(fields)
}

fn collect_columns(
    fields: &[PhysicalField],
    path: &mut TraversablePath,
    out: &mut Vec<ColumnDescriptor>,
) {
    for field in fields {
        path.push(field.name.clone());
        if field.physical_type == PhysicalType::Group {
            collect_columns(&field.children, path, out);
        } else {
            out.push(ColumnDescriptor {
                path: path.clone(),
                physical_type: field.physical_type,
            });
        }
        path.pop();
    }
}
