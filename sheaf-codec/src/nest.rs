//! Re-nesting of flat, positionally aligned row values

use serde_json::{Map, Value};
use sheaf_format::{Result, SheafError, TraversablePath};

/// Re-nests flat rows into hierarchical records.
///
/// `values[i]` of every row belongs to `paths[i]`. Paths are tokenized once
/// when the nester is created and reused for every row of a session.
#[derive(Debug, Clone)]
pub struct RowNester {
    paths: Vec<TraversablePath>,
}

impl RowNester {
    /// Create a nester for ordered leaf paths
    pub fn new(paths: Vec<TraversablePath>) -> Self {
        Self { paths }
    }

    /// Create a nester from dot-delimited path strings
    pub fn from_dotted<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| TraversablePath::parse_dotted(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(paths))
    }

    /// Leaf paths in column order
    pub fn paths(&self) -> &[TraversablePath] {
        &self.paths
    }

    /// Nest one row of values
    pub fn nest(&self, values: Vec<Value>) -> Result<Map<String, Value>> {
        nest_row(&self.paths, values)
    }
}

/// Nest `values` under `paths`, creating shared containers for common prefixes
pub fn nest_row(paths: &[TraversablePath], values: Vec<Value>) -> Result<Map<String, Value>> {
    if paths.len() != values.len() {
        return Err(SheafError::ArityMismatch {
            fields: paths.len(),
            values: values.len(),
        });
    }

    let mut record = Map::new();
    for (path, value) in paths.iter().zip(values) {
        insert_at(&mut record, path, value)?;
    }
    Ok(record)
}

fn insert_at(record: &mut Map<String, Value>, path: &TraversablePath, value: Value) -> Result<()> {
    let (terminal, parents) = path
        .split_last()
        .ok_or_else(|| SheafError::Internal("cannot nest under an empty path".to_string()))?;

    let mut container = record;
    for (idx, token) in parents.iter().enumerate() {
        let slot = container
            .entry(token.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        container = match slot {
            Value::Object(map) => map,
            _ => return Err(SheafError::PathConflict(path[..=idx].join("."))),
        };
    }

    if matches!(container.get(terminal), Some(Value::Object(_))) {
        return Err(SheafError::PathConflict(path.dotted()));
    }
    container.insert(terminal.clone(), value);
    Ok(())
}
