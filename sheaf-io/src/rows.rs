//! Row input: one JSON array of leaf values per line

use serde_json::Value;
use sheaf_format::Result;
use std::io::BufRead;

/// Iterator over NDJSON rows, each line a JSON array aligned with the columns.
///
/// Blank lines are skipped. A line that is not a JSON array yields an error.
pub struct NdjsonRows<R: BufRead> {
    reader: R,
    line: String,
}

impl<R: BufRead> NdjsonRows<R> {
    /// Read rows from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for NdjsonRows<R> {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = self.line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(Into::into));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheaf_format::SheafError;
    use std::io::Cursor;

    #[test]
    fn test_rows_skip_blank_lines() {
        let input = "[1, \"a\"]\n\n   \n[null, \"b\"]\n";
        let rows: Vec<Vec<Value>> = NdjsonRows::new(Cursor::new(input))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows, vec![vec![json!(1), json!("a")], vec![Value::Null, json!("b")]]);
    }

    #[test]
    fn test_object_line_rejected() {
        let mut rows = NdjsonRows::new(Cursor::new("{\"a\": 1}\n"));
        assert!(matches!(rows.next(), Some(Err(SheafError::Json(_)))));
    }
}
