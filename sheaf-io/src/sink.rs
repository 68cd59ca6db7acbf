//! Record sinks receiving nested rows

use serde_json::{Map, Value};
use sheaf_format::{Result, SheafError};
use std::io::{BufWriter, Write};

/// Destination for nested records.
///
/// This is the hand-off point to a columnar writer; implementations receive
/// records in row order.
pub trait RecordSink {
    /// Accept one nested record
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Writes one JSON object per line
pub struct NdjsonSink<W: Write> {
    writer: BufWriter<W>,
    records_written: u64,
}

impl<W: Write> NdjsonSink<W> {
    /// Wrap an output stream
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            records_written: 0,
        }
    }

    /// Records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and return the underlying stream
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| SheafError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for NdjsonSink<W> {
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<Map<String, Value>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far
    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    /// Surrender the collected records
    pub fn into_records(self) -> Vec<Map<String, Value>> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ndjson_sink_writes_lines() {
        let mut sink = NdjsonSink::new(Vec::new());
        sink.write_record(&record(json!({"a": {"b": 1}}))).unwrap();
        sink.write_record(&record(json!({"a": {"b": 2}}))).unwrap();
        assert_eq!(sink.records_written(), 2);

        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\"a\":{\"b\":1}}\n{\"a\":{\"b\":2}}\n");
    }

    #[test]
    fn test_ndjson_sink_keeps_key_order() {
        let mut sink = NdjsonSink::new(Vec::new());
        sink.write_record(&record(json!({"z": 1, "a": 2}))).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(text, "{\"z\":1,\"a\":2}\n");
    }

    #[test]
    fn test_memory_sink_through_mut_ref() {
        fn feed<S: RecordSink>(mut sink: S) {
            sink.write_record(&record(json!({"k": "v"}))).unwrap();
            sink.flush().unwrap();
        }

        let mut sink = MemorySink::new();
        feed(&mut sink);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.into_records()[0]["k"], json!("v"));
    }
}
