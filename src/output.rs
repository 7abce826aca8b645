//! Newline-delimited bulk-load output: an action line followed by the JSON
//! document, for every record.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{config::DEFAULT_ACTION_LINE, Error, Result};

pub struct BulkWriter<W: Write> {
    inner: BufWriter<W>,
    action_line: String,
    written: usize,
}

impl BulkWriter<File> {
    /// Creates (or truncates) the output file.
    ///
    /// # Errors
    ///
    /// When the file cannot be created.
    pub fn create(path: &Path, action_line: impl Into<String>) -> Result<Self> {
        let file = File::create(path).map_err(|source| Error::Output {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file).with_action_line(action_line))
    }
}

impl<W: Write> BulkWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
            action_line: DEFAULT_ACTION_LINE.to_string(),
            written: 0,
        }
    }

    #[must_use]
    pub fn with_action_line(mut self, action_line: impl Into<String>) -> Self {
        self.action_line = action_line.into();
        self
    }

    /// Writes the action line and `record` as one JSON line.
    ///
    /// # Errors
    ///
    /// When serialization or the underlying writer fails.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        writeln!(self.inner, "{}", self.action_line)?;
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// # Errors
    ///
    /// When the underlying writer fails to flush.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// When the buffered data cannot be flushed.
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|err| Error::IO(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::BulkWriter;

    #[test]
    fn each_record_is_preceded_by_the_action_line() {
        let mut writer = BulkWriter::new(Vec::new());
        writer
            .write_record(&json!({"id": "DOID:0001", "name": "sample disease"}))
            .expect("writes");
        writer
            .write_record(&json!({"id": "DOID:0002", "name": "other disease"}))
            .expect("writes");
        assert_eq!(writer.written(), 2);

        let output = String::from_utf8(writer.into_inner().expect("flushes")).expect("utf8");
        insta::assert_snapshot!(output, @r#"
        { "create":{ } }
        {"id":"DOID:0001","name":"sample disease"}
        { "create":{ } }
        {"id":"DOID:0002","name":"other disease"}
        "#);
    }

    #[test]
    fn action_line_is_configurable() {
        let mut writer = BulkWriter::new(Vec::new()).with_action_line(r#"{"index":{}}"#);
        writer.write_record(&json!({"id": "DOID:1"})).expect("writes");
        let output = String::from_utf8(writer.into_inner().expect("flushes")).expect("utf8");
        assert_eq!(output, "{\"index\":{}}\n{\"id\":\"DOID:1\"}\n");
    }
}
