//! Destination writers.
//!
//! [`FileWriter`] delivers a serialized document into a directory, one file
//! per message. [`NdjsonWriter`] streams documents one JSON object per line
//! for batch runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::entity::Entity;

/// Error type for serialization operations
#[derive(Debug)]
pub enum SerializationError {
    JsonError(serde_json::Error),
    IoError(std::io::Error),
    /// The requested file name would escape the output directory.
    InvalidFileName(String),
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        SerializationError::JsonError(err)
    }
}

impl From<std::io::Error> for SerializationError {
    fn from(err: std::io::Error) -> Self {
        SerializationError::IoError(err)
    }
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationError::JsonError(e) => write!(f, "JSON error: {}", e),
            SerializationError::IoError(e) => write!(f, "IO error: {}", e),
            SerializationError::InvalidFileName(name) => {
                write!(f, "Invalid output file name: '{}'", name)
            }
        }
    }
}

impl std::error::Error for SerializationError {}

/// Record of one file written by [`FileWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub path: PathBuf,
    pub bytes: usize,
    pub written_at: DateTime<Utc>,
}

/// Writes payloads as files inside an output directory.
#[derive(Debug, Clone)]
pub struct FileWriter {
    dir: PathBuf,
}

impl FileWriter {
    /// Create a writer for a directory. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a payload to `<dir>/<file_name>`, replacing any existing file.
    pub fn write(&self, file_name: &str, payload: &str) -> Result<Delivery, SerializationError> {
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            return Err(SerializationError::InvalidFileName(file_name.to_string()));
        }

        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(file_name);
        fs::write(&path, payload)?;

        tracing::debug!(path = %path.display(), bytes = payload.len(), "wrote output file");

        Ok(Delivery {
            path,
            bytes: payload.len(),
            written_at: Utc::now(),
        })
    }
}

/// NDJSON (Newline Delimited JSON) writer
///
/// Writes entities as NDJSON, one JSON object per line.
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    /// Create a new NDJSON writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a single entity as an NDJSON line
    pub fn write<T: Entity>(&mut self, entity: &T) -> Result<(), SerializationError> {
        let line = entity.to_ndjson_line()?;
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Write multiple entities
    pub fn write_all<T: Entity>(&mut self, entities: &[T]) -> Result<(), SerializationError> {
        for entity in entities {
            self.write(entity)?;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        self.writer.flush()?;
        Ok(())
    }
}
