//! Reading sources

use std::path::{Path, PathBuf};

use alarmguard_core::Reading;

use crate::{codec::decode_batch, ConnectorError, ReadingSource};

/// Fixed in-memory batch
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    readings: Vec<Reading>,
}

impl MemorySource {
    /// Source that returns `readings` on every fetch
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    /// Three-device sample batch for smoke tests
    pub fn demo() -> Self {
        Self::new(vec![
            Reading::new("foo", 100.0, 300.0),
            Reading::new("bar", 120.0, 320.0),
            Reading::new("foobar", 90.0, 120.0),
        ])
    }
}

impl ReadingSource for MemorySource {
    fn fetch_batch(&mut self) -> Result<Vec<Reading>, ConnectorError> {
        Ok(self.readings.clone())
    }
}

/// Batch document stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source reading `path` on every fetch
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSource for JsonFileSource {
    fn fetch_batch(&mut self) -> Result<Vec<Reading>, ConnectorError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            ConnectorError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let readings = decode_batch(&bytes)?;
        log::debug!("read {} readings from {}", readings.len(), self.path.display());
        Ok(readings)
    }
}
