//! Wire formats
//!
//! Alarm payloads and batch documents are JSON. Payloads carry the decision
//! score and the raw values that caused it:
//!
//! ```text
//! {"alarm":0.78,"values":{"t":89.0,"p":301.0}}
//! ```

use alarmguard_core::{AlarmPayload, Reading, SensorValues};
use serde::{Deserialize, Serialize};

use crate::ConnectorError;

/// One device entry in a batch document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub device_id: String,
    pub values: SensorValues,
}

impl From<DeviceReading> for Reading {
    fn from(entry: DeviceReading) -> Self {
        Reading::new(entry.device_id, entry.values.t, entry.values.p)
    }
}

/// Batch document as stored by upstream collectors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchDocument {
    pub readings: Vec<DeviceReading>,
}

impl BatchDocument {
    /// Convert into core readings, preserving order
    pub fn into_readings(self) -> Vec<Reading> {
        self.readings.into_iter().map(Reading::from).collect()
    }
}

/// Serialize an alarm payload for publishing
pub fn encode_payload(payload: &AlarmPayload) -> Result<Vec<u8>, ConnectorError> {
    serde_json::to_vec(payload).map_err(|e| ConnectorError::Codec(e.to_string()))
}

/// Decode a batch document into readings
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<Reading>, ConnectorError> {
    let document: BatchDocument = serde_json::from_slice(bytes)
        .map_err(|e| ConnectorError::SourceUnavailable(format!("malformed batch document: {e}")))?;
    Ok(document.into_readings())
}
