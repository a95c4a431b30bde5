//! Collaborators for the AlarmGuard decision pipeline
//!
//! ## Overview
//!
//! The core crate decides; this crate moves data. It provides the two
//! boundaries a decision cycle needs plus the glue that runs one cycle:
//!
//! ```text
//! ReadingSource ──► BatchRunner ──► ReadingDispatcher ──► Publisher ──► disconnect()
//!  (file, memory)       │              (core)             (MQTT, memory)
//!                       └── RunnerConfig (JSON, loaded once)
//! ```
//!
//! ## Sources
//!
//! - [`JsonFileSource`]: a batch document on disk,
//!   `{"readings":[{"device_id":"foo","values":{"t":100,"p":300}}]}`
//! - [`MemorySource`]: a fixed batch, for tests and demos
//!
//! ## Publishers
//!
//! ### MQTT
//!
//! **When to use:** the default transport. Alarms are small (a score and two
//! values), go to one topic per device (`<prefix>/<device_id>`) and usually
//! have several consumers (dashboards, pagers, historians).
//!
//! **Characteristics:**
//! - Username/password authentication, client id per gateway
//! - QoS 0/1/2 per deployment; QoS 1 waits for the broker's acknowledgement
//! - Every publish is bounded by a timeout
//!
//! ### Memory
//!
//! Records every publish; can be told to fail chosen topics.
//!
//! ## Lifecycle Guarantees
//!
//! [`BatchRunner::run`] attempts every alarm the dispatcher produced, even if
//! some publishes fail, and calls [`Publisher::disconnect`] exactly once per run
//! on every path, including source and training failures.
//!
//! ## Example Usage
//!
//! ```no_run
//! use alarmguard_connectors::{BatchRunner, JsonFileSource, MqttPublisher, RunnerConfig};
//!
//! let config = RunnerConfig::from_path("alarmguard.json")?;
//! let mut runner = BatchRunner::from_config(&config)?;
//! let mut source = JsonFileSource::new("batch.json");
//! let mut mqtt = MqttPublisher::connect(&config.mqtt)?;
//!
//! let summary = runner.run(&mut source, &mut mqtt)?;
//! println!("{} alarms published", summary.published);
//! # Ok::<(), alarmguard_connectors::ConnectorError>(())
//! ```

pub mod codec;
pub mod config;
pub mod recorder;
pub mod runner;
pub mod source;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
pub use codec::{decode_batch, encode_payload, BatchDocument, DeviceReading};
pub use config::{ClassifierKind, MqttConfig, RunnerConfig};
pub use recorder::MemoryPublisher;
pub use runner::{BatchRunner, BatchSummary, FailedPublish};
pub use source::{JsonFileSource, MemorySource};

#[cfg(feature = "mqtt")]
pub use mqtt::MqttPublisher;

use alarmguard_core::{AlarmError, Reading};
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Reading source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("{failed} of {attempted} alarm publishes failed")]
    PublishFailed { failed: usize, attempted: usize },

    #[error("Not connected")]
    NotConnected,

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Alarm(#[from] AlarmError),
}

/// Where a batch of readings comes from
pub trait ReadingSource {
    /// Fetch and decode the next batch.
    ///
    /// Fails with `ConnectorError::SourceUnavailable` when the backing store
    /// cannot be read or its content cannot be decoded.
    fn fetch_batch(&mut self) -> Result<Vec<Reading>, ConnectorError>;
}

/// Where alarms go
pub trait Publisher {
    /// Send one encoded alarm
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectorError>;

    /// Release the connection
    fn disconnect(&mut self) -> Result<(), ConnectorError>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn fetch_batch(&mut self) -> Result<Vec<Reading>, ConnectorError> {
        (**self).fetch_batch()
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        (**self).publish(topic, payload)
    }

    fn disconnect(&mut self) -> Result<(), ConnectorError> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
