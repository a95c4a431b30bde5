//! Runner configuration
//!
//! Loaded once at startup from a JSON file and never reloaded:
//!
//! ```json
//! {
//!   "alarm": { "max_temp": 200, "max_pressure": 800, "alarm_threshold": 0.6,
//!              "output_topic_prefix": "plant-3/alarms" },
//!   "mqtt": { "host": "broker.local", "port": 1883, "client_id": "gateway-7",
//!             "username": "gateway", "password": "secret", "qos": 1 },
//!   "classifier": "network"
//! }
//! ```
//!
//! Every section is optional; missing fields take their defaults. The file is
//! validated as a whole before anything runs.

use std::path::Path;
use std::time::Duration;

use alarmguard_core::AlarmConfig;
use serde::{Deserialize, Serialize};

use crate::ConnectorError;

/// Which learner backs the classifier tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    /// Feed-forward sigmoid network
    #[default]
    Network,
    /// Distance-weighted nearest neighbours
    Neighbors,
}

/// MQTT broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Optional username
    pub username: Option<String>,
    /// Optional password (sent only with a username)
    pub password: Option<String>,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// Quality of service: 0, 1 or 2
    pub qos: u8,
    /// Upper bound on a single publish, in milliseconds
    pub publish_timeout_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "alarmguard".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 30,
            qos: 1,
            publish_timeout_ms: 5_000,
        }
    }
}

impl MqttConfig {
    /// Settings for `host:port` with defaults elsewhere
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the client identifier
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Authenticate with username and password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the quality of service
    pub fn qos(mut self, qos: u8) -> Self {
        self.qos = qos;
        self
    }

    /// Keep-alive interval
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Publish timeout
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    /// Reject settings the client cannot use
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.host.is_empty() {
            return Err(ConnectorError::ConfigError("mqtt.host is empty".into()));
        }
        if self.client_id.is_empty() {
            return Err(ConnectorError::ConfigError("mqtt.client_id is empty".into()));
        }
        if self.qos > 2 {
            return Err(ConnectorError::ConfigError(format!("mqtt.qos {} is not 0, 1 or 2", self.qos)));
        }
        if self.keep_alive_secs == 0 {
            return Err(ConnectorError::ConfigError("mqtt.keep_alive_secs must be at least 1".into()));
        }
        if self.publish_timeout_ms == 0 {
            return Err(ConnectorError::ConfigError("mqtt.publish_timeout_ms must be at least 1".into()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConnectorError::ConfigError("mqtt.password given without username".into()));
        }
        Ok(())
    }
}

/// Everything a batch runner needs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Limits, threshold and topic prefix
    pub alarm: AlarmConfig,
    /// Broker settings
    pub mqtt: MqttConfig,
    /// Learner choice
    pub classifier: ClassifierKind,
}

impl RunnerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConnectorError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConnectorError::ConfigError(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConnectorError::ConfigError(format!("{}: {e}", path.display())))?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConnectorError> {
        self.alarm.validate()?;
        self.mqtt.validate()
    }
}
