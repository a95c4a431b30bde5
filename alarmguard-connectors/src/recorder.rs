//! In-memory publisher
//!
//! Keeps every publish for inspection. Topics registered with
//! [`MemoryPublisher::fail_topic`] are rejected with `ConnectorError::Publish`,
//! which lets callers exercise partial-failure handling without a broker.

use std::collections::HashSet;

use crate::{ConnectorError, Publisher};

/// Publisher that records instead of sending
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    published: Vec<(String, Vec<u8>)>,
    failing: HashSet<String>,
    attempts: usize,
    disconnects: usize,
}

impl MemoryPublisher {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every publish to `topic`
    pub fn fail_topic(mut self, topic: impl Into<String>) -> Self {
        self.failing.insert(topic.into());
        self
    }

    /// Successful publishes in order
    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    /// Topics of successful publishes in order
    pub fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|(topic, _)| topic.as_str()).collect()
    }

    /// Publish calls, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Times `disconnect` was called
    pub fn disconnects(&self) -> usize {
        self.disconnects
    }
}

impl Publisher for MemoryPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        self.attempts += 1;
        if self.disconnects > 0 {
            return Err(ConnectorError::NotConnected);
        }
        if self.failing.contains(topic) {
            return Err(ConnectorError::Publish(format!("{topic} rejected")));
        }
        self.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ConnectorError> {
        self.disconnects += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.disconnects == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_fails_topics() {
        let mut publisher = MemoryPublisher::new().fail_topic("alarms/bad");

        publisher.publish("alarms/good", b"{}").unwrap();
        assert!(publisher.publish("alarms/bad", b"{}").is_err());

        assert_eq!(publisher.topics(), ["alarms/good"]);
        assert_eq!(publisher.attempts(), 2);
    }

    #[test]
    fn publish_after_disconnect_fails() {
        let mut publisher = MemoryPublisher::new();
        publisher.disconnect().unwrap();
        assert!(!publisher.is_connected());
        assert!(matches!(
            publisher.publish("alarms/x", b"{}"),
            Err(ConnectorError::NotConnected)
        ));
    }
}
