//! MQTT publisher
//!
//! Blocking client on top of `rumqttc`. The event loop is driven inline: each
//! publish pushes the request and then polls the connection until the broker
//! has it (written to the socket for QoS 0, `PUBACK` for QoS 1, `PUBCOMP` for
//! QoS 2) or the configured timeout runs out. One publish is in flight at a
//! time, so the first acknowledgement seen belongs to it.

use std::time::Instant;

use rumqttc::{Client, Connection, Event, MqttOptions, Outgoing, Packet, QoS};

use crate::config::MqttConfig;
use crate::{ConnectorError, Publisher};

/// Request channel capacity; publishes are sequential so a handful is plenty
const REQUEST_CAPACITY: usize = 10;

/// Publisher backed by an MQTT broker connection
pub struct MqttPublisher {
    client: Client,
    connection: Connection,
    config: MqttConfig,
    qos: QoS,
    healthy: bool,
    closed: bool,
}

impl MqttPublisher {
    /// Open a session and wait for the broker's `CONNACK`
    pub fn connect(config: &MqttConfig) -> Result<Self, ConnectorError> {
        config.validate()?;

        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive());
        if let Some(username) = &config.username {
            options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let mut publisher = Self {
            client,
            connection,
            config: config.clone(),
            qos: qos_level(config.qos)?,
            healthy: false,
            closed: false,
        };

        publisher.await_connack()?;
        log::info!(
            "connected to mqtt broker {}:{} as {}",
            publisher.config.host,
            publisher.config.port,
            publisher.config.client_id
        );
        Ok(publisher)
    }

    /// Settings this publisher was opened with
    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    fn await_connack(&mut self) -> Result<(), ConnectorError> {
        let endpoint = format!("{}:{}", self.config.host, self.config.port);
        self.drive_until(|event| matches!(event, Event::Incoming(Packet::ConnAck(_))))
            .map_err(|reason| ConnectorError::Publish(format!("connecting to {endpoint}: {reason}")))?;
        self.healthy = true;
        Ok(())
    }

    /// Poll the event loop until `done` accepts an event or the publish timeout expires
    fn drive_until(&mut self, mut done: impl FnMut(&Event) -> bool) -> Result<(), String> {
        let deadline = Instant::now() + self.config.publish_timeout();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(format!("no response within {} ms", self.config.publish_timeout_ms));
            }

            match self.connection.recv_timeout(remaining) {
                Ok(Ok(event)) => {
                    if done(&event) {
                        return Ok(());
                    }
                }
                Ok(Err(e)) => {
                    self.healthy = false;
                    return Err(e.to_string());
                }
                Err(_) => {
                    return Err(format!("no response within {} ms", self.config.publish_timeout_ms));
                }
            }
        }
    }
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        if self.closed {
            return Err(ConnectorError::NotConnected);
        }

        self.client
            .publish(topic, self.qos, false, payload.to_vec())
            .map_err(|e| ConnectorError::Publish(format!("{topic}: {e}")))?;

        let qos = self.qos;
        self.drive_until(|event| match (qos, event) {
            (QoS::AtMostOnce, Event::Outgoing(Outgoing::Publish(_))) => true,
            (QoS::AtLeastOnce, Event::Incoming(Packet::PubAck(_))) => true,
            (QoS::ExactlyOnce, Event::Incoming(Packet::PubComp(_))) => true,
            _ => false,
        })
        .map_err(|reason| ConnectorError::Publish(format!("{topic}: {reason}")))?;

        self.healthy = true;
        log::debug!("published {} bytes to {}", payload.len(), topic);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ConnectorError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.client
            .disconnect()
            .map_err(|e| ConnectorError::Publish(format!("disconnect: {e}")))?;

        // The loop ends with an error right after the DISCONNECT goes out
        let flushed = self.drive_until(|event| matches!(event, Event::Outgoing(Outgoing::Disconnect)));
        self.healthy = false;
        if let Err(reason) = flushed {
            log::debug!("mqtt disconnect did not flush cleanly: {reason}");
        }
        log::info!("disconnected from mqtt broker {}:{}", self.config.host, self.config.port);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.healthy && !self.closed
    }
}

/// Map a numeric quality of service onto the client's enum
fn qos_level(qos: u8) -> Result<QoS, ConnectorError> {
    match qos {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(ConnectorError::ConfigError(format!("mqtt.qos {other} is not 0, 1 or 2"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_levels() {
        assert_eq!(qos_level(0).unwrap(), QoS::AtMostOnce);
        assert_eq!(qos_level(1).unwrap(), QoS::AtLeastOnce);
        assert_eq!(qos_level(2).unwrap(), QoS::ExactlyOnce);
        assert!(qos_level(3).is_err());
    }

    #[test]
    fn invalid_config_rejected_before_connecting() {
        let config = MqttConfig::new("", 1883);
        assert!(matches!(
            MqttPublisher::connect(&config),
            Err(ConnectorError::ConfigError(_))
        ));
    }
}
