//! One decision cycle: fetch, dispatch, publish, disconnect

use alarmguard_core::{
    AlarmConfig, AlarmEngine, BatchReport, BinaryClassifier, ReadingDispatcher, Scorable, TrainingSet,
};
use alarmguard_ml::{FeedForwardNetwork, NearestNeighbors, NetworkConfig, DEFAULT_NEIGHBORS};

use crate::codec::encode_payload;
use crate::config::{ClassifierKind, RunnerConfig};
use crate::{ConnectorError, Publisher, ReadingSource};

/// A publish that did not go through
#[derive(Debug)]
pub struct FailedPublish {
    /// Topic the alarm was meant for
    pub topic: String,
    /// What went wrong
    pub error: ConnectorError,
}

/// Outcome of a completed run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Dispatcher counters for the batch
    pub report: BatchReport,
    /// Alarms handed to the publisher
    pub attempted: usize,
    /// Alarms the publisher accepted
    pub published: usize,
    /// Alarms the publisher rejected
    pub failed: Vec<FailedPublish>,
}

/// Drives a dispatcher between a source and a publisher
pub struct BatchRunner<C> {
    engine: AlarmEngine<C>,
    dispatcher: ReadingDispatcher,
}

impl<C: BinaryClassifier> BatchRunner<C> {
    /// Runner over the built-in training set
    pub fn new(config: AlarmConfig, classifier: C) -> Result<Self, ConnectorError> {
        Self::with_training_set(config, classifier, TrainingSet::fixed())
    }

    /// Runner over a caller-supplied training set
    pub fn with_training_set(
        config: AlarmConfig,
        classifier: C,
        training: TrainingSet,
    ) -> Result<Self, ConnectorError> {
        Ok(Self {
            engine: AlarmEngine::new(config, classifier)?,
            dispatcher: ReadingDispatcher::new(training),
        })
    }

    /// Engine, including the classifier trained by the last run
    pub fn engine(&self) -> &AlarmEngine<C> {
        &self.engine
    }

    /// Dispatcher state and last report
    pub fn dispatcher(&self) -> &ReadingDispatcher {
        &self.dispatcher
    }

    /// Run one cycle.
    ///
    /// Every alarm the dispatcher produced is attempted even if earlier ones
    /// fail. The publisher is disconnected exactly once before returning,
    /// whatever happened. A source or dispatch error is returned as is; failed
    /// publishes are reported as `ConnectorError::PublishFailed`.
    pub fn run<S, P>(&mut self, source: &mut S, publisher: &mut P) -> Result<BatchSummary, ConnectorError>
    where
        S: ReadingSource + ?Sized,
        P: Publisher + ?Sized,
    {
        let outcome = self.fetch_and_publish(source, publisher);
        let closed = publisher.disconnect();

        let summary = match (outcome, closed) {
            (Ok(summary), Ok(())) => summary,
            (Ok(summary), Err(err)) => {
                log::warn!("disconnect after batch failed: {err}");
                if summary.failed.is_empty() {
                    return Err(err);
                }
                summary
            }
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    log::warn!("disconnect after failed batch also failed: {close_err}");
                }
                return Err(err);
            }
        };

        if !summary.failed.is_empty() {
            return Err(ConnectorError::PublishFailed {
                failed: summary.failed.len(),
                attempted: summary.attempted,
            });
        }

        log::info!("batch published {} of {} alarms", summary.published, summary.attempted);
        Ok(summary)
    }

    fn fetch_and_publish<S, P>(&mut self, source: &mut S, publisher: &mut P) -> Result<BatchSummary, ConnectorError>
    where
        S: ReadingSource + ?Sized,
        P: Publisher + ?Sized,
    {
        let readings = source.fetch_batch()?;
        let actions = self.dispatcher.dispatch(&readings, &mut self.engine)?;

        let mut summary = BatchSummary {
            report: self.dispatcher.last_report(),
            ..BatchSummary::default()
        };

        for action in actions {
            summary.attempted += 1;
            let sent = encode_payload(&action.payload).and_then(|bytes| publisher.publish(&action.topic, &bytes));
            match sent {
                Ok(()) => summary.published += 1,
                Err(error) => {
                    log::warn!("alarm for {} not published: {error}", action.topic);
                    summary.failed.push(FailedPublish {
                        topic: action.topic,
                        error,
                    });
                }
            }
        }

        Ok(summary)
    }
}

impl BatchRunner<Box<dyn BinaryClassifier>> {
    /// Runner with the learner named in `config`
    pub fn from_config(config: &RunnerConfig) -> Result<Self, ConnectorError> {
        config.validate()?;
        let classifier: Box<dyn BinaryClassifier> = match config.classifier {
            ClassifierKind::Network => Box::new(FeedForwardNetwork::new(NetworkConfig::default())?),
            ClassifierKind::Neighbors => Box::new(NearestNeighbors::new(DEFAULT_NEIGHBORS)?),
        };
        log::debug!("classifier: {}", classifier.name());
        Self::new(config.alarm.clone(), classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryPublisher, MemorySource};
    use alarmguard_core::{AlarmResult, LabeledPoint, NormalizedPoint, Reading, Trainable};

    /// Scores every reading at 0.9 once trained
    struct AlwaysHigh {
        trained: bool,
    }

    impl Trainable for AlwaysHigh {
        fn train(&mut self, _examples: &[LabeledPoint]) -> AlarmResult<()> {
            self.trained = true;
            Ok(())
        }

        fn is_trained(&self) -> bool {
            self.trained
        }
    }

    impl Scorable for AlwaysHigh {
        fn score(&self, _point: NormalizedPoint) -> AlarmResult<f64> {
            Ok(0.9)
        }
    }

    struct BrokenSource;

    /// Publisher whose disconnect always fails
    #[derive(Default)]
    struct StuckPublisher {
        disconnects: usize,
    }

    impl Publisher for StuckPublisher {
        fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), ConnectorError> {
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), ConnectorError> {
            self.disconnects += 1;
            Err(ConnectorError::Publish("socket already closed".into()))
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    impl ReadingSource for BrokenSource {
        fn fetch_batch(&mut self) -> Result<Vec<Reading>, ConnectorError> {
            Err(ConnectorError::SourceUnavailable("bucket offline".into()))
        }
    }

    fn runner() -> BatchRunner<AlwaysHigh> {
        BatchRunner::new(AlarmConfig::default(), AlwaysHigh { trained: false }).unwrap()
    }

    #[test]
    fn publishes_every_alarm_and_disconnects() {
        let mut publisher = MemoryPublisher::new();
        let summary = runner().run(&mut MemorySource::demo(), &mut publisher).unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.published, 3);
        assert_eq!(publisher.topics(), ["alarms/foo", "alarms/bar", "alarms/foobar"]);
        assert_eq!(publisher.disconnects(), 1);
    }

    #[test]
    fn partial_failure_still_attempts_the_rest() {
        let mut publisher = MemoryPublisher::new().fail_topic("alarms/foo");
        let err = runner().run(&mut MemorySource::demo(), &mut publisher).unwrap_err();

        assert!(matches!(err, ConnectorError::PublishFailed { failed: 1, attempted: 3 }));
        assert_eq!(publisher.attempts(), 3);
        assert_eq!(publisher.topics(), ["alarms/bar", "alarms/foobar"]);
        assert_eq!(publisher.disconnects(), 1);
    }

    #[test]
    fn source_failure_disconnects_once() {
        let mut publisher = MemoryPublisher::new();
        let err = runner().run(&mut BrokenSource, &mut publisher).unwrap_err();

        assert!(matches!(err, ConnectorError::SourceUnavailable(_)));
        assert_eq!(publisher.attempts(), 0);
        assert_eq!(publisher.disconnects(), 1);
    }

    #[test]
    fn empty_batch_publishes_nothing() {
        let mut publisher = MemoryPublisher::new();
        let summary = runner().run(&mut MemorySource::new(Vec::new()), &mut publisher).unwrap();

        assert_eq!(summary.attempted, 0);
        assert_eq!(publisher.disconnects(), 1);
    }

    #[test]
    fn source_error_wins_over_disconnect_error() {
        let mut publisher = StuckPublisher::default();
        let err = runner().run(&mut BrokenSource, &mut publisher).unwrap_err();

        assert!(matches!(err, ConnectorError::SourceUnavailable(_)));
        assert_eq!(publisher.disconnects, 1);
    }

    #[test]
    fn disconnect_error_surfaces_when_nothing_else_failed() {
        let mut publisher = StuckPublisher::default();
        let err = runner().run(&mut MemorySource::demo(), &mut publisher).unwrap_err();

        assert!(matches!(err, ConnectorError::Publish(_)));
        assert_eq!(publisher.disconnects, 1);
    }
}
