//! Batch dispatch: readings in, publish actions out
//!
//! ## Batch Lifecycle
//!
//! ```text
//! Idle ──► Training ──► Evaluating(0 of N) ──► ... ──► Evaluating(N-1 of N) ──► Completed
//!              │
//!              └──► Failed (no actions emitted)
//! ```
//!
//! The classifier is trained exactly once per batch and every reading is then
//! scored against that snapshot. Readings are evaluated in order and
//! independently. A triggered decision always yields exactly one
//! [`PublishAction`]; readings that do not trigger yield nothing (there is no
//! "ok" heartbeat).
//!
//! The dispatcher performs no I/O. It returns the actions for a publisher to
//! execute and records a [`BatchReport`] for the caller's lifecycle handling.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    engine::{AlarmDecision, AlarmEngine, DecisionReason},
    errors::{AlarmError, AlarmResult},
    reading::{Reading, SensorValues},
    traits::BinaryClassifier,
    training::TrainingSet,
};

/// Body of an outbound alarm
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmPayload {
    /// Decision score (1.0 for hard-limit alarms)
    pub alarm: f64,
    /// Raw values of the reading that alarmed
    pub values: SensorValues,
}

/// One alarm notification to publish
#[derive(Debug, Clone, PartialEq)]
pub struct PublishAction {
    /// `<prefix>/<device_id>`
    pub topic: String,
    /// Message body
    pub payload: AlarmPayload,
    /// Tier that triggered the alarm
    pub reason: DecisionReason,
}

/// Where the dispatcher is in the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// No batch started yet
    Idle,
    /// Fitting the classifier
    Training,
    /// Scoring reading `index` of `total`
    Evaluating {
        /// Zero-based position of the reading being evaluated
        index: usize,
        /// Readings in the batch
        total: usize,
    },
    /// Every reading evaluated
    Completed,
    /// Batch aborted; nothing is published
    Failed,
}

/// Counters for the last batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Readings decided (triggered or not)
    pub evaluated: usize,
    /// Readings that produced an action
    pub triggered: usize,
    /// Of `triggered`, how many came from hard limits
    pub hard_limit: usize,
    /// Readings skipped because their values were not finite
    pub skipped: usize,
}

/// Turns batches of readings into publish actions
#[derive(Debug, Clone)]
pub struct ReadingDispatcher {
    training: TrainingSet,
    state: BatchState,
    report: BatchReport,
}

impl Default for ReadingDispatcher {
    fn default() -> Self {
        Self::new(TrainingSet::fixed())
    }
}

impl ReadingDispatcher {
    /// Dispatcher training on `training` at the start of every batch
    pub fn new(training: TrainingSet) -> Self {
        Self {
            training,
            state: BatchState::Idle,
            report: BatchReport::default(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Counters for the most recent batch
    pub fn last_report(&self) -> BatchReport {
        self.report
    }

    /// Training data used per batch
    pub fn training_set(&self) -> &TrainingSet {
        &self.training
    }

    /// Evaluate a batch.
    ///
    /// Trains `engine` once, then decides every reading. Returns one action per
    /// triggered reading, in reading order. If training fails the whole batch
    /// fails and no action is returned.
    pub fn dispatch<C: BinaryClassifier>(
        &mut self,
        readings: &[Reading],
        engine: &mut AlarmEngine<C>,
    ) -> AlarmResult<Vec<PublishAction>> {
        self.report = BatchReport::default();
        log_info!("dispatching batch of {} readings", readings.len());

        self.state = BatchState::Training;
        if let Err(err) = engine.train(&self.training) {
            log_warn!("batch failed during training: {}", err);
            self.state = BatchState::Failed;
            return Err(err);
        }

        match self.evaluate(readings, engine) {
            Ok(actions) => {
                self.state = BatchState::Completed;
                log_info!(
                    "batch completed: {} evaluated, {} triggered ({} hard-limit), {} skipped",
                    self.report.evaluated,
                    self.report.triggered,
                    self.report.hard_limit,
                    self.report.skipped
                );
                Ok(actions)
            }
            Err(err) => {
                log_warn!("batch failed during evaluation: {}", err);
                self.state = BatchState::Failed;
                Err(err)
            }
        }
    }

    fn evaluate<C: BinaryClassifier>(
        &mut self,
        readings: &[Reading],
        engine: &AlarmEngine<C>,
    ) -> AlarmResult<Vec<PublishAction>> {
        let total = readings.len();
        let mut actions = Vec::new();

        for (index, reading) in readings.iter().enumerate() {
            self.state = BatchState::Evaluating { index, total };

            let decision = match engine.decide(reading) {
                Ok(decision) => decision,
                Err(AlarmError::InvalidReading) => {
                    log_warn!("skipping reading from {}: values are not finite", reading.device_id);
                    self.report.skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            self.report.evaluated += 1;
            log_debug!(
                "{}: triggered={} score={:.3} reason={}",
                reading.device_id,
                decision.triggered,
                decision.score,
                decision.reason
            );

            if let Some(action) = action_for(engine, reading, &decision) {
                self.report.triggered += 1;
                if action.reason == DecisionReason::HardLimit {
                    self.report.hard_limit += 1;
                }
                actions.push(action);
            }
        }

        Ok(actions)
    }
}

fn action_for<C: BinaryClassifier>(
    engine: &AlarmEngine<C>,
    reading: &Reading,
    decision: &AlarmDecision,
) -> Option<PublishAction> {
    if !decision.triggered {
        return None;
    }

    Some(PublishAction {
        topic: engine.config().topic_for(&reading.device_id),
        payload: AlarmPayload {
            alarm: decision.score,
            values: reading.values(),
        },
        reason: decision.reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AlarmConfig,
        reading::{LabeledPoint, NormalizedPoint},
        traits::{Scorable, Trainable},
    };

    /// Scores by normalized temperature and counts training calls
    #[derive(Debug, Default)]
    struct TemperatureScore {
        trainings: usize,
    }

    impl Trainable for TemperatureScore {
        fn train(&mut self, _examples: &[LabeledPoint]) -> AlarmResult<()> {
            self.trainings += 1;
            Ok(())
        }

        fn is_trained(&self) -> bool {
            self.trainings > 0
        }
    }

    impl Scorable for TemperatureScore {
        fn score(&self, point: NormalizedPoint) -> AlarmResult<f64> {
            if self.trainings == 0 {
                return Err(AlarmError::ClassifierPrecondition);
            }
            Ok(point.t)
        }
    }

    fn engine() -> AlarmEngine<TemperatureScore> {
        let config = AlarmConfig::default().with_topic_prefix("out");
        AlarmEngine::new(config, TemperatureScore::default()).unwrap()
    }

    #[test]
    fn trains_once_per_batch() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::default();
        let readings = [
            Reading::new("a", 10.0, 100.0),
            Reading::new("b", 20.0, 100.0),
            Reading::new("c", 30.0, 100.0),
        ];

        dispatcher.dispatch(&readings, &mut engine).unwrap();
        assert_eq!(engine.classifier().trainings, 1);

        dispatcher.dispatch(&readings, &mut engine).unwrap();
        assert_eq!(engine.classifier().trainings, 2);
    }

    #[test]
    fn one_action_per_triggered_reading() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::default();
        // threshold 0.6 on t / 200: 130 and 150 trigger, 250 breaches the hard limit
        let readings = [
            Reading::new("cold", 20.0, 100.0),
            Reading::new("warm", 130.0, 100.0),
            Reading::new("hot", 150.0, 100.0),
            Reading::new("melting", 250.0, 100.0),
            Reading::new("edge", 120.0, 100.0),
        ];

        let actions = dispatcher.dispatch(&readings, &mut engine).unwrap();
        let topics: Vec<&str> = actions.iter().map(|a| a.topic.as_str()).collect();
        assert_eq!(topics, ["out/warm", "out/hot", "out/melting"]);

        assert_eq!(actions[0].payload.alarm, 130.0 / 200.0);
        assert_eq!(actions[0].payload.values, SensorValues { t: 130.0, p: 100.0 });
        assert_eq!(actions[2].payload.alarm, 1.0);
        assert_eq!(actions[2].reason, DecisionReason::HardLimit);

        assert_eq!(dispatcher.state(), BatchState::Completed);
        assert_eq!(
            dispatcher.last_report(),
            BatchReport { evaluated: 5, triggered: 3, hard_limit: 1, skipped: 0 }
        );
    }

    #[test]
    fn empty_batch_completes_without_actions() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::default();
        assert!(dispatcher.dispatch(&[], &mut engine).unwrap().is_empty());
        assert_eq!(dispatcher.state(), BatchState::Completed);
    }

    #[test]
    fn training_failure_fails_batch_atomically() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::new(TrainingSet::new(Vec::new()));
        let readings = [Reading::new("melting", 250.0, 100.0)];

        let err = dispatcher.dispatch(&readings, &mut engine).unwrap_err();
        assert!(matches!(err, AlarmError::Training { .. }));
        assert_eq!(dispatcher.state(), BatchState::Failed);
        assert_eq!(dispatcher.last_report(), BatchReport::default());
    }

    #[test]
    fn invalid_readings_are_skipped() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::default();
        let readings = [
            Reading::new("broken", f64::NAN, 100.0),
            Reading::new("hot", 150.0, 100.0),
        ];

        let actions = dispatcher.dispatch(&readings, &mut engine).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(dispatcher.last_report().skipped, 1);
        assert_eq!(dispatcher.last_report().evaluated, 1);
    }

    #[test]
    fn non_finite_breaches_still_publish() {
        let mut engine = engine();
        let mut dispatcher = ReadingDispatcher::default();
        let readings = [
            Reading::new("runaway", f64::INFINITY, 300.0),
            Reading::new("sensor-lost", f64::NAN, 900.0),
            Reading::new("broken", 50.0, f64::NAN),
        ];

        let actions = dispatcher.dispatch(&readings, &mut engine).unwrap();
        let topics: Vec<&str> = actions.iter().map(|a| a.topic.as_str()).collect();
        assert_eq!(topics, ["out/runaway", "out/sensor-lost"]);
        assert!(actions.iter().all(|a| a.reason == DecisionReason::HardLimit));
        assert_eq!(
            dispatcher.last_report(),
            BatchReport { evaluated: 2, triggered: 2, hard_limit: 2, skipped: 1 }
        );
    }

    #[test]
    fn starts_idle() {
        assert_eq!(ReadingDispatcher::default().state(), BatchState::Idle);
    }
}
