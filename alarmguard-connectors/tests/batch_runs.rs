//! End-to-end runs with the real learners and in-memory collaborators

use std::io::Write;

use alarmguard_connectors::{
    BatchRunner, ClassifierKind, ConnectorError, JsonFileSource, MemoryPublisher, MemorySource, RunnerConfig,
};
use alarmguard_core::{AlarmConfig, AlarmError, BatchState, Reading, Scorable, TrainingSet};
use alarmguard_ml::FeedForwardNetwork;
use serde_json::Value;

fn network_runner() -> BatchRunner<FeedForwardNetwork> {
    BatchRunner::new(AlarmConfig::default(), FeedForwardNetwork::default()).unwrap()
}

fn payload(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn demo_batch_alarms_foo_and_bar() {
    let mut runner = network_runner();
    let mut publisher = MemoryPublisher::new();

    let summary = runner.run(&mut MemorySource::demo(), &mut publisher).unwrap();

    assert_eq!(publisher.topics(), ["alarms/foo", "alarms/bar"]);
    assert_eq!(summary.published, 2);
    assert_eq!(summary.report.evaluated, 3);
    assert_eq!(publisher.disconnects(), 1);

    let foo = payload(&publisher.published()[0].1);
    assert_eq!(foo["values"], serde_json::json!({"t": 100.0, "p": 300.0}));
    let score = foo["alarm"].as_f64().unwrap();
    assert!(score > 0.6 && score <= 1.0);
}

#[test]
fn hard_limit_payload_carries_full_score() {
    let mut publisher = MemoryPublisher::new();
    let mut source = MemorySource::new(vec![Reading::new("kiln", 210.0, 100.0)]);

    network_runner().run(&mut source, &mut publisher).unwrap();

    assert_eq!(publisher.topics(), ["alarms/kiln"]);
    assert_eq!(
        payload(&publisher.published()[0].1),
        serde_json::json!({"alarm": 1.0, "values": {"t": 210.0, "p": 100.0}})
    );
}

#[test]
fn failed_topic_does_not_stop_the_batch() {
    let mut publisher = MemoryPublisher::new().fail_topic("alarms/foo");

    let err = network_runner()
        .run(&mut MemorySource::demo(), &mut publisher)
        .unwrap_err();

    assert!(matches!(err, ConnectorError::PublishFailed { failed: 1, attempted: 2 }));
    assert_eq!(publisher.attempts(), 2);
    assert_eq!(publisher.topics(), ["alarms/bar"]);
    assert_eq!(publisher.disconnects(), 1);
}

#[test]
fn training_failure_publishes_nothing() {
    let mut runner = BatchRunner::with_training_set(
        AlarmConfig::default(),
        FeedForwardNetwork::default(),
        TrainingSet::new(Vec::new()),
    )
    .unwrap();
    let mut publisher = MemoryPublisher::new();

    let err = runner.run(&mut MemorySource::demo(), &mut publisher).unwrap_err();

    assert!(matches!(err, ConnectorError::Alarm(AlarmError::Training { .. })));
    assert_eq!(publisher.attempts(), 0);
    assert_eq!(publisher.disconnects(), 1);
    assert_eq!(runner.dispatcher().state(), BatchState::Failed);
}

#[test]
fn json_file_batch_with_neighbours() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"readings":[
            {{"device_id":"press-1","values":{{"t":89,"p":301}}}},
            {{"device_id":"press-2","values":{{"t":10,"p":275}}}},
            {{"device_id":"press-3","values":{{"t":50,"p":900}}}}
        ]}}"#
    )
    .unwrap();

    let config = RunnerConfig::from_json_str(
        r#"{"alarm": {"output_topic_prefix": "line-4"}, "classifier": "neighbors"}"#,
    )
    .unwrap();
    assert_eq!(config.classifier, ClassifierKind::Neighbors);

    let mut runner = BatchRunner::from_config(&config).unwrap();
    let mut publisher = MemoryPublisher::new();
    let summary = runner
        .run(&mut JsonFileSource::new(file.path()), &mut publisher)
        .unwrap();

    assert_eq!(publisher.topics(), ["line-4/press-1", "line-4/press-3"]);
    assert_eq!(summary.report.hard_limit, 1);
    assert_eq!(runner.engine().classifier().name(), "nearest neighbors");
}

#[test]
fn missing_batch_file_still_disconnects() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = JsonFileSource::new(dir.path().join("missing.json"));
    let mut publisher = MemoryPublisher::new();

    let err = network_runner().run(&mut source, &mut publisher).unwrap_err();

    assert!(matches!(err, ConnectorError::SourceUnavailable(_)));
    assert_eq!(publisher.disconnects(), 1);
}
