//! AlarmGuard Batch Example
//!
//! Runs one decision cycle over the three-device demo batch with the default
//! feed-forward network and an in-memory publisher, then prints what would have
//! gone to the broker.
//!
//! ## Scenario
//!
//! | device | t   | p   | expected                      |
//! |--------|-----|-----|-------------------------------|
//! | foo    | 100 | 300 | classifier alarm              |
//! | bar    | 120 | 320 | classifier alarm              |
//! | foobar | 90  | 120 | quiet (pressure far too low)  |
//!
//! Append a reading over 200 degrees to see the hard-limit path.
//!
//! Run with `cargo run -p alarmguard-connectors --example run_batch`.

use alarmguard_connectors::{BatchRunner, ConnectorError, MemoryPublisher, MemorySource, ReadingSource};
use alarmguard_core::{AlarmConfig, Reading};
use alarmguard_ml::FeedForwardNetwork;

fn main() -> Result<(), ConnectorError> {
    println!("AlarmGuard v{}", alarmguard_core::VERSION);
    println!("========================\n");

    let mut readings = MemorySource::demo().fetch_batch()?;
    readings.push(Reading::new("kiln", 240.0, 410.0));
    let mut source = MemorySource::new(readings);

    let config = AlarmConfig::default().with_topic_prefix("plant-3/alarms");
    let mut runner = BatchRunner::new(config, FeedForwardNetwork::default())?;
    let mut publisher = MemoryPublisher::new();

    let summary = runner.run(&mut source, &mut publisher)?;

    println!("Batch report:");
    println!("  evaluated:  {}", summary.report.evaluated);
    println!("  triggered:  {}", summary.report.triggered);
    println!("  hard limit: {}", summary.report.hard_limit);
    println!("  skipped:    {}", summary.report.skipped);

    if let Some(stats) = runner.engine().classifier().stats() {
        println!(
            "\nNetwork trained in {} passes (mse {:.4})",
            stats.iterations, stats.error
        );
    }

    println!("\nPublished {} alarms:", summary.published);
    for (topic, payload) in publisher.published() {
        println!("  {topic} <- {}", String::from_utf8_lossy(payload));
    }
    println!("Disconnected {} time(s)", publisher.disconnects());

    Ok(())
}
