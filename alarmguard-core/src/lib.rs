//! Alarm decision pipeline for AlarmGuard
//!
//! Decides, per sensor reading, whether an industrial device must raise an
//! alarm. Two tiers cooperate:
//!
//! 1. **Hard limits**: any temperature or pressure above its configured maximum
//!    alarms unconditionally.
//! 2. **Learned classifier**: sub-limit readings are normalized and scored by a
//!    binary classifier trained on a fixed labeled set; scores strictly above
//!    the configured threshold alarm.
//!
//! Key constraints:
//! - `no_std` + `alloc` capable (edge gateways), `std` by default
//! - No I/O: readings come in as values, alarms go out as [`PublishAction`]s
//! - One training pass per batch, then read-only scoring
//!
//! ```no_run
//! use alarmguard_core::{AlarmConfig, AlarmEngine, ReadingDispatcher, Reading};
//! # use alarmguard_core::{AlarmResult, LabeledPoint, NormalizedPoint, Scorable, Trainable};
//! # struct Model;
//! # impl Trainable for Model {
//! #     fn train(&mut self, _: &[LabeledPoint]) -> AlarmResult<()> { Ok(()) }
//! #     fn is_trained(&self) -> bool { true }
//! # }
//! # impl Scorable for Model {
//! #     fn score(&self, _: NormalizedPoint) -> AlarmResult<f64> { Ok(0.0) }
//! # }
//!
//! let mut engine = AlarmEngine::new(AlarmConfig::default(), Model)?;
//! let mut dispatcher = ReadingDispatcher::default();
//!
//! let readings = [Reading::new("boiler-1", 250.0, 300.0)];
//! for action in dispatcher.dispatch(&readings, &mut engine)? {
//!     // hand action.topic / action.payload to a publisher
//! }
//! # Ok::<(), alarmguard_core::AlarmError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Optional logging: compiles away without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod normalizer;
pub mod reading;
pub mod traits;
pub mod training;

// Public API
pub use config::AlarmConfig;
pub use dispatcher::{AlarmPayload, BatchReport, BatchState, PublishAction, ReadingDispatcher};
pub use engine::{AlarmDecision, AlarmEngine, DecisionReason};
pub use errors::{AlarmError, AlarmResult};
pub use normalizer::{normalize, FeatureNormalizer};
pub use reading::{AlarmLabel, LabeledPoint, NormalizedPoint, Reading, SensorValues, TrainingExample};
pub use traits::{BinaryClassifier, Scorable, Trainable};
pub use training::TrainingSet;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
