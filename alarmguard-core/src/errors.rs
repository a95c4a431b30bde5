//! Error Types for the Alarm Decision Pipeline
//!
//! ## Design Philosophy
//!
//! AlarmGuard's core errors follow the same rules as the rest of the core:
//!
//! 1. **Small Size**: Variants carry only `&'static str` context, so the enum is
//!    `Copy` and cheap to return from the per-reading hot path.
//!
//! 2. **No Heap Allocation**: Error construction never allocates, which keeps the
//!    core usable without an allocator for error reporting.
//!
//! 3. **Actionable Information**: Each variant tells the caller which phase of the
//!    decision cycle failed and therefore what the recovery scope is.
//!
//! ## Error Categories
//!
//! ### Startup
//! - `Config`: zero, negative or non-finite maxima, threshold outside `[0, 1]`.
//!   Raised when an engine or normalizer is constructed, never per reading.
//!
//! ### Per Batch
//! - `Training`: the training set is empty, malformed or single-class. The whole
//!   batch fails and nothing is published.
//!
//! ### Per Reading
//! - `InvalidReading`: a reading carries NaN or infinite values. The dispatcher
//!   skips such readings instead of failing the batch.
//!
//! ### Defects
//! - `ClassifierPrecondition`: a classifier was scored before it was trained.
//!   Correct call sequencing (train once, then score) never produces it.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use alarmguard_core::{AlarmConfig, AlarmError, FeatureNormalizer};
//!
//! let config = AlarmConfig::new(0.0, 800.0);
//! match FeatureNormalizer::new(&config) {
//!     Ok(_) => unreachable!(),
//!     Err(AlarmError::Config { field, .. }) => assert_eq!(field, "max_temp"),
//!     Err(_) => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for alarm pipeline operations
pub type AlarmResult<T> = Result<T, AlarmError>;

/// Alarm pipeline errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AlarmError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration for {field}: {reason}")]
    Config {
        /// Name of the offending configuration field
        field: &'static str,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// Classifier could not be fitted on the training data
    #[error("Training failed: {reason}")]
    Training {
        /// What was wrong with the training data
        reason: &'static str,
    },

    /// Classifier scored before it was trained
    #[error("Classifier scored before training")]
    ClassifierPrecondition,

    /// Reading values are not finite numbers
    #[error("Invalid reading: not a valid number")]
    InvalidReading,
}

impl AlarmError {
    /// Shorthand for a configuration error
    pub const fn config(field: &'static str, reason: &'static str) -> Self {
        Self::Config { field, reason }
    }

    /// Shorthand for a training error
    pub const fn training(reason: &'static str) -> Self {
        Self::Training { reason }
    }

    /// Whether this error aborts the whole batch (as opposed to a single reading)
    pub const fn is_batch_fatal(&self) -> bool {
        !matches!(self, Self::InvalidReading)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AlarmError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Config { field, reason } =>
                defmt::write!(fmt, "Config {}: {}", field, reason),
            Self::Training { reason } =>
                defmt::write!(fmt, "Training: {}", reason),
            Self::ClassifierPrecondition =>
                defmt::write!(fmt, "Scored before training"),
            Self::InvalidReading =>
                defmt::write!(fmt, "Invalid reading"),
        }
    }
}
