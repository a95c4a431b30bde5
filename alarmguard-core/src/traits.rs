//! Core traits for alarm classifiers
//!
//! The decision pipeline treats its learned model as a capability, not an
//! algorithm. Anything that can be fitted on labeled points and then score new
//! points can back an [`AlarmEngine`](crate::AlarmEngine).
//!
//! Training takes `&mut self` and scoring takes `&self`. Once a batch has
//! trained its classifier, the engine only hands out shared references, so the
//! model cannot be refitted while readings are being scored.

use alloc::boxed::Box;

use crate::{
    errors::AlarmResult,
    reading::{LabeledPoint, NormalizedPoint},
};

/// A model that can be fitted on labeled, normalized examples
pub trait Trainable {
    /// Fit internal parameters, replacing whatever was learned before.
    ///
    /// Fails with `AlarmError::Training` on empty or malformed input.
    fn train(&mut self, examples: &[LabeledPoint]) -> AlarmResult<()>;

    /// Whether a `train` call has succeeded
    fn is_trained(&self) -> bool;
}

/// A fitted model that estimates alarm likelihood
pub trait Scorable {
    /// Alarm likelihood for `point`, in practice close to `[0, 1]`.
    ///
    /// Fails with `AlarmError::ClassifierPrecondition` before training.
    fn score(&self, point: NormalizedPoint) -> AlarmResult<f64>;

    /// Short model name for logs
    fn name(&self) -> &'static str {
        "classifier"
    }
}

/// Full classifier capability: trainable and scorable
pub trait BinaryClassifier: Trainable + Scorable {}

impl<T: Trainable + Scorable + ?Sized> BinaryClassifier for T {}

impl<T: Trainable + ?Sized> Trainable for Box<T> {
    fn train(&mut self, examples: &[LabeledPoint]) -> AlarmResult<()> {
        (**self).train(examples)
    }

    fn is_trained(&self) -> bool {
        (**self).is_trained()
    }
}

impl<T: Scorable + ?Sized> Scorable for Box<T> {
    fn score(&self, point: NormalizedPoint) -> AlarmResult<f64> {
        (**self).score(point)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
