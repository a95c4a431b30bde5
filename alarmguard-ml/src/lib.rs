//! Lightweight Alarm Classifiers for Edge Devices
//!
//! ## Overview
//!
//! This crate provides the learned tier of AlarmGuard's decision pipeline. Each
//! learner implements the core [`Trainable`](alarmguard_core::Trainable) and
//! [`Scorable`](alarmguard_core::Scorable) traits, so the engine never knows
//! which algorithm it is talking to.
//!
//! ## Learners
//!
//! ### FeedForwardNetwork (default)
//!
//! A 2-input, single-hidden-layer sigmoid network trained by online
//! back-propagation with momentum:
//!
//! ```text
//!   t ──┐   ┌── h₁ ──┐
//!       ├──►├── h₂ ──┤──► σ(Σ wᵢhᵢ + b) = alarm likelihood
//!   p ──┘   └── h₃ ──┘
//! ```
//!
//! It captures joint effects such as "moderately hot AND moderately
//! pressurized" that no single-feature threshold can express. Weights are
//! initialised from a seeded generator, so a given configuration always trains
//! to the same model.
//!
//! ### NearestNeighbors
//!
//! Inverse-distance weighted vote of the k closest training points. No fitting
//! cost beyond storing the points; useful as a transparent baseline and for
//! deployments that cannot afford the network's training iterations.
//!
//! ## Memory Model
//!
//! ```text
//! FeedForwardNetwork (3 hidden units): 3 × 6 f64 + 2 f64 ≈ 160 bytes
//! NearestNeighbors: 24 bytes per training point
//! ```
//!
//! ## Integration with Hard Limits
//!
//! Learners only ever see sub-limit readings. Physics first, ML second:
//!
//! ```rust
//! use alarmguard_core::{AlarmConfig, AlarmEngine, Reading, TrainingSet};
//! use alarmguard_ml::FeedForwardNetwork;
//!
//! let mut engine = AlarmEngine::new(AlarmConfig::default(), FeedForwardNetwork::default())?;
//! engine.train(&TrainingSet::fixed())?;
//!
//! let decision = engine.decide(&Reading::new("boiler-1", 89.0, 301.0))?;
//! assert!(decision.triggered);
//! # Ok::<(), alarmguard_core::AlarmError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod neighbors;
pub mod network;

pub use neighbors::{NearestNeighbors, DEFAULT_NEIGHBORS};
pub use network::{FeedForwardNetwork, NetworkConfig, TrainingStats, MAX_HIDDEN_UNITS};

/// Default random seed for weight initialisation
pub const DEFAULT_SEED: u32 = 42;

/// Small xorshift generator for reproducible weight initialisation
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Create a generator; a zero seed is replaced since xorshift would stay at zero
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Next raw 32-bit value
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[0, 1)` with 24 bits of precision
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / (1u32 << 24) as f64
    }

    /// Uniform value in `[low, high)`
    pub fn range(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }
}

/// Logistic activation
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + libm::exp(-x))
}
