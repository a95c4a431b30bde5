//! Feed-forward sigmoid network
//!
//! One hidden layer, one output, trained sample-by-sample with
//! back-propagation and momentum. Defaults (3 hidden units, learning rate 0.3,
//! momentum 0.1, 20 000 iterations, 0.005 error target) are the classic
//! small-network settings the labeled alarm set was tuned against.
//!
//! Each `train` call reinitialises the weights from `NetworkConfig::seed`
//! before fitting, so training is a pure function of (config, examples).

use alarmguard_core::{AlarmError, AlarmResult, LabeledPoint, NormalizedPoint, Scorable, Trainable};
use heapless::Vec;

use crate::{sigmoid, Rng, DEFAULT_SEED};

/// Upper bound on hidden layer width (fixed storage)
pub const MAX_HIDDEN_UNITS: usize = 16;

const INPUTS: usize = 2;

/// Initial weights are drawn uniformly from `[-INIT_RANGE, INIT_RANGE)`
const INIT_RANGE: f64 = 0.2;

/// Hyper-parameters for [`FeedForwardNetwork`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    /// Hidden layer width, `1..=MAX_HIDDEN_UNITS`
    pub hidden_units: usize,
    /// Step size for weight updates
    pub learning_rate: f64,
    /// Fraction of the previous update carried into the next
    pub momentum: f64,
    /// Maximum passes over the training data
    pub iterations: usize,
    /// Stop early once mean squared error drops below this
    pub error_threshold: f64,
    /// Weight initialisation seed
    pub seed: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_units: 3,
            learning_rate: 0.3,
            momentum: 0.1,
            iterations: 20_000,
            error_threshold: 0.005,
            seed: DEFAULT_SEED,
        }
    }
}

impl NetworkConfig {
    /// Reject parameters the trainer cannot work with
    pub fn validate(&self) -> AlarmResult<()> {
        if self.hidden_units == 0 || self.hidden_units > MAX_HIDDEN_UNITS {
            return Err(AlarmError::config("hidden_units", "must be within 1..=16"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(AlarmError::config("learning_rate", "must be greater than zero"));
        }
        if !self.momentum.is_finite() || !(0.0..1.0).contains(&self.momentum) {
            return Err(AlarmError::config("momentum", "must be within [0, 1)"));
        }
        if self.iterations == 0 {
            return Err(AlarmError::config("iterations", "must be at least 1"));
        }
        if !self.error_threshold.is_finite() || self.error_threshold <= 0.0 || self.error_threshold >= 1.0 {
            return Err(AlarmError::config("error_threshold", "must be within (0, 1)"));
        }
        Ok(())
    }
}

/// Outcome of the last training run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrainingStats {
    /// Passes over the data actually performed
    pub iterations: usize,
    /// Mean squared error after the last pass
    pub error: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct HiddenUnit {
    weights: [f64; INPUTS],
    bias: f64,
    output_weight: f64,
    // previous updates, for momentum
    weight_changes: [f64; INPUTS],
    output_weight_change: f64,
}

/// Single-hidden-layer sigmoid network
#[derive(Debug, Clone)]
pub struct FeedForwardNetwork {
    config: NetworkConfig,
    hidden: Vec<HiddenUnit, MAX_HIDDEN_UNITS>,
    output_bias: f64,
    stats: Option<TrainingStats>,
}

impl Default for FeedForwardNetwork {
    fn default() -> Self {
        Self {
            config: NetworkConfig::default(),
            hidden: Vec::new(),
            output_bias: 0.0,
            stats: None,
        }
    }
}

impl FeedForwardNetwork {
    /// Create an untrained network
    pub fn new(config: NetworkConfig) -> AlarmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Hyper-parameters
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Statistics of the last successful training run
    pub fn stats(&self) -> Option<TrainingStats> {
        self.stats
    }

    fn initialise(&mut self) -> AlarmResult<()> {
        let mut rng = Rng::new(self.config.seed);
        let mut units = [HiddenUnit::default(); MAX_HIDDEN_UNITS];
        let units = units
            .get_mut(..self.config.hidden_units)
            .ok_or(AlarmError::config("hidden_units", "exceeds hidden layer capacity"))?;

        for unit in units.iter_mut() {
            for weight in unit.weights.iter_mut() {
                *weight = rng.range(-INIT_RANGE, INIT_RANGE);
            }
        }
        for unit in units.iter_mut() {
            unit.bias = rng.range(-INIT_RANGE, INIT_RANGE);
        }
        for unit in units.iter_mut() {
            unit.output_weight = rng.range(-INIT_RANGE, INIT_RANGE);
        }
        self.output_bias = rng.range(-INIT_RANGE, INIT_RANGE);

        self.hidden.clear();
        self.hidden
            .extend_from_slice(units)
            .map_err(|_| AlarmError::config("hidden_units", "exceeds hidden layer capacity"))
    }

    /// Forward pass; fills `activations` with hidden outputs and returns the output
    fn forward(&self, inputs: [f64; INPUTS], activations: &mut [f64; MAX_HIDDEN_UNITS]) -> f64 {
        let mut sum = 0.0;
        for (unit, activation) in self.hidden.iter().zip(activations.iter_mut()) {
            let net = unit.weights[0] * inputs[0] + unit.weights[1] * inputs[1] + unit.bias;
            *activation = sigmoid(net);
            sum += unit.output_weight * *activation;
        }
        sigmoid(sum + self.output_bias)
    }

    /// One online pass; returns the summed squared error
    fn train_pass(&mut self, samples: &[([f64; INPUTS], f64)]) -> f64 {
        let rate = self.config.learning_rate;
        let momentum = self.config.momentum;
        let mut activations = [0.0; MAX_HIDDEN_UNITS];
        let mut hidden_deltas = [0.0; MAX_HIDDEN_UNITS];
        let mut squared_error = 0.0;

        for &(inputs, target) in samples {
            let output = self.forward(inputs, &mut activations);
            let error = target - output;
            squared_error += error * error;

            let output_delta = error * output * (1.0 - output);
            for (i, unit) in self.hidden.iter().enumerate() {
                let h = activations[i];
                hidden_deltas[i] = output_delta * unit.output_weight * h * (1.0 - h);
            }

            for (i, unit) in self.hidden.iter_mut().enumerate() {
                let change = rate * output_delta * activations[i] + momentum * unit.output_weight_change;
                unit.output_weight_change = change;
                unit.output_weight += change;
            }
            self.output_bias += rate * output_delta;

            for (i, unit) in self.hidden.iter_mut().enumerate() {
                let delta = hidden_deltas[i];
                for k in 0..INPUTS {
                    let change = rate * delta * inputs[k] + momentum * unit.weight_changes[k];
                    unit.weight_changes[k] = change;
                    unit.weights[k] += change;
                }
                unit.bias += rate * delta;
            }
        }

        squared_error
    }
}

impl Trainable for FeedForwardNetwork {
    fn train(&mut self, examples: &[LabeledPoint]) -> AlarmResult<()> {
        if examples.is_empty() {
            return Err(AlarmError::training("no examples to fit"));
        }
        if examples
            .iter()
            .any(|ex| !ex.point.t.is_finite() || !ex.point.p.is_finite())
        {
            return Err(AlarmError::training("examples contain non-finite features"));
        }

        let samples: alloc::vec::Vec<([f64; INPUTS], f64)> = examples
            .iter()
            .map(|ex| (ex.point.features(), ex.label.target()))
            .collect();

        self.stats = None;
        self.config.validate()?;
        self.initialise()?;

        // At least one pass always runs; the error is only known after it
        let mut stats = TrainingStats::default();
        loop {
            stats.iterations += 1;
            stats.error = self.train_pass(&samples) / samples.len() as f64;
            if stats.iterations >= self.config.iterations
                || stats.error.is_nan()
                || stats.error <= self.config.error_threshold
            {
                break;
            }
        }

        if !stats.error.is_finite() {
            return Err(AlarmError::training("network diverged"));
        }

        self.stats = Some(stats);
        Ok(())
    }

    fn is_trained(&self) -> bool {
        self.stats.is_some()
    }
}

impl Scorable for FeedForwardNetwork {
    fn score(&self, point: NormalizedPoint) -> AlarmResult<f64> {
        if !self.is_trained() {
            return Err(AlarmError::ClassifierPrecondition);
        }
        let mut activations = [0.0; MAX_HIDDEN_UNITS];
        Ok(self.forward(point.features(), &mut activations))
    }

    fn name(&self) -> &'static str {
        "feed-forward network"
    }
}
