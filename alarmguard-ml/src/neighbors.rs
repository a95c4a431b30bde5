//! Distance-weighted nearest-neighbour classifier
//!
//! Scores a point by the labels of its `k` closest training examples in the
//! normalized space, each weighted by inverse Euclidean distance:
//!
//! ```text
//! score = Σ (label_i / d_i) / Σ (1 / d_i)     over the k nearest points
//! ```
//!
//! A point that coincides with training examples takes the mean of their labels.

use alloc::vec::Vec;

use alarmguard_core::{AlarmError, AlarmResult, LabeledPoint, NormalizedPoint, Scorable, Trainable};

/// Neighbours consulted per score
pub const DEFAULT_NEIGHBORS: usize = 3;

/// Distances below this count as an exact match
const EXACT_MATCH: f64 = 1e-12;

/// k-nearest-neighbour learner
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    k: usize,
    points: Vec<LabeledPoint>,
}

impl Default for NearestNeighbors {
    fn default() -> Self {
        Self {
            k: DEFAULT_NEIGHBORS,
            points: Vec::new(),
        }
    }
}

impl NearestNeighbors {
    /// Learner consulting `k` neighbours
    pub fn new(k: usize) -> AlarmResult<Self> {
        if k == 0 {
            return Err(AlarmError::config("neighbors", "must be at least 1"));
        }
        Ok(Self {
            k,
            points: Vec::new(),
        })
    }

    /// Neighbours consulted per score
    pub fn k(&self) -> usize {
        self.k
    }
}

fn distance(a: NormalizedPoint, b: NormalizedPoint) -> f64 {
    let dt = a.t - b.t;
    let dp = a.p - b.p;
    libm::sqrt(dt * dt + dp * dp)
}

impl Trainable for NearestNeighbors {
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

        self.points.clear();
        self.points.extend_from_slice(examples);
        Ok(())
    }

    fn is_trained(&self) -> bool {
        !self.points.is_empty()
    }
}

impl Scorable for NearestNeighbors {
    fn score(&self, point: NormalizedPoint) -> AlarmResult<f64> {
        if !self.is_trained() {
            return Err(AlarmError::ClassifierPrecondition);
        }

        let mut ranked: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|ex| (distance(point, ex.point), ex.label.target()))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let exact: Vec<f64> = ranked
            .iter()
            .take_while(|(d, _)| *d < EXACT_MATCH)
            .map(|(_, label)| *label)
            .collect();
        if !exact.is_empty() {
            return Ok(exact.iter().sum::<f64>() / exact.len() as f64);
        }

        let (weighted, total) = ranked
            .iter()
            .take(self.k)
            .fold((0.0, 0.0), |(weighted, total), (d, label)| {
                (weighted + label / d, total + 1.0 / d)
            });
        Ok(weighted / total)
    }

    fn name(&self) -> &'static str {
        "nearest neighbors"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarmguard_core::AlarmLabel;
    use proptest::prelude::*;

    fn point(t: f64, p: f64, label: AlarmLabel) -> LabeledPoint {
        LabeledPoint {
            point: NormalizedPoint::new(t, p),
            label,
        }
    }

    #[test]
    fn exact_match_returns_label() {
        let mut knn = NearestNeighbors::default();
        knn.train(&[
            point(0.1, 0.1, AlarmLabel::Normal),
            point(0.9, 0.9, AlarmLabel::Alarm),
            point(0.5, 0.2, AlarmLabel::Normal),
        ])
        .unwrap();

        assert_eq!(knn.score(NormalizedPoint::new(0.9, 0.9)).unwrap(), 1.0);
        assert_eq!(knn.score(NormalizedPoint::new(0.1, 0.1)).unwrap(), 0.0);
    }

    #[test]
    fn closer_neighbours_weigh_more() {
        let mut knn = NearestNeighbors::new(2).unwrap();
        knn.train(&[
            point(0.0, 0.0, AlarmLabel::Normal),
            point(1.0, 0.0, AlarmLabel::Alarm),
        ])
        .unwrap();

        // distances 0.25 and 0.75: weights 4 and 4/3 -> 0.25
        let score = knn.score(NormalizedPoint::new(0.25, 0.0)).unwrap();
        assert!((score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn untrained_refuses_to_score() {
        let knn = NearestNeighbors::default();
        assert_eq!(
            knn.score(NormalizedPoint::new(0.5, 0.5)),
            Err(AlarmError::ClassifierPrecondition)
        );
    }

    #[test]
    fn zero_neighbours_rejected() {
        assert!(matches!(
            NearestNeighbors::new(0),
            Err(AlarmError::Config { field: "neighbors", .. })
        ));
    }

    proptest! {
        #[test]
        fn scores_stay_within_label_range(t in -2.0f64..2.0, p in -2.0f64..2.0, k in 1usize..6) {
            let mut knn = NearestNeighbors::new(k).unwrap();
            knn.train(&[
                point(0.05, 0.34, AlarmLabel::Normal),
                point(0.45, 0.38, AlarmLabel::Alarm),
                point(0.16, 0.63, AlarmLabel::Alarm),
                point(0.26, 0.13, AlarmLabel::Normal),
            ])
            .unwrap();

            let score = knn.score(NormalizedPoint::new(t, p)).unwrap();
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
