//! Pan interpolation curves.
//!
//! A pan of `N` steps is described by cumulative progress fractions
//! `p(1) .. p(N)` with `p(N) = 1`. Offsets are derived from the cumulative
//! fractions rather than summed per-step deltas, so rounding never
//! accumulates across steps.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Below this the cosine weights are considered degenerate.
const WEIGHT_EPSILON: f64 = 1e-9;

/// The five pan curves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationType {
    /// Equal increments
    #[default]
    Linear,
    /// Each step covers half of the remaining distance
    ExponentialDecelerating,
    /// Samples `cos` over `[0, π/2)`
    QuarterCosine,
    /// Samples `1 + cos` over `[0, π)`
    HalfCosine,
    /// Samples `cos` over `[-π/2, π/2)`: slow start, fast middle, slow end
    MiddlePeak,
}

impl AnimationType {
    pub const ALL: [AnimationType; 5] = [
        AnimationType::Linear,
        AnimationType::ExponentialDecelerating,
        AnimationType::QuarterCosine,
        AnimationType::HalfCosine,
        AnimationType::MiddlePeak,
    ];

    /// Whether the last step writes the exact target instead of a computed
    /// increment.
    pub fn snaps_to_target(&self) -> bool {
        !matches!(self, AnimationType::Linear)
    }

    fn curve(&self) -> Curve {
        match self {
            AnimationType::Linear => Curve::Linear,
            AnimationType::ExponentialDecelerating => Curve::Exponential,
            AnimationType::QuarterCosine => Curve::Cosine {
                start: 0.0,
                range: PI / 2.0,
                offset: 0.0,
            },
            AnimationType::HalfCosine => Curve::Cosine {
                start: 0.0,
                range: PI,
                offset: 1.0,
            },
            AnimationType::MiddlePeak => Curve::Cosine {
                start: -PI / 2.0,
                range: PI,
                offset: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Linear,
    Exponential,
    Cosine { start: f64, range: f64, offset: f64 },
}

/// A curve sampled for a fixed number of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PanCurve {
    kind: AnimationType,
    steps: u32,
    /// Cumulative progress after each step; empty for the linear curve
    progress: Vec<f64>,
}

impl PanCurve {
    /// `steps` is clamped to at least one.
    pub fn new(kind: AnimationType, steps: u32) -> Self {
        let steps = steps.max(1);
        let progress = match kind.curve() {
            Curve::Linear => Vec::new(),
            Curve::Exponential => (1..=steps)
                .map(|step| 1.0 - 0.5f64.powi(step as i32))
                .collect(),
            Curve::Cosine {
                start,
                range,
                offset,
            } => {
                let increment = range / steps as f64;
                let weights: Vec<f64> = (0..steps)
                    .map(|step| offset + (step as f64 * increment + start).cos())
                    .collect();
                let total: f64 = weights.iter().sum();
                if total.abs() < WEIGHT_EPSILON {
                    // no usable weights, distribute evenly
                    (1..=steps).map(|step| step as f64 / steps as f64).collect()
                } else {
                    let scale = 1.0 / total;
                    weights
                        .iter()
                        .scan(0.0, |sum, weight| {
                            *sum += weight * scale;
                            Some(*sum)
                        })
                        .collect()
                }
            }
        };
        Self {
            kind,
            steps,
            progress,
        }
    }

    pub fn kind(&self) -> AnimationType {
        self.kind
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Cumulative progress after `step` (1-based) of the run.
    pub fn progress(&self, step: u32) -> f64 {
        let step = step.min(self.steps);
        if step == 0 {
            return 0.0;
        }
        if step == self.steps {
            return 1.0;
        }
        match self.kind {
            AnimationType::Linear => step as f64 / self.steps as f64,
            _ => self.progress[(step - 1) as usize],
        }
    }

    /// Cumulative pixel offsets after each step for a pan of `total` pixels.
    /// The last entry is always exactly `total`.
    pub fn offsets(&self, total: i32) -> Vec<i32> {
        let steps = self.steps as i64;
        (1..=self.steps)
            .map(|step| match self.kind {
                AnimationType::Linear => (total as i64 * step as i64 / steps) as i32,
                _ if step == self.steps => total,
                _ => (total as f64 * self.progress(step)).round() as i32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_close_exactly() {
        for kind in AnimationType::ALL {
            for total in [0, 1, 1000, -737] {
                for steps in [1, 5, 50] {
                    let offsets = PanCurve::new(kind, steps).offsets(total);
                    assert_eq!(offsets.len(), steps as usize);

                    let mut previous = 0;
                    let mut sum = 0i64;
                    for offset in &offsets {
                        sum += (*offset - previous) as i64;
                        previous = *offset;
                    }
                    assert_eq!(sum, total as i64, "{:?} total {} steps {}", kind, total, steps);
                }
            }
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        for kind in AnimationType::ALL {
            let curve = PanCurve::new(kind, 20);
            let mut previous = 0.0;
            for step in 1..=20 {
                let progress = curve.progress(step);
                assert!(progress >= previous - 1e-12, "{:?} step {}", kind, step);
                assert!(progress <= 1.0 + 1e-12);
                previous = progress;
            }
            assert_eq!(curve.progress(20), 1.0);
        }
    }

    #[test]
    fn test_linear_increments_are_equal() {
        assert_eq!(
            PanCurve::new(AnimationType::Linear, 4).offsets(1000),
            vec![250, 500, 750, 1000]
        );
    }

    #[test]
    fn test_exponential_halves_remaining_distance() {
        let offsets = PanCurve::new(AnimationType::ExponentialDecelerating, 4).offsets(1024);
        assert_eq!(offsets, vec![512, 768, 896, 1024]);
    }

    #[test]
    fn test_decelerating_curves_front_load() {
        for kind in [AnimationType::QuarterCosine, AnimationType::HalfCosine] {
            let offsets = PanCurve::new(kind, 10).offsets(10_000);
            let first = offsets[0];
            let last = offsets[9] - offsets[8];
            assert!(first > last, "{:?}: first {} last {}", kind, first, last);
        }
    }

    #[test]
    fn test_middle_peak_is_fastest_in_the_middle() {
        let offsets = PanCurve::new(AnimationType::MiddlePeak, 10).offsets(10_000);
        let delta = |i: usize| offsets[i] - if i == 0 { 0 } else { offsets[i - 1] };
        assert!(delta(5) > delta(0));
        assert!(delta(5) > delta(9));
    }

    #[test]
    fn test_degenerate_single_step() {
        // cos(-π/2) is zero so the middle-peak weights vanish for one step
        let curve = PanCurve::new(AnimationType::MiddlePeak, 1);
        assert_eq!(curve.offsets(321), vec![321]);
        assert_eq!(PanCurve::new(AnimationType::HalfCosine, 0).steps(), 1);
    }
}
