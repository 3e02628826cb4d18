use serde::{Deserialize, Serialize};

use super::range::RangeIncl;

/// Summary statistics over the finite values of an array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayStats {
    pub range: RangeIncl<f32>,
    pub mean: f32,
    pub variance: f32,
    pub std_dev: f32,
    /// Number of finite values the statistics were computed from.
    pub count: usize,
}

impl ArrayStats {
    /// Returns `None` if `data` holds no finite value.
    ///
    /// NaN and infinities are skipped; science cubes mark unobserved
    /// spaxels with NaN.
    pub fn new_f32(data: impl Iterator<Item = f32>) -> Option<Self> {
        let mut data = data.filter(|v| v.is_finite());
        let first = data.next()?;

        let mut min = first;
        let mut max = first;
        // Accumulate in f64, frames can hold tens of thousands of values
        let mut sum = first as f64;
        let mut sum_sq = (first as f64) * (first as f64);
        let mut count = 1usize;
        for value in data {
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
            let value = value as f64;
            sum += value;
            sum_sq += value * value;
            count += 1;
        }

        let mean = sum / count as f64;
        // Rounding can push this slightly below zero for constant data
        let variance = (sum_sq / count as f64 - mean * mean).max(0.0);

        Some(Self {
            range: RangeIncl::new(min, max),
            mean: mean as f32,
            variance: variance as f32,
            std_dev: variance.sqrt() as f32,
            count,
        })
    }
}
