use std::ops::{Div, Sub};

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeIncl<N> {
    pub min: N,
    pub max: N,
}

impl<N> RangeIncl<N> {
    pub fn new(min: N, max: N) -> Self {
        Self { min, max }
    }
}

impl<N: Sub<Output = N> + Div<Output = N> + Copy> RangeIncl<N> {
    pub fn width(&self) -> N {
        self.max - self.min
    }

    /// Position of `value` relative to this range, `0` at `min` and `1` at `max`. Unclamped.
    pub fn map(&self, value: N) -> N {
        (value - self.min) / self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::RangeIncl;

    #[test]
    fn map_is_relative_to_min() {
        let range = RangeIncl::new(2.0_f32, 6.0);
        assert_eq!(range.width(), 4.0);
        assert_eq!(range.map(2.0), 0.0);
        assert_eq!(range.map(4.0), 0.5);
        assert_eq!(range.map(6.0), 1.0);
        assert_eq!(range.map(8.0), 1.5);
    }
}
