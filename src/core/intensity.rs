//! core/intensity.rs - Discrete stimulus intensity scale.
//!
//! All probes and thresholds live on a fixed, evenly spaced ladder of levels.
//! The standard ladder is 0, 2, 4, …, 30; the coarse staircase step spans two
//! levels and the refinement step spans one.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("intensity scale needs at least 3 levels, got {0}")]
    TooFewLevels(usize),
    #[error("intensity levels must be strictly increasing (level {index})")]
    NotIncreasing { index: usize },
    #[error("intensity levels must be evenly spaced: expected {expected}, found {found} at level {index}")]
    UnevenSpacing {
        index: usize,
        expected: u32,
        found: u32,
    },
}

/// Ordered, evenly spaced intensity levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntensityScale {
    levels: Vec<u32>,
    spacing: u32,
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self::standard()
    }
}

impl IntensityScale {
    /// 0, 2, 4, …, 30.
    pub fn standard() -> Self {
        Self {
            levels: (0..=30).step_by(2).collect(),
            spacing: 2,
        }
    }

    pub fn new(levels: Vec<u32>) -> Result<Self, ScaleError> {
        if levels.len() < 3 {
            return Err(ScaleError::TooFewLevels(levels.len()));
        }
        if levels[1] <= levels[0] {
            return Err(ScaleError::NotIncreasing { index: 1 });
        }
        let spacing = levels[1] - levels[0];
        for (index, pair) in levels.windows(2).enumerate().skip(1) {
            if pair[1] <= pair[0] {
                return Err(ScaleError::NotIncreasing { index: index + 1 });
            }
            let found = pair[1] - pair[0];
            if found != spacing {
                return Err(ScaleError::UnevenSpacing {
                    index: index + 1,
                    expected: spacing,
                    found,
                });
            }
        }
        Ok(Self { levels, spacing })
    }

    #[inline]
    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub fn min(&self) -> u32 {
        self.levels[0]
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.levels[self.levels.len() - 1]
    }

    /// Default starting level: the middle element.
    #[inline]
    pub fn midpoint(&self) -> u32 {
        self.levels[self.levels.len() / 2]
    }

    #[inline]
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Coarse search step (two levels).
    #[inline]
    pub fn full_step(&self) -> u32 {
        self.spacing * 2
    }

    /// Refinement step (one level).
    #[inline]
    pub fn half_step(&self) -> u32 {
        self.spacing
    }

    #[inline]
    pub fn second_lowest(&self) -> u32 {
        self.levels[1]
    }

    #[inline]
    pub fn second_highest(&self) -> u32 {
        self.levels[self.levels.len() - 2]
    }

    #[inline]
    pub fn contains(&self, intensity: u32) -> bool {
        self.levels.binary_search(&intensity).is_ok()
    }

    /// Round `value` to an integer and snap it onto the scale, preferring the
    /// lower level when it falls between two.
    pub fn snap_floor(&self, value: f64) -> u32 {
        if !value.is_finite() || value <= self.min() as f64 {
            return self.min();
        }
        if value >= self.max() as f64 {
            return self.max();
        }
        let rounded = value.round() as u32;
        match self.levels.binary_search(&rounded) {
            Ok(idx) => self.levels[idx],
            Err(insert) => self.levels[insert.saturating_sub(1)],
        }
    }

    /// Smallest level strictly above `intensity`, clamped to the maximum.
    pub fn next_above(&self, intensity: u32) -> u32 {
        self.levels
            .iter()
            .copied()
            .find(|&l| l > intensity)
            .unwrap_or(self.max())
    }

    /// `intensity - step`, or `None` when that leaves the scale.
    pub fn step_down(&self, intensity: u32, step: u32) -> Option<u32> {
        let next = intensity.checked_sub(step)?;
        (next >= self.min()).then_some(next)
    }

    /// `intensity + step`, or `None` when that leaves the scale.
    pub fn step_up(&self, intensity: u32, step: u32) -> Option<u32> {
        let next = intensity + step;
        (next <= self.max()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scale_landmarks() {
        let scale = IntensityScale::standard();
        assert_eq!(scale.len(), 16);
        assert_eq!(scale.min(), 0);
        assert_eq!(scale.max(), 30);
        assert_eq!(scale.midpoint(), 16);
        assert_eq!(scale.full_step(), 4);
        assert_eq!(scale.half_step(), 2);
        assert_eq!(scale.second_lowest(), 2);
        assert_eq!(scale.second_highest(), 28);
    }

    #[test]
    fn snap_floor_prefers_lower_level() {
        let scale = IntensityScale::standard();
        assert_eq!(scale.snap_floor(16.0), 16);
        assert_eq!(scale.snap_floor(15.0), 14);
        assert_eq!(scale.snap_floor(14.6), 14);
        assert_eq!(scale.snap_floor(13.4), 12);
        assert_eq!(scale.snap_floor(-3.0), 0);
        assert_eq!(scale.snap_floor(41.0), 30);
        assert_eq!(scale.snap_floor(f64::NAN), 0);
    }

    #[test]
    fn steps_stay_on_scale() {
        let scale = IntensityScale::standard();
        assert_eq!(scale.step_down(4, 4), Some(0));
        assert_eq!(scale.step_down(2, 4), None);
        assert_eq!(scale.step_up(26, 4), Some(30));
        assert_eq!(scale.step_up(28, 4), None);
        assert_eq!(scale.next_above(14), 16);
        assert_eq!(scale.next_above(30), 30);
    }

    #[test]
    fn rejects_malformed_levels() {
        assert_eq!(
            IntensityScale::new(vec![0, 2]),
            Err(ScaleError::TooFewLevels(2))
        );
        assert_eq!(
            IntensityScale::new(vec![0, 2, 2, 4]),
            Err(ScaleError::NotIncreasing { index: 2 })
        );
        assert!(matches!(
            IntensityScale::new(vec![0, 2, 5]),
            Err(ScaleError::UnevenSpacing { index: 2, .. })
        ));
        let custom = IntensityScale::new(vec![10, 15, 20, 25]).unwrap();
        assert_eq!(custom.midpoint(), 20);
        assert_eq!(custom.full_step(), 10);
    }
}
