//! Positional window functions over one sector's date-sorted values.
//!
//! Every function returns a vector the same length as its input, with `None`
//! where there is not enough history.

/// Trailing mean over up to `window` values, ending at the current row.
///
/// A value is emitted once at least `min_periods` observations are in the
/// window. `min_periods == window` gives a strict full-window average;
/// `min_periods == 1` lets the window shrink near the start of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingMean {
    window: usize,
    min_periods: usize,
}

impl RollingMean {
    pub fn new(window: usize, min_periods: usize) -> Self {
        assert!(window >= 1, "rolling window must be >= 1");
        assert!(
            (1..=window).contains(&min_periods),
            "min_periods must be in 1..=window"
        );
        Self {
            window,
            min_periods,
        }
    }

    /// Full window required before any value is emitted.
    pub fn strict(window: usize) -> Self {
        Self::new(window, window)
    }

    /// Emits from the first row, averaging whatever history exists.
    pub fn shrinking(window: usize) -> Self {
        Self::new(window, 1)
    }

    /// Rows at the start of a series that cannot carry a value.
    pub fn lookback(&self) -> usize {
        self.min_periods - 1
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        (0..values.len())
            .map(|i| {
                let count = (i + 1).min(self.window);
                (count >= self.min_periods).then(|| {
                    let sum: f64 = values[i + 1 - count..=i].iter().sum();
                    sum / count as f64
                })
            })
            .collect()
    }
}

/// `values[i] - values[i - lag]`.
pub fn diff(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| (i >= lag).then(|| values[i] - values[i - lag]))
        .collect()
}

/// `(values[i] - values[i - lag]) / values[i - lag] * 100`.
///
/// Undefined when the base value is zero.
pub fn pct_change(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i < lag {
                return None;
            }
            let base = values[i - lag];
            if base == 0.0 {
                return None;
            }
            Some((values[i] - base) / base * 100.0)
        })
        .collect()
}
