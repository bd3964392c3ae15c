use crate::moments::{is_constant, mean, sample_std};

/// Rolling z-score of `series` over a trailing window of `lookback` values.
///
/// The output has the same length as the input. Entry `t` is `None` until the
/// window `[t - lookback + 1, t]` fits, and `0.0` when that window is flat.
/// `lookback` below 2 is treated as 2 so the window never degenerates.
pub fn rolling_zscore(series: &[f64], lookback: usize) -> Vec<Option<f64>> {
    let lookback = lookback.max(2);

    (0..series.len())
        .map(|t| {
            if t + 1 < lookback {
                return None;
            }
            let window = &series[t + 1 - lookback..=t];
            if is_constant(window) {
                return Some(0.0);
            }
            let std = sample_std(window);
            if std == 0.0 || !std.is_finite() {
                return Some(0.0);
            }
            Some((series[t] - mean(window)) / std)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_until_window_fills() {
        let z = rolling_zscore(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(z.len(), 5);
        assert_eq!(z[0], None);
        assert_eq!(z[1], None);
        assert!(z[2..].iter().all(Option::is_some));
    }

    #[test]
    fn matches_hand_computed_value() {
        // Window [1, 2, 3]: mean 2, sample std 1, last value 3.
        let z = rolling_zscore(&[1.0, 2.0, 3.0], 3);
        assert!((z[2].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_window_is_zero_not_nan() {
        let z = rolling_zscore(&[0.5; 10], 4);
        assert!(z[3..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn lookback_is_never_below_two() {
        let z = rolling_zscore(&[1.0, 3.0, 2.0], 0);
        assert_eq!(z[0], None);
        assert!(z[1].is_some());
    }
}
