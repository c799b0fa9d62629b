//! Stereo channel balance redistribution
//!
//! Each channel of a stereo mix carries one factor per part, and the factors
//! of a committed channel sum to 1.0. When one part's factor is edited, the
//! remaining parts absorb the difference in proportion to their current
//! values so the channel keeps summing to 1.0.
//!
//! Accumulated floating-point drift across repeated edits is left as-is:
//! results are exactly what the redistribution formula yields, with no
//! renormalization pass.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance used when checking that a channel sums to 1.0
pub const BALANCE_TOLERANCE: f64 = 1e-9;

/// Redistribution errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    #[error("Channel has no parts")]
    EmptyChannel,

    #[error("Part index {index} out of range for {len} parts")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("A single part must carry the whole channel (got {value})")]
    SinglePartNotFull { value: f64 },
}

/// One of the two stereo output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub fn all() -> [Channel; 2] {
        [Channel::Left, Channel::Right]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Left => write!(f, "left"),
            Channel::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Ok(Channel::Left),
            "right" | "r" => Ok(Channel::Right),
            other => Err(format!("Unknown channel '{}' (expected left or right)", other)),
        }
    }
}

/// Recompute a channel's factors after setting one part to `new_value`.
///
/// The edited part receives exactly `new_value`. Every other part is scaled
/// by `(1 - new_value) / (1 - old_value)`, which keeps their mutual ratios.
/// When the edited part previously held the entire channel there is nothing
/// to scale, so the remaining mass is split equally instead.
///
/// `new_value` is not range-checked; callers clamp it to `[0, 1]`.
///
/// # Arguments
/// * `factors` - Current factors of one channel
/// * `index` - Index of the part being edited
/// * `new_value` - New factor for that part
///
/// # Returns
/// The new factor vector, or an error if `index` does not address a part or
/// a single-part channel is asked to carry anything other than 1.0.
///
/// # Examples
///
/// ```
/// use pmx_common::balance::redistribute;
///
/// let f = redistribute(&[1.0, 0.0, 0.0], 0, 0.4).unwrap();
/// assert!((f[1] - 0.3).abs() < 1e-12);
/// assert!((f[2] - 0.3).abs() < 1e-12);
/// ```
pub fn redistribute(factors: &[f64], index: usize, new_value: f64) -> Result<Vec<f64>, BalanceError> {
    let n = factors.len();
    if n == 0 {
        return Err(BalanceError::EmptyChannel);
    }
    if index >= n {
        return Err(BalanceError::IndexOutOfRange { index, len: n });
    }

    if n == 1 {
        if (new_value - 1.0).abs() > BALANCE_TOLERANCE {
            return Err(BalanceError::SinglePartNotFull { value: new_value });
        }
        return Ok(vec![1.0]);
    }

    let old_other_total = 1.0 - factors[index];
    let new_other_total = 1.0 - new_value;

    let result = if old_other_total == 0.0 {
        // Edited part held the whole channel: split the rest evenly
        let share = new_other_total / (n - 1) as f64;
        (0..n)
            .map(|j| if j == index { new_value } else { share })
            .collect()
    } else {
        let coeff = new_other_total / old_other_total;
        factors
            .iter()
            .enumerate()
            .map(|(j, &f)| if j == index { new_value } else { f * coeff })
            .collect()
    };

    Ok(result)
}

/// Factors for `n` parts sharing a channel equally
pub fn uniform_factors(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Sum of a channel's factors
pub fn factor_sum(factors: &[f64]) -> f64 {
    factors.iter().sum()
}

/// True when the factors sum to 1.0 within [`BALANCE_TOLERANCE`]
pub fn is_balanced(factors: &[f64]) -> bool {
    !factors.is_empty() && (factor_sum(factors) - 1.0).abs() <= BALANCE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "length mismatch: {:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "expected {:?}, got {:?}", expected, actual);
        }
    }

    #[test]
    fn test_degenerate_split() {
        let f = redistribute(&[1.0, 0.0, 0.0], 0, 0.4).unwrap();
        assert_close(&f, &[0.4, 0.3, 0.3]);
    }

    #[test]
    fn test_proportional_case() {
        let f = redistribute(&[0.5, 0.3, 0.2], 0, 0.8).unwrap();
        assert_close(&f, &[0.8, 0.12, 0.08]);
    }

    #[test]
    fn test_edited_value_is_exact() {
        let f = redistribute(&[0.25, 0.25, 0.25, 0.25], 2, 0.37).unwrap();
        assert_eq!(f[2], 0.37);
    }

    #[test]
    fn test_sum_stays_one() {
        let cases: &[(&[f64], usize, f64)] = &[
            (&[0.5, 0.3, 0.2], 1, 0.0),
            (&[0.5, 0.3, 0.2], 2, 1.0),
            (&[0.1, 0.2, 0.3, 0.4], 3, 0.05),
            (&[1.0, 0.0], 0, 0.0),
            (&[0.0, 1.0, 0.0, 0.0], 1, 0.25),
        ];
        for (factors, index, value) in cases {
            let f = redistribute(factors, *index, *value).unwrap();
            assert!(
                is_balanced(&f),
                "sum drifted for {:?} @ {} = {}: {:?}",
                factors,
                index,
                value,
                f
            );
            assert_eq!(f[*index], *value);
        }
    }

    #[test]
    fn test_sum_and_edited_value_sweep() {
        let values: Vec<f64> = (0..=20).map(|s| s as f64 * 0.05).collect();

        for n in 1..=6usize {
            let total: f64 = (1..=n).map(|k| k as f64).sum();
            let mut inputs = vec![uniform_factors(n), (1..=n).map(|k| k as f64 / total).collect()];
            // One part holding the whole channel; editing it takes the equal-split branch
            for hot in 0..n {
                let mut one_hot = vec![0.0; n];
                one_hot[hot] = 1.0;
                inputs.push(one_hot);
            }

            for factors in &inputs {
                for index in 0..n {
                    for &value in &values {
                        let result = redistribute(factors, index, value);
                        if n == 1 && value != 1.0 {
                            assert_eq!(result, Err(BalanceError::SinglePartNotFull { value }));
                            continue;
                        }
                        let f = result.unwrap();
                        assert_eq!(f.len(), n);
                        assert_eq!(f[index], value);
                        assert!(
                            is_balanced(&f),
                            "sum drifted for {:?} @ {} = {}: {:?}",
                            factors,
                            index,
                            value,
                            f
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_ratios_preserved() {
        let before = [0.4, 0.3, 0.2, 0.1];
        let after = redistribute(&before, 0, 0.7).unwrap();
        let ratio_before = before[1] / before[3];
        let ratio_after = after[1] / after[3];
        assert!((ratio_before - ratio_after).abs() < 1e-12);
        assert!((before[2] / before[3] - after[2] / after[3]).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_when_unchanged() {
        let before = [0.5, 0.3, 0.2];
        let after = redistribute(&before, 1, 0.3).unwrap();
        assert_close(&after, &before);

        let full = [1.0, 0.0, 0.0];
        assert_close(&redistribute(&full, 0, 1.0).unwrap(), &full);
    }

    #[test]
    fn test_single_part_noop() {
        assert_eq!(redistribute(&[1.0], 0, 1.0).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_single_part_rejects_partial_value() {
        assert_eq!(
            redistribute(&[1.0], 0, 0.5),
            Err(BalanceError::SinglePartNotFull { value: 0.5 })
        );
    }

    #[test]
    fn test_empty_and_out_of_range() {
        assert_eq!(redistribute(&[], 0, 0.5), Err(BalanceError::EmptyChannel));
        assert_eq!(
            redistribute(&[0.5, 0.5], 2, 0.5),
            Err(BalanceError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_out_of_range_value_is_not_rejected() {
        // Slider bounds are the caller's job; the formula still applies
        let f = redistribute(&[0.5, 0.5], 0, 1.5).unwrap();
        assert_close(&f, &[1.5, -0.5]);
    }

    #[test]
    fn test_no_renormalization_of_drift() {
        // Input already off by a small amount stays off by the same relative amount
        let drifted = [0.5, 0.3, 0.2 + 1e-6];
        let f = redistribute(&drifted, 0, 0.5).unwrap();
        assert_close(&f, &drifted);
        assert!(!is_balanced(&f));
    }

    #[test]
    fn test_repeated_edits_stay_close() {
        let mut f = uniform_factors(5);
        for step in 0..30 {
            let index = step % 5;
            let value = 0.1 + ((step * 37) % 50) as f64 / 100.0;
            f = redistribute(&f, index, value).unwrap();
        }
        assert!((factor_sum(&f) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_factors() {
        assert!(uniform_factors(0).is_empty());
        assert_eq!(uniform_factors(1), vec![1.0]);
        assert_close(&uniform_factors(4), &[0.25, 0.25, 0.25, 0.25]);
        assert!(is_balanced(&uniform_factors(3)));
    }

    #[test]
    fn test_channel_parse_and_display() {
        assert_eq!("left".parse::<Channel>(), Ok(Channel::Left));
        assert_eq!("R".parse::<Channel>(), Ok(Channel::Right));
        assert!("center".parse::<Channel>().is_err());
        assert_eq!(Channel::Right.to_string(), "right");
    }
}
