//! Hyperperiod calculation.
//!
//! The hyperperiod of a set of periodic tasks is the Least Common Multiple
//! (LCM) of all their periods: the length of one full repeating schedule
//! cycle.  Periods are integer ticks, so the result is exact.
//!
//! | Failure | Result |
//! |---------|--------|
//! | no periods / a zero period | `Err(NoValidPeriods)` |
//! | `a · (b / gcd)` does not fit in `u64` | `Err(Overflow { a, b })` |
//! | result above the configured limit | `Err(TooLarge { value, limit })` |
//!
//! None of these silently degrade to a truncated value: a wrapped hyperperiod
//! would yield a schedule with the wrong periodicity.

pub mod math;

use tracing::{debug, info, warn};

use math::lcm_fold;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the hyperperiod, in ticks.
///
/// One hour at microsecond resolution.
pub const DEFAULT_HYPERPERIOD_LIMIT: u64 = 3_600_000_000;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur during hyperperiod calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperperiodError {
    /// No periods were supplied, or one of them was zero.
    NoValidPeriods,

    /// LCM calculation overflowed `u64`.
    ///
    /// `a` is the running LCM, `b` the period being folded in.
    Overflow { a: u64, b: u64 },

    /// The calculated hyperperiod exceeded the configured limit.
    TooLarge { value: u64, limit: u64 },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::NoValidPeriods => {
                write!(f, "no tasks with a valid (non-zero) period")
            }
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyperperiod {value} ticks exceeds limit {limit} ticks")
            }
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Calculated hyperperiod for one task set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    /// Hyperperiod in ticks.
    pub hyperperiod: u64,

    /// Distinct periods present in the task set (sorted).
    pub unique_periods: Vec<u64>,

    /// Number of periods that went into the fold.
    pub task_count: usize,
}

/// Fold `periods` (in the given order) into their LCM and check it against
/// `limit`.
///
/// # Errors
/// * [`HyperperiodError::NoValidPeriods`] – `periods` is empty or contains a
///   zero.
/// * [`HyperperiodError::Overflow`] – LCM computation exceeded `u64`.
/// * [`HyperperiodError::TooLarge`] – result exceeds `limit`.
pub fn calculate_hyperperiod(
    periods: &[u64],
    limit: u64,
) -> Result<HyperperiodInfo, HyperperiodError> {
    if periods.is_empty() || periods.contains(&0) {
        warn!(
            period_count = periods.len(),
            "No valid periods for hyperperiod calculation"
        );
        return Err(HyperperiodError::NoValidPeriods);
    }

    let hyperperiod = lcm_fold(periods.iter().copied()).inspect_err(|e| {
        warn!(error = %e, "Hyperperiod does not fit in 64 bits");
    })?;

    if hyperperiod > limit {
        warn!(hyperperiod, limit, "Hyperperiod exceeds configured limit");
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit,
        });
    }

    let unique_periods = {
        let mut v = periods.to_vec();
        v.sort_unstable();
        v.dedup();
        v
    };

    info!(
        task_count = periods.len(),
        unique_count = unique_periods.len(),
        hyperperiod,
        "Calculated hyperperiod"
    );
    for p in &unique_periods {
        debug!(period = p, releases = hyperperiod / p, "  unique period");
    }

    Ok(HyperperiodInfo {
        hyperperiod,
        unique_periods,
        task_count: periods.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_period_is_its_own_hyperperiod() {
        let info = calculate_hyperperiod(&[10], DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.hyperperiod, 10);
        assert_eq!(info.task_count, 1);
    }

    #[test]
    fn two_periods_lcm() {
        let info = calculate_hyperperiod(&[4, 6], DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.hyperperiod, 12);
        assert_eq!(info.unique_periods, vec![4, 6]);
    }

    #[test]
    fn coprime_periods_multiply() {
        let info = calculate_hyperperiod(&[7, 11], DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.hyperperiod, 77);
    }

    #[test]
    fn hyperperiod_is_divisible_by_every_period() {
        let periods = [3, 8, 12, 20, 45];
        let info = calculate_hyperperiod(&periods, DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.hyperperiod, 360);
        for p in periods {
            assert_eq!(info.hyperperiod % p, 0, "period {p}");
        }
    }

    #[test]
    fn unique_periods_are_sorted_and_deduped() {
        let info =
            calculate_hyperperiod(&[5, 1, 5, 2], DEFAULT_HYPERPERIOD_LIMIT).unwrap();
        assert_eq!(info.unique_periods, vec![1, 2, 5]);
        assert_eq!(info.task_count, 4);
    }

    #[test]
    fn empty_periods_returns_no_valid_periods() {
        let err = calculate_hyperperiod(&[], DEFAULT_HYPERPERIOD_LIMIT).unwrap_err();
        assert_eq!(err, HyperperiodError::NoValidPeriods);
    }

    #[test]
    fn zero_period_returns_no_valid_periods() {
        let err = calculate_hyperperiod(&[10, 0], DEFAULT_HYPERPERIOD_LIMIT).unwrap_err();
        assert_eq!(err, HyperperiodError::NoValidPeriods);
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        let big = u64::MAX / 2 + 1;
        let err = calculate_hyperperiod(&[big, 3], u64::MAX).unwrap_err();
        assert!(matches!(err, HyperperiodError::Overflow { .. }));
    }

    #[test]
    fn exceeding_limit_returns_too_large() {
        let err = calculate_hyperperiod(&[7, 11], 50).unwrap_err();
        assert_eq!(err, HyperperiodError::TooLarge { value: 77, limit: 50 });
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let info = calculate_hyperperiod(&[7, 11], 77).unwrap();
        assert_eq!(info.hyperperiod, 77);
    }
}
