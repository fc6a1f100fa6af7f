/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure arithmetic helpers: GCD and checked LCM over tick counts.

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(x, 0) == x`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Checked LCM, computed as `a · (b / gcd(a, b))`.
///
/// The division is exact, so the only failure mode is the final
/// multiplication, which is checked.  Returns `Ok(0)` when either operand is
/// zero.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    a.checked_mul(b / gcd(a, b))
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// Fold `periods` left-to-right with [`lcm`].
///
/// `Ok(0)` for an empty input; the first overflowing step is returned as
/// `Err`, carrying the running LCM and the period that broke it.
pub fn lcm_fold<I>(periods: I) -> Result<u64, HyperperiodError>
where
    I: IntoIterator<Item = u64>,
{
    let mut iter = periods.into_iter();
    let Some(first) = iter.next() else {
        return Ok(0);
    };
    iter.try_fold(first, lcm)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── gcd ───────────────────────────────────────────────────────────────────

    #[test]
    fn gcd_basic_cases() {
        assert_eq!(gcd(4, 6), 2);
        assert_eq!(gcd(7, 11), 1);
        assert_eq!(gcd(120, 45), 15);
    }

    #[test]
    fn gcd_with_zero() {
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
        assert_eq!(gcd(0, 0), 0);
    }

    // ── lcm ───────────────────────────────────────────────────────────────────

    #[test]
    fn lcm_basic_cases() {
        assert_eq!(lcm(4, 6).unwrap(), 12);
        assert_eq!(lcm(7, 11).unwrap(), 77);
        assert_eq!(lcm(10, 10).unwrap(), 10);
    }

    #[test]
    fn lcm_with_zero_returns_zero() {
        assert_eq!(lcm(0, 3).unwrap(), 0);
        assert_eq!(lcm(3, 0).unwrap(), 0);
    }

    #[test]
    fn lcm_beyond_32_bits_is_exact() {
        // Two coprime periods whose product does not fit in u32.
        let a = 65_537;
        let b = 65_539;
        assert_eq!(lcm(a, b).unwrap(), 4_295_229_443);
    }

    #[test]
    fn lcm_overflow_returns_error() {
        let a = u64::MAX / 2 + 1; // 2^63
        let b = 3;
        assert_eq!(lcm(a, b), Err(HyperperiodError::Overflow { a, b }));
    }

    // ── lcm_fold ──────────────────────────────────────────────────────────────

    #[test]
    fn lcm_fold_empty_returns_zero() {
        assert_eq!(lcm_fold(Vec::new()).unwrap(), 0);
    }

    #[test]
    fn lcm_fold_single_period() {
        assert_eq!(lcm_fold([10]).unwrap(), 10);
    }

    #[test]
    fn lcm_fold_heterogeneous_periods() {
        assert_eq!(lcm_fold([4, 6]).unwrap(), 12);
        assert_eq!(lcm_fold([2, 3, 5, 7]).unwrap(), 210);
    }

    #[test]
    fn lcm_fold_reports_running_value_on_overflow() {
        let big = 1u64 << 62;
        let err = lcm_fold([big, 3, 5]).unwrap_err();
        assert_eq!(err, HyperperiodError::Overflow { a: big * 3, b: 5 });
    }
}
