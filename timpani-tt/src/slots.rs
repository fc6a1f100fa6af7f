/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Slot-selection strings: deriving LET timing from a mode period.
//!
//! A mode period `M` is split into `frequency` equal slots numbered
//! `1..=frequency`.  A selection names the slots a task's invocations
//! occupy:
//!
//! ```text
//! "2"        one invocation in slot 2
//! "1-2"      one invocation spanning slots 1 and 2   ("1~2" is accepted too)
//! "1-2|4"    two invocations
//! "1*"       slot 1, then repeated with its own length as stride: every slot
//! "1-2*|6"   slots 1-2, 3-4 (repeat stops before the next part), then 6
//! ```
//!
//! A selection only maps onto a single periodic LET task if every invocation
//! has the same length and consecutive starts are equally spaced, including
//! the wrap-around from the last invocation back to the first.

use thiserror::Error;

/// Selection used when a task names a frequency but no slots.
pub const DEFAULT_SLOTS: &str = "1*";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("frequency must be at least 1")]
    ZeroFrequency,

    #[error("slot selection '{selection}' has an empty part")]
    Empty { selection: String },

    #[error("unexpected character '{ch}' in slot selection '{selection}'")]
    Unexpected { selection: String, ch: char },

    #[error("slot {slot} is outside 1..={frequency}")]
    SlotOutOfRange { slot: u64, frequency: u32 },

    #[error("slot range {start}-{end} ends before it starts")]
    InvalidRange { start: u64, end: u64 },

    #[error("slot selection '{selection}' is not periodic: {reason}")]
    NotPeriodic {
        selection: String,
        reason: &'static str,
    },

    #[error("mode period {mode_period} is not a positive multiple of frequency {frequency}")]
    IndivisibleModePeriod { mode_period: u64, frequency: u32 },
}

/// Half-open slot interval `start..end`, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    pub start: u64,
    pub end: u64,
}

impl SlotRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    fn shifted(&self, by: u64) -> SlotRange {
        SlotRange {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// Timing of a periodic LET task, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetTiming {
    pub period: u64,
    pub let_ticks: u64,
    pub offset: u64,
}

/// `count` back-to-back copies of `first`, the expansion of one `*` part.
///
/// Kept unexpanded so `"1*"` over millions of slots stays one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotRun {
    first: SlotRange,
    count: u64,
}

impl SlotRun {
    fn last(&self) -> SlotRange {
        self.first.shifted(self.first.len() * (self.count - 1))
    }
}

/// A parsed slot selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    selection: String,
    frequency: u32,
    runs: Vec<SlotRun>,
}

struct Part {
    range: SlotRange,
    repeat: bool,
}

impl SlotSelection {
    /// Parse `selection` for a mode divided into `frequency` slots.
    ///
    /// Surrounding whitespace and single quotes are ignored.
    pub fn parse(selection: &str, frequency: u32) -> Result<Self, SlotError> {
        if frequency == 0 {
            return Err(SlotError::ZeroFrequency);
        }
        let mode_end = u64::from(frequency) + 1;

        let body = selection.trim().trim_matches('\'');
        let parts = body
            .split('|')
            .map(|raw| parse_part(raw, selection, frequency))
            .collect::<Result<Vec<_>, _>>()?;

        let mut runs: Vec<SlotRun> = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            if let Some(prev) = runs.last() {
                if part.range.start < prev.last().end {
                    return Err(SlotError::NotPeriodic {
                        selection: selection.to_string(),
                        reason: "invocations overlap or are out of order",
                    });
                }
            }

            let mut count = 1;
            if part.repeat {
                // Repeat up to the next part, or to the end of the mode.
                let limit = parts.get(i + 1).map_or(mode_end, |next| next.range.start);
                count += limit.saturating_sub(part.range.end) / part.range.len();
            }
            runs.push(SlotRun {
                first: part.range,
                count,
            });
        }

        Ok(SlotSelection {
            selection: selection.to_string(),
            frequency,
            runs,
        })
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Number of invocations after `*` expansion.
    pub fn invocation_count(&self) -> u64 {
        self.runs.iter().map(|r| r.count).sum()
    }

    /// Invocations in slot order, after `*` expansion.
    pub fn invocations(&self) -> impl Iterator<Item = SlotRange> + '_ {
        self.runs.iter().flat_map(|run| {
            let len = run.first.len();
            (0..run.count).map(move |k| run.first.shifted(k * len))
        })
    }

    /// Derive `(period, let, offset)` for a mode period of `mode_period`
    /// ticks.
    ///
    /// # Errors
    /// * [`SlotError::IndivisibleModePeriod`] – slots would not be whole ticks.
    /// * [`SlotError::NotPeriodic`] – unequal lengths or unequal spacing.
    pub fn let_timing(&self, mode_period: u64) -> Result<LetTiming, SlotError> {
        let frequency = u64::from(self.frequency);
        if mode_period == 0 || mode_period % frequency != 0 {
            return Err(SlotError::IndivisibleModePeriod {
                mode_period,
                frequency: self.frequency,
            });
        }
        let slot = mode_period / frequency;

        let (first, last) = match (self.runs.first(), self.runs.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(SlotError::Empty {
                    selection: self.selection.clone(),
                })
            }
        };
        let len = first.first.len();
        if self.runs.iter().any(|r| r.first.len() != len) {
            return Err(self.not_periodic("invocations differ in length"));
        }

        let stride = if self.invocation_count() == 1 {
            frequency
        } else {
            // Within a run starts are `len` apart; between runs the gap is
            // from the last copy of one run to the first of the next.
            let stride = if first.count > 1 {
                len
            } else {
                self.runs[1].first.start - first.first.start
            };
            let runs_fit = self.runs.iter().all(|r| r.count == 1 || len == stride);
            let gaps_fit = self
                .runs
                .windows(2)
                .all(|w| w[1].first.start - w[0].last().start == stride);
            let wrap = first.first.start + frequency - last.last().start;
            if !runs_fit || !gaps_fit || wrap != stride {
                return Err(self.not_periodic("invocations are not evenly spaced"));
            }
            stride
        };

        Ok(LetTiming {
            period: slot * stride,
            let_ticks: slot * len,
            offset: slot * (first.first.start - 1),
        })
    }

    fn not_periodic(&self, reason: &'static str) -> SlotError {
        SlotError::NotPeriodic {
            selection: self.selection.clone(),
            reason,
        }
    }
}

fn parse_part(raw: &str, selection: &str, frequency: u32) -> Result<Part, SlotError> {
    let text = raw.trim();
    let (body, repeat) = match text.strip_suffix('*') {
        Some(b) => (b.trim_end(), true),
        None => (text, false),
    };

    let mut bounds = body.splitn(2, ['-', '~']);
    let start = parse_slot(bounds.next().unwrap_or(""), selection, frequency)?;
    let last = match bounds.next() {
        Some(s) => parse_slot(s, selection, frequency)?,
        None => start,
    };
    if last < start {
        return Err(SlotError::InvalidRange { start, end: last });
    }

    Ok(Part {
        range: SlotRange {
            start,
            end: last + 1,
        },
        repeat,
    })
}

fn parse_slot(text: &str, selection: &str, frequency: u32) -> Result<u64, SlotError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SlotError::Empty {
            selection: selection.to_string(),
        });
    }
    if let Some(ch) = text.chars().find(|c| !c.is_ascii_digit()) {
        return Err(SlotError::Unexpected {
            selection: selection.to_string(),
            ch,
        });
    }
    let slot = text.parse::<u64>().unwrap_or(u64::MAX);
    if slot == 0 || slot > u64::from(frequency) {
        return Err(SlotError::SlotOutOfRange { slot, frequency });
    }
    Ok(slot)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(selection: &str, frequency: u32, mode_period: u64) -> Result<LetTiming, SlotError> {
        SlotSelection::parse(selection, frequency)?.let_timing(mode_period)
    }

    fn ranges(selection: &str, frequency: u32) -> Vec<(u64, u64)> {
        SlotSelection::parse(selection, frequency)
            .unwrap()
            .invocations()
            .map(|r| (r.start, r.end))
            .collect()
    }

    // ── parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn single_slot() {
        assert_eq!(ranges("2", 4), vec![(2, 3)]);
    }

    #[test]
    fn slot_range_with_dash_or_tilde() {
        assert_eq!(ranges("1-2", 4), vec![(1, 3)]);
        assert_eq!(ranges("1~2", 4), vec![(1, 3)]);
    }

    #[test]
    fn asterisk_repeats_to_end_of_mode() {
        assert_eq!(ranges("1*", 4), vec![(1, 2), (2, 3), (3, 4), (4, 5)]);
        assert_eq!(ranges("1-2*", 6), vec![(1, 3), (3, 5), (5, 7)]);
    }

    #[test]
    fn asterisk_stops_before_next_part() {
        assert_eq!(ranges("1-2*|6", 6), vec![(1, 3), (3, 5), (6, 7)]);
    }

    #[test]
    fn quotes_and_whitespace_are_ignored() {
        assert_eq!(ranges("'1*'", 2), vec![(1, 2), (2, 3)]);
        assert_eq!(ranges(" 1 - 2 | 3 - 4 ", 4), vec![(1, 3), (3, 5)]);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            SlotSelection::parse("1", 0).unwrap_err(),
            SlotError::ZeroFrequency
        );
        assert!(matches!(
            SlotSelection::parse("", 4).unwrap_err(),
            SlotError::Empty { .. }
        ));
        assert!(matches!(
            SlotSelection::parse("1||2", 4).unwrap_err(),
            SlotError::Empty { .. }
        ));
        assert!(matches!(
            SlotSelection::parse("1a", 4).unwrap_err(),
            SlotError::Unexpected { ch: 'a', .. }
        ));
        assert_eq!(
            SlotSelection::parse("0", 4).unwrap_err(),
            SlotError::SlotOutOfRange { slot: 0, frequency: 4 }
        );
        assert_eq!(
            SlotSelection::parse("5", 4).unwrap_err(),
            SlotError::SlotOutOfRange { slot: 5, frequency: 4 }
        );
        assert_eq!(
            SlotSelection::parse("3-1", 4).unwrap_err(),
            SlotError::InvalidRange { start: 3, end: 1 }
        );
    }

    #[test]
    fn slots_at_the_top_of_the_u32_range_do_not_overflow() {
        let sel = SlotSelection::parse("1-2*|3", u32::MAX).unwrap();
        assert_eq!(sel.invocations().count(), 2);

        let top = u32::MAX.to_string();
        let sel = SlotSelection::parse(&top, u32::MAX).unwrap();
        let only: Vec<_> = sel.invocations().collect();
        assert_eq!(
            only,
            vec![SlotRange {
                start: u64::from(u32::MAX),
                end: u64::from(u32::MAX) + 1
            }]
        );

        let every = SlotSelection::parse("1*", u32::MAX).unwrap();
        assert_eq!(every.invocation_count(), u64::from(u32::MAX));
    }

    #[test]
    fn slot_number_beyond_u32_is_out_of_range() {
        assert_eq!(
            SlotSelection::parse("99999999999", u32::MAX).unwrap_err(),
            SlotError::SlotOutOfRange {
                slot: 99_999_999_999,
                frequency: u32::MAX
            }
        );
    }

    #[test]
    fn repeated_part_is_counted_not_expanded() {
        let sel = SlotSelection::parse("1*", 50_000_000).unwrap();
        assert_eq!(sel.invocation_count(), 50_000_000);
        assert_eq!(sel.runs.len(), 1);

        let t = sel.let_timing(100_000_000).unwrap();
        assert_eq!((t.period, t.let_ticks, t.offset), (2, 2, 0));
    }

    #[test]
    fn overlapping_parts_are_rejected() {
        assert!(matches!(
            SlotSelection::parse("1-3|2", 4).unwrap_err(),
            SlotError::NotPeriodic { .. }
        ));
    }

    // ── let_timing ────────────────────────────────────────────────────────────

    #[test]
    fn every_slot_gives_slot_length_period() {
        let t = timing("1*", 4, 20).unwrap();
        assert_eq!(
            t,
            LetTiming {
                period: 5,
                let_ticks: 5,
                offset: 0
            }
        );
    }

    #[test]
    fn two_wide_invocations_per_mode() {
        let t = timing("1-2|3-4", 4, 20).unwrap();
        assert_eq!((t.period, t.let_ticks, t.offset), (10, 10, 0));
    }

    #[test]
    fn single_invocation_has_mode_period() {
        let t = timing("2", 4, 100).unwrap();
        assert_eq!((t.period, t.let_ticks, t.offset), (100, 25, 25));
    }

    #[test]
    fn repeated_range_is_periodic_when_it_tiles_the_mode() {
        let t = timing("1-2*", 6, 60).unwrap();
        assert_eq!((t.period, t.let_ticks, t.offset), (20, 20, 0));
    }

    #[test]
    fn offset_invocations_keep_their_offset() {
        // Slots 2 and 4 of 4: stride 2, wrap 2 + 4 - 4 = 2.
        let t = timing("2|4", 4, 40).unwrap();
        assert_eq!((t.period, t.let_ticks, t.offset), (20, 10, 10));
    }

    #[test]
    fn unequal_lengths_are_not_periodic() {
        assert!(matches!(
            timing("1|3-4", 4, 40).unwrap_err(),
            SlotError::NotPeriodic { .. }
        ));
    }

    #[test]
    fn uneven_spacing_is_not_periodic() {
        // 2, 3, 4 of 4: stride 1 but wrap-around gap is 2.
        assert!(matches!(
            timing("2*", 4, 40).unwrap_err(),
            SlotError::NotPeriodic { .. }
        ));
        assert!(matches!(
            timing("1|2|4", 4, 40).unwrap_err(),
            SlotError::NotPeriodic { .. }
        ));
    }

    #[test]
    fn mode_period_must_divide_into_whole_slots() {
        assert_eq!(
            timing("1*", 3, 10).unwrap_err(),
            SlotError::IndivisibleModePeriod {
                mode_period: 10,
                frequency: 3
            }
        );
        assert!(matches!(
            timing("1*", 3, 0).unwrap_err(),
            SlotError::IndivisibleModePeriod { .. }
        ));
    }
}
