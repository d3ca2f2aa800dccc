//! Bounded wrap-around counter.
//!
//! [`BoundedCyclicCounter`] tracks a position inside the inclusive range
//! `[threshold, ceiling]`. Stepping past either boundary wraps to the other one.
//!
//! Invariants, guaranteed by construction and preserved by every operation:
//! - `threshold < ceiling`
//! - `threshold <= current <= ceiling`
//!
//! Range arithmetic is done in `i128`, so any pair of `i64` bounds works,
//! including the full `i64::MIN..=i64::MAX` range (width 2^64).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("ceiling ({ceiling}) must be greater than threshold ({threshold})")]
    InvalidRange { threshold: i64, ceiling: i64 },
    #[error("target {target} is outside the counter range [{threshold}, {ceiling}]")]
    OutOfRange {
        target: i64,
        threshold: i64,
        ceiling: i64,
    },
}

/// Outcome of a single [`increment`](BoundedCyclicCounter::increment) or
/// [`decrement`](BoundedCyclicCounter::decrement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved one position without touching a boundary.
    Advanced,
    /// Crossed a boundary and landed on the opposite one.
    Wrapped,
}

impl Step {
    #[must_use]
    pub const fn is_wrapped(self) -> bool {
        matches!(self, Step::Wrapped)
    }
}

/// Plain-data view of a counter, used as its serialized form.
///
/// Converting back into a counter re-validates every invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub threshold: i64,
    pub ceiling: i64,
    pub current: i64,
}

/// Integer position inside `[threshold, ceiling]` that wraps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CounterSnapshot", into = "CounterSnapshot")]
pub struct BoundedCyclicCounter {
    threshold: i64,
    ceiling: i64,
    current: i64,
}

impl BoundedCyclicCounter {
    /// Creates a counter positioned at `threshold`.
    ///
    /// Returns [`CounterError::InvalidRange`] if `threshold >= ceiling`.
    pub const fn new(threshold: i64, ceiling: i64) -> Result<Self, CounterError> {
        if threshold >= ceiling {
            return Err(CounterError::InvalidRange { threshold, ceiling });
        }
        Ok(Self {
            threshold,
            ceiling,
            current: threshold,
        })
    }

    pub fn reset(&mut self) {
        self.current = self.threshold;
    }

    /// Moves to `target` if it lies inside the range.
    ///
    /// Out-of-range targets are rejected with [`CounterError::OutOfRange`]
    /// and leave the counter untouched. Use
    /// [`move_to_circular`](Self::move_to_circular) to wrap instead.
    pub fn move_to(&mut self, target: i64) -> Result<(), CounterError> {
        if !self.contains(target) {
            return Err(CounterError::OutOfRange {
                target,
                threshold: self.threshold,
                ceiling: self.ceiling,
            });
        }
        self.current = target;
        Ok(())
    }

    /// Moves to `target`, wrapping an out-of-range target onto the opposite
    /// boundary.
    ///
    /// An overshoot past the ceiling is counted up from the threshold, and an
    /// undershoot below the threshold is counted down from the ceiling. With
    /// threshold = 2 and ceiling = 7, a target of 10 lands on 5 and a target
    /// of 1 lands on 6. Results that would still be out of range are wrapped
    /// again, so the overshoot repeats every `ceiling - threshold` and this
    /// never fails.
    pub fn move_to_circular(&mut self, target: i64) {
        let span = i128::from(self.ceiling) - i128::from(self.threshold);
        self.current = if target > self.ceiling {
            let excess = i128::from(target) - i128::from(self.ceiling);
            (i128::from(self.threshold) + (excess - 1) % span + 1) as i64
        } else if target < self.threshold {
            let deficit = i128::from(self.threshold) - i128::from(target);
            (i128::from(self.ceiling) - (deficit - 1) % span - 1) as i64
        } else {
            target
        };
    }

    pub fn fast_forward_to_max(&mut self) {
        self.current = self.ceiling;
    }

    pub fn increment(&mut self) -> Step {
        if self.current < self.ceiling {
            self.current += 1;
            Step::Advanced
        } else {
            self.current = self.threshold;
            Step::Wrapped
        }
    }

    /// Same result as calling [`increment`](Self::increment) `steps` times.
    ///
    /// Negative `steps` move backwards by the magnitude, like
    /// [`decrement_by`](Self::decrement_by).
    pub fn increment_by(&mut self, steps: i64) {
        self.current = self.wrap(self.offset_i128() + i128::from(steps));
    }

    pub fn decrement(&mut self) -> Step {
        if self.current > self.threshold {
            self.current -= 1;
            Step::Advanced
        } else {
            self.current = self.ceiling;
            Step::Wrapped
        }
    }

    /// Same result as calling [`decrement`](Self::decrement) `steps` times.
    ///
    /// Negative `steps` move forwards by the magnitude.
    pub fn decrement_by(&mut self, steps: i64) {
        self.current = self.wrap(self.offset_i128() - i128::from(steps));
    }

    #[must_use]
    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    #[must_use]
    pub const fn ceiling(&self) -> i64 {
        self.ceiling
    }

    #[must_use]
    pub const fn current(&self) -> i64 {
        self.current
    }

    /// Number of distinct positions, `ceiling - threshold + 1`.
    #[must_use]
    pub const fn width(&self) -> u128 {
        self.ceiling.abs_diff(self.threshold) as u128 + 1
    }

    /// Zero-based position of `current` inside the range.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.current.abs_diff(self.threshold)
    }

    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.threshold && value <= self.ceiling
    }

    #[must_use]
    pub const fn is_at_threshold(&self) -> bool {
        self.current == self.threshold
    }

    #[must_use]
    pub const fn is_at_ceiling(&self) -> bool {
        self.current == self.ceiling
    }

    #[must_use]
    pub const fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            threshold: self.threshold,
            ceiling: self.ceiling,
            current: self.current,
        }
    }

    fn offset_i128(&self) -> i128 {
        i128::from(self.current) - i128::from(self.threshold)
    }

    // Result always lies in [threshold, ceiling], so narrowing back to i64 is lossless.
    fn wrap(&self, offset: i128) -> i64 {
        let width = self.width() as i128;
        (i128::from(self.threshold) + offset.rem_euclid(width)) as i64
    }
}

impl TryFrom<CounterSnapshot> for BoundedCyclicCounter {
    type Error = CounterError;

    fn try_from(snapshot: CounterSnapshot) -> Result<Self, Self::Error> {
        let mut counter = Self::new(snapshot.threshold, snapshot.ceiling)?;
        counter.move_to(snapshot.current)?;
        Ok(counter)
    }
}

impl From<BoundedCyclicCounter> for CounterSnapshot {
    fn from(counter: BoundedCyclicCounter) -> Self {
        counter.snapshot()
    }
}

impl fmt::Display for BoundedCyclicCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in [{}, {}]", self.current, self.threshold, self.ceiling)
    }
}
