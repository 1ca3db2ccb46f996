//! Scorebook shot-notation codec.
//!
//! A scorebook line is a compact string where each character records one
//! shot attempt in a single quarter:
//!
//! | char | meaning                    |
//! |------|----------------------------|
//! | `1`  | free throw, made           |
//! | `x`  | free throw, missed         |
//! | `2`  | 2-point field goal, made   |
//! | `-`  | 2-point field goal, missed |
//! | `3`  | 3-point field goal, made   |
//! | `/`  | 3-point field goal, missed |
//!
//! Order within the line carries no meaning beyond the totals, and
//! unrecognized characters are skipped so that future notation extensions
//! do not break old readers.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::{debug, instrument};

/// Shot counts decoded from one scorebook line.
///
/// Counters follow box-score naming: `ftm`/`fta` free throws made/attempted,
/// `fg2m`/`fg2a` two-pointers, `fg3m`/`fg3a` three-pointers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters, new,
)]
pub struct ShotCounts {
    ftm: i32,
    fta: i32,
    fg2m: i32,
    fg2a: i32,
    fg3m: i32,
    fg3a: i32,
}

impl ShotCounts {
    /// Decodes a scorebook line into shot counts.
    ///
    /// Decoding is purely additive left-to-right and never fails: an empty
    /// line, or a line with no recognized characters, decodes to all zeros.
    #[instrument(skip(line), fields(len = line.len()))]
    pub fn decode(line: &str) -> Self {
        let mut counts = Self::default();
        for c in line.chars() {
            match c {
                '1' => {
                    counts.ftm += 1;
                    counts.fta += 1;
                }
                'x' => counts.fta += 1,
                '2' => {
                    counts.fg2m += 1;
                    counts.fg2a += 1;
                }
                '-' => counts.fg2a += 1,
                '3' => {
                    counts.fg3m += 1;
                    counts.fg3a += 1;
                }
                '/' => counts.fg3a += 1,
                other => debug!(char = %other, "Skipping unrecognized notation character"),
            }
        }
        counts
    }

    /// Decodes an optional scorebook line, treating `None` as empty.
    #[instrument(skip(line))]
    pub fn decode_opt(line: Option<&str>) -> Self {
        line.map(Self::decode).unwrap_or_default()
    }

    /// Encodes the counts back into canonical notation: makes before misses,
    /// free throws first, then twos, then threes.
    ///
    /// Round-trip holds at the count level: `decode(encode(c)) == c` for any
    /// consistent counts.
    #[instrument(skip(self))]
    pub fn encode(&self) -> String {
        let mut line = String::new();
        line.push_str(&"1".repeat(self.ftm.max(0) as usize));
        line.push_str(&"x".repeat((self.fta - self.ftm).max(0) as usize));
        line.push_str(&"2".repeat(self.fg2m.max(0) as usize));
        line.push_str(&"-".repeat((self.fg2a - self.fg2m).max(0) as usize));
        line.push_str(&"3".repeat(self.fg3m.max(0) as usize));
        line.push_str(&"/".repeat((self.fg3a - self.fg3m).max(0) as usize));
        line
    }

    /// Points scored by these counts (1 per free throw, 2 per two, 3 per three).
    pub fn points(&self) -> i32 {
        self.ftm + 2 * self.fg2m + 3 * self.fg3m
    }

    /// Total shot attempts across all categories.
    pub fn attempts(&self) -> i32 {
        self.fta + self.fg2a + self.fg3a
    }

    /// True when every counter is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for ShotCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ftm: self.ftm + rhs.ftm,
            fta: self.fta + rhs.fta,
            fg2m: self.fg2m + rhs.fg2m,
            fg2a: self.fg2a + rhs.fg2a,
            fg3m: self.fg3m + rhs.fg3m,
            fg3a: self.fg3a + rhs.fg3a,
        }
    }
}

impl AddAssign for ShotCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ShotCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
