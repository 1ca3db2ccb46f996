//! Stat aggregation and score calculation.
//!
//! [`StatTotals`] is the one counter bundle used everywhere: per-quarter
//! rows, per-game rows, and single-event deltas. Addition is commutative and
//! associative, so re-summing quarter rows always reproduces the game row
//! regardless of entry order. [`replay_events`] recomputes totals from the
//! event log for the reconciliation audit.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::{debug, instrument};

use crate::db::{DbError, GameEvent};
use crate::events::{EventType, ShotDetails, ShotType};
use crate::notation::ShotCounts;

/// Running stat totals for one player in one game or one quarter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters, new,
)]
pub struct StatTotals {
    /// Free throws made.
    ftm: i32,
    /// Free throws attempted.
    fta: i32,
    /// Two-point field goals made.
    fg2m: i32,
    /// Two-point field goals attempted.
    fg2a: i32,
    /// Three-point field goals made.
    fg3m: i32,
    /// Three-point field goals attempted.
    fg3a: i32,
    /// Fouls charged.
    fouls: i32,
}

impl StatTotals {
    /// Builds totals from decoded scorebook counts (zero fouls).
    #[instrument]
    pub fn from_counts(counts: ShotCounts) -> Self {
        Self {
            ftm: *counts.ftm(),
            fta: *counts.fta(),
            fg2m: *counts.fg2m(),
            fg2a: *counts.fg2a(),
            fg3m: *counts.fg3m(),
            fg3a: *counts.fg3a(),
            fouls: 0,
        }
    }

    /// Delta for a single shot attempt: one attempt, plus one make if `made`.
    #[instrument]
    pub fn from_shot(shot_type: ShotType, made: bool) -> Self {
        let m = i32::from(made);
        match shot_type {
            ShotType::FreeThrow => Self {
                ftm: m,
                fta: 1,
                ..Self::default()
            },
            ShotType::TwoPoint => Self {
                fg2m: m,
                fg2a: 1,
                ..Self::default()
            },
            ShotType::ThreePoint => Self {
                fg3m: m,
                fg3a: 1,
                ..Self::default()
            },
        }
    }

    /// Delta for a single foul.
    #[instrument]
    pub fn foul() -> Self {
        Self {
            fouls: 1,
            ..Self::default()
        }
    }

    /// Points scored by these totals (1 per free throw, 2 per two, 3 per three).
    pub fn points(&self) -> i32 {
        self.ftm + 2 * self.fg2m + 3 * self.fg3m
    }

    /// Checks the attempts-cover-makes invariant on every shot category.
    pub fn is_consistent(&self) -> bool {
        self.fta >= self.ftm
            && self.fg2a >= self.fg2m
            && self.fg3a >= self.fg3m
            && self.ftm >= 0
            && self.fg2m >= 0
            && self.fg3m >= 0
            && self.fouls >= 0
    }

    /// True when every counter is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for StatTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ftm: self.ftm + rhs.ftm,
            fta: self.fta + rhs.fta,
            fg2m: self.fg2m + rhs.fg2m,
            fg2a: self.fg2a + rhs.fg2a,
            fg3m: self.fg3m + rhs.fg3m,
            fg3a: self.fg3a + rhs.fg3a,
            fouls: self.fouls + rhs.fouls,
        }
    }
}

impl AddAssign for StatTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for StatTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Folds per-quarter totals into game totals.
///
/// Used by bulk import (all quarters at once) and equivalent to repeated
/// incremental addition during live entry.
#[instrument(skip(quarters))]
pub fn sum_quarters<'a>(quarters: impl IntoIterator<Item = &'a StatTotals>) -> StatTotals {
    quarters.into_iter().copied().sum()
}

/// Computes a team's score from its players' totals.
///
/// Pure and deterministic: `Σ (ftm + 2·fg2m + 3·fg3m)` over the given
/// players. Used for live display and as the authoritative score at
/// finalize.
#[instrument(skip(player_totals))]
pub fn team_score<'a>(player_totals: impl IntoIterator<Item = &'a StatTotals>) -> i32 {
    player_totals.into_iter().map(StatTotals::points).sum()
}

/// Recomputes per-player, per-quarter totals from the event log.
///
/// Only `shot` and `foul` events carry stat deltas; everything else is
/// lifecycle bookkeeping and contributes nothing. The result keys are
/// `(player_id, quarter)`.
///
/// # Errors
///
/// Returns [`DbError`] if an event row carries an unknown event type or an
/// undecodable details payload.
#[instrument(skip(events), fields(count = events.len()))]
pub fn replay_events(events: &[GameEvent]) -> Result<BTreeMap<(i32, i32), StatTotals>, DbError> {
    let mut totals: BTreeMap<(i32, i32), StatTotals> = BTreeMap::new();

    for event in events {
        let delta = match event.parse_event_type()? {
            EventType::Shot => {
                let details: ShotDetails = event.parse_details()?;
                StatTotals::from_shot(*details.shot_type(), *details.made())
            }
            EventType::Foul => StatTotals::foul(),
            _ => continue,
        };

        let Some(player_id) = *event.player_id() else {
            return Err(DbError::new(format!(
                "Stat event {} has no player",
                event.id()
            )));
        };

        *totals
            .entry((player_id, *event.quarter()))
            .or_default() += delta;
    }

    debug!(players_quarters = totals.len(), "Replayed event log into totals");
    Ok(totals)
}

/// Sums replayed `(player, quarter)` totals into per-player game totals.
#[instrument(skip(by_quarter))]
pub fn roll_up_players(
    by_quarter: &BTreeMap<(i32, i32), StatTotals>,
) -> BTreeMap<i32, StatTotals> {
    let mut by_player: BTreeMap<i32, StatTotals> = BTreeMap::new();
    for ((player_id, _quarter), totals) in by_quarter {
        *by_player.entry(*player_id).or_default() += *totals;
    }
    by_player
}
