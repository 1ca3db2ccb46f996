//! Active roster tracking for a live game.
//!
//! [`RosterView`] is the on-court projection built from the open roster rows
//! of one game. The engine rebuilds it inside each mutating transaction and
//! uses it to validate substitutions before touching any row, so a rejected
//! substitution leaves the court untouched.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

use crate::db::ActiveRoster;
use crate::error::GameError;

/// Snapshot of who is on court for each team in one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterView {
    on_court: BTreeMap<i32, BTreeSet<i32>>,
}

impl RosterView {
    /// Builds the view from roster rows, keeping only open entries.
    #[instrument(skip(entries), fields(count = entries.len()))]
    pub fn from_entries(entries: &[ActiveRoster]) -> Self {
        let mut on_court: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.checked_out_at().is_none()) {
            let newly = on_court
                .entry(*entry.team_id())
                .or_default()
                .insert(*entry.player_id());
            if !newly {
                warn!(
                    player_id = entry.player_id(),
                    team_id = entry.team_id(),
                    "Duplicate open roster entry"
                );
            }
        }
        Self { on_court }
    }

    /// Player ids currently on court for the given team.
    #[instrument(skip(self))]
    pub fn on_court(&self, team_id: i32) -> BTreeSet<i32> {
        self.on_court.get(&team_id).cloned().unwrap_or_default()
    }

    /// The team a player is currently on court for, if any.
    pub fn team_of(&self, player_id: i32) -> Option<i32> {
        self.on_court
            .iter()
            .find(|(_, players)| players.contains(&player_id))
            .map(|(team_id, _)| *team_id)
    }

    /// True when the player is on court for any team.
    pub fn is_on_court(&self, player_id: i32) -> bool {
        self.team_of(player_id).is_some()
    }

    /// Total number of players on court across both teams.
    pub fn count(&self) -> usize {
        self.on_court.values().map(BTreeSet::len).sum()
    }

    /// Validates a substitution request against the current court.
    ///
    /// Checks, in order: the move is non-empty, neither list repeats a
    /// player, the lists do not overlap, every out-player is on court for
    /// `team_id`, every in-player plays for `team_id` (per `affiliations`)
    /// and is not already on court for anyone.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidSubstitution`], [`GameError::PlayerNotOnRoster`],
    /// or [`GameError::TeamMismatch`] on the first violated rule.
    #[instrument(skip(self, affiliations))]
    pub fn validate_substitution(
        &self,
        game_id: i32,
        team_id: i32,
        players_out: &[i32],
        players_in: &[i32],
        affiliations: &HashMap<i32, i32>,
    ) -> Result<(), GameError> {
        if players_out.is_empty() && players_in.is_empty() {
            return Err(GameError::InvalidSubstitution {
                reason: "substitution moves no players".to_string(),
            });
        }

        let out_set: BTreeSet<i32> = players_out.iter().copied().collect();
        let in_set: BTreeSet<i32> = players_in.iter().copied().collect();
        if out_set.len() != players_out.len() || in_set.len() != players_in.len() {
            return Err(GameError::InvalidSubstitution {
                reason: "a player is listed twice in the same direction".to_string(),
            });
        }
        if let Some(both) = out_set.intersection(&in_set).next() {
            return Err(GameError::InvalidSubstitution {
                reason: format!("player {} appears in both lists", both),
            });
        }

        for &player_id in players_out {
            match self.team_of(player_id) {
                Some(on_team) if on_team == team_id => {}
                Some(_) => {
                    return Err(GameError::TeamMismatch { player_id, team_id });
                }
                None => {
                    return Err(GameError::PlayerNotOnRoster { player_id, game_id });
                }
            }
        }

        for &player_id in players_in {
            if affiliations.get(&player_id) != Some(&team_id) {
                return Err(GameError::TeamMismatch { player_id, team_id });
            }
            if self.is_on_court(player_id) {
                return Err(GameError::InvalidSubstitution {
                    reason: format!("player {} is already on court", player_id),
                });
            }
        }

        debug!(
            moving_out = players_out.len(),
            moving_in = players_in.len(),
            "Substitution validated"
        );
        Ok(())
    }
}
