//! Domain error taxonomy for the game state machine.

use chrono::NaiveDate;
use derive_more::{Display, Error};

use crate::db::DbError;

/// Errors returned by game state machine operations.
///
/// Every precondition violation maps to exactly one variant so callers can
/// present precise messages. All variants are recoverable; internal storage
/// failures surface as [`GameError::Persistence`] after the whole operation
/// has been rolled back.
#[derive(Debug, Display, Error)]
pub enum GameError {
    /// No game exists with the given id.
    #[display("game {game_id} not found")]
    GameNotFound {
        /// Requested game id.
        game_id: i32,
    },

    /// The game has already been started (or already finished).
    #[display("game {game_id} is already live or final")]
    AlreadyLive {
        /// Requested game id.
        game_id: i32,
    },

    /// The action requires a live game.
    #[display("game {game_id} is not live")]
    NotLive {
        /// Requested game id.
        game_id: i32,
    },

    /// Home and away teams must differ.
    #[display("home and away team are both team {team_id}")]
    SameTeam {
        /// The team supplied on both sides.
        team_id: i32,
    },

    /// An active game already exists for this date and team pair.
    #[display("game between teams {home_team_id} and {away_team_id} on {played_on} already exists")]
    DuplicateGame {
        /// Home team of the existing game.
        home_team_id: i32,
        /// Away team of the existing game.
        away_team_id: i32,
        /// Date of the existing game.
        played_on: NaiveDate,
    },

    /// The player is not currently checked in for this game.
    #[display("player {player_id} is not on the active roster for game {game_id}")]
    PlayerNotOnRoster {
        /// Requested player id.
        player_id: i32,
        /// Requested game id.
        game_id: i32,
    },

    /// The substitution request is malformed or conflicts with the court.
    #[display("invalid substitution: {reason}")]
    InvalidSubstitution {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// The quarter value is outside the legal range for this action.
    #[display("invalid quarter {quarter}")]
    InvalidQuarter {
        /// Offending quarter value.
        quarter: i32,
    },

    /// The player does not play for the team named in the request.
    #[display("player {player_id} does not play for team {team_id}")]
    TeamMismatch {
        /// Requested player id.
        player_id: i32,
        /// Team the request named.
        team_id: i32,
    },

    /// Storage failure; the operation was rolled back in full.
    #[display("persistence failure: {source}")]
    Persistence {
        /// Underlying database error.
        source: DbError,
    },
}

impl From<DbError> for GameError {
    fn from(source: DbError) -> Self {
        Self::Persistence { source }
    }
}

impl From<diesel::result::Error> for GameError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Persistence {
            source: DbError::from(err),
        }
    }
}
