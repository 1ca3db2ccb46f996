//! Event log vocabulary: closed event and shot enumerations plus the typed
//! `details` payload carried by each event row.
//!
//! Event and shot kinds are closed enums rather than free strings so an
//! illegal value is a construction-time error, not a runtime string-compare
//! miss. Payloads serialize to JSON in the `details` column.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::DbError;

/// Kind of append-only game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Game went live with its starting lineups.
    Start,
    /// One shot attempt by one player.
    Shot,
    /// One foul charged to one player.
    Foul,
    /// One atomic substitution (out set and in set together).
    Substitution,
    /// Quarter transition, including the move into overtime.
    EndQuarter,
    /// Terminal transition that locks the game and records final scores.
    Finalize,
}

impl EventType {
    /// Converts the event type to the string stored in the database.
    #[instrument]
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Shot => "shot",
            Self::Foul => "foul",
            Self::Substitution => "substitution",
            Self::EndQuarter => "end_quarter",
            Self::Finalize => "finalize",
        }
    }

    /// Parses an event type from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the string is not a valid event type.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "start" => Ok(Self::Start),
            "shot" => Ok(Self::Shot),
            "foul" => Ok(Self::Foul),
            "substitution" => Ok(Self::Substitution),
            "end_quarter" => Ok(Self::EndQuarter),
            "finalize" => Ok(Self::Finalize),
            _ => Err(DbError::new(format!("Invalid event type: '{}'", s))),
        }
    }
}

/// Category of shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotType {
    /// Free throw, worth one point.
    #[serde(rename = "ft")]
    FreeThrow,
    /// Two-point field goal.
    #[serde(rename = "2pt")]
    TwoPoint,
    /// Three-point field goal.
    #[serde(rename = "3pt")]
    ThreePoint,
}

impl ShotType {
    /// Point value of a made shot of this type.
    pub fn point_value(&self) -> i32 {
        match self {
            Self::FreeThrow => 1,
            Self::TwoPoint => 2,
            Self::ThreePoint => 3,
        }
    }

    /// Converts the shot type to the string stored in the database.
    #[instrument]
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::FreeThrow => "ft",
            Self::TwoPoint => "2pt",
            Self::ThreePoint => "3pt",
        }
    }

    /// Parses a shot type from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the string is not a valid shot type.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "ft" => Ok(Self::FreeThrow),
            "2pt" => Ok(Self::TwoPoint),
            "3pt" => Ok(Self::ThreePoint),
            _ => Err(DbError::new(format!("Invalid shot type: '{}'", s))),
        }
    }
}

/// Payload of a `start` event: the starting lineups.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct StartDetails {
    /// Player ids starting for the home team.
    home_starters: Vec<i32>,
    /// Player ids starting for the away team.
    away_starters: Vec<i32>,
}

/// Payload of a `shot` event.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct ShotDetails {
    /// Category of the attempt.
    shot_type: ShotType,
    /// Whether the attempt scored.
    made: bool,
    /// Quarter the shot is booked against.
    quarter: i32,
}

/// Payload of a `foul` event.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct FoulDetails {
    /// Free-form foul classification supplied by the caller.
    foul_type: String,
    /// Quarter the foul is booked against.
    quarter: i32,
}

/// Payload of a `substitution` event. Both lists are applied atomically.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct SubstitutionDetails {
    /// Team making the substitution.
    team_id: i32,
    /// Players leaving the court.
    players_out: Vec<i32>,
    /// Players entering the court.
    players_in: Vec<i32>,
}

/// Payload of an `end_quarter` event.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct EndQuarterDetails {
    /// Quarter being closed.
    from_quarter: i32,
    /// Quarter being opened.
    to_quarter: i32,
    /// True when the transition extends the game into overtime.
    overtime: bool,
}

/// Payload of a `finalize` event.
#[derive(Debug, Clone, Serialize, Deserialize, Getters, new)]
pub struct FinalizeDetails {
    /// Official home score at finalize.
    home_score: i32,
    /// Official away score at finalize.
    away_score: i32,
}
