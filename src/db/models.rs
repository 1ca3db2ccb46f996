//! Database models and domain types.

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::events::EventType;
use crate::stats::StatTotals;

/// Team database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::teams)]
pub struct Team {
    id: i32,
    name: String,
    created_at: NaiveDateTime,
}

/// Insertable team model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::teams)]
pub struct NewTeam {
    name: String,
}

/// Player database model.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::players)]
#[diesel(belongs_to(Team))]
pub struct Player {
    id: i32,
    team_id: i32,
    name: String,
    jersey_number: i32,
    created_at: NaiveDateTime,
}

/// Insertable player model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    team_id: i32,
    name: String,
    jersey_number: i32,
}

/// Game database model. Identifies the two teams and the calendar date;
/// immutable once created apart from the soft-delete flag.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::games)]
pub struct Game {
    id: i32,
    home_team_id: i32,
    away_team_id: i32,
    played_on: NaiveDate,
    location: Option<String>,
    notes: Option<String>,
    deleted: bool,
    created_at: NaiveDateTime,
}

/// Insertable game model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    home_team_id: i32,
    away_team_id: i32,
    played_on: NaiveDate,
    location: Option<String>,
    notes: Option<String>,
}

/// Lifecycle phase derived from a [`GameState`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Created but not yet started.
    Scheduled,
    /// Started and accepting events.
    Live,
    /// Finalized; terminal.
    Final,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Final => "final",
        };
        write!(f, "{}", s)
    }
}

/// Game lifecycle projection: exactly one row per game, mutated only by the
/// state machine.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::game_states)]
#[diesel(belongs_to(Game))]
pub struct GameState {
    id: i32,
    game_id: i32,
    current_quarter: i32,
    is_live: bool,
    is_final: bool,
    home_timeouts_remaining: i32,
    away_timeouts_remaining: i32,
    home_score: Option<i32>,
    away_score: Option<i32>,
    updated_at: NaiveDateTime,
}

impl GameState {
    /// Lifecycle phase implied by the live/final flags.
    #[instrument(skip(self))]
    pub fn phase(&self) -> GamePhase {
        if self.is_final {
            GamePhase::Final
        } else if self.is_live {
            GamePhase::Live
        } else {
            GamePhase::Scheduled
        }
    }
}

/// Insertable game state model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_states)]
pub struct NewGameState {
    game_id: i32,
    current_quarter: i32,
    is_live: bool,
    is_final: bool,
    home_timeouts_remaining: i32,
    away_timeouts_remaining: i32,
}

impl NewGameState {
    /// Initial state for a freshly created game: quarter 1, not live, not
    /// final, full timeout allotment on both sides.
    #[instrument]
    pub fn initial(game_id: i32) -> Self {
        Self::new(game_id, 1, false, false, 7, 7)
    }
}

/// Append-only game event row. Never mutated or deleted; the source of
/// truth from which stored totals can be recomputed.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::game_events)]
#[diesel(belongs_to(Game))]
pub struct GameEvent {
    id: i32,
    game_id: i32,
    event_type: String,
    quarter: i32,
    player_id: Option<i32>,
    team_id: Option<i32>,
    details: String,
    created_at: NaiveDateTime,
}

impl GameEvent {
    /// Parses the stored event type into an [`EventType`].
    #[instrument(skip(self), fields(event_type = %self.event_type))]
    pub fn parse_event_type(&self) -> Result<EventType, DbError> {
        EventType::from_db_string(self.event_type())
    }

    /// Deserializes the JSON details payload into the given type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the payload does not match the expected shape.
    #[instrument(skip(self))]
    pub fn parse_details<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        Ok(serde_json::from_str(self.details())?)
    }
}

/// Insertable game event model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_events)]
pub struct NewGameEvent {
    game_id: i32,
    event_type: String,
    quarter: i32,
    player_id: Option<i32>,
    team_id: Option<i32>,
    details: String,
}

impl NewGameEvent {
    /// Builds an insertable event from a typed payload.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the payload cannot be serialized.
    #[instrument(skip(payload))]
    pub fn from_payload<T: Serialize>(
        game_id: i32,
        event_type: EventType,
        quarter: i32,
        player_id: Option<i32>,
        team_id: Option<i32>,
        payload: &T,
    ) -> Result<Self, DbError> {
        Ok(Self::new(
            game_id,
            event_type.to_db_string().to_string(),
            quarter,
            player_id,
            team_id,
            serde_json::to_string(payload)?,
        ))
    }
}

/// Active roster row: one check-in/check-out span for one player in one
/// game. On court while `checked_out_at` is null.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::active_rosters)]
#[diesel(belongs_to(Game))]
pub struct ActiveRoster {
    id: i32,
    game_id: i32,
    player_id: i32,
    team_id: i32,
    is_starter: bool,
    checked_in_at: NaiveDateTime,
    checked_out_at: Option<NaiveDateTime>,
}

/// Insertable active roster model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::active_rosters)]
pub struct NewActiveRoster {
    game_id: i32,
    player_id: i32,
    team_id: i32,
    is_starter: bool,
    checked_in_at: NaiveDateTime,
}

/// Per-game running totals for one player. A materialized cache of the
/// quarter rows; the audit recomputes and compares.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::player_game_stats)]
#[diesel(belongs_to(Game))]
pub struct PlayerGameStats {
    id: i32,
    game_id: i32,
    player_id: i32,
    ftm: i32,
    fta: i32,
    fg2m: i32,
    fg2a: i32,
    fg3m: i32,
    fg3a: i32,
    fouls: i32,
    updated_at: NaiveDateTime,
}

impl PlayerGameStats {
    /// Copies the counters into a [`StatTotals`] value.
    #[instrument(skip(self))]
    pub fn totals(&self) -> StatTotals {
        StatTotals::new(
            self.ftm, self.fta, self.fg2m, self.fg2a, self.fg3m, self.fg3a, self.fouls,
        )
    }
}

/// Insertable per-game stats model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::player_game_stats)]
pub struct NewPlayerGameStats {
    game_id: i32,
    player_id: i32,
    ftm: i32,
    fta: i32,
    fg2m: i32,
    fg2a: i32,
    fg3m: i32,
    fg3a: i32,
    fouls: i32,
}

impl NewPlayerGameStats {
    /// Builds an insertable row from aggregated totals.
    #[instrument(skip(totals))]
    pub fn from_totals(game_id: i32, player_id: i32, totals: &StatTotals) -> Self {
        Self::new(
            game_id,
            player_id,
            *totals.ftm(),
            *totals.fta(),
            *totals.fg2m(),
            *totals.fg2a(),
            *totals.fg3m(),
            *totals.fg3a(),
            *totals.fouls(),
        )
    }
}

/// Per-quarter breakdown for one player, same counters as the game row.
#[derive(
    Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize,
)]
#[diesel(table_name = schema::player_quarter_stats)]
#[diesel(belongs_to(Game))]
pub struct PlayerQuarterStats {
    id: i32,
    game_id: i32,
    player_id: i32,
    quarter: i32,
    ftm: i32,
    fta: i32,
    fg2m: i32,
    fg2a: i32,
    fg3m: i32,
    fg3a: i32,
    fouls: i32,
    updated_at: NaiveDateTime,
}

impl PlayerQuarterStats {
    /// Copies the counters into a [`StatTotals`] value.
    #[instrument(skip(self))]
    pub fn totals(&self) -> StatTotals {
        StatTotals::new(
            self.ftm, self.fta, self.fg2m, self.fg2a, self.fg3m, self.fg3a, self.fouls,
        )
    }
}

/// Insertable per-quarter stats model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::player_quarter_stats)]
pub struct NewPlayerQuarterStats {
    game_id: i32,
    player_id: i32,
    quarter: i32,
    ftm: i32,
    fta: i32,
    fg2m: i32,
    fg2a: i32,
    fg3m: i32,
    fg3a: i32,
    fouls: i32,
}

impl NewPlayerQuarterStats {
    /// Builds an insertable row from aggregated totals.
    #[instrument(skip(totals))]
    pub fn from_totals(game_id: i32, player_id: i32, quarter: i32, totals: &StatTotals) -> Self {
        Self::new(
            game_id,
            player_id,
            quarter,
            *totals.ftm(),
            *totals.fta(),
            *totals.fg2m(),
            *totals.fg2a(),
            *totals.fg3m(),
            *totals.fg3a(),
            *totals.fouls(),
        )
    }
}
