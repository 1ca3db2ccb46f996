//! Courtside - live basketball game scorekeeping.
//!
//! Records the live progress of one basketball game (shots, fouls,
//! substitutions, quarter transitions) and derives per-player and per-team
//! statistics from that record.
//!
//! # Architecture
//!
//! - **Engine**: the game state machine; gates every action on lifecycle
//!   state and is the sole writer of the append-only event log
//! - **Notation**: the scorebook shot-notation codec
//! - **Stats**: stat aggregation, score calculation, and event replay
//! - **Roster**: the on-court projection and substitution rules
//! - **Db**: diesel/SQLite persistence for all eight relations
//!
//! # Example
//!
//! ```no_run
//! use courtside::{GameEngine, ScorebookRepository, ShotType};
//!
//! # fn example() -> Result<(), courtside::GameError> {
//! let repo = ScorebookRepository::new("scorebook.db".to_string())?;
//! repo.run_migrations()?;
//! let engine = GameEngine::new(repo);
//!
//! engine.start_game(1, &[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10])?;
//! engine.record_shot(1, 3, ShotType::TwoPoint, true, 1)?;
//! let scores = engine.finalize_game(1)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod db;
mod engine;
mod error;
mod events;
mod notation;
mod roster;
mod stats;

// Crate-level exports - persistence
pub use db::{
    ActiveRoster, DbError, Game, GameEvent, GamePhase, GameState, Player, PlayerGameStats,
    PlayerQuarterStats, ScorebookRepository, Team,
};

// Crate-level exports - state machine
pub use engine::{GameEngine, LiveState, TeamScores, TotalsAudit};

// Crate-level exports - error taxonomy
pub use error::GameError;

// Crate-level exports - event vocabulary
pub use events::{
    EndQuarterDetails, EventType, FinalizeDetails, FoulDetails, ShotDetails, ShotType,
    StartDetails, SubstitutionDetails,
};

// Crate-level exports - codec, stats, roster
pub use notation::ShotCounts;
pub use roster::RosterView;
pub use stats::{StatTotals, replay_events, roll_up_players, sum_quarters, team_score};
