//! Database persistence layer for games, rosters, events, and stats.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{
    ActiveRoster, Game, GameEvent, GamePhase, GameState, NewActiveRoster, NewGame, NewGameEvent,
    NewGameState, NewPlayer, NewPlayerGameStats, NewPlayerQuarterStats, NewTeam, Player,
    PlayerGameStats, PlayerQuarterStats, Team,
};
pub use repository::ScorebookRepository;
