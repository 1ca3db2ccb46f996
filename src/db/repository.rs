//! Database repository for the live-game scorebook.
//!
//! Convenience reads open their own connection. Row-level helpers take a
//! `&mut SqliteConnection` so the engine can compose them inside one
//! transaction per mutating operation.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::db::{
    ActiveRoster, DbError, Game, GameEvent, GameState, NewActiveRoster, NewGame, NewGameEvent,
    NewGameState, NewPlayer, NewPlayerGameStats, NewPlayerQuarterStats, NewTeam, Player,
    PlayerGameStats, PlayerQuarterStats, Team, schema,
};
use crate::stats::StatTotals;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for scorebook operations.
#[derive(Debug, Clone)]
pub struct ScorebookRepository {
    db_path: String,
}

impl ScorebookRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests, but
    /// note each connection then sees its own database).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating ScorebookRepository");
        Ok(Self { db_path })
    }

    /// Runs any pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut conn)?;
        Ok(conn)
    }

    /// Runs `f` inside one immediate (write) transaction.
    ///
    /// The closure's error rolls the whole transaction back, so a mutating
    /// operation either commits every row it touched or none of them.
    #[instrument(skip(self, f))]
    pub fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(f)
    }

    /// Runs `f` inside a read transaction for a consistent snapshot.
    #[instrument(skip(self, f))]
    pub fn view<T, E>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;
        conn.transaction(f)
    }

    // ── Teams and players ────────────────────────────────────────

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the name is taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_team(&self, name: String) -> Result<Team, DbError> {
        debug!(name = %name, "Creating team");
        let mut conn = self.connection()?;

        let team = diesel::insert_into(schema::teams::table)
            .values(&NewTeam::new(name))
            .returning(Team::as_returning())
            .get_result(&mut conn)?;

        info!(team_id = team.id(), name = %team.name(), "Team created");
        Ok(team)
    }

    /// Creates a player on a team.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the team does not exist or a database error
    /// occurs.
    #[instrument(skip(self))]
    pub fn create_player(
        &self,
        team_id: i32,
        name: String,
        jersey_number: i32,
    ) -> Result<Player, DbError> {
        debug!(team_id, name = %name, "Creating player");
        let mut conn = self.connection()?;

        let player = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(team_id, name, jersey_number))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), team_id, "Player created");
        Ok(player)
    }

    /// Loads the named players, keyed by id, mapped to their team id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(conn, ids), fields(count = ids.len()))]
    pub(crate) fn player_affiliations(
        conn: &mut SqliteConnection,
        ids: &[i32],
    ) -> Result<HashMap<i32, i32>, DbError> {
        let players = schema::players::table
            .filter(schema::players::id.eq_any(ids))
            .load::<Player>(conn)?;
        Ok(players.iter().map(|p| (*p.id(), *p.team_id())).collect())
    }

    // ── Games and game states ────────────────────────────────────

    /// Gets a game by id. Returns `None` if not found or soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn game(&self, game_id: i32) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        Self::find_game(&mut conn, game_id)
    }

    /// Gets a game by id within an existing transaction.
    #[instrument(skip(conn))]
    pub(crate) fn find_game(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Option<Game>, DbError> {
        let game = schema::games::table
            .filter(schema::games::id.eq(game_id))
            .filter(schema::games::deleted.eq(false))
            .first::<Game>(conn)
            .optional()?;
        Ok(game)
    }

    /// Finds an active game for the same date and (unordered) team pair.
    #[instrument(skip(conn))]
    pub(crate) fn find_duplicate_game(
        conn: &mut SqliteConnection,
        played_on: NaiveDate,
        home_team_id: i32,
        away_team_id: i32,
    ) -> Result<Option<Game>, DbError> {
        use schema::games::dsl;

        let game = dsl::games
            .filter(dsl::played_on.eq(played_on))
            .filter(dsl::deleted.eq(false))
            .filter(
                dsl::home_team_id
                    .eq(home_team_id)
                    .and(dsl::away_team_id.eq(away_team_id))
                    .or(dsl::home_team_id
                        .eq(away_team_id)
                        .and(dsl::away_team_id.eq(home_team_id))),
            )
            .first::<Game>(conn)
            .optional()?;
        Ok(game)
    }

    /// Inserts a game row.
    #[instrument(skip(conn, game))]
    pub(crate) fn insert_game(
        conn: &mut SqliteConnection,
        game: NewGame,
    ) -> Result<Game, DbError> {
        let game = diesel::insert_into(schema::games::table)
            .values(&game)
            .returning(Game::as_returning())
            .get_result(conn)?;
        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    /// Inserts the initial game state row for a game.
    #[instrument(skip(conn))]
    pub(crate) fn insert_game_state(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<GameState, DbError> {
        let state = diesel::insert_into(schema::game_states::table)
            .values(&NewGameState::initial(game_id))
            .returning(GameState::as_returning())
            .get_result(conn)?;
        Ok(state)
    }

    /// Gets the state row for a game. Returns `None` if the game is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn game_state(&self, game_id: i32) -> Result<Option<GameState>, DbError> {
        let mut conn = self.connection()?;
        Self::find_game_state(&mut conn, game_id)
    }

    /// Gets the state row within an existing transaction.
    #[instrument(skip(conn))]
    pub(crate) fn find_game_state(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Option<GameState>, DbError> {
        let state = schema::game_states::table
            .filter(schema::game_states::game_id.eq(game_id))
            .first::<GameState>(conn)
            .optional()?;
        Ok(state)
    }

    /// Marks a game live.
    #[instrument(skip(conn))]
    pub(crate) fn set_live(
        conn: &mut SqliteConnection,
        game_id: i32,
        now: NaiveDateTime,
    ) -> Result<GameState, DbError> {
        use schema::game_states::dsl;

        let state = diesel::update(dsl::game_states.filter(dsl::game_id.eq(game_id)))
            .set((dsl::is_live.eq(true), dsl::updated_at.eq(now)))
            .returning(GameState::as_returning())
            .get_result(conn)?;
        info!(game_id, "Game is live");
        Ok(state)
    }

    /// Moves a game to the given quarter.
    #[instrument(skip(conn))]
    pub(crate) fn set_quarter(
        conn: &mut SqliteConnection,
        game_id: i32,
        quarter: i32,
        now: NaiveDateTime,
    ) -> Result<GameState, DbError> {
        use schema::game_states::dsl;

        let state = diesel::update(dsl::game_states.filter(dsl::game_id.eq(game_id)))
            .set((dsl::current_quarter.eq(quarter), dsl::updated_at.eq(now)))
            .returning(GameState::as_returning())
            .get_result(conn)?;
        info!(game_id, quarter, "Quarter advanced");
        Ok(state)
    }

    /// Locks a game as final with its official scores.
    #[instrument(skip(conn))]
    pub(crate) fn set_final(
        conn: &mut SqliteConnection,
        game_id: i32,
        home_score: i32,
        away_score: i32,
        now: NaiveDateTime,
    ) -> Result<GameState, DbError> {
        use schema::game_states::dsl;

        let state = diesel::update(dsl::game_states.filter(dsl::game_id.eq(game_id)))
            .set((
                dsl::is_live.eq(false),
                dsl::is_final.eq(true),
                dsl::home_score.eq(Some(home_score)),
                dsl::away_score.eq(Some(away_score)),
                dsl::updated_at.eq(now),
            ))
            .returning(GameState::as_returning())
            .get_result(conn)?;
        info!(game_id, home_score, away_score, "Game finalized");
        Ok(state)
    }

    // ── Event log ────────────────────────────────────────────────

    /// Appends one event row. There is no update or delete path for events.
    #[instrument(skip(conn, event))]
    pub(crate) fn insert_event(
        conn: &mut SqliteConnection,
        event: NewGameEvent,
    ) -> Result<GameEvent, DbError> {
        let event = diesel::insert_into(schema::game_events::table)
            .values(&event)
            .returning(GameEvent::as_returning())
            .get_result(conn)?;
        debug!(
            event_id = event.id(),
            game_id = event.game_id(),
            event_type = %event.event_type(),
            "Event appended"
        );
        Ok(event)
    }

    /// Gets the full event log for a game, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn events(&self, game_id: i32) -> Result<Vec<GameEvent>, DbError> {
        let mut conn = self.connection()?;
        Self::events_for_game(&mut conn, game_id)
    }

    /// Gets the full event log within an existing transaction.
    #[instrument(skip(conn))]
    pub(crate) fn events_for_game(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Vec<GameEvent>, DbError> {
        let events = schema::game_events::table
            .filter(schema::game_events::game_id.eq(game_id))
            .order(schema::game_events::id.asc())
            .load::<GameEvent>(conn)?;
        Ok(events)
    }

    /// Gets the most recent events for a game, newest first.
    #[instrument(skip(conn))]
    pub(crate) fn recent_events(
        conn: &mut SqliteConnection,
        game_id: i32,
        limit: i64,
    ) -> Result<Vec<GameEvent>, DbError> {
        let events = schema::game_events::table
            .filter(schema::game_events::game_id.eq(game_id))
            .order(schema::game_events::id.desc())
            .limit(limit)
            .load::<GameEvent>(conn)?;
        Ok(events)
    }

    // ── Active rosters ───────────────────────────────────────────

    /// Gets every roster entry for a game, open and closed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn roster_entries(&self, game_id: i32) -> Result<Vec<ActiveRoster>, DbError> {
        let mut conn = self.connection()?;
        let entries = schema::active_rosters::table
            .filter(schema::active_rosters::game_id.eq(game_id))
            .order(schema::active_rosters::id.asc())
            .load::<ActiveRoster>(&mut conn)?;
        Ok(entries)
    }

    /// Gets every open roster entry for a game.
    #[instrument(skip(conn))]
    pub(crate) fn open_roster_entries(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Vec<ActiveRoster>, DbError> {
        let entries = schema::active_rosters::table
            .filter(schema::active_rosters::game_id.eq(game_id))
            .filter(schema::active_rosters::checked_out_at.is_null())
            .load::<ActiveRoster>(conn)?;
        Ok(entries)
    }

    /// Gets the open roster entry for one player, if any.
    #[instrument(skip(conn))]
    pub(crate) fn open_entry(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
    ) -> Result<Option<ActiveRoster>, DbError> {
        let entry = schema::active_rosters::table
            .filter(schema::active_rosters::game_id.eq(game_id))
            .filter(schema::active_rosters::player_id.eq(player_id))
            .filter(schema::active_rosters::checked_out_at.is_null())
            .first::<ActiveRoster>(conn)
            .optional()?;
        Ok(entry)
    }

    /// True when the player has ever been a starter in this game.
    #[instrument(skip(conn))]
    pub(crate) fn was_starter(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
    ) -> Result<bool, DbError> {
        use diesel::dsl::count_star;

        let starters: i64 = schema::active_rosters::table
            .filter(schema::active_rosters::game_id.eq(game_id))
            .filter(schema::active_rosters::player_id.eq(player_id))
            .filter(schema::active_rosters::is_starter.eq(true))
            .select(count_star())
            .first(conn)?;
        Ok(starters > 0)
    }

    /// Checks a player in: opens a new roster entry.
    #[instrument(skip(conn))]
    pub(crate) fn check_in(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
        team_id: i32,
        is_starter: bool,
        now: NaiveDateTime,
    ) -> Result<ActiveRoster, DbError> {
        let entry = diesel::insert_into(schema::active_rosters::table)
            .values(&NewActiveRoster::new(
                game_id, player_id, team_id, is_starter, now,
            ))
            .returning(ActiveRoster::as_returning())
            .get_result(conn)?;
        debug!(game_id, player_id, team_id, is_starter, "Player checked in");
        Ok(entry)
    }

    /// Checks a player out: closes the given roster entry.
    #[instrument(skip(conn))]
    pub(crate) fn check_out(
        conn: &mut SqliteConnection,
        entry_id: i32,
        now: NaiveDateTime,
    ) -> Result<ActiveRoster, DbError> {
        use schema::active_rosters::dsl;

        let entry = diesel::update(dsl::active_rosters.filter(dsl::id.eq(entry_id)))
            .set(dsl::checked_out_at.eq(Some(now)))
            .returning(ActiveRoster::as_returning())
            .get_result(conn)?;
        debug!(entry_id, player_id = entry.player_id(), "Player checked out");
        Ok(entry)
    }

    /// Closes every open roster entry for a game (used at finalize).
    #[instrument(skip(conn))]
    pub(crate) fn close_open_entries(
        conn: &mut SqliteConnection,
        game_id: i32,
        now: NaiveDateTime,
    ) -> Result<usize, DbError> {
        use schema::active_rosters::dsl;

        let closed = diesel::update(
            dsl::active_rosters
                .filter(dsl::game_id.eq(game_id))
                .filter(dsl::checked_out_at.is_null()),
        )
        .set(dsl::checked_out_at.eq(Some(now)))
        .execute(conn)?;
        debug!(game_id, closed, "Open roster entries closed");
        Ok(closed)
    }

    // ── Player stats ─────────────────────────────────────────────

    /// Gets every per-game stats row for a game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn game_stats(&self, game_id: i32) -> Result<Vec<PlayerGameStats>, DbError> {
        let mut conn = self.connection()?;
        Self::game_stats_rows(&mut conn, game_id)
    }

    /// Gets every per-game stats row within an existing transaction.
    #[instrument(skip(conn))]
    pub(crate) fn game_stats_rows(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Vec<PlayerGameStats>, DbError> {
        let rows = schema::player_game_stats::table
            .filter(schema::player_game_stats::game_id.eq(game_id))
            .order(schema::player_game_stats::player_id.asc())
            .load::<PlayerGameStats>(conn)?;
        Ok(rows)
    }

    /// Gets every per-quarter stats row for a game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn quarter_stats(&self, game_id: i32) -> Result<Vec<PlayerQuarterStats>, DbError> {
        let mut conn = self.connection()?;
        Self::quarter_stats_rows(&mut conn, game_id)
    }

    /// Gets every per-quarter stats row within an existing transaction.
    #[instrument(skip(conn))]
    pub(crate) fn quarter_stats_rows(
        conn: &mut SqliteConnection,
        game_id: i32,
    ) -> Result<Vec<PlayerQuarterStats>, DbError> {
        let rows = schema::player_quarter_stats::table
            .filter(schema::player_quarter_stats::game_id.eq(game_id))
            .order((
                schema::player_quarter_stats::player_id.asc(),
                schema::player_quarter_stats::quarter.asc(),
            ))
            .load::<PlayerQuarterStats>(conn)?;
        Ok(rows)
    }

    /// Adds a delta to a player's quarter row, creating it lazily.
    #[instrument(skip(conn, delta))]
    pub(crate) fn apply_quarter_delta(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
        quarter: i32,
        delta: &StatTotals,
        now: NaiveDateTime,
    ) -> Result<PlayerQuarterStats, DbError> {
        use schema::player_quarter_stats::dsl;

        let existing = dsl::player_quarter_stats
            .filter(dsl::game_id.eq(game_id))
            .filter(dsl::player_id.eq(player_id))
            .filter(dsl::quarter.eq(quarter))
            .first::<PlayerQuarterStats>(conn)
            .optional()?;

        let row = match existing {
            Some(row) => {
                let t = row.totals() + *delta;
                diesel::update(dsl::player_quarter_stats.filter(dsl::id.eq(*row.id())))
                    .set((
                        dsl::ftm.eq(*t.ftm()),
                        dsl::fta.eq(*t.fta()),
                        dsl::fg2m.eq(*t.fg2m()),
                        dsl::fg2a.eq(*t.fg2a()),
                        dsl::fg3m.eq(*t.fg3m()),
                        dsl::fg3a.eq(*t.fg3a()),
                        dsl::fouls.eq(*t.fouls()),
                        dsl::updated_at.eq(now),
                    ))
                    .returning(PlayerQuarterStats::as_returning())
                    .get_result(conn)?
            }
            None => diesel::insert_into(dsl::player_quarter_stats)
                .values(&NewPlayerQuarterStats::from_totals(
                    game_id, player_id, quarter, delta,
                ))
                .returning(PlayerQuarterStats::as_returning())
                .get_result(conn)?,
        };
        Ok(row)
    }

    /// Adds a delta to a player's game row, creating it lazily.
    #[instrument(skip(conn, delta))]
    pub(crate) fn apply_game_delta(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
        delta: &StatTotals,
        now: NaiveDateTime,
    ) -> Result<PlayerGameStats, DbError> {
        use schema::player_game_stats::dsl;

        let existing = dsl::player_game_stats
            .filter(dsl::game_id.eq(game_id))
            .filter(dsl::player_id.eq(player_id))
            .first::<PlayerGameStats>(conn)
            .optional()?;

        let row = match existing {
            Some(row) => {
                let t = row.totals() + *delta;
                diesel::update(dsl::player_game_stats.filter(dsl::id.eq(*row.id())))
                    .set((
                        dsl::ftm.eq(*t.ftm()),
                        dsl::fta.eq(*t.fta()),
                        dsl::fg2m.eq(*t.fg2m()),
                        dsl::fg2a.eq(*t.fg2a()),
                        dsl::fg3m.eq(*t.fg3m()),
                        dsl::fg3a.eq(*t.fg3a()),
                        dsl::fouls.eq(*t.fouls()),
                        dsl::updated_at.eq(now),
                    ))
                    .returning(PlayerGameStats::as_returning())
                    .get_result(conn)?
            }
            None => diesel::insert_into(dsl::player_game_stats)
                .values(&NewPlayerGameStats::from_totals(game_id, player_id, delta))
                .returning(PlayerGameStats::as_returning())
                .get_result(conn)?,
        };
        Ok(row)
    }

    /// Replaces a player's stat rows from per-quarter totals (bulk import).
    ///
    /// Deletes existing quarter and game rows for the player, inserts one
    /// quarter row per non-zero entry, and writes the game row as their sum.
    #[instrument(skip(conn, per_quarter), fields(quarters = per_quarter.len()))]
    pub(crate) fn replace_player_stats(
        conn: &mut SqliteConnection,
        game_id: i32,
        player_id: i32,
        per_quarter: &[(i32, StatTotals)],
    ) -> Result<PlayerGameStats, DbError> {
        {
            use schema::player_quarter_stats::dsl;
            diesel::delete(
                dsl::player_quarter_stats
                    .filter(dsl::game_id.eq(game_id))
                    .filter(dsl::player_id.eq(player_id)),
            )
            .execute(conn)?;
        }
        {
            use schema::player_game_stats::dsl;
            diesel::delete(
                dsl::player_game_stats
                    .filter(dsl::game_id.eq(game_id))
                    .filter(dsl::player_id.eq(player_id)),
            )
            .execute(conn)?;
        }

        let mut game_totals = StatTotals::default();
        for (quarter, totals) in per_quarter {
            game_totals += *totals;
            if totals.is_zero() {
                continue;
            }
            diesel::insert_into(schema::player_quarter_stats::table)
                .values(&NewPlayerQuarterStats::from_totals(
                    game_id, player_id, *quarter, totals,
                ))
                .execute(conn)?;
        }

        let row = diesel::insert_into(schema::player_game_stats::table)
            .values(&NewPlayerGameStats::from_totals(
                game_id, player_id, &game_totals,
            ))
            .returning(PlayerGameStats::as_returning())
            .get_result(conn)?;

        info!(game_id, player_id, "Player stats replaced from import");
        Ok(row)
    }
}
