//! Command-line interface for courtside.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Courtside - live basketball game scorekeeping
#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "Live basketball scorekeeping engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the database file (created if it doesn't exist)
    #[arg(long, default_value = "courtside.db", global = true)]
    pub db_path: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply any pending schema migrations
    Migrate,

    /// Create a team
    AddTeam {
        /// Team name
        name: String,
    },

    /// Create a player on a team
    AddPlayer {
        /// Team the player belongs to
        team_id: i32,

        /// Player name
        name: String,

        /// Jersey number
        #[arg(long, default_value = "0")]
        jersey: i32,
    },

    /// Schedule a game between two teams
    Schedule {
        /// Game date (YYYY-MM-DD)
        date: NaiveDate,

        /// Home team id
        home_team_id: i32,

        /// Away team id
        away_team_id: i32,

        /// Optional venue
        #[arg(long)]
        location: Option<String>,
    },

    /// Start a game with its two starting lineups
    Start {
        /// Game id
        game_id: i32,

        /// Home starters, comma-separated player ids
        #[arg(long, value_delimiter = ',')]
        home: Vec<i32>,

        /// Away starters, comma-separated player ids
        #[arg(long, value_delimiter = ',')]
        away: Vec<i32>,
    },

    /// Record a shot attempt for a player
    Shot {
        /// Game id
        game_id: i32,

        /// Player id
        player_id: i32,

        /// Shot type: ft, 2pt, or 3pt
        shot_type: String,

        /// Quarter the shot is booked against
        quarter: i32,

        /// Record the attempt as a miss
        #[arg(long)]
        missed: bool,
    },

    /// Record a foul against a player
    Foul {
        /// Game id
        game_id: i32,

        /// Player id
        player_id: i32,

        /// Quarter the foul is booked against
        quarter: i32,

        /// Foul classification
        #[arg(long, default_value = "personal")]
        foul_type: String,
    },

    /// Substitute players for one team
    Sub {
        /// Game id
        game_id: i32,

        /// Team making the substitution
        team_id: i32,

        /// Players leaving the court, comma-separated
        #[arg(long, value_delimiter = ',')]
        out: Vec<i32>,

        /// Players entering the court, comma-separated
        #[arg(long = "in", value_delimiter = ',')]
        players_in: Vec<i32>,
    },

    /// End the current quarter (regulation only)
    EndQuarter {
        /// Game id
        game_id: i32,
    },

    /// Extend a tied game into overtime
    Overtime {
        /// Game id
        game_id: i32,
    },

    /// Finalize a live game and lock in the official scores
    Finalize {
        /// Game id
        game_id: i32,
    },

    /// Show the current scores derived from player totals
    Score {
        /// Game id
        game_id: i32,
    },

    /// Show who is on court for each team
    Court {
        /// Game id
        game_id: i32,
    },

    /// Show a game's state and recent events as JSON
    Show {
        /// Game id
        game_id: i32,

        /// How many recent events to include
        #[arg(long, default_value = "10")]
        recent: i64,
    },

    /// Import scorebook quarter lines for one player (quarter 1 first)
    Import {
        /// Game id
        game_id: i32,

        /// Player id
        player_id: i32,

        /// Up to five quarter lines in scorebook notation (e.g. "22-1x/")
        quarters: Vec<String>,
    },

    /// Replay a game's event log and verify stored totals
    Audit {
        /// Game id
        game_id: i32,
    },
}
