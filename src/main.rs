//! Courtside - live basketball scorekeeping CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use courtside::{GameEngine, ScorebookRepository, ShotType};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let repo = ScorebookRepository::new(cli.db_path.clone())?;

    match cli.command {
        Command::Migrate => {
            repo.run_migrations()?;
            info!("Database ready");
        }
        Command::AddTeam { name } => {
            let team = repo.create_team(name)?;
            println!("{}", serde_json::to_string_pretty(&team)?);
        }
        Command::AddPlayer {
            team_id,
            name,
            jersey,
        } => {
            let player = repo.create_player(team_id, name, jersey)?;
            println!("{}", serde_json::to_string_pretty(&player)?);
        }
        Command::Schedule {
            date,
            home_team_id,
            away_team_id,
            location,
        } => {
            let engine = GameEngine::new(repo);
            let game = engine.create_game(date, home_team_id, away_team_id, location, None)?;
            println!("{}", serde_json::to_string_pretty(&game)?);
        }
        Command::Start {
            game_id,
            home,
            away,
        } => {
            let engine = GameEngine::new(repo);
            let state = engine.start_game(game_id, &home, &away)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Shot {
            game_id,
            player_id,
            shot_type,
            quarter,
            missed,
        } => {
            let engine = GameEngine::new(repo);
            let shot_type = ShotType::from_db_string(&shot_type)?;
            let row = engine.record_shot(game_id, player_id, shot_type, !missed, quarter)?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        Command::Foul {
            game_id,
            player_id,
            quarter,
            foul_type,
        } => {
            let engine = GameEngine::new(repo);
            let row = engine.record_foul(game_id, player_id, &foul_type, quarter)?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        Command::Sub {
            game_id,
            team_id,
            out,
            players_in,
        } => {
            let engine = GameEngine::new(repo);
            let view = engine.substitute_players(game_id, team_id, &out, &players_in)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::EndQuarter { game_id } => {
            let engine = GameEngine::new(repo);
            let state = engine.end_quarter(game_id)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Overtime { game_id } => {
            let engine = GameEngine::new(repo);
            let state = engine.begin_overtime(game_id)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Finalize { game_id } => {
            let engine = GameEngine::new(repo);
            let scores = engine.finalize_game(game_id)?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Command::Score { game_id } => {
            let engine = GameEngine::new(repo);
            let scores = engine.scores(game_id)?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Command::Court { game_id } => {
            let engine = GameEngine::new(repo);
            let view = engine.on_court(game_id)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Show { game_id, recent } => {
            let engine = GameEngine::new(repo);
            let snapshot = engine.live_state(game_id, recent)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Import {
            game_id,
            player_id,
            quarters,
        } => {
            let engine = GameEngine::new(repo);
            let lines: Vec<Option<String>> = quarters.into_iter().map(Some).collect();
            let row = engine.import_quarter_lines(game_id, player_id, &lines)?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        Command::Audit { game_id } => {
            let engine = GameEngine::new(repo);
            let audit = engine.audit_totals(game_id)?;
            println!("{}", serde_json::to_string_pretty(&audit)?);
        }
    }

    Ok(())
}
