//! Tests for game lifecycle gating and the spec scenario.

use chrono::NaiveDate;
use std::thread;
use tempfile::NamedTempFile;

use courtside::{GameEngine, GameError, GamePhase, ScorebookRepository, ShotType};

/// One scheduled game between two seeded teams of seven players each. The
/// temp file must stay in scope to keep the database alive.
struct Fixture {
    _db: NamedTempFile,
    engine: GameEngine,
    home_team: i32,
    away_team: i32,
    home_players: Vec<i32>,
    away_players: Vec<i32>,
    game_id: i32,
}

fn setup_game() -> Fixture {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = ScorebookRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");

    let home = repo
        .create_team("Lakers".to_string())
        .expect("Create team failed");
    let away = repo
        .create_team("Warriors".to_string())
        .expect("Create team failed");

    let mut home_players = Vec::new();
    let mut away_players = Vec::new();
    for i in 0..7 {
        let p = repo
            .create_player(*home.id(), format!("Home {i}"), i)
            .expect("Create player failed");
        home_players.push(*p.id());
        let p = repo
            .create_player(*away.id(), format!("Away {i}"), i)
            .expect("Create player failed");
        away_players.push(*p.id());
    }

    let engine = GameEngine::new(repo);
    let game = engine
        .create_game(
            NaiveDate::from_ymd_opt(2026, 3, 14).expect("Bad date"),
            *home.id(),
            *away.id(),
            None,
            None,
        )
        .expect("Create game failed");

    Fixture {
        _db: db_file,
        engine,
        home_team: *home.id(),
        away_team: *away.id(),
        home_players,
        away_players,
        game_id: *game.id(),
    }
}

fn start(fx: &Fixture) {
    fx.engine
        .start_game(
            fx.game_id,
            &fx.home_players[..5],
            &fx.away_players[..5],
        )
        .expect("Start failed");
}

#[test]
fn test_created_game_is_scheduled() {
    let fx = setup_game();
    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    let state = snapshot.game_state();
    assert_eq!(state.phase(), GamePhase::Scheduled);
    assert_eq!(*state.current_quarter(), 1);
    assert!(!*state.is_live());
    assert!(!*state.is_final());
    assert!(snapshot.recent_events().is_empty());
}

#[test]
fn test_create_game_same_team_rejected() {
    let fx = setup_game();
    let result = fx.engine.create_game(
        NaiveDate::from_ymd_opt(2026, 3, 15).expect("Bad date"),
        fx.home_team,
        fx.home_team,
        None,
        None,
    );
    assert!(matches!(result, Err(GameError::SameTeam { .. })));
}

#[test]
fn test_create_duplicate_game_rejected_both_orders() {
    let fx = setup_game();
    let date = NaiveDate::from_ymd_opt(2026, 3, 14).expect("Bad date");

    let same_order = fx
        .engine
        .create_game(date, fx.home_team, fx.away_team, None, None);
    assert!(matches!(same_order, Err(GameError::DuplicateGame { .. })));

    let swapped = fx
        .engine
        .create_game(date, fx.away_team, fx.home_team, None, None);
    assert!(matches!(swapped, Err(GameError::DuplicateGame { .. })));

    // A different date is a different game.
    let other_date = NaiveDate::from_ymd_opt(2026, 3, 21).expect("Bad date");
    fx.engine
        .create_game(other_date, fx.home_team, fx.away_team, None, None)
        .expect("Different date should be allowed");
}

#[test]
fn test_start_game_goes_live() {
    let fx = setup_game();
    start(&fx);

    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    assert_eq!(snapshot.game_state().phase(), GamePhase::Live);
    assert_eq!(*snapshot.game_state().current_quarter(), 1);
    assert_eq!(snapshot.recent_events().len(), 1);

    let court = fx.engine.on_court(fx.game_id).expect("Roster failed");
    assert_eq!(court.on_court(fx.home_team).len(), 5);
    assert_eq!(court.on_court(fx.away_team).len(), 5);
}

#[test]
fn test_start_game_twice_fails_already_live() {
    let fx = setup_game();
    start(&fx);
    let result = fx.engine.start_game(
        fx.game_id,
        &fx.home_players[..5],
        &fx.away_players[..5],
    );
    assert!(matches!(result, Err(GameError::AlreadyLive { .. })));
}

#[test]
fn test_start_game_empty_lineup_rejected() {
    let fx = setup_game();
    let result = fx
        .engine
        .start_game(fx.game_id, &[], &fx.away_players[..5]);
    assert!(matches!(result, Err(GameError::InvalidSubstitution { .. })));
}

#[test]
fn test_start_game_wrong_team_starter_rejected() {
    let fx = setup_game();
    // An away player listed in the home lineup.
    let mut home = fx.home_players[..4].to_vec();
    home.push(fx.away_players[0]);
    let result = fx
        .engine
        .start_game(fx.game_id, &home, &fx.away_players[..5]);
    assert!(matches!(result, Err(GameError::TeamMismatch { .. })));

    // Nothing was applied: the game is still scheduled with nobody on court.
    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    assert_eq!(snapshot.game_state().phase(), GamePhase::Scheduled);
    let court = fx.engine.on_court(fx.game_id).expect("Roster failed");
    assert_eq!(court.count(), 0);
}

#[test]
fn test_record_shot_before_start_fails_not_live() {
    let fx = setup_game();
    let result = fx
        .engine
        .record_shot(fx.game_id, fx.home_players[0], ShotType::TwoPoint, true, 1);
    assert!(matches!(result, Err(GameError::NotLive { .. })));
}

#[test]
fn test_record_shot_unknown_game_fails_not_found() {
    let fx = setup_game();
    let result = fx
        .engine
        .record_shot(9999, fx.home_players[0], ShotType::TwoPoint, true, 1);
    assert!(matches!(result, Err(GameError::GameNotFound { .. })));
}

#[test]
fn test_record_shot_bench_player_fails_not_on_roster() {
    let fx = setup_game();
    start(&fx);
    // Player 6 and 7 are not in the starting five.
    let result = fx
        .engine
        .record_shot(fx.game_id, fx.home_players[5], ShotType::TwoPoint, true, 1);
    assert!(matches!(result, Err(GameError::PlayerNotOnRoster { .. })));
}

#[test]
fn test_record_shot_invalid_quarter_rejected() {
    let fx = setup_game();
    start(&fx);
    for quarter in [0, -1, 6] {
        let result = fx.engine.record_shot(
            fx.game_id,
            fx.home_players[0],
            ShotType::FreeThrow,
            true,
            quarter,
        );
        assert!(matches!(result, Err(GameError::InvalidQuarter { .. })));
    }
}

#[test]
fn test_record_shot_historical_quarter_does_not_advance_clock() {
    let fx = setup_game();
    start(&fx);
    fx.engine.end_quarter(fx.game_id).expect("End quarter failed");

    // Late correction booked against quarter 1 while the game is in quarter 2.
    fx.engine
        .record_shot(fx.game_id, fx.home_players[0], ShotType::FreeThrow, true, 1)
        .expect("Historical shot failed");

    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    assert_eq!(*snapshot.game_state().current_quarter(), 2);
}

#[test]
fn test_record_foul_returns_running_total() {
    let fx = setup_game();
    start(&fx);

    let first = fx
        .engine
        .record_foul(fx.game_id, fx.home_players[1], "personal", 1)
        .expect("Foul failed");
    assert_eq!(*first.fouls(), 1);

    let second = fx
        .engine
        .record_foul(fx.game_id, fx.home_players[1], "shooting", 1)
        .expect("Foul failed");
    assert_eq!(*second.fouls(), 2);
}

#[test]
fn test_end_quarter_advances_through_regulation() {
    let fx = setup_game();
    start(&fx);

    for expected in [2, 3, 4] {
        let state = fx.engine.end_quarter(fx.game_id).expect("End quarter failed");
        assert_eq!(*state.current_quarter(), expected);
    }

    // Quarter 4 cannot be ended; finalize or overtime is required.
    let result = fx.engine.end_quarter(fx.game_id);
    assert!(matches!(result, Err(GameError::InvalidQuarter { quarter: 4 })));
}

#[test]
fn test_overtime_only_from_quarter_four() {
    let fx = setup_game();
    start(&fx);

    let early = fx.engine.begin_overtime(fx.game_id);
    assert!(matches!(early, Err(GameError::InvalidQuarter { quarter: 1 })));

    for _ in 0..3 {
        fx.engine.end_quarter(fx.game_id).expect("End quarter failed");
    }
    let state = fx.engine.begin_overtime(fx.game_id).expect("Overtime failed");
    assert_eq!(*state.current_quarter(), 5);

    // No second overtime.
    let again = fx.engine.begin_overtime(fx.game_id);
    assert!(matches!(again, Err(GameError::InvalidQuarter { quarter: 5 })));
}

#[test]
fn test_finalize_before_start_fails_not_live() {
    let fx = setup_game();
    let result = fx.engine.finalize_game(fx.game_id);
    assert!(matches!(result, Err(GameError::NotLive { .. })));
}

#[test]
fn test_no_operation_leaves_final() {
    let fx = setup_game();
    start(&fx);
    fx.engine.finalize_game(fx.game_id).expect("Finalize failed");

    assert!(matches!(
        fx.engine.finalize_game(fx.game_id),
        Err(GameError::NotLive { .. })
    ));
    assert!(matches!(
        fx.engine
            .record_shot(fx.game_id, fx.home_players[0], ShotType::TwoPoint, true, 1),
        Err(GameError::NotLive { .. })
    ));
    assert!(matches!(
        fx.engine.end_quarter(fx.game_id),
        Err(GameError::NotLive { .. })
    ));
    assert!(matches!(
        fx.engine.start_game(
            fx.game_id,
            &fx.home_players[..5],
            &fx.away_players[..5]
        ),
        Err(GameError::AlreadyLive { .. })
    ));

    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    assert_eq!(snapshot.game_state().phase(), GamePhase::Final);
}

#[test]
fn test_spec_scenario_full_game() {
    let fx = setup_game();
    start(&fx);

    let a = fx.home_players[0];
    let b = fx.home_players[1];
    let c = fx.away_players[0];

    // Made 2pt for A in quarter 1.
    let a_stats = fx
        .engine
        .record_shot(fx.game_id, a, ShotType::TwoPoint, true, 1)
        .expect("Shot failed");
    assert_eq!(*a_stats.fg2m(), 1);
    assert_eq!(*a_stats.fg2a(), 1);

    // Missed 3pt for B.
    let b_stats = fx
        .engine
        .record_shot(fx.game_id, b, ShotType::ThreePoint, false, 1)
        .expect("Shot failed");
    assert_eq!(*b_stats.fg3m(), 0);
    assert_eq!(*b_stats.fg3a(), 1);

    // Made FT for C.
    let c_stats = fx
        .engine
        .record_shot(fx.game_id, c, ShotType::FreeThrow, true, 1)
        .expect("Shot failed");
    assert_eq!(*c_stats.ftm(), 1);
    assert_eq!(*c_stats.fta(), 1);

    let state = fx.engine.end_quarter(fx.game_id).expect("End quarter failed");
    assert_eq!(*state.current_quarter(), 2);

    let scores = fx.engine.finalize_game(fx.game_id).expect("Finalize failed");
    assert_eq!(*scores.home_score(), 2);
    assert_eq!(*scores.away_score(), 1);

    let snapshot = fx.engine.live_state(fx.game_id, 10).expect("Snapshot failed");
    assert!(*snapshot.game_state().is_final());
    assert!(!*snapshot.game_state().is_live());
    assert_eq!(*snapshot.game_state().home_score(), Some(2));
    assert_eq!(*snapshot.game_state().away_score(), Some(1));
}

#[test]
fn test_concurrent_writers_one_game_lose_no_deltas() {
    let fx = setup_game();
    start(&fx);
    let shooter = fx.home_players[0];
    let game_id = fx.game_id;

    let threads: i32 = 4;
    let shots_each: i32 = 5;
    thread::scope(|s| {
        for _ in 0..threads {
            let engine = fx.engine.clone();
            s.spawn(move || {
                for _ in 0..shots_each {
                    engine
                        .record_shot(game_id, shooter, ShotType::FreeThrow, true, 1)
                        .expect("Shot failed");
                }
            });
        }
    });

    let rows = fx
        .engine
        .repository()
        .game_stats(game_id)
        .expect("Stats failed");
    let row = rows
        .iter()
        .find(|r| *r.player_id() == shooter)
        .expect("Missing stats row");
    assert_eq!(*row.ftm(), threads * shots_each);
    assert_eq!(*row.fta(), threads * shots_each);

    // Start plus every shot: nothing lost, nothing applied twice.
    let events = fx
        .engine
        .repository()
        .events(game_id)
        .expect("Events failed");
    assert_eq!(events.len(), 1 + (threads * shots_each) as usize);

    // The terminal transition still gates correctly after the contention.
    fx.engine.finalize_game(game_id).expect("Finalize failed");
    assert!(matches!(
        fx.engine
            .record_shot(game_id, shooter, ShotType::FreeThrow, true, 1),
        Err(GameError::NotLive { .. })
    ));
}

#[test]
fn test_different_games_progress_concurrently() {
    let fx = setup_game();
    start(&fx);

    let other = fx
        .engine
        .create_game(
            NaiveDate::from_ymd_opt(2026, 3, 21).expect("Bad date"),
            fx.home_team,
            fx.away_team,
            None,
            None,
        )
        .expect("Create game failed");
    let other_id = *other.id();
    fx.engine
        .start_game(other_id, &fx.home_players[..5], &fx.away_players[..5])
        .expect("Start failed");

    let shooter = fx.home_players[0];
    let shots_each: i32 = 10;
    thread::scope(|s| {
        for game_id in [fx.game_id, other_id] {
            let engine = fx.engine.clone();
            s.spawn(move || {
                for _ in 0..shots_each {
                    engine
                        .record_shot(game_id, shooter, ShotType::TwoPoint, true, 1)
                        .expect("Shot failed");
                }
            });
        }
    });

    for game_id in [fx.game_id, other_id] {
        let rows = fx
            .engine
            .repository()
            .game_stats(game_id)
            .expect("Stats failed");
        let row = rows
            .iter()
            .find(|r| *r.player_id() == shooter)
            .expect("Missing stats row");
        assert_eq!(*row.fg2m(), shots_each, "game {game_id}");
        assert_eq!(*row.fg2a(), shots_each, "game {game_id}");
    }
}

#[test]
fn test_live_state_negative_recent_returns_no_events() {
    let fx = setup_game();
    start(&fx);
    fx.engine
        .record_shot(fx.game_id, fx.home_players[0], ShotType::TwoPoint, true, 1)
        .expect("Shot failed");

    let snapshot = fx.engine.live_state(fx.game_id, -1).expect("Snapshot failed");
    assert!(snapshot.recent_events().is_empty());

    let snapshot = fx.engine.live_state(fx.game_id, 0).expect("Snapshot failed");
    assert!(snapshot.recent_events().is_empty());
}

#[test]
fn test_live_state_recent_events_newest_first() {
    let fx = setup_game();
    start(&fx);
    fx.engine
        .record_shot(fx.game_id, fx.home_players[0], ShotType::TwoPoint, true, 1)
        .expect("Shot failed");
    fx.engine
        .record_foul(fx.game_id, fx.away_players[0], "personal", 1)
        .expect("Foul failed");

    let snapshot = fx.engine.live_state(fx.game_id, 2).expect("Snapshot failed");
    let events = snapshot.recent_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type(), "foul");
    assert_eq!(events[1].event_type(), "shot");

    assert!(matches!(
        fx.engine.live_state(9999, 2),
        Err(GameError::GameNotFound { .. })
    ));
}
