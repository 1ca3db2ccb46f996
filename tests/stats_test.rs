//! Tests for stat aggregation and score calculation.

use courtside::{ShotCounts, ShotType, StatTotals, sum_quarters, team_score};

#[test]
fn test_shot_delta_made_free_throw() {
    let delta = StatTotals::from_shot(ShotType::FreeThrow, true);
    assert_eq!(*delta.ftm(), 1);
    assert_eq!(*delta.fta(), 1);
    assert_eq!(*delta.fg2a(), 0);
    assert_eq!(delta.points(), 1);
}

#[test]
fn test_shot_delta_missed_three() {
    let delta = StatTotals::from_shot(ShotType::ThreePoint, false);
    assert_eq!(*delta.fg3m(), 0);
    assert_eq!(*delta.fg3a(), 1);
    assert_eq!(delta.points(), 0);
}

#[test]
fn test_foul_delta() {
    let delta = StatTotals::foul();
    assert_eq!(*delta.fouls(), 1);
    assert_eq!(delta.points(), 0);
}

#[test]
fn test_sum_quarters_matches_incremental_addition() {
    let quarters = [
        StatTotals::from_counts(ShotCounts::decode("22-1")),
        StatTotals::from_counts(ShotCounts::decode("3//x")),
        StatTotals::from_counts(ShotCounts::decode("111")),
        StatTotals::from_counts(ShotCounts::decode("-")),
    ];

    let batch = sum_quarters(quarters.iter());

    let mut incremental = StatTotals::default();
    for q in &quarters {
        incremental += *q;
    }

    assert_eq!(batch, incremental);
}

#[test]
fn test_sum_quarters_is_order_independent() {
    let a = StatTotals::from_shot(ShotType::TwoPoint, true);
    let b = StatTotals::from_shot(ShotType::ThreePoint, false);
    let c = StatTotals::foul();

    assert_eq!(sum_quarters([a, b, c].iter()), sum_quarters([c, a, b].iter()));
    assert_eq!(a + b, b + a);
    assert_eq!((a + b) + c, a + (b + c));
}

#[test]
fn test_team_score_formula() {
    // 3 FT + 4×2pt + 2×3pt = 3 + 8 + 6 = 17.
    let players = [
        StatTotals::new(2, 4, 1, 3, 0, 1, 2),
        StatTotals::new(1, 1, 3, 5, 2, 4, 0),
    ];
    assert_eq!(team_score(players.iter()), 17);
}

#[test]
fn test_team_score_empty_is_zero() {
    let nobody: [StatTotals; 0] = [];
    assert_eq!(team_score(nobody.iter()), 0);
}

#[test]
fn test_consistency_invariant() {
    assert!(StatTotals::from_counts(ShotCounts::decode("22-1x/")).is_consistent());
    assert!(StatTotals::default().is_consistent());
    // Makes exceeding attempts is inconsistent.
    assert!(!StatTotals::new(2, 1, 0, 0, 0, 0, 0).is_consistent());
}

#[test]
fn test_counts_points_agree_with_totals_points() {
    let counts = ShotCounts::decode("1223x/-");
    assert_eq!(counts.points(), StatTotals::from_counts(counts).points());
}
