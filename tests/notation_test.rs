//! Tests for the scorebook shot-notation codec.

use courtside::ShotCounts;

#[test]
fn test_decode_spec_example() {
    let counts = ShotCounts::decode("22-1x/");
    assert_eq!(*counts.ftm(), 1);
    assert_eq!(*counts.fta(), 2);
    assert_eq!(*counts.fg2m(), 2);
    assert_eq!(*counts.fg2a(), 3);
    assert_eq!(*counts.fg3m(), 0);
    assert_eq!(*counts.fg3a(), 1);
}

#[test]
fn test_decode_empty_is_zero() {
    assert!(ShotCounts::decode("").is_zero());
}

#[test]
fn test_decode_none_is_zero() {
    assert!(ShotCounts::decode_opt(None).is_zero());
}

#[test]
fn test_decode_unknown_characters_skipped() {
    let with_noise = ShotCounts::decode("a2 b3!?9");
    let clean = ShotCounts::decode("23");
    assert_eq!(with_noise, clean);
}

#[test]
fn test_decode_all_unknown_is_zero_not_error() {
    assert!(ShotCounts::decode("qwerty!@#").is_zero());
}

#[test]
fn test_decode_order_does_not_matter() {
    assert_eq!(ShotCounts::decode("123x-/"), ShotCounts::decode("/x-321"));
}

#[test]
fn test_counts_split_string_length_by_category() {
    let line = "11x22--33//";
    let counts = ShotCounts::decode(line);
    assert_eq!(counts.attempts() as usize, line.len());
    assert_eq!(*counts.fta(), 3);
    assert_eq!(*counts.fg2a(), 4);
    assert_eq!(*counts.fg3a(), 4);
}

#[test]
fn test_decode_is_additive() {
    let a = "2-1";
    let b = "3x/";
    let joined = format!("{a}{b}");
    assert_eq!(
        ShotCounts::decode(a) + ShotCounts::decode(b),
        ShotCounts::decode(&joined)
    );
}

#[test]
fn test_encode_round_trips_counts() {
    for line in &["22-1x/", "", "111", "///", "2-2-2-", "123x-/123x-/"] {
        let counts = ShotCounts::decode(line);
        assert_eq!(ShotCounts::decode(&counts.encode()), counts);
    }
}

#[test]
fn test_points() {
    // 1 FT + two 2pt makes + one 3pt make = 8.
    let counts = ShotCounts::decode("1223x/");
    assert_eq!(counts.points(), 8);
}

#[test]
fn test_sum_of_counts() {
    let total: ShotCounts = ["1", "2", "3", "x-/"]
        .iter()
        .map(|line| ShotCounts::decode(line))
        .sum();
    assert_eq!(total, ShotCounts::decode("123x-/"));
}
