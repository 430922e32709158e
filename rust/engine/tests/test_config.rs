use std::fs;

use holdem_engine::action::Action;
use holdem_engine::config::{
    apply_env_overrides, load, load_from_path, load_from_str, GameConfig, PlayerConfig, PlayerKind,
};
use holdem_engine::engine::Engine;
use holdem_engine::errors::ConfigError;
use serial_test::serial;

const ENV_KEYS: [&str; 5] = [
    "HOLDEM_SEED",
    "HOLDEM_SMALL_BLIND",
    "HOLDEM_BIG_BLIND",
    "HOLDEM_STARTING_CHIPS",
    "HOLDEM_DEBUG",
];

fn clear_env() {
    for k in ENV_KEYS {
        std::env::remove_var(k);
    }
}

#[test]
fn defaults_are_sensible() {
    let cfg = GameConfig::default();
    assert_eq!(cfg.starting_chips, 1000);
    assert_eq!((cfg.small_blind, cfg.big_blind), (1, 2));
    assert_eq!((cfg.min_players, cfg.max_players), (2, 9));
    assert_eq!(cfg.random_seed, None);
    assert!(!cfg.debug_mode);
    // no players configured yet
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    assert!(GameConfig::heads_up().validate().is_ok());
}

#[test]
fn toml_layers_over_defaults() {
    let cfg = load_from_str(
        r#"
        small_blind = 5
        big_blind = 10
        random_seed = 42

        [[players]]
        seat = 0
        name = "Alice"
        kind = "human"

        [[players]]
        seat = 3
        name = "Bot"
        chips = 500
        "#,
    )
    .unwrap();

    assert_eq!(cfg.small_blind, 5);
    assert_eq!(cfg.big_blind, 10);
    assert_eq!(cfg.starting_chips, 1000);
    assert_eq!(cfg.random_seed, Some(42));
    assert_eq!(cfg.human_seat(), Some(0));
    assert_eq!(cfg.players[1].kind, PlayerKind::Ai);
    assert_eq!(cfg.chips_for(&cfg.players[0]), 1000);
    assert_eq!(cfg.chips_for(&cfg.players[1]), 500);
    assert!(cfg.validate().is_ok());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = load_from_str("small_blind = \"five\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.toml");
    fs::write(
        &path,
        "starting_chips = 300\n[[players]]\nseat = 0\nname = \"a\"\n[[players]]\nseat = 1\nname = \"b\"\n",
    )
    .unwrap();
    let cfg = load_from_path(&path).unwrap();
    assert_eq!(cfg.starting_chips, 300);
    assert_eq!(cfg.players.len(), 2);

    let missing = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));
}

#[test]
fn validation_catches_bad_tables() {
    let bad_blinds = GameConfig::heads_up().with_blinds(2, 2);
    assert!(bad_blinds.validate().is_err());

    let zero_sb = GameConfig::heads_up().with_blinds(0, 2);
    assert!(zero_sb.validate().is_err());

    let mut duplicate = GameConfig::heads_up();
    duplicate.players[1].seat = 0;
    assert!(duplicate.validate().is_err());

    let empty_dealer = GameConfig::heads_up().with_dealer(5);
    assert!(empty_dealer.validate().is_err());

    let mut two_humans = GameConfig::with_players(3);
    two_humans.players[0].kind = PlayerKind::Human;
    two_humans.players[2].kind = PlayerKind::Human;
    assert!(two_humans.validate().is_err());

    assert!(GameConfig::with_players(10).validate().is_err());
    assert!(Engine::new(GameConfig::with_players(1)).is_err());
}

#[test]
fn table_chips_must_fit_in_a_u32() {
    let too_many = GameConfig::with_players(3).with_starting_chips(2_000_000_000);
    assert!(matches!(too_many.validate(), Err(ConfigError::Invalid(_))));
    assert!(Engine::new(too_many).is_err());

    let mut one_big_seat = GameConfig::with_players(3).with_starting_chips(100);
    one_big_seat.players[1].chips = Some(u32::MAX);
    assert!(one_big_seat.validate().is_err());

    let mut engine =
        Engine::new(GameConfig::heads_up().with_starting_chips(2_000_000_000).with_seed(8))
            .unwrap();
    assert!(engine.start_new_hand());
    let first = engine.current_player().unwrap();
    engine.execute_action(Action::all_in(first)).unwrap();
    let second = engine.current_player().unwrap();
    engine.execute_action(Action::all_in(second)).unwrap();
    engine.end_hand().unwrap();
    assert_eq!(engine.state().total_chips(), 4_000_000_000);
}

#[test]
fn sparse_seats_are_allowed() {
    let mut cfg = GameConfig::default();
    cfg.players = vec![
        PlayerConfig::new(2, "left", PlayerKind::Ai),
        PlayerConfig::new(7, "right", PlayerKind::Ai),
    ];
    cfg.dealer_seat = 7;
    let mut engine = Engine::new(cfg).unwrap();
    assert!(engine.start_new_hand());
    assert_eq!(engine.state().dealer_position, 7);
    assert_eq!(engine.state().big_blind_position, Some(2));
}

#[test]
#[serial]
fn env_overrides_apply_after_file_values() {
    clear_env();
    std::env::set_var("HOLDEM_SEED", "99");
    std::env::set_var("HOLDEM_BIG_BLIND", "20");
    std::env::set_var("HOLDEM_SMALL_BLIND", "10");
    std::env::set_var("HOLDEM_DEBUG", "yes");

    let mut cfg = GameConfig::heads_up().with_seed(1);
    apply_env_overrides(&mut cfg).unwrap();
    assert_eq!(cfg.random_seed, Some(99));
    assert_eq!((cfg.small_blind, cfg.big_blind), (10, 20));
    assert!(cfg.debug_mode);
    clear_env();
}

#[test]
#[serial]
fn bad_env_value_is_rejected() {
    clear_env();
    std::env::set_var("HOLDEM_STARTING_CHIPS", "lots");
    let mut cfg = GameConfig::heads_up();
    let err = apply_env_overrides(&mut cfg).unwrap_err();
    assert!(err.to_string().contains("starting chips"));

    std::env::set_var("HOLDEM_STARTING_CHIPS", "");
    assert!(apply_env_overrides(&mut cfg).is_ok());
    assert_eq!(cfg.starting_chips, 1000);
    clear_env();
}

#[test]
#[serial]
fn full_load_validates_the_result() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.toml");
    fs::write(
        &path,
        "[[players]]\nseat = 0\nname = \"a\"\n[[players]]\nseat = 1\nname = \"b\"\n",
    )
    .unwrap();

    assert!(load(Some(&path)).is_ok());

    std::env::set_var("HOLDEM_BIG_BLIND", "1");
    assert!(matches!(load(Some(&path)), Err(ConfigError::Invalid(_))));
    clear_env();

    // defaults alone have no players
    assert!(load(None).is_err());
}
