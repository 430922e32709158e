use holdem_engine::action::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::engine::Engine;
use holdem_engine::phase::Phase;

fn engine(players: usize, dealer: usize) -> Engine {
    let config = GameConfig::with_players(players)
        .with_starting_chips(100)
        .with_dealer(dealer)
        .with_seed(99);
    let mut engine = Engine::new(config).unwrap();
    assert!(engine.start_new_hand());
    engine
}

fn complete_street(engine: &mut Engine) {
    let phase = engine.phase();
    while engine.phase() == phase {
        let seat = engine.current_player().unwrap();
        let action = if engine.state().call_amount(seat) == 0 {
            Action::check(seat)
        } else {
            Action::call(seat)
        };
        engine.execute_action(action).unwrap();
    }
}

#[test]
fn heads_up_dealer_posts_small_blind_and_acts_first_preflop() {
    let mut e = engine(2, 1);
    let state = e.state();
    assert_eq!(state.small_blind_position, Some(1));
    assert_eq!(state.big_blind_position, Some(0));
    assert_eq!(state.current_player, Some(1));

    complete_street(&mut e);
    assert_eq!(e.phase(), Phase::Flop);
    // after the flop the big blind acts first
    assert_eq!(e.current_player(), Some(0));
}

#[test]
fn three_handed_first_actor_is_left_of_big_blind() {
    for dealer in 0..3 {
        let e = engine(3, dealer);
        let sb = (dealer + 1) % 3;
        let bb = (dealer + 2) % 3;
        assert_eq!(e.state().small_blind_position, Some(sb));
        assert_eq!(e.state().big_blind_position, Some(bb));
        assert_eq!(e.current_player(), Some(dealer));
    }
}

#[test]
fn six_handed_positions_wrap_around() {
    let e = engine(6, 4);
    assert_eq!(e.state().small_blind_position, Some(5));
    assert_eq!(e.state().big_blind_position, Some(0));
    assert_eq!(e.current_player(), Some(1));
}

#[test]
fn postflop_starts_left_of_dealer_skipping_folded_seats() {
    let mut e = engine(4, 0);
    // preflop: 3 acts first, then 0, 1, 2
    assert_eq!(e.current_player(), Some(3));
    e.execute_action(Action::call(3)).unwrap();
    e.execute_action(Action::call(0)).unwrap();
    e.execute_action(Action::fold(1)).unwrap();
    e.execute_action(Action::check(2)).unwrap();
    assert_eq!(e.phase(), Phase::Flop);
    // seat 1 folded, so seat 2 opens the flop
    assert_eq!(e.current_player(), Some(2));

    let order: Vec<usize> = {
        let mut seen = Vec::new();
        while e.phase() == Phase::Flop {
            let seat = e.current_player().unwrap();
            seen.push(seat);
            e.execute_action(Action::check(seat)).unwrap();
        }
        seen
    };
    assert_eq!(order, vec![2, 3, 0]);
}

#[test]
fn every_street_burns_before_dealing() {
    let mut e = engine(3, 0);
    // 6 hole cards dealt
    assert_eq!(e.state().deck.remaining(), 46);
    complete_street(&mut e);
    assert_eq!(e.state().deck.remaining(), 42);
    complete_street(&mut e);
    assert_eq!(e.state().deck.remaining(), 40);
    complete_street(&mut e);
    assert_eq!(e.state().deck.remaining(), 38);
    assert_eq!(e.state().community_cards.len(), 5);
}

#[test]
fn available_actions_only_for_the_seat_to_act() {
    let e = engine(3, 0);
    assert!(!e.available_actions(0).is_empty());
    assert!(e.available_actions(1).is_empty());
    assert!(e.available_actions(2).is_empty());

    let details = e.available_action_details(0);
    let raise = details
        .iter()
        .find(|a| a.action_type == holdem_engine::action::ActionType::Raise)
        .unwrap();
    assert_eq!((raise.min_amount, raise.max_amount), (4, 100));
}
