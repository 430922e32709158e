use std::collections::{BTreeMap, BTreeSet};

use holdem_engine::errors::GameError;
use holdem_engine::player::{Player, SeatStatus};
use holdem_engine::pot::{build_pots, calculate_side_pots, split_evenly, PotManager, SidePot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn contrib(pairs: &[(usize, u32)]) -> BTreeMap<usize, u32> {
    pairs.iter().copied().collect()
}

fn players_with_bets(bets: &[u32]) -> Vec<Player> {
    bets.iter()
        .enumerate()
        .map(|(i, &b)| {
            let mut p = Player::new(i, format!("p{i}"), 1000);
            p.bet(b).unwrap();
            p
        })
        .collect()
}

#[test]
fn uneven_all_ins_make_main_and_side_pot() {
    let dist = calculate_side_pots(&contrib(&[(0, 25), (1, 50), (2, 100)]));
    assert_eq!(
        dist.pots,
        vec![
            SidePot {
                amount: 75,
                eligible: vec![0, 1, 2]
            },
            SidePot {
                amount: 50,
                eligible: vec![1, 2]
            },
        ]
    );
    assert_eq!(dist.returned, contrib(&[(2, 50)]));
    assert_eq!(dist.pots_total() + dist.returned_total(), 175);
}

#[test]
fn equal_stacks_make_a_single_pot() {
    let dist = calculate_side_pots(&contrib(&[(0, 100), (1, 100), (2, 100)]));
    assert_eq!(dist.pots.len(), 1);
    assert_eq!(dist.pots[0].amount, 300);
    assert!(dist.returned.is_empty());
}

#[test]
fn folded_seat_funds_tiers_it_reached() {
    let folded: BTreeSet<usize> = [1].into_iter().collect();
    let dist = build_pots(&contrib(&[(0, 20), (1, 60), (2, 100), (3, 100)]), &folded);
    // 20 from each of four, then 40 from three, then 40 from two
    assert_eq!(
        dist.pots,
        vec![
            SidePot {
                amount: 80,
                eligible: vec![0, 2, 3]
            },
            SidePot {
                amount: 200,
                eligible: vec![2, 3]
            },
        ]
    );
}

#[test]
fn side_pot_conservation_over_random_contributions() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xC0FFEE);
    for _ in 0..500 {
        let seats = rng.random_range(2..=9usize);
        let map: BTreeMap<usize, u32> = (0..seats)
            .map(|s| (s, rng.random_range(0..=400u32)))
            .collect();
        let folded: BTreeSet<usize> = (0..seats).filter(|_| rng.random_bool(0.3)).collect();
        let dist = build_pots(&map, &folded);

        let total: u32 = map.values().sum();
        assert_eq!(dist.pots_total() + dist.returned_total(), total, "{map:?}");
        for pot in &dist.pots {
            assert!(pot.amount > 0);
            assert!(!pot.eligible.is_empty());
            assert!(pot.eligible.iter().all(|s| !folded.contains(s)));
        }
        for (seat, back) in &dist.returned {
            assert!(*back <= map[seat]);
        }
    }
}

#[test]
fn collection_returns_uncalled_excess() {
    let mut players = players_with_bets(&[30, 100, 30]);
    let mut pm = PotManager::new();
    let returns = pm.collect_from_players(&mut players);

    assert_eq!(returns, contrib(&[(1, 70)]));
    assert_eq!(pm.total(), 90);
    assert_eq!(players[1].chips, 970);
    assert_eq!(players[1].total_contributed, 30);
    assert!(players.iter().all(|p| p.current_bet == 0));
    assert!(pm.validate_pot_integrity());
}

#[test]
fn contributions_accumulate_across_streets() {
    let mut players = players_with_bets(&[10, 10, 10]);
    let mut pm = PotManager::new();
    pm.collect_from_players(&mut players);

    // seat 0 is short all-in on the next street
    players[0].chips = 5;
    players[0].bet(5).unwrap();
    players[1].bet(50).unwrap();
    players[2].bet(50).unwrap();
    pm.collect_from_players(&mut players);

    assert_eq!(pm.contributions(), &contrib(&[(0, 15), (1, 60), (2, 60)]));
    assert_eq!(pm.main_pot(), 45);
    assert_eq!(
        pm.side_pots(),
        &[SidePot {
            amount: 90,
            eligible: vec![1, 2]
        }]
    );
    assert!(pm.has_side_pots());
}

#[test]
fn award_pots_pays_each_pot_to_its_winners() {
    let mut players = players_with_bets(&[25, 50, 50]);
    players[0].status = SeatStatus::AllIn;
    let mut pm = PotManager::new();
    pm.collect_from_players(&mut players);
    let before: u32 = players.iter().map(|p| p.chips).sum();

    let winners: BTreeMap<usize, Vec<usize>> = [(0, vec![0]), (1, vec![1, 2])].into_iter().collect();
    let payouts = pm.award_pots(&winners, &mut players).unwrap();

    assert_eq!(payouts, contrib(&[(0, 75), (1, 25), (2, 25)]));
    let after: u32 = players.iter().map(|p| p.chips).sum();
    assert_eq!(after - before, 125);
    assert_eq!(pm.total(), 0);
    assert!(pm.validate_pot_integrity());
}

#[test]
fn award_pots_rejects_ineligible_winner_without_paying() {
    let mut players = players_with_bets(&[25, 50, 50]);
    let mut pm = PotManager::new();
    pm.collect_from_players(&mut players);
    let snapshot = players.clone();

    let winners: BTreeMap<usize, Vec<usize>> = [(0, vec![1]), (1, vec![0])].into_iter().collect();
    let err = pm.award_pots(&winners, &mut players).unwrap_err();
    assert!(matches!(err, GameError::GameState(_)));
    assert_eq!(players, snapshot);
    assert_eq!(pm.total(), 125);
}

#[test]
fn odd_chips_go_to_lowest_seats() {
    assert_eq!(split_evenly(5, &[2, 7]), vec![(2, 3), (7, 2)]);
    assert_eq!(split_evenly(6, &[0, 1, 2]), vec![(0, 2), (1, 2), (2, 2)]);
    assert!(split_evenly(10, &[]).is_empty());
}

#[test]
fn reset_clears_everything() {
    let mut players = players_with_bets(&[10, 10]);
    let mut pm = PotManager::new();
    pm.collect_from_players(&mut players);
    pm.reset();
    assert_eq!(pm, PotManager::new());
}
