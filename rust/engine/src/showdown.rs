use std::collections::BTreeMap;

use serde::Serialize;

use crate::cards::Card;
use crate::errors::GameError;
use crate::events::EventKind;
use crate::game::GameState;
use crate::hand::{best_hand, HandResult};

/// A hand revealed at showdown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ShownHand {
    pub seat: usize,
    pub hole_cards: Vec<Card>,
    pub result: HandResult,
    pub best_five: [Card; 5],
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PotAward {
    pub pot_index: usize,
    pub amount: u32,
    pub eligible: Vec<usize>,
    pub winners: Vec<usize>,
}

/// Outcome of a finished hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HandSummary {
    pub hand_number: u64,
    pub board: Vec<Card>,
    pub pots: Vec<PotAward>,
    /// Chips paid to each winning seat
    pub winnings: BTreeMap<usize, u32>,
    /// Empty when the hand was won uncontested
    pub hands: Vec<ShownHand>,
    pub won_uncontested: bool,
}

impl HandSummary {
    /// Every seat that won at least one pot, ascending.
    pub fn winners(&self) -> Vec<usize> {
        self.winnings.keys().copied().collect()
    }

    pub fn total_awarded(&self) -> u32 {
        self.winnings.values().sum()
    }

    pub fn hand_of(&self, seat: usize) -> Option<&ShownHand> {
        self.hands.iter().find(|h| h.seat == seat)
    }

    /// One-line description, e.g. `"seat 2 wins 6 with straight, 9 high"`.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .winnings
            .iter()
            .map(|(&seat, &amount)| match self.hand_of(seat) {
                Some(h) => format!("seat {seat} wins {amount} with {}", h.result),
                None => format!("seat {seat} wins {amount}"),
            })
            .collect();
        parts.join("; ")
    }
}

/// Pays out every pot and returns what happened.
///
/// A lone survivor takes everything without any evaluation. Otherwise each
/// pot goes to the best hands among the seats eligible for it, split evenly
/// with odd chips to the lowest seats.
pub fn resolve(state: &mut GameState) -> Result<HandSummary, GameError> {
    if state.outstanding_bets() > 0 {
        state.collect_bets();
    }
    let in_hand: Vec<usize> = state.players_in_hand().map(|p| p.seat_id).collect();
    let pots = state.pots.pots().to_vec();

    let (hands, winners_by_pot, won_uncontested) = match in_hand.as_slice() {
        [] => return Err(GameError::state("no player left in the hand")),
        [only] => {
            let winners: BTreeMap<usize, Vec<usize>> =
                (0..pots.len()).map(|i| (i, vec![*only])).collect();
            (Vec::new(), winners, true)
        }
        _ => {
            let mut hands = Vec::with_capacity(in_hand.len());
            for &seat in &in_hand {
                let p = state
                    .player(seat)
                    .ok_or_else(|| GameError::state(format!("no player at seat {seat}")))?;
                let (result, best_five) = best_hand(&p.hole_cards, &state.community_cards)?;
                hands.push(ShownHand {
                    seat,
                    hole_cards: p.hole_cards.clone(),
                    result,
                    best_five,
                });
            }
            let winners = pots
                .iter()
                .enumerate()
                .map(|(i, pot)| (i, best_among(&hands, &pot.eligible)))
                .collect();
            (hands, winners, false)
        }
    };

    let winnings = state
        .pots
        .award_pots(&winners_by_pot, &mut state.players)?;

    let mut awards = Vec::with_capacity(pots.len());
    for (i, pot) in pots.into_iter().enumerate() {
        let winners = winners_by_pot.get(&i).cloned().unwrap_or_default();
        tracing::info!(pot_index = i, amount = pot.amount, winners = ?winners, "pot awarded");
        state.push_event(EventKind::PotAwarded {
            pot_index: i,
            amount: pot.amount,
            winners: winners.clone(),
        });
        awards.push(PotAward {
            pot_index: i,
            amount: pot.amount,
            eligible: pot.eligible,
            winners,
        });
    }
    state.current_bet = 0;
    state.current_player = None;

    Ok(HandSummary {
        hand_number: state.hand_number,
        board: state.community_cards.clone(),
        pots: awards,
        winnings,
        hands,
        won_uncontested,
    })
}

/// Seats holding the strongest hand among `eligible`, ascending.
fn best_among(hands: &[ShownHand], eligible: &[usize]) -> Vec<usize> {
    let contenders: Vec<&ShownHand> = hands
        .iter()
        .filter(|h| eligible.contains(&h.seat))
        .collect();
    let Some(best) = contenders.iter().map(|h| &h.result).max() else {
        return Vec::new();
    };
    let mut winners: Vec<usize> = contenders
        .iter()
        .filter(|h| h.result == *best)
        .map(|h| h.seat)
        .collect();
    winners.sort_unstable();
    winners
}
