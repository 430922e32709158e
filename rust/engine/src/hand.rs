//! Best-five-card hand evaluation.
//!
//! [`evaluate_hand`] enumerates every 5-card subset of the hole and community
//! cards and keeps the strongest [`HandResult`]. Results compare by category,
//! then primary value, secondary value and kickers, so the derived `Ord` is
//! the poker ordering.
//!
//! ```
//! use holdem_engine::cards::parse_cards;
//! use holdem_engine::hand::{evaluate_hand, HandRank};
//!
//! let hole = parse_cards("Ah 2d").unwrap();
//! let board = parse_cards("3c 4s 5h Kd Qc").unwrap();
//! let result = evaluate_hand(&hole, &board).unwrap();
//! assert_eq!(result.rank, HandRank::Straight);
//! assert_eq!(result.primary_value, 5);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::errors::GameError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum HandRank {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandRank {
    pub fn name(self) -> &'static str {
        match self {
            HandRank::HighCard => "high card",
            HandRank::OnePair => "one pair",
            HandRank::TwoPair => "two pair",
            HandRank::ThreeOfAKind => "three of a kind",
            HandRank::Straight => "straight",
            HandRank::Flush => "flush",
            HandRank::FullHouse => "full house",
            HandRank::FourOfAKind => "four of a kind",
            HandRank::StraightFlush => "straight flush",
            HandRank::RoyalFlush => "royal flush",
        }
    }
}

/// Strength of a made five-card hand.
///
/// Field order matters: the derived ordering is lexicographic over
/// `(rank, primary_value, secondary_value, kickers)`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandResult {
    pub rank: HandRank,
    /// Rank of the defining group: pair, trips, quads, or the high card of a
    /// straight (5 for the wheel)
    pub primary_value: u8,
    /// Second pair of two pair, or the pair of a full house
    pub secondary_value: u8,
    /// Remaining tie-breakers, descending
    pub kickers: Vec<u8>,
}

impl HandResult {
    fn new(rank: HandRank, primary_value: u8, secondary_value: u8, kickers: Vec<u8>) -> Self {
        Self {
            rank,
            primary_value,
            secondary_value,
            kickers,
        }
    }

    /// Short human-readable description such as `"full house, Ks over 7s"`.
    pub fn describe(&self) -> String {
        let name = |v: u8| Rank::from_value(v).map(|r| r.symbol()).unwrap_or('?');
        match self.rank {
            HandRank::OnePair | HandRank::ThreeOfAKind | HandRank::FourOfAKind => {
                format!("{}, {}s", self.rank.name(), name(self.primary_value))
            }
            HandRank::TwoPair => format!(
                "{}, {}s and {}s",
                self.rank.name(),
                name(self.primary_value),
                name(self.secondary_value)
            ),
            HandRank::FullHouse => format!(
                "{}, {}s over {}s",
                self.rank.name(),
                name(self.primary_value),
                name(self.secondary_value)
            ),
            HandRank::RoyalFlush => self.rank.name().to_string(),
            _ => format!("{}, {} high", self.rank.name(), name(self.primary_value)),
        }
    }
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Evaluates the best hand from exactly two hole cards and up to five
/// community cards.
///
/// # Errors
///
/// [`GameError::InvalidHand`] when there are not exactly two hole cards, more
/// than five community cards, or fewer than five cards in total.
pub fn evaluate_hand(hole: &[Card], community: &[Card]) -> Result<HandResult, GameError> {
    best_hand(hole, community).map(|(result, _)| result)
}

/// Like [`evaluate_hand`] but also returns the five cards that make the hand.
pub fn best_hand(hole: &[Card], community: &[Card]) -> Result<(HandResult, [Card; 5]), GameError> {
    if hole.len() != 2 {
        return Err(GameError::InvalidHand(format!(
            "expected 2 hole cards, got {}",
            hole.len()
        )));
    }
    if community.len() > 5 {
        return Err(GameError::InvalidHand(format!(
            "at most 5 community cards allowed, got {}",
            community.len()
        )));
    }
    let all: Vec<Card> = hole.iter().chain(community.iter()).copied().collect();
    if all.len() < 5 {
        return Err(GameError::InvalidHand(format!(
            "need at least 5 cards to evaluate, got {}",
            all.len()
        )));
    }

    let n = all.len();
    let mut best: Option<(HandResult, [Card; 5])> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [all[a], all[b], all[c], all[d], all[e]];
                        let result = evaluate_five(&five);
                        let better = match &best {
                            Some((current, _)) => result > *current,
                            None => true,
                        };
                        if better {
                            best = Some((result, five));
                        }
                    }
                }
            }
        }
    }
    best.ok_or_else(|| GameError::InvalidHand("no five-card combination".into()))
}

/// Classifies exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandResult {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    for c in cards {
        rank_counts[c.rank.value() as usize] += 1;
    }
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = detect_straight_high(&rank_counts);

    if let (true, Some(high)) = (is_flush, straight_high) {
        if high == Rank::Ace.value() {
            return HandResult::new(HandRank::RoyalFlush, high, 0, vec![]);
        }
        return HandResult::new(HandRank::StraightFlush, high, 0, vec![]);
    }

    let groups = rank_groups(&rank_counts);
    let quads = groups.iter().find(|(_, count)| *count == 4).map(|(r, _)| *r);
    let trips = groups.iter().find(|(_, count)| *count == 3).map(|(r, _)| *r);
    let pairs: Vec<u8> = groups
        .iter()
        .filter(|(_, count)| *count == 2)
        .map(|(r, _)| *r)
        .collect();
    let singles: Vec<u8> = groups
        .iter()
        .filter(|(_, count)| *count == 1)
        .map(|(r, _)| *r)
        .collect();

    if let Some(q) = quads {
        return HandResult::new(HandRank::FourOfAKind, q, 0, singles);
    }
    if let (Some(t), Some(&p)) = (trips, pairs.first()) {
        return HandResult::new(HandRank::FullHouse, t, p, vec![]);
    }
    if is_flush {
        return HandResult::new(HandRank::Flush, ranks[0], 0, ranks[1..].to_vec());
    }
    if let Some(high) = straight_high {
        return HandResult::new(HandRank::Straight, high, 0, vec![]);
    }
    if let Some(t) = trips {
        return HandResult::new(HandRank::ThreeOfAKind, t, 0, singles);
    }
    if pairs.len() >= 2 {
        return HandResult::new(HandRank::TwoPair, pairs[0], pairs[1], singles);
    }
    if let Some(&p) = pairs.first() {
        return HandResult::new(HandRank::OnePair, p, 0, singles);
    }
    HandResult::new(HandRank::HighCard, ranks[0], 0, ranks[1..].to_vec())
}

pub fn compare_hands(a: &HandResult, b: &HandResult) -> Ordering {
    a.cmp(b)
}

/// `(rank, count)` pairs, highest rank first.
fn rank_groups(rank_counts: &[u8; 15]) -> Vec<(u8, u8)> {
    (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (r, rank_counts[r as usize]))
        .collect()
}

/// High card of a five-distinct-rank straight, with the ace also playing low.
fn detect_straight_high(rank_counts: &[u8; 15]) -> Option<u8> {
    let mut mask: u16 = 0;
    for r in 2..=14u8 {
        if rank_counts[r as usize] > 0 {
            mask |= 1 << r;
        }
    }
    if mask & (1 << 14) != 0 {
        mask |= 1 << 1;
    }
    (5..=14u8).rev().find(|&high| {
        let window = 0b11111u16 << (high - 4);
        mask & window == window
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_needs_the_ace_low() {
        let mut counts = [0u8; 15];
        for r in [14, 2, 3, 4, 5] {
            counts[r] = 1;
        }
        assert_eq!(detect_straight_high(&counts), Some(5));
        counts[14] = 0;
        counts[6] = 1;
        assert_eq!(detect_straight_high(&counts), Some(6));
    }

    #[test]
    fn broken_run_is_not_a_straight() {
        let mut counts = [0u8; 15];
        for r in [14, 13, 12, 11, 9] {
            counts[r] = 1;
        }
        assert_eq!(detect_straight_high(&counts), None);
    }
}
