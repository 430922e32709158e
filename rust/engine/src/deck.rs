use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// A 52-card deck dealt from the top (the end of the vector).
///
/// The RNG lives with the deck so a seeded deck reproduces the same sequence
/// of shuffles across hands.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    /// Creates an unshuffled deck. `None` draws a seed from the thread RNG.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed.unwrap_or_else(rand::random));
        Self {
            cards: full_deck(),
            rng,
        }
    }

    pub fn new_with_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Restores all 52 cards and shuffles them.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deals `n` cards, or nothing at all when fewer than `n` remain.
    pub fn deal_cards(&mut self, n: usize) -> Option<Vec<Card>> {
        if n > self.cards.len() {
            return None;
        }
        let split = self.cards.len() - n;
        let mut dealt = self.cards.split_off(split);
        dealt.reverse();
        Some(dealt)
    }

    pub fn burn_card(&mut self) -> Option<Card> {
        self.deal_card()
    }

    /// Restores all 52 cards in factory order without shuffling.
    pub fn reset(&mut self) {
        self.cards = full_deck();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}
