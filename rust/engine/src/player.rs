use serde::{Deserialize, Serialize};

use crate::action::ActionType;
use crate::cards::Card;
use crate::errors::GameError;

/// Where a seat stands in the current hand.
///
/// Within a hand `Active` only moves to `Folded` or `AllIn`; both are
/// terminal until the next hand starts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    /// In the hand and able to act
    Active,
    /// Gave up the hand
    Folded,
    /// Whole stack committed; stays in the hand but never acts again
    AllIn,
    /// No chips left; skipped when dealing
    Out,
    /// Voluntarily not playing; skipped when dealing
    SittingOut,
}

/// Per-seat record. Chips leave the stack only through [`Player::bet`], so
/// `chips + current_bet` never changes within a single action.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub seat_id: usize,
    pub name: String,
    pub chips: u32,
    pub hole_cards: Vec<Card>,
    /// Chips put in during the current betting round only
    pub current_bet: u32,
    /// Chips put in across the whole hand, for side-pot construction
    pub total_contributed: u32,
    pub status: SeatStatus,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub last_action_type: Option<ActionType>,
    /// Voluntary action taken since the street began or since the last full
    /// raise. Blinds do not count.
    pub has_acted: bool,
}

impl Player {
    pub fn new(seat_id: usize, name: impl Into<String>, chips: u32) -> Self {
        Self {
            seat_id,
            name: name.into(),
            chips,
            hole_cards: Vec::with_capacity(2),
            current_bet: 0,
            total_contributed: 0,
            status: if chips > 0 {
                SeatStatus::Active
            } else {
                SeatStatus::Out
            },
            is_dealer: false,
            is_small_blind: false,
            is_big_blind: false,
            last_action_type: None,
            has_acted: false,
        }
    }

    pub fn can_act(&self) -> bool {
        self.status == SeatStatus::Active && self.chips > 0
    }

    /// Still contesting the pot: not folded and not sitting the hand out.
    pub fn is_in_hand(&self) -> bool {
        matches!(self.status, SeatStatus::Active | SeatStatus::AllIn)
    }

    /// Dealt into hands at all. Out and sitting-out seats are skipped.
    pub fn is_seated_in(&self) -> bool {
        !matches!(self.status, SeatStatus::Out | SeatStatus::SittingOut)
    }

    /// Moves `amount` from the stack into the street bet. Committing the last
    /// chip makes the player all-in.
    pub fn bet(&mut self, amount: u32) -> Result<(), GameError> {
        if amount > self.chips {
            return Err(GameError::InsufficientChips {
                needed: amount,
                available: self.chips,
            });
        }
        self.chips -= amount;
        self.current_bet += amount;
        self.total_contributed += amount;
        if self.chips == 0 && self.status == SeatStatus::Active {
            self.status = SeatStatus::AllIn;
        }
        Ok(())
    }

    pub fn fold(&mut self) {
        self.status = SeatStatus::Folded;
    }

    pub fn win(&mut self, amount: u32) {
        self.chips = self.chips.saturating_add(amount);
    }

    pub fn give_card(&mut self, c: Card) -> Result<(), GameError> {
        if self.hole_cards.len() >= 2 {
            return Err(GameError::state(format!(
                "seat {} already holds two hole cards",
                self.seat_id
            )));
        }
        self.hole_cards.push(c);
        Ok(())
    }

    /// Clears per-hand state. A seat with no chips is marked out; a seat
    /// sitting out stays that way.
    pub fn reset_for_new_hand(&mut self) {
        self.hole_cards.clear();
        self.current_bet = 0;
        self.total_contributed = 0;
        self.is_dealer = false;
        self.is_small_blind = false;
        self.is_big_blind = false;
        self.last_action_type = None;
        self.has_acted = false;
        if self.status != SeatStatus::SittingOut {
            self.status = if self.chips > 0 {
                SeatStatus::Active
            } else {
                SeatStatus::Out
            };
        }
    }

    pub fn reset_for_new_street(&mut self) {
        self.current_bet = 0;
        self.has_acted = false;
    }

    pub fn sit_out(&mut self) {
        self.status = SeatStatus::SittingOut;
    }

    pub fn sit_in(&mut self) {
        if self.status == SeatStatus::SittingOut {
            self.status = if self.chips > 0 {
                SeatStatus::Active
            } else {
                SeatStatus::Out
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn betting_whole_stack_goes_all_in() {
        let mut p = Player::new(0, "p0", 50);
        p.bet(20).unwrap();
        assert_eq!((p.chips, p.current_bet), (30, 20));
        assert_eq!(p.status, SeatStatus::Active);
        p.bet(30).unwrap();
        assert_eq!(p.status, SeatStatus::AllIn);
        assert_eq!(p.total_contributed, 50);
    }

    #[test]
    fn overdraft_is_rejected_without_mutation() {
        let mut p = Player::new(3, "p3", 10);
        let err = p.bet(11).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientChips {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(p.chips, 10);
        assert_eq!(p.current_bet, 0);
    }

    #[test]
    fn broke_player_is_out_after_reset() {
        let mut p = Player::new(1, "p1", 5);
        p.bet(5).unwrap();
        p.reset_for_new_hand();
        assert_eq!(p.status, SeatStatus::Out);
        p.win(7);
        p.reset_for_new_hand();
        assert_eq!(p.status, SeatStatus::Active);
    }

    #[test]
    fn sitting_out_survives_reset() {
        let mut p = Player::new(2, "p2", 100);
        p.sit_out();
        p.reset_for_new_hand();
        assert_eq!(p.status, SeatStatus::SittingOut);
        p.sit_in();
        assert_eq!(p.status, SeatStatus::Active);
    }
}
