use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// The six betting actions a seat can take.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Forfeit the hand
    Fold,
    /// Pass without betting; only legal when nothing is owed
    Check,
    /// Match the table bet
    Call,
    /// Open the betting on a street
    Bet,
    /// Increase an existing bet; the amount is the new street total
    Raise,
    /// Commit the whole remaining stack
    AllIn,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Fold => "fold",
            ActionType::Check => "check",
            ActionType::Call => "call",
            ActionType::Bet => "bet",
            ActionType::Raise => "raise",
            ActionType::AllIn => "all_in",
        }
    }

    /// Whether the action carries a caller-supplied amount.
    pub fn takes_amount(self) -> bool {
        matches!(self, ActionType::Bet | ActionType::Raise)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionType::Fold),
            "check" => Ok(ActionType::Check),
            "call" => Ok(ActionType::Call),
            "bet" => Ok(ActionType::Bet),
            "raise" => Ok(ActionType::Raise),
            "all_in" | "allin" | "all-in" => Ok(ActionType::AllIn),
            other => Err(GameError::invalid(format!("unknown action type {other:?}"))),
        }
    }
}

/// An action as submitted by a seat, before validation.
///
/// `amount` is only meaningful for `Bet` (street total) and `Raise` (new
/// street total); it is ignored for the other types.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub seat: usize,
    pub action_type: ActionType,
    #[serde(default)]
    pub amount: u32,
}

impl Action {
    pub fn new(seat: usize, action_type: ActionType, amount: u32) -> Self {
        Self {
            seat,
            action_type,
            amount,
        }
    }

    pub fn fold(seat: usize) -> Self {
        Self::new(seat, ActionType::Fold, 0)
    }

    pub fn check(seat: usize) -> Self {
        Self::new(seat, ActionType::Check, 0)
    }

    pub fn call(seat: usize) -> Self {
        Self::new(seat, ActionType::Call, 0)
    }

    pub fn bet(seat: usize, amount: u32) -> Self {
        Self::new(seat, ActionType::Bet, amount)
    }

    /// Raise to a new street total of `to`.
    pub fn raise_to(seat: usize, to: u32) -> Self {
        Self::new(seat, ActionType::Raise, to)
    }

    pub fn all_in(seat: usize) -> Self {
        Self::new(seat, ActionType::AllIn, 0)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.action_type.takes_amount() {
            write!(f, "seat {} {} {}", self.seat, self.action_type, self.amount)
        } else {
            write!(f, "seat {} {}", self.seat, self.action_type)
        }
    }
}

/// Raw action input coming from a UI layer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerActionInput {
    pub seat_id: usize,
    pub action_type: ActionType,
    #[serde(default)]
    pub amount: Option<u32>,
}

impl PlayerActionInput {
    pub fn new(seat_id: usize, action_type: ActionType, amount: Option<u32>) -> Self {
        Self {
            seat_id,
            action_type,
            amount,
        }
    }

    /// Checks the shape of the input. Bets and raises need a positive amount.
    pub fn to_action(&self) -> Result<Action, GameError> {
        let amount = if self.action_type.takes_amount() {
            match self.amount {
                Some(a) if a > 0 => a,
                _ => {
                    return Err(GameError::invalid(format!(
                        "{} requires a positive amount",
                        self.action_type
                    )))
                }
            }
        } else {
            0
        };
        Ok(Action::new(self.seat_id, self.action_type, amount))
    }
}

/// The result of running an [`Action`] through the validator: what will
/// actually be applied to the table.
///
/// `amount` means chips added to the stack's street bet for `Call` and
/// `AllIn`, the street total for `Bet` and `Raise`, and zero otherwise.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatedAction {
    pub seat: usize,
    pub original: Action,
    pub action_type: ActionType,
    pub amount: u32,
    pub was_converted: bool,
    pub conversion_reason: Option<String>,
}

impl ValidatedAction {
    pub(crate) fn unchanged(original: Action, amount: u32) -> Self {
        Self {
            seat: original.seat,
            original,
            action_type: original.action_type,
            amount,
            was_converted: false,
            conversion_reason: None,
        }
    }

    pub(crate) fn converted(
        original: Action,
        action_type: ActionType,
        amount: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            seat: original.seat,
            original,
            action_type,
            amount,
            was_converted: true,
            conversion_reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for ValidatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action_type {
            ActionType::Fold | ActionType::Check => {
                write!(f, "seat {} {}", self.seat, self.action_type)?
            }
            _ => write!(f, "seat {} {} {}", self.seat, self.action_type, self.amount)?,
        }
        if let Some(reason) = &self.conversion_reason {
            write!(f, " (converted from {}: {})", self.original.action_type, reason)?;
        }
        Ok(())
    }
}
