use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType, ValidatedAction};
use crate::errors::GameError;
use crate::game::GameState;
use crate::player::SeatStatus;

/// Betting facts the validator needs about one seat at one moment.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BettingContext {
    /// Chips behind
    pub chips: u32,
    /// Seat's bet on this street so far
    pub player_bet: u32,
    /// Highest bet on the table this street
    pub table_bet: u32,
    /// Smallest legal raise-to total
    pub min_raise_to: u32,
    pub big_blind: u32,
}

impl BettingContext {
    pub fn for_seat(state: &GameState, seat: usize) -> Option<Self> {
        state.player(seat).map(|p| Self {
            chips: p.chips,
            player_bet: p.current_bet,
            table_bet: state.current_bet,
            min_raise_to: state.min_raise_to(),
            big_blind: state.big_blind,
        })
    }

    pub fn to_call(&self) -> u32 {
        self.table_bet.saturating_sub(self.player_bet)
    }

    /// Street total the seat reaches by going all-in.
    pub fn all_in_total(&self) -> u32 {
        self.player_bet + self.chips
    }
}

/// Validates `action` against the live table.
///
/// Checks the turn and seat preconditions and then applies the betting rules
/// of [`validate_action`].
///
/// # Errors
///
/// - [`GameError::GameState`] when no hand is in progress
/// - [`GameError::InvalidAction`] for an unknown seat, a seat that is not
///   active, an out-of-turn action, a non-positive bet or raise amount, or a
///   rule violation
/// - [`GameError::InsufficientChips`] for a raise that cannot even call
pub fn validate(state: &GameState, action: &Action) -> Result<ValidatedAction, GameError> {
    if !state.hand_in_progress {
        return Err(GameError::state("no hand in progress"));
    }
    if !state.phase.is_betting_street() {
        return Err(GameError::invalid("betting is closed at showdown"));
    }
    let player = state
        .player(action.seat)
        .ok_or_else(|| GameError::invalid(format!("no player at seat {}", action.seat)))?;
    if player.status != SeatStatus::Active {
        return Err(GameError::invalid(format!(
            "seat {} cannot act while {:?}",
            action.seat, player.status
        )));
    }
    if state.current_player != Some(action.seat) {
        return Err(GameError::invalid(match state.current_player {
            Some(current) => format!("not seat {}'s turn (seat {current} to act)", action.seat),
            None => format!("not seat {}'s turn (nobody is to act)", action.seat),
        }));
    }
    if action.action_type.takes_amount() && action.amount == 0 {
        return Err(GameError::invalid(format!(
            "{} amount must be positive",
            action.action_type
        )));
    }
    let ctx = BettingContext::for_seat(state, action.seat)
        .ok_or_else(|| GameError::invalid(format!("no player at seat {}", action.seat)))?;
    validate_action(&ctx, action)
}

/// Applies the betting rules for one seat, converting where the rules allow
/// it.
///
/// # Examples
///
/// ```
/// use holdem_engine::action::{Action, ActionType};
/// use holdem_engine::rules::{validate_action, BettingContext};
///
/// let ctx = BettingContext { chips: 40, player_bet: 0, table_bet: 100, min_raise_to: 200, big_blind: 2 };
///
/// // A short call becomes an all-in for the whole stack
/// let v = validate_action(&ctx, &Action::call(3)).unwrap();
/// assert_eq!(v.action_type, ActionType::AllIn);
/// assert_eq!(v.amount, 40);
/// assert!(v.was_converted);
/// ```
///
/// ```
/// use holdem_engine::action::Action;
/// use holdem_engine::errors::GameError;
/// use holdem_engine::rules::{validate_action, BettingContext};
///
/// let ctx = BettingContext { chips: 30, player_bet: 0, table_bet: 100, min_raise_to: 200, big_blind: 2 };
///
/// // Thirty chips cannot even call a hundred, so the raise is refused
/// let err = validate_action(&ctx, &Action::raise_to(3, 100)).unwrap_err();
/// assert!(matches!(err, GameError::InsufficientChips { .. }));
/// ```
pub fn validate_action(ctx: &BettingContext, action: &Action) -> Result<ValidatedAction, GameError> {
    let to_call = ctx.to_call();
    let original = *action;
    match action.action_type {
        ActionType::Fold => Ok(ValidatedAction::unchanged(original, 0)),
        ActionType::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::unchanged(original, 0))
            } else {
                Err(GameError::invalid(format!(
                    "cannot check facing a bet of {to_call}"
                )))
            }
        }
        ActionType::Call => {
            if to_call == 0 {
                Ok(ValidatedAction::converted(
                    original,
                    ActionType::Check,
                    0,
                    "nothing to call, checking instead",
                ))
            } else if ctx.chips < to_call {
                Ok(ValidatedAction::converted(
                    original,
                    ActionType::AllIn,
                    ctx.chips,
                    format!(
                        "stack of {} cannot cover the call of {to_call}, going all-in",
                        ctx.chips
                    ),
                ))
            } else {
                Ok(ValidatedAction::unchanged(original, to_call))
            }
        }
        ActionType::Bet => {
            if ctx.table_bet > 0 {
                return Err(GameError::invalid(format!(
                    "cannot bet into an existing bet of {}, raise instead",
                    ctx.table_bet
                )));
            }
            let amount = action.amount;
            if amount > ctx.chips {
                return Ok(ValidatedAction::converted(
                    original,
                    ActionType::AllIn,
                    ctx.chips,
                    format!("bet of {amount} exceeds stack of {}, going all-in", ctx.chips),
                ));
            }
            if amount < ctx.big_blind {
                if amount == ctx.chips {
                    return Ok(ValidatedAction::converted(
                        original,
                        ActionType::AllIn,
                        ctx.chips,
                        "stack is below the big blind, betting it all-in",
                    ));
                }
                return Err(GameError::invalid(format!(
                    "bet of {amount} is below the big blind of {}",
                    ctx.big_blind
                )));
            }
            Ok(ValidatedAction::unchanged(original, amount))
        }
        ActionType::Raise => {
            if ctx.table_bet == 0 {
                return Err(GameError::invalid("nothing to raise, bet instead"));
            }
            let amount = action.amount;
            let max_total = ctx.all_in_total();
            if amount >= max_total {
                if max_total < ctx.table_bet {
                    return Err(GameError::InsufficientChips {
                        needed: to_call,
                        available: ctx.chips,
                    });
                }
                if amount == max_total && amount >= ctx.min_raise_to {
                    return Ok(ValidatedAction::unchanged(original, amount));
                }
                let reason = if max_total == ctx.table_bet {
                    format!("stack only covers the call of {to_call}, going all-in")
                } else if max_total < ctx.min_raise_to {
                    format!(
                        "all-in raise to {max_total} is below the minimum of {} but allowed",
                        ctx.min_raise_to
                    )
                } else {
                    format!("raise to {amount} exceeds stack, going all-in to {max_total}")
                };
                return Ok(ValidatedAction::converted(
                    original,
                    ActionType::AllIn,
                    ctx.chips,
                    reason,
                ));
            }
            if amount <= ctx.table_bet {
                return Err(GameError::invalid(format!(
                    "raise to {amount} does not exceed the current bet of {}",
                    ctx.table_bet
                )));
            }
            if amount < ctx.min_raise_to {
                return Err(GameError::invalid(format!(
                    "raise to {amount} is below the minimum raise to {}",
                    ctx.min_raise_to
                )));
            }
            Ok(ValidatedAction::unchanged(original, amount))
        }
        ActionType::AllIn => {
            if ctx.chips == 0 {
                return Err(GameError::invalid("no chips left to go all-in with"));
            }
            Ok(ValidatedAction::unchanged(original, ctx.chips))
        }
    }
}

/// A legal action with the amounts it accepts. For `Bet` and `Raise` the
/// bounds are street totals; for `Call` and `AllIn` they are chips added.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AvailableAction {
    pub action_type: ActionType,
    pub min_amount: u32,
    pub max_amount: u32,
}

/// Actions `seat` may take right now; empty when it is not that seat's turn.
pub fn available_actions(state: &GameState, seat: usize) -> Vec<ActionType> {
    available_action_details(state, seat)
        .into_iter()
        .map(|a| a.action_type)
        .collect()
}

pub fn available_action_details(state: &GameState, seat: usize) -> Vec<AvailableAction> {
    let eligible = state.hand_in_progress
        && state.phase.is_betting_street()
        && state.current_player == Some(seat)
        && state.player(seat).map(|p| p.can_act()).unwrap_or(false);
    let ctx = match BettingContext::for_seat(state, seat) {
        Some(ctx) if eligible => ctx,
        _ => return Vec::new(),
    };

    let fixed = |action_type, amount| AvailableAction {
        action_type,
        min_amount: amount,
        max_amount: amount,
    };
    let to_call = ctx.to_call();
    let max_total = ctx.all_in_total();
    let mut out = vec![fixed(ActionType::Fold, 0)];
    if to_call == 0 {
        out.push(fixed(ActionType::Check, 0));
    } else {
        out.push(fixed(ActionType::Call, to_call.min(ctx.chips)));
    }
    if ctx.table_bet == 0 && ctx.chips >= ctx.big_blind {
        out.push(AvailableAction {
            action_type: ActionType::Bet,
            min_amount: ctx.big_blind,
            max_amount: ctx.chips,
        });
    }
    if ctx.table_bet > 0 && max_total >= ctx.min_raise_to {
        out.push(AvailableAction {
            action_type: ActionType::Raise,
            min_amount: ctx.min_raise_to,
            max_amount: max_total,
        });
    }
    out.push(fixed(ActionType::AllIn, ctx.chips));
    out
}
