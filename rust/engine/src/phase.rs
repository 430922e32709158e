//! Street state machine.
//!
//! Each [`Phase`] variant knows how to enter its street, apply an action,
//! detect the end of betting and hand over to the next street. Dispatch is a
//! plain `match` on the variant; all state lives in [`GameState`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionType, ValidatedAction};
use crate::errors::GameError;
use crate::events::EventKind;
use crate::game::GameState;
use crate::player::Player;
use crate::rules;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    /// The street that follows this one. Showdown is terminal.
    pub fn next(self) -> Phase {
        match self {
            Phase::PreFlop => Phase::Flop,
            Phase::Flop => Phase::Turn,
            Phase::Turn => Phase::River,
            Phase::River | Phase::Showdown => Phase::Showdown,
        }
    }

    /// Community cards dealt when entering this street.
    pub fn cards_dealt(self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            Phase::PreFlop | Phase::Showdown => 0,
        }
    }

    pub fn is_betting_street(self) -> bool {
        self != Phase::Showdown
    }

    /// One-time setup for the street. Pre-flop shuffles, posts blinds and
    /// deals hole cards; later streets burn and deal community cards.
    pub fn enter(self, state: &mut GameState) -> Result<(), GameError> {
        state.phase = self;
        match self {
            Phase::PreFlop => enter_preflop(state),
            Phase::Flop | Phase::Turn | Phase::River => {
                state.deck.burn_card();
                let mut dealt = Vec::with_capacity(self.cards_dealt());
                for _ in 0..self.cards_dealt() {
                    dealt.push(state.deal_card()?);
                }
                state.community_cards.extend_from_slice(&dealt);
                state.start_new_betting_round();
                tracing::debug!(phase = %self, board = ?state.community_cards, "community cards dealt");
                state.push_event(EventKind::CardsDealt {
                    phase: self,
                    board: dealt,
                    seats: Vec::new(),
                });
                Ok(())
            }
            Phase::Showdown => {
                state.current_player = None;
                Ok(())
            }
        }
    }

    /// Applies a validated action and moves the turn on. Returns whether the
    /// betting round continues.
    pub fn act(self, state: &mut GameState, action: &ValidatedAction) -> Result<bool, GameError> {
        if !self.is_betting_street() {
            return Err(GameError::PhaseTransition(
                "no betting is possible at showdown".into(),
            ));
        }
        state.apply_action(action.seat, action.action_type, action.amount)?;
        tracing::debug!(
            phase = %self,
            seat = action.seat,
            action = %action.action_type,
            amount = action.amount,
            converted = action.was_converted,
            "action applied"
        );
        state.push_event(EventKind::PlayerAction {
            seat: action.seat,
            action: action.action_type,
            amount: action.amount,
            converted: action.was_converted,
            reason: action.conversion_reason.clone(),
        });

        if !state.advance_current_player() {
            return Ok(false);
        }
        Ok(!self.is_round_complete(state))
    }

    pub fn is_round_complete(self, state: &GameState) -> bool {
        match self {
            Phase::Showdown => true,
            _ => state.is_betting_round_complete(),
        }
    }

    /// Collects the street's bets and moves the phase on. Goes straight to
    /// showdown once a single player is left in the hand.
    pub fn exit(self, state: &mut GameState) -> Result<Phase, GameError> {
        if self == Phase::Showdown {
            return Err(GameError::PhaseTransition(
                "showdown is the final phase".into(),
            ));
        }
        state.collect_bets();
        state.push_event(EventKind::BettingRoundComplete {
            phase: self,
            pot: state.pot(),
        });

        let next = if state.players_in_hand().count() <= 1 {
            Phase::Showdown
        } else {
            self.next()
        };
        tracing::debug!(from = %self, to = %next, pot = state.pot(), "phase change");
        state.push_event(EventKind::PhaseChanged {
            from: self,
            to: next,
        });
        state.phase = next;
        state.current_player = None;
        Ok(next)
    }

    /// `exit` followed by entering whatever phase comes next.
    pub fn advance(self, state: &mut GameState) -> Result<Phase, GameError> {
        let next = self.exit(state)?;
        next.enter(state)?;
        Ok(next)
    }

    /// Drives a whole street by asking `next_action` for each player's move
    /// until the round is complete.
    ///
    /// A failure from a seat other than `primary_seat`, whether the callback
    /// errors or its action is rejected, folds that seat and play continues.
    /// Failures from `primary_seat` are returned. The loop gives up after
    /// `players * 4` iterations.
    pub fn process_betting_round<F>(
        self,
        state: &mut GameState,
        primary_seat: Option<usize>,
        mut next_action: F,
    ) -> Result<Vec<ValidatedAction>, GameError>
    where
        F: FnMut(usize, &GameState) -> Result<Action, GameError>,
    {
        let cap = state.players.len() * 4;
        let mut applied = Vec::new();
        for _ in 0..cap {
            if self.is_round_complete(state) {
                return Ok(applied);
            }
            let Some(seat) = state.current_player else {
                return Ok(applied);
            };

            let validated = next_action(seat, state).and_then(|a| {
                if a.seat != seat {
                    return Err(GameError::invalid(format!(
                        "action for seat {} submitted on seat {seat}'s turn",
                        a.seat
                    )));
                }
                rules::validate(state, &a)
            });
            let validated = match validated {
                Ok(v) => v,
                Err(e) if Some(seat) == primary_seat => return Err(e),
                Err(e) => {
                    tracing::warn!(seat, error = %e, "no usable action, folding seat");
                    ValidatedAction::converted(
                        Action::fold(seat),
                        ActionType::Fold,
                        0,
                        format!("forced fold: {e}"),
                    )
                }
            };

            let continues = self.act(state, &validated)?;
            applied.push(validated);
            if !continues {
                return Ok(applied);
            }
        }
        if self.is_round_complete(state) {
            return Ok(applied);
        }
        tracing::warn!(phase = %self, cap, "betting round hit the iteration cap");
        Err(GameError::state(format!(
            "betting round did not finish within {cap} actions"
        )))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::PreFlop => "pre_flop",
            Phase::Flop => "flop",
            Phase::Turn => "turn",
            Phase::River => "river",
            Phase::Showdown => "showdown",
        };
        f.write_str(s)
    }
}

fn enter_preflop(state: &mut GameState) -> Result<(), GameError> {
    state.deck.shuffle();
    state.community_cards.clear();
    state.street_action_count = 0;
    state.post_blinds()?;

    // two passes, one card each, starting left of the dealer
    let mut order = Vec::new();
    let mut seat = state.dealer_position;
    for _ in 0..state.players.len() {
        match state.next_seat_after(seat, Player::is_seated_in) {
            Some(next) if !order.contains(&next) => {
                order.push(next);
                seat = next;
            }
            _ => break,
        }
    }
    for _ in 0..2 {
        for &s in &order {
            let card = state.deal_card()?;
            let idx = state.player_index(s)?;
            state.players[idx].give_card(card)?;
        }
    }
    state.push_event(EventKind::CardsDealt {
        phase: Phase::PreFlop,
        board: Vec::new(),
        seats: order,
    });

    let bb = state
        .big_blind_position
        .ok_or_else(|| GameError::state("big blind not assigned"))?;
    state.current_player = state.next_seat_after(bb, Player::can_act);
    Ok(())
}
