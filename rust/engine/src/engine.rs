use serde::Serialize;

use crate::action::{Action, ActionType, PlayerActionInput, ValidatedAction};
use crate::config::GameConfig;
use crate::errors::{ConfigError, GameError};
use crate::events::{EventKind, EventSink, GameEvent, NullSink};
use crate::game::GameState;
use crate::logger::{HandLogger, HandRecord, ShowdownInfo};
use crate::phase::Phase;
use crate::player::{Player, SeatStatus};
use crate::rules::{self, AvailableAction};
use crate::showdown::{self, HandSummary};
use crate::snapshot::GameSnapshot;
use crate::strategy::Decide;

/// What a committed action did.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ActionReport {
    pub action: ValidatedAction,
    pub events: Vec<GameEvent>,
    /// Phase after the action and any street changes it caused
    pub phase: Phase,
    pub version: u64,
}

impl ActionReport {
    pub fn is_hand_over(&self) -> bool {
        self.phase == Phase::Showdown
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The input was refused; nothing changed
    InvalidAction,
    /// The engine was driven incorrectly or hit an internal error
    GameError,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActionFailure {
    pub kind: FailureKind,
    pub error: GameError,
}

impl ActionFailure {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl From<GameError> for ActionFailure {
    fn from(error: GameError) -> Self {
        let kind = if error.is_user_error() {
            FailureKind::InvalidAction
        } else {
            FailureKind::GameError
        };
        Self { kind, error }
    }
}

/// Structured outcome of [`Engine::execute_player_action`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ActionResult {
    Success(ActionReport),
    Failure(ActionFailure),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn events(&self) -> &[GameEvent] {
        match self {
            ActionResult::Success(report) => &report.events,
            ActionResult::Failure(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(f) => Some(f),
        }
    }
}

/// Table controller: starts hands, runs submitted actions through the
/// validator and the street state machine, and hands out snapshots.
///
/// Every mutation runs on a copy of the [`GameState`]. The copy replaces the
/// live state, and the version counter moves, only when the whole operation
/// succeeds, so a rejected action leaves the table exactly as it was.
///
/// # Examples
///
/// ```
/// use holdem_engine::action::Action;
/// use holdem_engine::config::GameConfig;
/// use holdem_engine::engine::Engine;
///
/// let config = GameConfig::with_players(3).with_starting_chips(100).with_seed(7);
/// let mut engine = Engine::new(config).unwrap();
/// assert!(engine.start_new_hand());
///
/// // Seat 0 is on the button, so it acts first pre-flop with three players
/// let seat = engine.current_player().unwrap();
/// assert_eq!(seat, 0);
/// let report = engine.execute_action(Action::call(seat)).unwrap();
/// assert_eq!(report.action.amount, 2);
/// ```
pub struct Engine {
    config: GameConfig,
    state: GameState,
    version: u64,
    human_seat: Option<usize>,
    sink: Box<dyn EventSink>,
    ai: Option<Box<dyn Decide>>,
    hand_logger: Option<HandLogger>,
    last_summary: Option<HandSummary>,
    last_record: Option<HandRecord>,
}

impl Engine {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let players = config
            .players
            .iter()
            .map(|pc| Player::new(pc.seat, pc.name.clone(), config.chips_for(pc)))
            .collect();
        let state = GameState::new(
            players,
            config.small_blind,
            config.big_blind,
            config.dealer_seat,
            config.random_seed,
        );
        if config.debug_mode {
            tracing::debug!(?config, "engine created");
        }
        Ok(Self {
            human_seat: config.human_seat(),
            config,
            state,
            version: 0,
            sink: Box::new(NullSink),
            ai: None,
            hand_logger: None,
            last_summary: None,
            last_record: None,
        })
    }

    pub fn with_event_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_ai<D: Decide + 'static>(mut self, ai: D) -> Self {
        self.ai = Some(Box::new(ai));
        self
    }

    pub fn with_hand_logger(mut self, logger: HandLogger) -> Self {
        self.hand_logger = Some(logger);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Live state, read-only. Unmasked; use [`Engine::get_snapshot`] for
    /// anything handed to a player.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn hand_number(&self) -> u64 {
        self.state.hand_number
    }

    pub fn hand_in_progress(&self) -> bool {
        self.state.hand_in_progress
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_hand_over(&self) -> bool {
        self.state.phase == Phase::Showdown
    }

    pub fn is_betting_round_complete(&self) -> bool {
        self.state.phase.is_round_complete(&self.state)
    }

    pub fn current_player(&self) -> Option<usize> {
        self.state.current_player
    }

    pub fn human_seat(&self) -> Option<usize> {
        self.human_seat
    }

    /// Fewer than two seats hold chips.
    pub fn is_game_over(&self) -> bool {
        self.state.players_with_chips() < 2
    }

    pub fn last_hand_summary(&self) -> Option<&HandSummary> {
        self.last_summary.as_ref()
    }

    pub fn last_hand_record(&self) -> Option<&HandRecord> {
        self.last_record.as_ref()
    }

    pub fn available_actions(&self, seat: usize) -> Vec<ActionType> {
        rules::available_actions(&self.state, seat)
    }

    pub fn available_action_details(&self, seat: usize) -> Vec<AvailableAction> {
        rules::available_action_details(&self.state, seat)
    }

    /// Snapshot masked for `viewer`.
    pub fn get_snapshot(&self, viewer: Option<usize>) -> GameSnapshot {
        GameSnapshot::from_state(&self.state, viewer, self.version)
    }

    /// `None` when nothing has changed since `last_known_version`.
    pub fn get_snapshot_if_changed(
        &self,
        viewer: Option<usize>,
        last_known_version: u64,
    ) -> Option<GameSnapshot> {
        if last_known_version == self.version {
            return None;
        }
        Some(self.get_snapshot(viewer))
    }

    /// Starts the next hand. Returns false, changing nothing, when a hand is
    /// already running or fewer than two players have chips.
    pub fn start_new_hand(&mut self) -> bool {
        if self.state.hand_in_progress {
            tracing::warn!(hand = self.state.hand_number, "hand already in progress");
            return false;
        }
        if self.state.players_with_chips() < 2 {
            tracing::info!("not enough players with chips to start a hand");
            return false;
        }
        match self.transact(start_hand) {
            Ok(()) => {
                tracing::info!(
                    hand = self.state.hand_number,
                    dealer = self.state.dealer_position,
                    "hand started"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start hand");
                false
            }
        }
    }

    /// Validates and applies `action`, then advances streets as far as the
    /// betting allows. On error nothing changes.
    pub fn execute_action(&mut self, action: Action) -> Result<ActionReport, GameError> {
        let events_before = self.state.events.len();
        let outcome = self.transact(|state| {
            if !state.hand_in_progress {
                return Err(GameError::state("no hand in progress"));
            }
            let validated = rules::validate(state, &action)?;
            let phase = state.phase;
            if !phase.act(state, &validated)? {
                settle_streets(state)?;
            }
            Ok(validated)
        });
        match outcome {
            Ok(validated) => Ok(ActionReport {
                action: validated,
                events: self.state.events[events_before..].to_vec(),
                phase: self.state.phase,
                version: self.version,
            }),
            Err(e) => {
                tracing::warn!(seat = action.seat, action = %action.action_type, error = %e, "action rejected");
                Err(e)
            }
        }
    }

    pub fn execute_player_action(&mut self, input: &PlayerActionInput) -> ActionResult {
        match input.to_action().and_then(|a| self.execute_action(a)) {
            Ok(report) => ActionResult::Success(report),
            Err(e) => ActionResult::Failure(e.into()),
        }
    }

    /// Resolves the showdown and closes the hand.
    ///
    /// Returns `Ok(None)` when no hand is in progress and an error when the
    /// hand has not reached showdown yet.
    pub fn end_hand(&mut self) -> Result<Option<HandSummary>, GameError> {
        if !self.state.hand_in_progress {
            return Ok(None);
        }
        if self.state.phase != Phase::Showdown {
            return Err(GameError::state(format!(
                "hand is still in {}, showdown not reached",
                self.state.phase
            )));
        }
        let summary = self.transact(|state| {
            let summary = showdown::resolve(state)?;
            for p in state.players.iter_mut() {
                if p.chips == 0 && p.status != SeatStatus::SittingOut {
                    p.status = SeatStatus::Out;
                }
            }
            let busted: Vec<usize> = state
                .players
                .iter()
                .filter(|p| p.status == SeatStatus::Out && p.total_contributed > 0)
                .map(|p| p.seat_id)
                .collect();
            for seat in busted {
                state.push_event(EventKind::PlayerEliminated { seat });
            }
            state.hand_in_progress = false;
            state.push_event(EventKind::HandEnded {
                winners: summary.winners(),
            });
            Ok(summary)
        })?;

        tracing::info!(
            hand = summary.hand_number,
            winners = ?summary.winners(),
            awarded = summary.total_awarded(),
            "hand ended"
        );
        self.record_hand(&summary);
        self.last_summary = Some(summary.clone());
        Ok(Some(summary))
    }

    /// Lets the configured AI act for the current seat. Returns false when
    /// there is no AI, no hand, the seat to act is the human one, or the
    /// AI's action is rejected.
    pub fn process_ai_action(&mut self) -> bool {
        let Some(seat) = self.state.current_player else {
            return false;
        };
        if !self.state.hand_in_progress || Some(seat) == self.human_seat {
            return false;
        }
        let Some(ai) = self.ai.as_ref() else {
            return false;
        };
        let snapshot = self.get_snapshot(Some(seat));
        let action = ai.decide(&snapshot, seat);
        tracing::debug!(seat, ai = ai.name(), action = %action, "ai decision");
        self.execute_action(action).is_ok()
    }

    /// Runs AI seats until the human seat must act or betting is over.
    /// Returns how many AI actions were applied.
    pub fn run_until_human_turn(&mut self) -> usize {
        let cap = self.state.players.len() * 4 * 4;
        let mut applied = 0;
        while applied < cap && self.process_ai_action() {
            applied += 1;
        }
        applied
    }

    /// Plays out the current street by asking `callback` for each seat's
    /// action. Callback failures and rejected actions fold computer seats;
    /// for the human seat they abort the round and nothing changes.
    ///
    /// The round commits as one transaction, so every snapshot handed to
    /// `callback` carries the version from before the round. The version
    /// moves by one when the round is committed.
    pub fn process_betting_round<F>(&mut self, mut callback: F) -> Result<ActionReport, GameError>
    where
        F: FnMut(usize, &GameSnapshot) -> Result<Action, GameError>,
    {
        let events_before = self.state.events.len();
        // frozen until the round commits
        let version = self.version;
        let human = self.human_seat;
        let applied = self.transact(|state| {
            if !state.hand_in_progress {
                return Err(GameError::state("no hand in progress"));
            }
            let phase = state.phase;
            let applied = phase.process_betting_round(state, human, |seat, st| {
                callback(seat, &GameSnapshot::from_state(st, Some(seat), version))
            })?;
            if phase.is_round_complete(state) || state.current_player.is_none() {
                settle_streets(state)?;
            }
            applied
                .last()
                .cloned()
                .ok_or_else(|| GameError::state("betting round had nothing to do"))
        })?;
        Ok(ActionReport {
            action: applied,
            events: self.state.events[events_before..].to_vec(),
            phase: self.state.phase,
            version: self.version,
        })
    }

    /// Takes `seat` out of future hands, or puts it back. Only between
    /// hands.
    pub fn set_sitting_out(&mut self, seat: usize, sitting_out: bool) -> Result<(), GameError> {
        if self.state.hand_in_progress {
            return Err(GameError::state("cannot change seats during a hand"));
        }
        self.transact(|state| {
            let p = state
                .player_mut(seat)
                .ok_or_else(|| GameError::invalid(format!("no player at seat {seat}")))?;
            if sitting_out {
                p.sit_out();
            } else {
                p.sit_in();
            }
            Ok(())
        })
    }

    /// Runs `f` on a copy of the state and commits it only on success,
    /// publishing the events it produced.
    fn transact<T, F>(&mut self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut GameState) -> Result<T, GameError>,
    {
        let mut working = self.state.clone();
        let events_before = working.events.len();
        let out = f(&mut working)?;
        self.state = working;
        self.version += 1;
        for event in &self.state.events[events_before..] {
            self.sink.publish(event);
        }
        Ok(out)
    }

    fn record_hand(&mut self, summary: &HandSummary) {
        let Some(logger) = self.hand_logger.as_mut() else {
            self.last_record = None;
            return;
        };
        let record = HandRecord {
            hand_id: logger.next_id(),
            hand_number: summary.hand_number,
            seed: self.config.random_seed,
            dealer: self.state.dealer_position,
            actions: self.state.action_log.clone(),
            board: summary.board.clone(),
            result: Some(summary.describe()),
            ts: None,
            showdown: (!summary.won_uncontested).then(|| ShowdownInfo {
                winners: summary.winners(),
                notes: None,
            }),
        };
        if let Err(e) = logger.write(&record) {
            tracing::warn!(error = %e, hand = summary.hand_number, "failed to write hand record");
        }
        self.last_record = Some(record);
    }
}

fn start_hand(state: &mut GameState) -> Result<(), GameError> {
    for p in state.players.iter_mut() {
        p.reset_for_new_hand();
    }
    if state.hand_number == 0 {
        state.settle_dealer();
    } else {
        state.rotate_dealer();
    }
    state.pots.reset();
    state.community_cards.clear();
    state.action_log.clear();
    state.events.clear();
    state.current_bet = 0;
    state.last_raiser = None;
    state.last_raise_amount = 0;
    state.hand_number += 1;
    state.hand_in_progress = true;
    state.push_event(EventKind::HandStarted {
        dealer: state.dealer_position,
    });
    Phase::PreFlop.enter(state)?;
    settle_streets(state)
}

/// Moves through streets on which nobody can act, stopping at the first
/// street that needs a decision or at showdown.
fn settle_streets(state: &mut GameState) -> Result<(), GameError> {
    let mut phase = state.phase;
    while phase != Phase::Showdown
        && (state.current_player.is_none() || phase.is_round_complete(state))
    {
        phase = phase.advance(state)?;
    }
    Ok(())
}
