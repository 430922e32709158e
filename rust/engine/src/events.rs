use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::action::ActionType;
use crate::cards::Card;
use crate::phase::Phase;

/// What happened at the table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    HandStarted {
        dealer: usize,
    },
    BlindsPosted {
        small_blind: (usize, u32),
        big_blind: (usize, u32),
    },
    /// `board` holds new community cards; `seats` lists seats that received
    /// hole cards. Hole cards themselves are never published.
    CardsDealt {
        phase: Phase,
        board: Vec<Card>,
        seats: Vec<usize>,
    },
    PlayerAction {
        seat: usize,
        action: ActionType,
        amount: u32,
        converted: bool,
        reason: Option<String>,
    },
    BettingRoundComplete {
        phase: Phase,
        pot: u32,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    ChipsReturned {
        seat: usize,
        amount: u32,
    },
    PotAwarded {
        pot_index: usize,
        amount: u32,
        winners: Vec<usize>,
    },
    PlayerEliminated {
        seat: usize,
    },
    HandEnded {
        winners: Vec<usize>,
    },
}

impl EventKind {
    /// Stable upper-case name, as used in the serialised `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::HandStarted { .. } => "HAND_STARTED",
            EventKind::BlindsPosted { .. } => "BLINDS_POSTED",
            EventKind::CardsDealt { .. } => "CARDS_DEALT",
            EventKind::PlayerAction { .. } => "PLAYER_ACTION",
            EventKind::BettingRoundComplete { .. } => "BETTING_ROUND_COMPLETE",
            EventKind::PhaseChanged { .. } => "PHASE_CHANGED",
            EventKind::ChipsReturned { .. } => "CHIPS_RETURNED",
            EventKind::PotAwarded { .. } => "POT_AWARDED",
            EventKind::PlayerEliminated { .. } => "PLAYER_ELIMINATED",
            EventKind::HandEnded { .. } => "HAND_ENDED",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct GameEvent {
    pub hand_number: u64,
    /// RFC3339, millisecond precision
    pub timestamp: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl GameEvent {
    pub fn new(hand_number: u64, kind: EventKind) -> Self {
        Self {
            hand_number,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Receives every event the engine commits, in order.
///
/// Events from a rejected action are never published.
pub trait EventSink {
    fn publish(&mut self, event: &GameEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: &GameEvent) {}
}

/// Adapts a closure into a sink.
pub struct CallbackSink<F>(pub F);

impl<F> EventSink for CallbackSink<F>
where
    F: FnMut(&GameEvent),
{
    fn publish(&mut self, event: &GameEvent) {
        (self.0)(event)
    }
}

impl EventSink for Sender<GameEvent> {
    fn publish(&mut self, event: &GameEvent) {
        if self.send(event.clone()).is_err() {
            tracing::trace!(event = event.name(), "event receiver dropped");
        }
    }
}

/// Collecting sink whose clones share one buffer, so a caller can keep a
/// handle after giving the sink to the engine.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(GameEvent::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: &GameEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
