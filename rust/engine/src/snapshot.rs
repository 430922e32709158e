use std::fmt;

use serde::{Serialize, Serializer};

use crate::action::ActionType;
use crate::cards::Card;
use crate::game::GameState;
use crate::phase::Phase;
use crate::player::{Player, SeatStatus};
use crate::pot::SidePot;

/// Text shown in place of a card the viewer may not see.
pub const HIDDEN_CARD: &str = "XX";

/// A hole card as seen by one viewer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CardView {
    Visible(Card),
    Hidden,
}

impl CardView {
    pub fn card(self) -> Option<Card> {
        match self {
            CardView::Visible(c) => Some(c),
            CardView::Hidden => None,
        }
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardView::Visible(c) => write!(f, "{c}"),
            CardView::Hidden => f.write_str(HIDDEN_CARD),
        }
    }
}

impl Serialize for CardView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One seat as the viewer sees it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub seat_id: usize,
    pub name: String,
    /// Stack behind, excluding the street bet
    pub chips: u32,
    /// Chips bet on the current street
    pub current_bet: u32,
    /// Chips put in over the whole hand, blinds included
    pub total_contributed: u32,
    pub status: SeatStatus,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    /// Last action this seat took in the hand
    pub last_action: Option<ActionType>,
    /// Two entries while dealt in, each visible or hidden
    pub hole_cards: Vec<CardView>,
}

impl PlayerSnapshot {
    /// `"As Kd"`, or `"XX XX"` when hidden.
    pub fn hole_cards_text(&self) -> String {
        self.hole_cards
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Read-only copy of the table as one viewer is allowed to see it.
///
/// The viewer sees their own hole cards. Other hole cards are hidden until a
/// contested showdown, where every hand still in play is shown. A snapshot
/// with no viewer hides all hole cards until then.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct GameSnapshot {
    /// Engine version the snapshot was taken at
    pub version: u64,
    /// Seat whose hole cards are shown, if any
    pub viewer: Option<usize>,
    pub hand_number: u64,
    pub hand_in_progress: bool,
    pub phase: Phase,
    pub community_cards: Vec<Card>,
    /// Chips collected into pots, street bets excluded
    pub pot: u32,
    /// Main pot first, then side pots
    pub pots: Vec<SidePot>,
    /// Highest street bet on the table
    pub current_bet: u32,
    /// Last bet or raise increment this street
    pub last_raise_amount: u32,
    /// Smallest legal raise-to total
    pub min_raise_to: u32,
    /// Seat to act; `None` when nobody can act
    pub current_player: Option<usize>,
    pub dealer_position: usize,
    pub small_blind: u32,
    pub big_blind: u32,
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    pub fn from_state(state: &GameState, viewer: Option<usize>, version: u64) -> Self {
        let contested_showdown =
            state.phase == Phase::Showdown && state.players_in_hand().count() > 1;
        let players = state
            .players
            .iter()
            .map(|p| {
                let visible =
                    Some(p.seat_id) == viewer || (contested_showdown && p.is_in_hand());
                player_view(p, visible)
            })
            .collect();
        Self {
            version,
            viewer,
            hand_number: state.hand_number,
            hand_in_progress: state.hand_in_progress,
            phase: state.phase,
            community_cards: state.community_cards.clone(),
            pot: state.pot(),
            pots: state.pots.pots().to_vec(),
            current_bet: state.current_bet,
            last_raise_amount: state.last_raise_amount,
            min_raise_to: state.min_raise_to(),
            current_player: state.current_player,
            dealer_position: state.dealer_position,
            small_blind: state.small_blind,
            big_blind: state.big_blind,
            players,
        }
    }

    pub fn player(&self, seat: usize) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.seat_id == seat)
    }

    pub fn call_amount(&self, seat: usize) -> u32 {
        self.player(seat)
            .map(|p| self.current_bet.saturating_sub(p.current_bet))
            .unwrap_or(0)
    }

    /// Hole cards visible to this snapshot's viewer for `seat`.
    pub fn visible_hole_cards(&self, seat: usize) -> Vec<Card> {
        self.player(seat)
            .map(|p| p.hole_cards.iter().filter_map(|c| c.card()).collect())
            .unwrap_or_default()
    }
}

fn player_view(p: &Player, visible: bool) -> PlayerSnapshot {
    let hole_cards = p
        .hole_cards
        .iter()
        .map(|&c| {
            if visible {
                CardView::Visible(c)
            } else {
                CardView::Hidden
            }
        })
        .collect();
    PlayerSnapshot {
        seat_id: p.seat_id,
        name: p.name.clone(),
        chips: p.chips,
        current_bet: p.current_bet,
        total_contributed: p.total_contributed,
        status: p.status,
        is_dealer: p.is_dealer,
        is_small_blind: p.is_small_blind,
        is_big_blind: p.is_big_blind,
        last_action: p.last_action_type,
        hole_cards,
    }
}
