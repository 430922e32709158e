use std::collections::BTreeMap;

use crate::action::ActionType;
use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::events::{EventKind, GameEvent};
use crate::logger::ActionRecord;
use crate::phase::Phase;
use crate::player::{Player, SeatStatus};
use crate::pot::PotManager;

/// Mutable aggregate for one table.
///
/// `players` is kept sorted by `seat_id`; "left of" a seat means the next
/// higher seat id, wrapping around.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Street being played, or Showdown once betting is over
    pub phase: Phase,
    /// Board cards dealt so far, in deal order
    pub community_cards: Vec<Card>,
    /// Chips collected from finished streets
    pub pots: PotManager,
    /// Highest street bet on the table this round
    pub current_bet: u32,
    /// Seat that made the last bet or full raise this street
    pub last_raiser: Option<usize>,
    /// Size of the last bet or raise increment, for the minimum raise
    pub last_raise_amount: u32,
    pub players: Vec<Player>,
    /// Button seat for the current hand
    pub dealer_position: usize,
    pub small_blind_position: Option<usize>,
    pub big_blind_position: Option<usize>,
    /// Seat whose turn it is; `None` when nobody can act
    pub current_player: Option<usize>,
    pub small_blind: u32,
    pub big_blind: u32,
    /// Actions applied on the current street
    pub street_action_count: u32,
    pub deck: Deck,
    /// Number of the current hand; 0 before the first one
    pub hand_number: u64,
    pub hand_in_progress: bool,
    /// Every action applied this hand, with its chip movement
    pub action_log: Vec<ActionRecord>,
    /// Events produced so far; the controller publishes the new tail
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(
        mut players: Vec<Player>,
        small_blind: u32,
        big_blind: u32,
        dealer_position: usize,
        seed: Option<u64>,
    ) -> Self {
        players.sort_by_key(|p| p.seat_id);
        Self {
            phase: Phase::PreFlop,
            community_cards: Vec::with_capacity(5),
            pots: PotManager::new(),
            current_bet: 0,
            last_raiser: None,
            last_raise_amount: 0,
            players,
            dealer_position,
            small_blind_position: None,
            big_blind_position: None,
            current_player: None,
            small_blind,
            big_blind,
            street_action_count: 0,
            deck: Deck::new(seed),
            hand_number: 0,
            hand_in_progress: false,
            action_log: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.iter().find(|p| p.seat_id == seat)
    }

    pub fn player_mut(&mut self, seat: usize) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.seat_id == seat)
    }

    pub(crate) fn player_index(&self, seat: usize) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.seat_id == seat)
            .ok_or_else(|| GameError::invalid(format!("no player at seat {seat}")))
    }

    /// Chips already collected into the pots.
    pub fn pot(&self) -> u32 {
        self.pots.total()
    }

    /// Street bets not yet collected.
    pub fn outstanding_bets(&self) -> u32 {
        self.players.iter().map(|p| p.current_bet).sum()
    }

    /// `sum(chips) + sum(current_bet) + pot`; constant for the whole hand.
    pub fn total_chips(&self) -> u32 {
        self.players.iter().map(|p| p.chips).sum::<u32>() + self.outstanding_bets() + self.pot()
    }

    pub fn call_amount(&self, seat: usize) -> u32 {
        self.player(seat)
            .map(|p| self.current_bet.saturating_sub(p.current_bet))
            .unwrap_or(0)
    }

    /// Smallest legal raise-to total.
    pub fn min_raise_to(&self) -> u32 {
        self.current_bet + self.last_raise_amount.max(self.big_blind)
    }

    /// Players still contesting the pot.
    pub fn players_in_hand(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_in_hand())
    }

    /// Players who can still make a decision this hand.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.can_act())
    }

    /// Seats dealt into hands, ascending.
    pub fn seated_seats(&self) -> Vec<usize> {
        self.players
            .iter()
            .filter(|p| p.is_seated_in())
            .map(|p| p.seat_id)
            .collect()
    }

    /// First seat clockwise after `seat` whose player matches `pred`. `seat`
    /// itself is considered last.
    pub fn next_seat_after<F>(&self, seat: usize, pred: F) -> Option<usize>
    where
        F: Fn(&Player) -> bool,
    {
        let start = self
            .players
            .iter()
            .position(|p| p.seat_id > seat)
            .unwrap_or(0);
        let n = self.players.len();
        (0..n)
            .map(|i| &self.players[(start + i) % n])
            .find(|p| pred(*p))
            .map(|p| p.seat_id)
    }

    /// Moves the dealer button to the next seat that is dealt in.
    pub fn rotate_dealer(&mut self) {
        if let Some(next) = self.next_seat_after(self.dealer_position, Player::is_seated_in) {
            self.dealer_position = next;
        }
    }

    /// Puts the button on a seat that is dealt in, starting from the
    /// configured position.
    pub(crate) fn settle_dealer(&mut self) {
        let seated = self
            .player(self.dealer_position)
            .map(Player::is_seated_in)
            .unwrap_or(false);
        if !seated {
            self.rotate_dealer();
        }
    }

    /// Marks dealer and blind flags and returns `(small_blind, big_blind)`
    /// seats. Heads-up the dealer posts the small blind.
    pub fn assign_positions(&mut self) -> Result<(usize, usize), GameError> {
        let seated = self.seated_seats();
        if seated.len() < 2 {
            return Err(GameError::state("need at least two seated players"));
        }
        let dealer = self.dealer_position;
        let sb = if seated.len() == 2 {
            dealer
        } else {
            self.next_seat_after(dealer, Player::is_seated_in)
                .ok_or_else(|| GameError::state("no small blind seat"))?
        };
        let bb = self
            .next_seat_after(sb, Player::is_seated_in)
            .ok_or_else(|| GameError::state("no big blind seat"))?;

        for p in &mut self.players {
            p.is_dealer = p.seat_id == dealer;
            p.is_small_blind = p.seat_id == sb;
            p.is_big_blind = p.seat_id == bb;
        }
        self.small_blind_position = Some(sb);
        self.big_blind_position = Some(bb);
        Ok((sb, bb))
    }

    /// Posts both blinds. A short stack posts what it has and is all-in.
    /// The table bet is the nominal big blind either way.
    pub fn post_blinds(&mut self) -> Result<(), GameError> {
        let (sb_seat, bb_seat) = self.assign_positions()?;
        let sb = self.post_blind(sb_seat, self.small_blind)?;
        let bb = self.post_blind(bb_seat, self.big_blind)?;
        self.current_bet = self.big_blind;
        self.last_raise_amount = self.big_blind;
        self.last_raiser = None;
        tracing::debug!(sb_seat, sb, bb_seat, bb, "blinds posted");
        self.push_event(EventKind::BlindsPosted {
            small_blind: (sb_seat, sb),
            big_blind: (bb_seat, bb),
        });
        Ok(())
    }

    fn post_blind(&mut self, seat: usize, amount: u32) -> Result<u32, GameError> {
        let idx = self.player_index(seat)?;
        let p = &mut self.players[idx];
        let posted = amount.min(p.chips);
        p.bet(posted)?;
        Ok(posted)
    }

    /// Moves the turn to the next player who can act. Returns false when
    /// nobody can.
    pub fn advance_current_player(&mut self) -> bool {
        let from = match self.current_player {
            Some(seat) => seat,
            None => self.dealer_position,
        };
        self.current_player = self.next_seat_after(from, Player::can_act);
        self.current_player.is_some()
    }

    /// The street is over once at most one player is left in the hand, or
    /// every player who can still act has acted since the last full raise and
    /// matched the table bet.
    pub fn is_betting_round_complete(&self) -> bool {
        if self.players_in_hand().count() <= 1 {
            return true;
        }
        let active: Vec<&Player> = self.active_players().collect();
        match active.as_slice() {
            [] => true,
            [only] if only.current_bet >= self.current_bet => true,
            _ => active
                .iter()
                .all(|p| p.has_acted && p.current_bet == self.current_bet),
        }
    }

    /// Resets the per-street betting fields. The first player to act is the
    /// first one left of the dealer who can.
    pub fn start_new_betting_round(&mut self) {
        self.current_bet = 0;
        self.last_raiser = None;
        self.last_raise_amount = 0;
        self.street_action_count = 0;
        for p in &mut self.players {
            p.reset_for_new_street();
        }
        self.current_player = self.next_seat_after(self.dealer_position, Player::can_act);
    }

    /// Collects the street's bets into the pots, announcing any chips handed
    /// back to an uncalled bettor.
    pub fn collect_bets(&mut self) -> BTreeMap<usize, u32> {
        let returns = self.pots.collect_from_players(&mut self.players);
        for (&seat, &amount) in &returns {
            tracing::debug!(seat, amount, "uncalled chips returned");
            self.push_event(EventKind::ChipsReturned { seat, amount });
        }
        returns
    }

    pub fn deal_card(&mut self) -> Result<Card, GameError> {
        self.deck
            .deal_card()
            .ok_or_else(|| GameError::state("deck exhausted"))
    }

    /// Applies the chip and status effects of an already validated action.
    pub(crate) fn apply_action(
        &mut self,
        seat: usize,
        action_type: ActionType,
        amount: u32,
    ) -> Result<(), GameError> {
        let idx = self.player_index(seat)?;
        let pot_before = self.pot() + self.outstanding_bets();
        let chips_before = self.players[idx].chips;
        let previous_bet = self.current_bet;

        let mut reopened = false;
        {
            let p = &mut self.players[idx];
            match action_type {
                ActionType::Fold => p.fold(),
                ActionType::Check => {}
                ActionType::Call => p.bet(amount)?,
                ActionType::Bet | ActionType::Raise => {
                    let add = amount.checked_sub(p.current_bet).ok_or_else(|| {
                        GameError::state(format!(
                            "{action_type} to {amount} is below the seat's bet of {}",
                            p.current_bet
                        ))
                    })?;
                    p.bet(add)?;
                    reopened = true;
                }
                ActionType::AllIn => {
                    let chips = p.chips;
                    p.bet(chips)?;
                    reopened = p.current_bet > previous_bet;
                }
            }
            p.last_action_type = Some(action_type);
            p.has_acted = true;
        }

        if reopened {
            let total = self.players[idx].current_bet;
            self.current_bet = total;
            self.last_raiser = Some(seat);
            self.last_raise_amount = total - previous_bet;
            for (i, other) in self.players.iter_mut().enumerate() {
                if i != idx {
                    other.has_acted = false;
                }
            }
        }
        self.street_action_count += 1;

        let chips_after = self.players[idx].chips;
        self.action_log.push(ActionRecord {
            hand_number: self.hand_number,
            phase: self.phase,
            street_index: self.street_action_count,
            seat,
            action_type,
            amount: chips_before - chips_after,
            pot_before,
            pot_after: self.pot() + self.outstanding_bets(),
            chips_before,
            chips_after,
        });
        Ok(())
    }

    pub fn push_event(&mut self, kind: EventKind) {
        self.events.push(GameEvent::new(self.hand_number, kind));
    }

    /// Seats that hold chips and are not sitting out.
    pub fn players_with_chips(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.chips > 0 && p.status != SeatStatus::SittingOut)
            .count()
    }
}
