//! Main pot and side pot bookkeeping.
//!
//! Contributions are tracked per seat for the whole hand. Each time a betting
//! round is collected the pots are rebuilt from those totals with the usual
//! uneven all-in construction, so a short all-in on any street caps what that
//! seat can win.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::{Player, SeatStatus};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    /// Seats that can win this pot, ascending
    pub eligible: Vec<usize>,
}

/// Pots built from a contribution map plus whatever could not be matched.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PotDistribution {
    pub pots: Vec<SidePot>,
    pub returned: BTreeMap<usize, u32>,
}

impl PotDistribution {
    pub fn pots_total(&self) -> u32 {
        self.pots.iter().map(|p| p.amount).sum()
    }

    pub fn returned_total(&self) -> u32 {
        self.returned.values().sum()
    }
}

/// Builds pots from per-seat contributions where every contributor is still
/// eligible. A tier only one seat reached is returned to that seat.
pub fn calculate_side_pots(contributions: &BTreeMap<usize, u32>) -> PotDistribution {
    build_pots(contributions, &BTreeSet::new())
}

/// Builds pots from per-seat contributions. Chips from `folded` seats count
/// toward every tier they reached but those seats never become eligible.
pub fn build_pots(
    contributions: &BTreeMap<usize, u32>,
    folded: &BTreeSet<usize>,
) -> PotDistribution {
    let mut levels: Vec<u32> = contributions.values().copied().filter(|&c| c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut out = PotDistribution::default();
    // chips from a tier nobody can win, carried into the next pot created
    let mut orphaned = 0u32;
    let mut prev = 0u32;
    for level in levels {
        let reached: Vec<usize> = contributions
            .iter()
            .filter(|(_, &c)| c >= level)
            .map(|(&seat, _)| seat)
            .collect();
        let slice = (level - prev) * reached.len() as u32;
        prev = level;

        if let [only] = reached.as_slice() {
            *out.returned.entry(*only).or_insert(0) += slice;
            continue;
        }

        let eligible: Vec<usize> = reached
            .into_iter()
            .filter(|seat| !folded.contains(seat))
            .collect();
        if eligible.is_empty() {
            match out.pots.last_mut() {
                Some(last) => last.amount += slice,
                None => orphaned += slice,
            }
            continue;
        }
        match out.pots.last_mut() {
            Some(last) if last.eligible == eligible => last.amount += slice,
            _ => out.pots.push(SidePot {
                amount: slice + std::mem::take(&mut orphaned),
                eligible,
            }),
        }
    }
    if orphaned > 0 {
        // every contributor folded: hand the chips back
        for (&seat, &c) in contributions {
            let already = out.returned.get(&seat).copied().unwrap_or(0);
            let give = (c - already).min(orphaned);
            if give > 0 {
                *out.returned.entry(seat).or_insert(0) += give;
                orphaned -= give;
            }
        }
    }
    out
}

/// Owns the chips already pulled off the table for the hand in progress.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PotManager {
    pots: Vec<SidePot>,
    contributions: BTreeMap<usize, u32>,
    collected: u32,
    returned: u32,
    awarded: u32,
}

impl PotManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pots(&self) -> &[SidePot] {
        &self.pots
    }

    pub fn total(&self) -> u32 {
        self.pots.iter().map(|p| p.amount).sum()
    }

    pub fn main_pot(&self) -> u32 {
        self.pots.first().map(|p| p.amount).unwrap_or(0)
    }

    pub fn side_pots(&self) -> &[SidePot] {
        self.pots.get(1..).unwrap_or(&[])
    }

    pub fn has_side_pots(&self) -> bool {
        self.pots.len() > 1
    }

    /// Hand-to-date contribution per seat, after returns.
    pub fn contributions(&self) -> &BTreeMap<usize, u32> {
        &self.contributions
    }

    /// Pulls every street bet into the pots and zeroes `current_bet`.
    ///
    /// When one seat bet more than anybody else this round, the unmatched
    /// part goes straight back to its stack. Returns what was handed back,
    /// keyed by seat.
    pub fn collect_from_players(&mut self, players: &mut [Player]) -> BTreeMap<usize, u32> {
        let mut returns = BTreeMap::new();

        let mut bets: Vec<(usize, u32)> = players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.current_bet > 0)
            .map(|(i, p)| (i, p.current_bet))
            .collect();
        bets.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        if let Some(&(top_idx, top)) = bets.first() {
            let second = bets.get(1).map(|&(_, b)| b).unwrap_or(0);
            if top > second {
                let excess = top - second;
                let p = &mut players[top_idx];
                p.current_bet -= excess;
                p.total_contributed -= excess;
                p.win(excess);
                returns.insert(p.seat_id, excess);
                self.collected += excess;
                self.returned += excess;
            }
        }

        for p in players.iter_mut() {
            if p.current_bet > 0 {
                *self.contributions.entry(p.seat_id).or_insert(0) += p.current_bet;
                self.collected += p.current_bet;
                p.current_bet = 0;
            }
        }

        let folded: BTreeSet<usize> = players
            .iter()
            .filter(|p| p.status == SeatStatus::Folded)
            .map(|p| p.seat_id)
            .collect();
        let dist = build_pots(&self.contributions, &folded);
        for (&seat, &amount) in &dist.returned {
            if let Some(p) = players.iter_mut().find(|p| p.seat_id == seat) {
                p.win(amount);
                p.total_contributed = p.total_contributed.saturating_sub(amount);
            }
            if let Some(c) = self.contributions.get_mut(&seat) {
                *c -= amount;
            }
            *returns.entry(seat).or_insert(0) += amount;
            self.returned += amount;
        }
        self.pots = dist.pots;
        returns
    }

    /// Pays each pot to its winners. Pot `i` is split evenly among
    /// `winners_by_pot[i]`; odd chips go one each to the lowest seats.
    ///
    /// Every pot must have at least one winner drawn from its eligible set.
    /// Nothing is paid unless the whole map is valid. Clears the pots.
    pub fn award_pots(
        &mut self,
        winners_by_pot: &BTreeMap<usize, Vec<usize>>,
        players: &mut [Player],
    ) -> Result<BTreeMap<usize, u32>, GameError> {
        let mut payouts: BTreeMap<usize, u32> = BTreeMap::new();
        for (i, pot) in self.pots.iter().enumerate() {
            let mut winners = winners_by_pot
                .get(&i)
                .cloned()
                .ok_or_else(|| GameError::state(format!("no winners given for pot {i}")))?;
            winners.sort_unstable();
            winners.dedup();
            if winners.is_empty() {
                return Err(GameError::state(format!("no winners given for pot {i}")));
            }
            if let Some(bad) = winners.iter().find(|w| !pot.eligible.contains(w)) {
                return Err(GameError::state(format!(
                    "seat {bad} is not eligible for pot {i}"
                )));
            }
            for (seat, share) in split_evenly(pot.amount, &winners) {
                *payouts.entry(seat).or_insert(0) += share;
            }
        }
        for &seat in payouts.keys() {
            if !players.iter().any(|p| p.seat_id == seat) {
                return Err(GameError::state(format!("no player at seat {seat}")));
            }
        }

        for p in players.iter_mut() {
            if let Some(&amount) = payouts.get(&p.seat_id) {
                p.win(amount);
            }
        }
        self.awarded += payouts.values().sum::<u32>();
        self.pots.clear();
        self.contributions.clear();
        Ok(payouts)
    }

    /// Every chip collected is in a pot, was returned, or was awarded.
    pub fn validate_pot_integrity(&self) -> bool {
        self.total() + self.returned + self.awarded == self.collected
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Splits `amount` across `winners` (ascending). The remainder goes one chip
/// at a time starting from the lowest seat.
pub fn split_evenly(amount: u32, winners: &[usize]) -> Vec<(usize, u32)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let n = winners.len() as u32;
    let share = amount / n;
    let remainder = (amount % n) as usize;
    winners
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, share + u32::from(i < remainder)))
        .collect()
}
