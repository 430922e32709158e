use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub seat: usize,
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: PlayerKind,
    /// Overrides `starting_chips` for this seat
    #[serde(default)]
    pub chips: Option<u32>,
}

fn default_kind() -> PlayerKind {
    PlayerKind::Ai
}

impl PlayerConfig {
    pub fn new(seat: usize, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            seat,
            name: name.into(),
            kind,
            chips: None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub starting_chips: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub max_players: usize,
    pub min_players: usize,
    pub random_seed: Option<u64>,
    pub debug_mode: bool,
    /// Button position for the first hand
    pub dealer_seat: usize,
    pub players: Vec<PlayerConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_chips: 1000,
            small_blind: 1,
            big_blind: 2,
            max_players: 9,
            min_players: 2,
            random_seed: None,
            debug_mode: false,
            dealer_seat: 0,
            players: Vec::new(),
        }
    }
}

impl GameConfig {
    /// `count` computer seats numbered from 0.
    pub fn with_players(count: usize) -> Self {
        Self {
            players: (0..count)
                .map(|seat| PlayerConfig::new(seat, format!("Player {seat}"), PlayerKind::Ai))
                .collect(),
            ..Self::default()
        }
    }

    pub fn heads_up() -> Self {
        Self::with_players(2)
    }

    pub fn with_blinds(mut self, small_blind: u32, big_blind: u32) -> Self {
        self.small_blind = small_blind;
        self.big_blind = big_blind;
        self
    }

    pub fn with_starting_chips(mut self, chips: u32) -> Self {
        self.starting_chips = chips;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_dealer(mut self, seat: usize) -> Self {
        self.dealer_seat = seat;
        self
    }

    /// Marks `seat` as the single human seat.
    pub fn with_human(mut self, seat: usize) -> Self {
        for p in &mut self.players {
            p.kind = if p.seat == seat {
                PlayerKind::Human
            } else {
                PlayerKind::Ai
            };
        }
        self
    }

    pub fn with_stacks(mut self, stacks: &[u32]) -> Self {
        for (p, &chips) in self.players.iter_mut().zip(stacks) {
            p.chips = Some(chips);
        }
        self
    }

    pub fn human_seat(&self) -> Option<usize> {
        self.players
            .iter()
            .find(|p| p.kind == PlayerKind::Human)
            .map(|p| p.seat)
    }

    pub fn chips_for(&self, player: &PlayerConfig) -> u32 {
        player.chips.unwrap_or(self.starting_chips)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.small_blind == 0 {
            return invalid("small_blind must be >0".into());
        }
        if self.big_blind <= self.small_blind {
            return invalid(format!(
                "big_blind ({}) must be greater than small_blind ({})",
                self.big_blind, self.small_blind
            ));
        }
        if self.starting_chips == 0 {
            return invalid("starting_chips must be >0".into());
        }
        if self.min_players < 2 {
            return invalid("min_players must be >=2".into());
        }
        if self.max_players < self.min_players {
            return invalid(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            ));
        }
        let n = self.players.len();
        if n < self.min_players || n > self.max_players {
            return invalid(format!(
                "{n} players configured, expected {}..={}",
                self.min_players, self.max_players
            ));
        }
        let table_chips: u64 = self
            .players
            .iter()
            .map(|p| u64::from(self.chips_for(p)))
            .sum();
        if table_chips > u64::from(u32::MAX) {
            return invalid(format!(
                "table holds {table_chips} chips in total, at most {} supported",
                u32::MAX
            ));
        }
        let mut seats = BTreeSet::new();
        for p in &self.players {
            if !seats.insert(p.seat) {
                return invalid(format!("seat {} is configured twice", p.seat));
            }
        }
        if !seats.contains(&self.dealer_seat) {
            return invalid(format!("dealer_seat {} is not occupied", self.dealer_seat));
        }
        let humans = self
            .players
            .iter()
            .filter(|p| p.kind == PlayerKind::Human)
            .count();
        if humans > 1 {
            return invalid(format!("at most one human seat allowed, found {humans}"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    starting_chips: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    max_players: Option<usize>,
    #[serde(default)]
    min_players: Option<usize>,
    #[serde(default)]
    random_seed: Option<u64>,
    #[serde(default)]
    debug_mode: Option<bool>,
    #[serde(default)]
    dealer_seat: Option<usize>,
    #[serde(default)]
    players: Option<Vec<PlayerConfig>>,
}

impl FileConfig {
    fn apply(self, cfg: &mut GameConfig) {
        if let Some(v) = self.starting_chips {
            cfg.starting_chips = v;
        }
        if let Some(v) = self.small_blind {
            cfg.small_blind = v;
        }
        if let Some(v) = self.big_blind {
            cfg.big_blind = v;
        }
        if let Some(v) = self.max_players {
            cfg.max_players = v;
        }
        if let Some(v) = self.min_players {
            cfg.min_players = v;
        }
        if let Some(v) = self.random_seed {
            cfg.random_seed = Some(v);
        }
        if let Some(v) = self.debug_mode {
            cfg.debug_mode = v;
        }
        if let Some(v) = self.dealer_seat {
            cfg.dealer_seat = v;
        }
        if let Some(v) = self.players {
            cfg.players = v;
        }
    }
}

/// Parses TOML over the defaults. Missing keys keep their default value.
/// The result is not validated.
pub fn load_from_str(s: &str) -> Result<GameConfig, ConfigError> {
    let file: FileConfig = toml::from_str(s)?;
    let mut cfg = GameConfig::default();
    file.apply(&mut cfg);
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<GameConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    load_from_str(&s)
}

/// Full resolution: defaults, then the file if given, then `HOLDEM_*`
/// environment variables, then validation.
pub fn load(path: Option<&Path>) -> Result<GameConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) => load_from_path(p)?,
        None => GameConfig::default(),
    };
    apply_env_overrides(&mut cfg)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Applies `HOLDEM_SEED`, `HOLDEM_SMALL_BLIND`, `HOLDEM_BIG_BLIND`,
/// `HOLDEM_STARTING_CHIPS` and `HOLDEM_DEBUG`. Empty values are ignored.
pub fn apply_env_overrides(cfg: &mut GameConfig) -> Result<(), ConfigError> {
    if let Some(seed) = env_value("HOLDEM_SEED") {
        cfg.random_seed = Some(parse_num(&seed, "seed")?);
    }
    if let Some(sb) = env_value("HOLDEM_SMALL_BLIND") {
        cfg.small_blind = parse_num(&sb, "small blind")?;
    }
    if let Some(bb) = env_value("HOLDEM_BIG_BLIND") {
        cfg.big_blind = parse_num(&bb, "big blind")?;
    }
    if let Some(chips) = env_value("HOLDEM_STARTING_CHIPS") {
        cfg.starting_chips = parse_num(&chips, "starting chips")?;
    }
    if let Some(debug) = env_value("HOLDEM_DEBUG") {
        cfg.debug_mode =
            parse_bool(&debug).ok_or_else(|| ConfigError::Invalid("Invalid debug flag".into()))?;
    }
    Ok(())
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_num<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("Invalid {what}: {s:?}")))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
