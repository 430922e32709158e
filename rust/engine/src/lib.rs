//! # holdem-engine: No-Limit Texas Hold'em Rules Engine
//!
//! A single-table Hold'em engine for two to nine seats. It deals with a
//! seeded ChaCha20 deck, validates and converts betting actions, runs the
//! street state machine, builds side pots from all-in contributions and
//! settles showdowns. Observers only ever get masked, versioned snapshots.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and text parsing
//! - [`deck`] - Seeded deck with shuffle, burn and deal
//! - [`hand`] - Five-of-seven hand evaluation and comparison
//! - [`player`] - Seat state and chip movement
//! - [`pot`] - Main and side pot construction and payout
//! - [`rules`] - Action validation and conversion
//! - [`phase`] - Street state machine
//! - [`game`] - Mutable table aggregate
//! - [`showdown`] - Pot resolution at the end of a hand
//! - [`engine`] - Controller: hands, actions, snapshots
//! - [`snapshot`] - Masked read-only views
//! - [`events`] - Game events and sinks
//! - [`logger`] - Action records and JSONL hand history
//! - [`config`] - Table configuration from TOML and environment
//! - [`strategy`] - Decision trait for computer seats
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::action::Action;
//! use holdem_engine::config::GameConfig;
//! use holdem_engine::engine::Engine;
//!
//! let mut engine = Engine::new(GameConfig::heads_up().with_seed(42)).unwrap();
//! assert!(engine.start_new_hand());
//!
//! // Heads-up the button posts the small blind and acts first pre-flop
//! let seat = engine.current_player().unwrap();
//! engine.execute_action(Action::fold(seat)).unwrap();
//!
//! assert!(engine.is_hand_over());
//! let summary = engine.end_hand().unwrap().unwrap();
//! assert!(summary.won_uncontested);
//! assert_eq!(engine.state().total_chips(), 2000);
//! ```
//!
//! ## Hand Evaluation
//!
//! ```rust
//! use holdem_engine::cards::parse_cards;
//! use holdem_engine::hand::{evaluate_hand, HandRank};
//!
//! let hole = parse_cards("Ah Kh").unwrap();
//! let board = parse_cards("Qh Jh Th 2c 3d").unwrap();
//! let result = evaluate_hand(&hole, &board).unwrap();
//! assert_eq!(result.rank, HandRank::RoyalFlush);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! The same seed always produces the same shuffle:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! let mut a = Deck::new_with_seed(42);
//! let mut b = Deck::new_with_seed(42);
//! a.shuffle();
//! b.shuffle();
//! assert_eq!(a.deal_cards(5), b.deal_cards(5));
//! ```

pub mod action;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game;
pub mod hand;
pub mod logger;
pub mod phase;
pub mod player;
pub mod pot;
pub mod rules;
pub mod showdown;
pub mod snapshot;
pub mod strategy;
