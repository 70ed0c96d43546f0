//! Guessing game engine.
//!
//! This module provides:
//! - Guess text parsing and validation
//! - The per-round guess ledger with its replace policy
//! - Descriptive statistics and winner scoring over the ledger
//! - The session state machine gating when guesses are accepted

pub mod errors;
pub mod ledger;
pub mod parse;
pub mod scoring;
pub mod session;
pub mod stats;

pub use errors::{GuessError, Operation};
pub use ledger::{Guess, GuessLedger};
pub use parse::{is_guess, parse_guess, parse_target};
pub use scoring::ScoreResult;
pub use session::{Session, SessionState};
pub use stats::{GuessStats, StopSummary};
