//! # Guess Moderator
//!
//! The engine behind a chat guessing game: a moderator opens a guessing
//! window, participants post numbers, and once the window closes the bot
//! reports statistics and picks the closest guesses to a target.
//!
//! ## Core Modules
//!
//! - [`game`]: Session state machine, guess ledger, statistics and scoring
//! - [`moderator`]: Async actor that owns a session and serializes every
//!   chat event and command applied to it
//! - [`chat`]: Turns raw chat text into tagged commands and guesses
//!
//! ## Example
//!
//! ```
//! use guess_moderator::Session;
//!
//! let mut session = Session::new(true, false);
//! session.start().unwrap();
//! session.submit_guess("alice", "42").unwrap();
//! session.submit_guess("bob", "45 surely").unwrap();
//! session.begin_stop().unwrap();
//! session.finish_stop().unwrap();
//!
//! let result = session.score(43.0).unwrap();
//! assert_eq!(result.winner_names, vec!["alice".to_string()]);
//! ```

/// Chat text parsing into commands and guesses.
pub mod chat;

/// Core game logic: ledger, statistics, scoring and session state.
pub mod game;
pub use game::{
    GuessError, GuessLedger, GuessStats, Operation, ScoreResult, Session, SessionState,
    StopSummary,
};

/// Session actor and its message protocol.
pub mod moderator;
pub use moderator::{BotCommand, ModeratorActor, ModeratorConfig, ModeratorHandle, Outbound};
