//! Guessing game error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::session::SessionState;

/// Operations gated by the session state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Operation {
    Start,
    Stop,
    Guess,
    AddGuess,
    Score,
    Stats,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Start => "start guessing",
            Self::Stop => "stop guessing",
            Self::Guess => "take guesses",
            Self::AddGuess => "add a guess",
            Self::Score => "score",
            Self::Stats => "show stats",
        };
        write!(f, "{repr}")
    }
}

/// Errors from submitting guesses or driving the session.
///
/// None of these are fatal. The moderator turns each one into a chat
/// message with [`GuessError::chat_message`].
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GuessError {
    #[error("not a whole number")]
    NotANumber,
    #[error("negative value")]
    NegativeValue,
    #[error("no guesses recorded")]
    EmptyLedger,
    #[error("can't {operation} while {state}")]
    WrongState {
        operation: Operation,
        state: SessionState,
    },
}

impl GuessError {
    /// User-facing text for relaying to the channel.
    pub fn chat_message(&self) -> String {
        match self {
            Self::NotANumber | Self::NegativeValue => {
                "Positive whole numbers only please".to_string()
            }
            Self::EmptyLedger => "No guesses yet".to_string(),
            Self::WrongState { operation, state } => {
                format!("Can't {operation} right now, the bot is {state}")
            }
        }
    }
}
