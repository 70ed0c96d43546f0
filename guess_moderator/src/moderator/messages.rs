//! Moderator actor message types.

use serde::Serialize;
use std::fmt;
use tokio::sync::oneshot;

use crate::game::{GuessError, GuessStats, ScoreResult, SessionState, StopSummary};

/// Moderator commands. Only privileged chat users may issue these; the
/// chat layer checks that before sending them.
#[derive(Clone, Debug, PartialEq)]
pub enum BotCommand {
    /// Open a new guessing window
    StartGuessing,
    /// Close the window and summarize after the stop delay
    StopGuessing,
    /// Discard the current round and reopen the window from any state
    ResetGuessing,
    /// Pick winners for the target using the configured mode
    Score { target: f64 },
    /// Force a guess in for `participant`, or for the invoker if absent
    AddGuess {
        value: u64,
        participant: Option<String>,
    },
    /// Report guess statistics
    Stats,
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartGuessing => write!(f, "start guessing"),
            Self::StopGuessing => write!(f, "stop guessing"),
            Self::ResetGuessing => write!(f, "reset guessing"),
            Self::Score { target } => write!(f, "score {target}"),
            Self::AddGuess {
                value,
                participant: Some(participant),
            } => write!(f, "add guess {value} for {participant}"),
            Self::AddGuess { value, .. } => write!(f, "add guess {value}"),
            Self::Stats => write!(f, "stats"),
        }
    }
}

/// Messages that can be sent to a ModeratorActor
#[derive(Debug)]
pub enum ModeratorMessage {
    /// Moderator command from `invoker`
    Command {
        invoker: String,
        command: BotCommand,
        response: oneshot::Sender<ModeratorResponse>,
    },

    /// Chat guess from a participant
    SubmitGuess {
        participant: String,
        raw: String,
        response: oneshot::Sender<ModeratorResponse>,
    },

    /// Get current session state
    GetState {
        response: oneshot::Sender<SessionState>,
    },

    /// Stop delay elapsed. Only the actor's own timer can build one.
    FinishStop(StopTimer),

    /// Stop the actor
    Shutdown,
}

/// A pending stop, tied to the round it was issued in.
///
/// Only the moderator's timer builds these:
///
/// ```compile_fail
/// use guess_moderator::moderator::{ModeratorMessage, StopTimer};
///
/// let (response, _) = tokio::sync::oneshot::channel();
/// let _ = ModeratorMessage::FinishStop(StopTimer { round: 1, response });
/// ```
#[derive(Debug)]
pub struct StopTimer {
    pub(super) round: u64,
    pub(super) response: oneshot::Sender<ModeratorResponse>,
}

/// Result of a moderator message
#[derive(Debug, Clone, PartialEq)]
pub enum ModeratorResponse {
    /// Guessing window opened
    Started,

    /// Window closed after the stop delay
    Stopped(StopSummary),

    /// Round thrown away and window reopened
    Reset { discarded: usize },

    /// Winners for a score command
    Scored(ScoreResult),

    /// Statistics for a stats command
    Stats(GuessStats),

    /// Chat guess stored; carries the value now on record
    GuessAccepted(u64),

    /// Guess forced in by a moderator
    GuessAdded {
        participant: String,
        value: u64,
        replaced: Option<u64>,
    },

    /// Operation refused
    Rejected(GuessError),
}

impl ModeratorResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        !matches!(self, ModeratorResponse::Rejected(_))
    }

    pub fn error(&self) -> Option<&GuessError> {
        match self {
            ModeratorResponse::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// Text for the chat transport to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outbound {
    /// Message for the whole channel
    Channel(String),

    /// Message addressed to one participant
    Reply { to: String, text: String },
}

impl Outbound {
    pub fn text(&self) -> &str {
        match self {
            Outbound::Channel(text) | Outbound::Reply { text, .. } => text,
        }
    }
}

impl fmt::Display for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outbound::Channel(text) => write!(f, "{text}"),
            Outbound::Reply { to, text } => write!(f, "@{to} {text}"),
        }
    }
}
