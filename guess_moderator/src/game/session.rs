//! Guessing session state machine.
//!
//! A session moves through `Idle -> Collecting -> Closing -> HoldingForScore`
//! and back to `Collecting` on every new round. A reset reopens the window
//! from any state. Guesses are only accepted while `Collecting`; scoring is
//! only allowed while `HoldingForScore`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    errors::{GuessError, Operation},
    ledger::GuessLedger,
    scoring::ScoreResult,
    stats::{GuessStats, StopSummary},
};

/// Phase of a guessing round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SessionState {
    /// No round has been started.
    #[default]
    Idle,
    /// The guessing window is open.
    Collecting,
    /// The window closure was announced and the stop delay is running.
    Closing,
    /// The window is closed and the guesses wait for a target.
    HoldingForScore,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting guesses",
            Self::Closing => "closing the guessing window",
            Self::HoldingForScore => "holding guesses for scoring",
        };
        write!(f, "{repr}")
    }
}

/// One guessing game: the round state plus its ledger.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    ledger: GuessLedger,
    /// Bumped each time a window opens, so work scheduled for an earlier
    /// round can be told apart.
    round: u64,
    /// Scoring mode used by [`Session::score`].
    closest_without_going_over: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Session {
    #[must_use]
    pub fn new(use_latest_reply: bool, closest_without_going_over: bool) -> Self {
        Self {
            state: SessionState::Idle,
            ledger: GuessLedger::new(use_latest_reply),
            round: 0,
            closest_without_going_over,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ledger(&self) -> &GuessLedger {
        &self.ledger
    }

    /// Number of windows opened so far
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn closest_without_going_over(&self) -> bool {
        self.closest_without_going_over
    }

    pub fn can_accept_guesses(&self) -> bool {
        self.state == SessionState::Collecting
    }

    pub fn can_score(&self) -> bool {
        self.state == SessionState::HoldingForScore
    }

    fn require(&self, operation: Operation, allowed: &[SessionState]) -> Result<(), GuessError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GuessError::WrongState {
                operation,
                state: self.state,
            })
        }
    }

    /// Open a new guessing window, discarding the previous round's guesses.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` if a window is already open or closing.
    pub fn start(&mut self) -> Result<(), GuessError> {
        self.require(
            Operation::Start,
            &[SessionState::Idle, SessionState::HoldingForScore],
        )?;
        self.open_window();
        Ok(())
    }

    /// Throw away the current round and open a fresh window, whatever the
    /// state. A stop still waiting on its delay no longer completes.
    /// Returns the number of guesses discarded.
    pub fn reset(&mut self) -> usize {
        let discarded = self.ledger.len();
        self.open_window();
        discarded
    }

    fn open_window(&mut self) {
        self.ledger.clear();
        self.round += 1;
        self.state = SessionState::Collecting;
    }

    /// Close the window to new guesses. The round is not scoreable until
    /// [`Session::finish_stop`] runs after the stop delay.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless collecting.
    pub fn begin_stop(&mut self) -> Result<(), GuessError> {
        self.require(Operation::Stop, &[SessionState::Collecting])?;
        self.state = SessionState::Closing;
        Ok(())
    }

    /// Complete a stop begun with [`Session::begin_stop`].
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless closing.
    pub fn finish_stop(&mut self) -> Result<StopSummary, GuessError> {
        self.finish_stop_for(self.round)
    }

    /// Complete a stop begun during `round`. Refused if the session has
    /// been restarted or reset since.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless closing in `round`.
    pub fn finish_stop_for(&mut self, round: u64) -> Result<StopSummary, GuessError> {
        if round != self.round {
            return Err(GuessError::WrongState {
                operation: Operation::Stop,
                state: self.state,
            });
        }
        self.require(Operation::Stop, &[SessionState::Closing])?;
        self.state = SessionState::HoldingForScore;
        Ok(self.ledger.summary())
    }

    /// Record a chat guess, subject to the ledger's replace policy.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless collecting, else any parse error from
    /// [`GuessLedger::accept`].
    pub fn submit_guess(&mut self, participant: &str, raw: &str) -> Result<u64, GuessError> {
        self.require(Operation::Guess, &[SessionState::Collecting])?;
        self.ledger.accept(participant, raw)
    }

    /// Force a guess in on a moderator's behalf, overwriting any earlier
    /// guess from `participant`. Returns the replaced value.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless collecting or holding for score.
    pub fn add_guess(&mut self, participant: &str, value: u64) -> Result<Option<u64>, GuessError> {
        self.require(
            Operation::AddGuess,
            &[SessionState::Collecting, SessionState::HoldingForScore],
        )?;
        Ok(self.ledger.force(participant, value))
    }

    /// # Errors
    ///
    /// Returns `WrongState` when idle and `EmptyLedger` without guesses.
    pub fn stats(&self) -> Result<GuessStats, GuessError> {
        self.require(
            Operation::Stats,
            &[
                SessionState::Collecting,
                SessionState::Closing,
                SessionState::HoldingForScore,
            ],
        )?;
        self.ledger.stats()
    }

    /// Score with the session's configured mode.
    ///
    /// # Errors
    ///
    /// See [`Session::score_with`].
    pub fn score(&self, target: f64) -> Result<ScoreResult, GuessError> {
        self.score_with(target, self.closest_without_going_over)
    }

    /// Score the held guesses against `target`. Doesn't change state, so a
    /// closed round can be scored any number of times.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless holding for score and `EmptyLedger`
    /// without guesses.
    pub fn score_with(
        &self,
        target: f64,
        closest_without_going_over: bool,
    ) -> Result<ScoreResult, GuessError> {
        self.require(Operation::Score, &[SessionState::HoldingForScore])?;
        self.ledger.score(target, closest_without_going_over)
    }
}
