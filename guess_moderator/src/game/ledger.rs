//! Per-round guess ledger.

use serde::Serialize;
use std::collections::HashMap;

use super::{
    errors::GuessError,
    parse::parse_guess,
    scoring::{self, ScoreResult},
    stats::{GuessStats, StopSummary},
};

/// A participant's recorded guess.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Guess {
    pub participant: String,
    pub value: u64,
}

/// Mapping of participant to their single guess for the current round.
///
/// Entries keep the order participants first guessed in. Replacing a guess
/// keeps the participant's original position, so tie-breaks stay stable
/// across replacements.
#[derive(Clone, Debug)]
pub struct GuessLedger {
    /// When set, a repeat guess overwrites the stored one. Otherwise the
    /// first guess wins and repeats are dropped.
    use_latest_reply: bool,
    entries: Vec<Guess>,
    /// Participant to index into `entries`.
    positions: HashMap<String, usize>,
}

impl Default for GuessLedger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GuessLedger {
    #[must_use]
    pub fn new(use_latest_reply: bool) -> Self {
        Self {
            use_latest_reply,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn use_latest_reply(&self) -> bool {
        self.use_latest_reply
    }

    /// Parse `raw` and record it for `participant`.
    ///
    /// Returns the value now stored for the participant. With first-wins
    /// policy that is the earlier guess when one exists.
    ///
    /// # Errors
    ///
    /// Returns `NotANumber` or `NegativeValue` if `raw` isn't a valid
    /// guess. The ledger is left untouched on error.
    pub fn accept(&mut self, participant: &str, raw: &str) -> Result<u64, GuessError> {
        let value = parse_guess(raw)?;
        Ok(self.record(participant, value))
    }

    /// Record an already validated value, applying the replace policy.
    pub fn record(&mut self, participant: &str, value: u64) -> u64 {
        match self.positions.get(participant) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                if self.use_latest_reply {
                    entry.value = value;
                }
                entry.value
            }
            None => {
                self.insert_new(participant, value);
                value
            }
        }
    }

    /// Store `value` for `participant` regardless of the replace policy.
    /// Returns the value it replaced, if any.
    pub fn force(&mut self, participant: &str, value: u64) -> Option<u64> {
        match self.positions.get(participant) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].value, value)),
            None => {
                self.insert_new(participant, value);
                None
            }
        }
    }

    fn insert_new(&mut self, participant: &str, value: u64) {
        self.positions
            .insert(participant.to_string(), self.entries.len());
        self.entries.push(Guess {
            participant: participant.to_string(),
            value,
        });
    }

    pub fn get(&self, participant: &str) -> Option<u64> {
        self.positions
            .get(participant)
            .map(|&idx| self.entries[idx].value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    /// Guesses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Guess> {
        self.entries.iter()
    }

    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|guess| guess.value).collect()
    }

    /// Descriptive statistics over the recorded values.
    ///
    /// # Errors
    ///
    /// Returns `EmptyLedger` if nobody has guessed.
    pub fn stats(&self) -> Result<GuessStats, GuessError> {
        GuessStats::from_values(&self.values())
    }

    /// Count and range, defined for an empty ledger too.
    pub fn summary(&self) -> StopSummary {
        StopSummary::from_values(&self.values())
    }

    /// Winners for `target`, see [`scoring::score`].
    ///
    /// # Errors
    ///
    /// Returns `EmptyLedger` if nobody has guessed.
    pub fn score(
        &self,
        target: f64,
        closest_without_going_over: bool,
    ) -> Result<ScoreResult, GuessError> {
        scoring::score(&self.entries, target, closest_without_going_over)
    }
}
