//! Winner selection for a target value.

use serde::Serialize;
use std::{collections::BTreeSet, fmt};

use super::{errors::GuessError, ledger::Guess};

/// Participants whose guesses came closest to a target.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Ascending by value, then by the order participants first guessed.
    pub winner_names: Vec<String>,
    /// Distinct winning values.
    pub winner_values: BTreeSet<u64>,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self
            .winner_values
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" and ");
        let label = if self.winner_names.len() == 1 {
            "Winner"
        } else {
            "Winners"
        };
        write!(
            f,
            "{label} with {values}: {}",
            self.winner_names.join(", ")
        )
    }
}

/// Pick the guesses closest to `target`.
///
/// By default every guess at the minimum absolute distance wins, so two
/// different values either side of the target can both win. With
/// `closest_without_going_over`, only guesses at or below the target are
/// eligible and the highest of them wins. If every guess went over, the
/// default rule applies to all guesses instead.
///
/// # Errors
///
/// Returns `EmptyLedger` if `guesses` is empty.
pub fn score(
    guesses: &[Guess],
    target: f64,
    closest_without_going_over: bool,
) -> Result<ScoreResult, GuessError> {
    if guesses.is_empty() {
        return Err(GuessError::EmptyLedger);
    }

    let all: Vec<(usize, &Guess)> = guesses.iter().enumerate().collect();
    let candidates = if closest_without_going_over {
        let under: Vec<(usize, &Guess)> = all
            .iter()
            .copied()
            .filter(|(_, guess)| guess.value as f64 <= target)
            .collect();
        if under.is_empty() {
            log::debug!("Every guess is over {target}, scoring by nearest instead");
            all
        } else {
            under
        }
    } else {
        all
    };

    let best = candidates
        .iter()
        .map(|(_, guess)| distance(guess.value, target))
        .fold(f64::INFINITY, f64::min);

    let mut winners: Vec<(usize, &Guess)> = candidates
        .into_iter()
        .filter(|(_, guess)| distance(guess.value, target) == best)
        .collect();
    winners.sort_by_key(|&(position, guess)| (guess.value, position));

    Ok(ScoreResult {
        winner_values: winners.iter().map(|(_, guess)| guess.value).collect(),
        winner_names: winners
            .into_iter()
            .map(|(_, guess)| guess.participant.clone())
            .collect(),
    })
}

/// Eligible guesses in capped mode never exceed the target, so this equals
/// `target - value` there.
fn distance(value: u64, target: f64) -> f64 {
    (value as f64 - target).abs()
}
