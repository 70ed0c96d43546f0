//! Descriptive statistics over recorded guesses.

use serde::Serialize;
use std::fmt;

use super::errors::GuessError;

/// Number of quantile groups for [`GuessStats::quartiles`].
const QUARTILE_GROUPS: usize = 4;

/// Statistics over a non-empty set of guesses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GuessStats {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    /// Sample standard deviation. Undefined (None) for a single guess.
    pub stdev: Option<f64>,
    /// Population standard deviation. Zero for a single guess.
    pub population_stdev: f64,
    pub median: f64,
    /// Every value tied for the highest frequency, ascending.
    pub multimode: Vec<u64>,
    /// The 3 cut points splitting the guesses into quarters.
    pub quartiles: [f64; 3],
}

impl GuessStats {
    /// Compute statistics over `values` in any order.
    ///
    /// # Errors
    ///
    /// Returns `EmptyLedger` if `values` is empty.
    pub fn from_values(values: &[u64]) -> Result<Self, GuessError> {
        if values.is_empty() {
            return Err(GuessError::EmptyLedger);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let mean = mean(&sorted);
        let squares = sum_of_squares(&sorted, mean);

        let stdev = (count > 1).then(|| (squares / (count - 1) as f64).sqrt());
        let population_stdev = (squares / count as f64).sqrt();

        Ok(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            stdev,
            population_stdev,
            median: median(&sorted),
            multimode: multimode(&sorted),
            quartiles: quartiles(&sorted),
        })
    }
}

impl fmt::Display for GuessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modes = self
            .multimode
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let [q1, q2, q3] = self.quartiles;

        write!(
            f,
            "{} | min {} | max {} | mean {:.2}",
            guess_count(self.count),
            self.min,
            self.max,
            self.mean
        )?;
        if let Some(stdev) = self.stdev {
            write!(f, " | stdev {stdev:.2}")?;
        }
        write!(
            f,
            " | median {:.2} | mode {modes} | quartiles {q1:.2}, {q2:.2}, {q3:.2}",
            self.median
        )
    }
}

/// Count and range of the guesses when the window closes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StopSummary {
    pub count: usize,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl StopSummary {
    pub fn from_values(values: &[u64]) -> Self {
        Self {
            count: values.len(),
            min: values.iter().copied().min(),
            max: values.iter().copied().max(),
        }
    }
}

impl fmt::Display for StopSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(
                f,
                "{} received, ranging from {min} to {max}",
                guess_count(self.count)
            ),
            _ => write!(f, "No guesses received"),
        }
    }
}

fn guess_count(count: usize) -> String {
    if count == 1 {
        "1 guess".to_string()
    } else {
        format!("{count} guesses")
    }
}

fn mean(sorted: &[u64]) -> f64 {
    let total: u128 = sorted.iter().map(|&v| u128::from(v)).sum();
    total as f64 / sorted.len() as f64
}

fn sum_of_squares(sorted: &[u64], mean: f64) -> f64 {
    sorted
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum()
}

fn median(sorted: &[u64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

fn multimode(sorted: &[u64]) -> Vec<u64> {
    let mut runs: Vec<(u64, usize)> = Vec::new();
    for &value in sorted {
        match runs.last_mut() {
            Some((last, len)) if *last == value => *len += 1,
            _ => runs.push((value, 1)),
        }
    }

    let highest = runs.iter().map(|&(_, len)| len).max().unwrap_or(0);
    runs.into_iter()
        .filter(|&(_, len)| len == highest)
        .map(|(value, _)| value)
        .collect()
}

/// Exclusive quantile method: cut point `i` sits at position `i * (n + 1) / 4`
/// and is linearly interpolated between its neighbours.
fn quartiles(sorted: &[u64]) -> [f64; 3] {
    let len = sorted.len();
    if len == 1 {
        return [sorted[0] as f64; 3];
    }

    let groups = QUARTILE_GROUPS as i64;
    let m = len + 1;
    let mut cuts = [0.0; 3];
    for (i, cut) in (1..QUARTILE_GROUPS).zip(cuts.iter_mut()) {
        let j = (i * m / QUARTILE_GROUPS).clamp(1, len - 1);
        // Negative or above `groups` once `j` is clamped at either end.
        let delta = (i * m) as i64 - (j * QUARTILE_GROUPS) as i64;
        let below = sorted[j - 1] as f64 * (groups - delta) as f64;
        let above = sorted[j] as f64 * delta as f64;
        *cut = (below + above) / groups as f64;
    }
    cuts
}
