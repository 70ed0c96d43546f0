//! Moderator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest stop delay accepted by [`ModeratorConfig::validate`].
pub const MAX_STOPGUESS_DELAY_SECS: u64 = 300;

/// Settings the moderator needs from the bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratorConfig {
    /// Repeat guesses replace earlier ones (otherwise first guess wins)
    pub use_latest_reply: bool,

    /// Tell participants when their guess was invalid
    pub report_invalid: bool,

    /// Seconds between announcing the window closure and scoring being
    /// available
    pub stopguess_delay: u64,

    /// Default scoring mode: closest guess not above the target
    pub closest_without_going_over: bool,
}

impl Default for ModeratorConfig {
    fn default() -> Self {
        Self {
            use_latest_reply: true,
            report_invalid: false,
            stopguess_delay: 5,
            closest_without_going_over: false,
        }
    }
}

impl ModeratorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.stopguess_delay > MAX_STOPGUESS_DELAY_SECS {
            return Err(format!(
                "Stop guess delay must be at most {MAX_STOPGUESS_DELAY_SECS} seconds"
            ));
        }

        Ok(())
    }

    pub fn stop_delay(&self) -> Duration {
        Duration::from_secs(self.stopguess_delay)
    }
}
