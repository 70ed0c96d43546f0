//! Bot configuration management.
//!
//! Settings live in a YAML file, the chat token in a second YAML file so the
//! settings can be shared without leaking credentials. `${VAR}` references
//! in either file are expanded from the environment before parsing.

use guess_moderator::ModeratorConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, sync::LazyLock};

/// Environment variable that overrides the token file.
pub const TOKEN_ENV_VAR: &str = "GM_TOKEN";
/// Environment variable holding the IRC nick.
pub const NICK_ENV_VAR: &str = "GM_NICK";
pub const DEFAULT_NICK: &str = "guessbot";

const OAUTH_PREFIX: &str = "oauth:";

static ENV_VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
});

/// Complete bot configuration as stored in `config.yaml`. Missing keys take
/// their defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Channel joined on startup, without the leading `#`
    pub default_channel: String,
    /// Command prefix, e.g. `!` for `!startguessing`
    pub prefix: String,
    /// Echo every chat line to the log
    pub live_mode: bool,
    pub use_latest_reply: bool,
    pub report_invalid: bool,
    /// Seconds between closing the window and scoring
    pub stopguess_delay: u64,
    pub closest_without_going_over: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        let moderator = ModeratorConfig::default();
        Self {
            default_channel: String::new(),
            prefix: "!".to_string(),
            live_mode: false,
            use_latest_reply: moderator.use_latest_reply,
            report_invalid: moderator.report_invalid,
            stopguess_delay: moderator.stopguess_delay,
            closest_without_going_over: moderator.closest_without_going_over,
        }
    }
}

impl BotConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read or isn't valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        Self::from_yaml(&text).map_err(|err| match err {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                what: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parse configuration text, expanding `${VAR}` references first
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(text);
        // An empty file is a config with every default
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&expanded).map_err(|source| ConfigError::Yaml {
            what: "configuration".to_string(),
            source,
        })
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|source| ConfigError::Yaml {
            what: "configuration".to_string(),
            source,
        })
    }

    /// Write a config with every default to `path`, creating parent
    /// directories as needed
    pub fn write_default(path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = Self::default().to_yaml()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Arguments
    ///
    /// * `require_channel` - Whether a channel must be set (IRC needs one,
    ///   the console transport doesn't)
    pub fn validate(&self, require_channel: bool) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Invalid {
                var: "prefix".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                var: "prefix".to_string(),
                reason: "Must not contain whitespace".to_string(),
            });
        }

        if require_channel && self.channel().is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "default_channel".to_string(),
                hint: "Set it to the Twitch channel the bot should join".to_string(),
            });
        }

        self.moderator_config()
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "stopguess_delay".to_string(),
                reason,
            })
    }

    /// The subset of settings the moderator actor runs with
    pub fn moderator_config(&self) -> ModeratorConfig {
        ModeratorConfig {
            use_latest_reply: self.use_latest_reply,
            report_invalid: self.report_invalid,
            stopguess_delay: self.stopguess_delay,
            closest_without_going_over: self.closest_without_going_over,
        }
    }

    /// Channel name, lowercase and without a leading `#`
    pub fn channel(&self) -> String {
        self.default_channel
            .trim()
            .trim_start_matches('#')
            .to_lowercase()
    }
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    token: String,
}

/// Read the chat token from a YAML file with a `token` key
pub fn load_token(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    let text = expand_env_vars(&read_file(path)?);
    let file: TokenFile = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        what: path.display().to_string(),
        source,
    })?;
    normalize_token(&file.token)
}

/// `GM_TOKEN` if set, otherwise the token file
pub fn resolve_token(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.trim().is_empty() => normalize_token(&token),
        _ => load_token(path),
    }
}

/// Trim the token and add the `oauth:` prefix IRC expects
pub fn normalize_token(token: &str) -> Result<String, ConfigError> {
    let token = token.trim();
    let bare = token.strip_prefix(OAUTH_PREFIX).unwrap_or(token);
    if bare.is_empty() {
        return Err(ConfigError::MissingRequired {
            var: "token".to_string(),
            hint: format!("Put it in the token file or set {TOKEN_ENV_VAR}"),
        });
    }
    Ok(format!("{OAUTH_PREFIX}{bare}"))
}

/// Nick to log in with
pub fn nick_from_env() -> String {
    std::env::var(NICK_ENV_VAR)
        .ok()
        .map(|nick| nick.trim().to_lowercase())
        .filter(|nick| !nick.is_empty())
        .unwrap_or_else(|| DEFAULT_NICK.to_string())
}

/// Replace `${VAR}` with the value of `VAR`, or nothing if it is unset
pub fn expand_env_vars(input: &str) -> String {
    ENV_VAR_REF
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {source}")]
    Yaml {
        what: String,
        source: serde_yaml::Error,
    },

    #[error("Missing required setting: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
