use thiserror::Error;

use crate::{
    game::{is_guess, parse_target},
    moderator::BotCommand,
};

/// What a chat line means to the bot.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatInput {
    /// Moderator command, only honoured from privileged users
    Command(BotCommand),
    /// Guess text, either bare (`"42"`) or from the guess command
    Guess(String),
    /// Anything else
    Chatter,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Score needs a target value (e.g. '{0}score 42')")]
    MissingScoreValue(String),
    #[error("Invalid score target '{0}'. Must be a number")]
    InvalidScoreValue(String),
    #[error("Add guess needs a value (e.g. '{0}addguess 42 alice')")]
    MissingGuessValue(String),
    #[error("Invalid guess '{0}'. Positive whole numbers only please")]
    InvalidGuessValue(String),
}

/// Parse a chat line.
///
/// Commands start with `prefix` and are matched case-insensitively. Lines
/// that start with a number are guesses.
///
/// # Examples
///
/// ```
/// use guess_moderator::chat::{ChatInput, parse_chat};
/// use guess_moderator::BotCommand;
///
/// assert_eq!(parse_chat("!", "!StartGuessing"), Ok(ChatInput::Command(BotCommand::StartGuessing)));
/// assert_eq!(parse_chat("!", "!score 3.5"), Ok(ChatInput::Command(BotCommand::Score { target: 3.5 })));
/// assert_eq!(parse_chat("!", "42 easy"), Ok(ChatInput::Guess("42 easy".to_string())));
/// assert_eq!(parse_chat("!", "!guess 7"), Ok(ChatInput::Guess("7".to_string())));
/// assert_eq!(parse_chat("!", "hello"), Ok(ChatInput::Chatter));
/// ```
pub fn parse_chat(prefix: &str, text: &str) -> Result<ChatInput, ParseError> {
    let Some(rest) = strip_prefix_ignore_case(text, prefix) else {
        return Ok(if is_guess(text) {
            ChatInput::Guess(text.to_string())
        } else {
            ChatInput::Chatter
        });
    };

    let mut parts = rest.split_ascii_whitespace();
    let Some(name) = parts.next() else {
        return Ok(ChatInput::Chatter);
    };

    match name.to_ascii_lowercase().as_str() {
        "startguessing" => Ok(ChatInput::Command(BotCommand::StartGuessing)),
        "stopguessing" => Ok(ChatInput::Command(BotCommand::StopGuessing)),
        "resetguessing" => Ok(ChatInput::Command(BotCommand::ResetGuessing)),
        "stats" => Ok(ChatInput::Command(BotCommand::Stats)),
        "score" => parse_score_command(prefix, parts.next()),
        "addguess" => parse_addguess_command(prefix, parts.next(), parts.next()),
        "guess" => {
            // Everything after the command word, like a bare guess
            let raw = rest.trim_ascii_start()[name.len()..].trim_ascii_start();
            Ok(ChatInput::Guess(raw.to_string()))
        }
        _ => Ok(ChatInput::Chatter),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Parse a score command: "score VALUE"
fn parse_score_command(prefix: &str, value: Option<&str>) -> Result<ChatInput, ParseError> {
    let value = value.ok_or_else(|| ParseError::MissingScoreValue(prefix.to_string()))?;
    let target =
        parse_target(value).ok_or_else(|| ParseError::InvalidScoreValue(value.to_string()))?;
    Ok(ChatInput::Command(BotCommand::Score { target }))
}

/// Parse an add guess command: "addguess VALUE [USERNAME]"
fn parse_addguess_command(
    prefix: &str,
    value: Option<&str>,
    participant: Option<&str>,
) -> Result<ChatInput, ParseError> {
    let value = value.ok_or_else(|| ParseError::MissingGuessValue(prefix.to_string()))?;
    let value = value
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidGuessValue(value.to_string()))?;

    // Names may be written as mentions; chat logins are lowercase
    let participant = participant
        .map(|name| name.trim_start_matches('@').to_lowercase())
        .filter(|name| !name.is_empty());

    Ok(ChatInput::Command(BotCommand::AddGuess { value, participant }))
}
