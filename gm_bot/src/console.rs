//! Local chat transport for trying the bot without Twitch.
//!
//! Each input line is `name: text`, with `@name: text` for a privileged
//! user. A line without a name comes from the operator, who is privileged.
//! Outbound messages are written one per line.

use anyhow::{Context, Error};
use async_trait::async_trait;
use guess_moderator::Outbound;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};

use crate::transport::{ChatEvent, ChatSink, ChatSource};

pub const OPERATOR_NAME: &str = "console";

/// Parse one console line. Blank lines yield `None`.
pub fn parse_console_line(line: &str) -> Option<ChatEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let named = line
        .split_once(':')
        .map(|(name, text)| (name.trim(), text.trim()))
        .filter(|(name, _)| is_name(name.trim_start_matches('@')));

    Some(match named {
        Some((name, text)) => match name.strip_prefix('@') {
            Some(name) => ChatEvent::new(name.to_lowercase(), text, true),
            None => ChatEvent::new(name.to_lowercase(), text, false),
        },
        None => ChatEvent::new(OPERATOR_NAME, line, true),
    })
}

/// Chat logins: letters, digits and underscores, not starting with a digit
fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub struct ConsoleSource<R> {
    lines: Lines<R>,
}

impl ConsoleSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ChatSource for ConsoleSource<R> {
    async fn recv(&mut self) -> Result<Option<ChatEvent>, Error> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read console input")?
        {
            if let Some(event) = parse_console_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

pub struct ConsoleSink<W> {
    writer: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ChatSink for ConsoleSink<W> {
    async fn send(&mut self, message: &Outbound) -> Result<(), Error> {
        let line = format!("{message}\n");
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write console output")?;
        self.writer.flush().await?;
        Ok(())
    }
}
