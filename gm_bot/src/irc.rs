//! Twitch chat over plain IRC.
//!
//! Only what a channel bot needs: login with tag capability, `PING`
//! keepalive, `PRIVMSG` in and out.

use anyhow::{Context, Error, bail};
use async_trait::async_trait;
use guess_moderator::Outbound;
use std::collections::HashMap;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};

use crate::transport::{ChatEvent, ChatSink, ChatSource};

pub const TWITCH_IRC_ADDR: &str = "irc.chat.twitch.tv:6667";

/// Login and channel details for one connection
#[derive(Clone)]
pub struct IrcSettings {
    pub addr: String,
    pub nick: String,
    /// Includes the `oauth:` prefix
    pub token: String,
    /// Without the leading `#`
    pub channel: String,
}

impl std::fmt::Debug for IrcSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcSettings")
            .field("addr", &self.addr)
            .field("nick", &self.nick)
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .finish()
    }
}

/// Lines sent right after connecting
pub fn login_lines(settings: &IrcSettings) -> Vec<String> {
    vec![
        "CAP REQ :twitch.tv/tags".to_string(),
        format!("PASS {}", settings.token),
        format!("NICK {}", settings.nick),
        format!("JOIN #{}", settings.channel),
    ]
}

/// One parsed IRC line: `[@tags] [:prefix] COMMAND [params] [:trailing]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    /// Middle params followed by the trailing param, if any
    pub params: Vec<String>,
}

impl IrcMessage {
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        let mut message = IrcMessage::default();

        if let Some(tagged) = rest.strip_prefix('@') {
            let (tags, after) = tagged.split_once(' ')?;
            message.tags = parse_tags(tags);
            rest = after.trim_start();
        }

        if let Some(prefixed) = rest.strip_prefix(':') {
            let (prefix, after) = prefixed.split_once(' ')?;
            message.prefix = Some(prefix.to_string());
            rest = after.trim_start();
        }

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing)),
            None => (rest, None),
        };
        let mut words = middle.split_ascii_whitespace();
        message.command = words.next()?.to_ascii_uppercase();
        message.params = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            message.params.push(trailing.to_string());
        }

        Some(message)
    }

    /// Nick part of a `nick!user@host` prefix
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(prefix.split_once('!').map_or(prefix, |(nick, _)| nick))
    }

    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Moderators and the broadcaster may run commands
    pub fn is_privileged(&self) -> bool {
        self.tag("mod") == Some("1")
            || self.tag("badges").is_some_and(|badges| {
                badges
                    .split(',')
                    .any(|badge| badge.starts_with("broadcaster/"))
            })
    }

    /// Chat event for a `PRIVMSG` in `channel`, skipping the bot's own lines
    pub fn to_chat_event(&self, channel: &str, own_nick: &str) -> Option<ChatEvent> {
        if self.command != "PRIVMSG" {
            return None;
        }
        let target = self.params.first()?;
        if !target
            .trim_start_matches('#')
            .eq_ignore_ascii_case(channel)
        {
            return None;
        }

        let author = self.nick()?.to_lowercase();
        if author.eq_ignore_ascii_case(own_nick) {
            return None;
        }

        let text = if self.params.len() > 1 {
            self.trailing()?
        } else {
            ""
        };
        Some(ChatEvent::new(author, text, self.is_privileged()))
    }
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|tag| !tag.is_empty())
        .map(|tag| match tag.split_once('=') {
            Some((key, value)) => (key.to_string(), unescape_tag_value(value)),
            None => (tag.to_string(), String::new()),
        })
        .collect()
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// IRC is line based; a newline in chat text would end the command early
pub fn sanitize(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn privmsg(channel: &str, message: &Outbound) -> String {
    format!("PRIVMSG #{channel} :{}", sanitize(&message.to_string()))
}

/// Connect and log in. Lines are written by a background task, so both
/// halves can be used from one `select!` loop.
pub async fn connect(settings: &IrcSettings) -> Result<(IrcSource, IrcSink), Error> {
    tracing::info!("Connecting to {} as {}", settings.addr, settings.nick);

    let stream = TcpStream::connect(&settings.addr)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.addr))?;
    let (read, write) = stream.into_split();

    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_lines(write, raw_rx));

    for line in login_lines(settings) {
        raw_tx.send(line).context("IRC writer stopped during login")?;
    }

    let source = IrcSource {
        lines: BufReader::new(read).lines(),
        raw_tx: raw_tx.clone(),
        channel: settings.channel.clone(),
        nick: settings.nick.clone(),
    };
    let sink = IrcSink {
        raw_tx,
        channel: settings.channel.clone(),
    };
    Ok((source, sink))
}

async fn write_lines(mut write: OwnedWriteHalf, mut raw_rx: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = raw_rx.recv().await {
        if line.starts_with("PASS ") {
            tracing::debug!("> PASS <redacted>");
        } else {
            tracing::debug!("> {line}");
        }

        let result = async {
            write.write_all(line.as_bytes()).await?;
            write.write_all(b"\r\n").await?;
            write.flush().await
        }
        .await;

        if let Err(err) = result {
            tracing::error!("IRC write failed: {err}");
            break;
        }
    }
}

pub struct IrcSource {
    lines: Lines<BufReader<OwnedReadHalf>>,
    /// For keepalive replies
    raw_tx: mpsc::UnboundedSender<String>,
    channel: String,
    nick: String,
}

#[async_trait]
impl ChatSource for IrcSource {
    async fn recv(&mut self) -> Result<Option<ChatEvent>, Error> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read from IRC")?
        {
            let Some(message) = IrcMessage::parse(&line) else {
                tracing::debug!("Unparseable IRC line: {line}");
                continue;
            };

            match message.command.as_str() {
                "PRIVMSG" => {
                    if let Some(event) = message.to_chat_event(&self.channel, &self.nick) {
                        return Ok(Some(event));
                    }
                }
                "PING" => {
                    let payload = message.trailing().unwrap_or("tmi.twitch.tv");
                    self.raw_tx
                        .send(format!("PONG :{payload}"))
                        .context("IRC writer stopped")?;
                }
                "001" => tracing::info!("Logged in as {}", self.nick),
                "JOIN" if message.nick() == Some(self.nick.as_str()) => {
                    tracing::info!("Joined #{}", self.channel);
                }
                "NOTICE" => {
                    let text = message.trailing().unwrap_or_default();
                    if text.contains("Login authentication failed")
                        || text.contains("Improperly formatted auth")
                    {
                        bail!("Twitch rejected the login: {text}");
                    }
                    tracing::info!("Notice: {text}");
                }
                "RECONNECT" => {
                    tracing::warn!("Server asked us to reconnect");
                    return Ok(None);
                }
                _ => tracing::trace!("< {line}"),
            }
        }

        tracing::info!("IRC connection closed");
        Ok(None)
    }
}

pub struct IrcSink {
    raw_tx: mpsc::UnboundedSender<String>,
    channel: String,
}

#[async_trait]
impl ChatSink for IrcSink {
    async fn send(&mut self, message: &Outbound) -> Result<(), Error> {
        self.raw_tx
            .send(privmsg(&self.channel, message))
            .context("IRC writer stopped")?;
        Ok(())
    }
}
