//! Bot service loop: chat events in, moderator output back to chat.
//!
//! Events are forwarded to the moderator without waiting for their outcome,
//! so a stop command's delay never holds up reading chat. Everything the
//! moderator wants said arrives through its outbox.

use anyhow::Error;
use guess_moderator::{
    BotCommand, ModeratorHandle, Outbound,
    chat::{ChatInput, parse_chat},
};
use tokio::sync::{mpsc, watch};

use crate::{
    config::BotConfig,
    logging::log_chat_line,
    transport::{ChatEvent, ChatSink, ChatSource},
};

/// Settings the service loop reads per chat event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub prefix: String,
    pub live_mode: bool,
    /// Used for labelling live mode output
    pub channel: String,
}

impl From<&BotConfig> for ServiceSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            live_mode: config.live_mode,
            channel: config.channel(),
        }
    }
}

/// What to do with one chat event
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Command {
        invoker: String,
        command: BotCommand,
    },
    Guess {
        participant: String,
        raw: String,
    },
    /// Usage error, answered without involving the moderator
    Reply(Outbound),
    Ignore,
}

/// Decide how to handle a chat event. Commands from unprivileged users are
/// dropped.
pub fn route_event(settings: &ServiceSettings, event: &ChatEvent) -> Route {
    if settings.live_mode {
        log_chat_line(&settings.channel, &event.author, &event.text);
    }

    match parse_chat(&settings.prefix, &event.text) {
        Ok(ChatInput::Command(command)) if event.is_privileged => Route::Command {
            invoker: event.author.clone(),
            command,
        },
        Ok(ChatInput::Command(command)) => {
            tracing::debug!("Ignoring {command} from unprivileged {}", event.author);
            Route::Ignore
        }
        Ok(ChatInput::Guess(raw)) => Route::Guess {
            participant: event.author.clone(),
            raw,
        },
        Ok(ChatInput::Chatter) => Route::Ignore,
        Err(err) if event.is_privileged => {
            tracing::debug!("Bad command from {}: {err}", event.author);
            Route::Reply(Outbound::Reply {
                to: event.author.clone(),
                text: err.to_string(),
            })
        }
        Err(_) => Route::Ignore,
    }
}

/// Connects one chat transport to a moderator
pub struct BotService {
    settings: ServiceSettings,
    handle: ModeratorHandle,
    outbox: mpsc::Receiver<Outbound>,
}

impl BotService {
    pub fn new(
        settings: ServiceSettings,
        handle: ModeratorHandle,
        outbox: mpsc::Receiver<Outbound>,
    ) -> Self {
        Self {
            settings,
            handle,
            outbox,
        }
    }

    /// Run until the source ends or `shutdown` flips to true
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails or the moderator has stopped
    pub async fn run<S, K>(
        mut self,
        mut source: S,
        mut sink: K,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), Error>
    where
        S: ChatSource,
        K: ChatSink,
    {
        tracing::info!("Bot service running with prefix {:?}", self.settings.prefix);

        loop {
            tokio::select! {
                event = source.recv() => {
                    let Some(event) = event? else {
                        tracing::info!("Chat source ended");
                        break;
                    };
                    forward(&self.settings, &self.handle, &event, &mut sink).await?;
                }

                Some(message) = self.outbox.recv() => {
                    sink.send(&message).await?;
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Shutdown requested");
                        break;
                    }
                }
            }
        }

        // Whatever the moderator already queued still goes out
        while let Ok(message) = self.outbox.try_recv() {
            sink.send(&message).await?;
        }

        Ok(())
    }
}

async fn forward<K: ChatSink>(
    settings: &ServiceSettings,
    handle: &ModeratorHandle,
    event: &ChatEvent,
    sink: &mut K,
) -> Result<(), Error> {
    match route_event(settings, event) {
        Route::Command { invoker, command } => handle.dispatch(&invoker, command).await?,
        Route::Guess { participant, raw } => handle.dispatch_guess(&participant, &raw).await?,
        Route::Reply(message) => sink.send(&message).await?,
        Route::Ignore => {}
    }
    Ok(())
}
