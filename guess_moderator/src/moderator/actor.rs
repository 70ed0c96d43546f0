//! Moderator actor implementation with async message handling.

use super::{
    config::ModeratorConfig,
    messages::{BotCommand, ModeratorMessage, ModeratorResponse, Outbound, StopTimer},
};
use crate::game::{GuessError, Session, SessionState};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::sleep,
};

const INBOX_CAPACITY: usize = 100;

pub const WINDOW_OPEN_MESSAGE: &str = "Guessing is open! Post a positive whole number to guess";
pub const WINDOW_CLOSED_MESSAGE: &str = "Guessing window closed";
pub const WINDOW_RESET_MESSAGE: &str =
    "Guessing reset! Earlier guesses are gone, post a positive whole number to guess";

/// Errors talking to a moderator actor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("moderator is closed")]
    Closed,
    #[error("moderator dropped the response")]
    NoResponse,
}

/// Moderator actor handle for sending messages
#[derive(Clone, Debug)]
pub struct ModeratorHandle {
    sender: mpsc::Sender<ModeratorMessage>,
}

impl ModeratorHandle {
    pub fn new(sender: mpsc::Sender<ModeratorMessage>) -> Self {
        Self { sender }
    }

    /// Send a raw message to the moderator
    pub async fn send(&self, message: ModeratorMessage) -> Result<(), HandleError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| HandleError::Closed)
    }

    /// Run a command and wait for its outcome. A stop only resolves once
    /// the stop delay has elapsed.
    pub async fn command(
        &self,
        invoker: &str,
        command: BotCommand,
    ) -> Result<ModeratorResponse, HandleError> {
        let (response, rx) = oneshot::channel();
        self.send(ModeratorMessage::Command {
            invoker: invoker.to_string(),
            command,
            response,
        })
        .await?;
        rx.await.map_err(|_| HandleError::NoResponse)
    }

    /// Queue a command without waiting for its outcome. Chat output still
    /// goes to the outbox.
    pub async fn dispatch(&self, invoker: &str, command: BotCommand) -> Result<(), HandleError> {
        let (response, _) = oneshot::channel();
        self.send(ModeratorMessage::Command {
            invoker: invoker.to_string(),
            command,
            response,
        })
        .await
    }

    pub async fn submit_guess(
        &self,
        participant: &str,
        raw: &str,
    ) -> Result<ModeratorResponse, HandleError> {
        let (response, rx) = oneshot::channel();
        self.send(ModeratorMessage::SubmitGuess {
            participant: participant.to_string(),
            raw: raw.to_string(),
            response,
        })
        .await?;
        rx.await.map_err(|_| HandleError::NoResponse)
    }

    /// Queue a guess without waiting for its outcome
    pub async fn dispatch_guess(&self, participant: &str, raw: &str) -> Result<(), HandleError> {
        let (response, _) = oneshot::channel();
        self.send(ModeratorMessage::SubmitGuess {
            participant: participant.to_string(),
            raw: raw.to_string(),
            response,
        })
        .await
    }

    pub async fn state(&self) -> Result<SessionState, HandleError> {
        let (response, rx) = oneshot::channel();
        self.send(ModeratorMessage::GetState { response }).await?;
        rx.await.map_err(|_| HandleError::NoResponse)
    }

    pub async fn shutdown(&self) -> Result<(), HandleError> {
        self.send(ModeratorMessage::Shutdown).await
    }
}

/// Moderator actor owning the guessing session.
///
/// Every chat event and command is handled to completion before the next
/// message is read, so the session never needs a lock. The stop delay runs
/// in a separate timer task that posts [`ModeratorMessage::FinishStop`]
/// back to the inbox.
pub struct ModeratorActor {
    config: ModeratorConfig,

    session: Session,

    /// Message inbox
    inbox: mpsc::Receiver<ModeratorMessage>,

    /// Lets the stop timer reach the inbox without keeping the actor alive
    timer_sender: mpsc::WeakSender<ModeratorMessage>,

    /// Chat output
    outbox: mpsc::Sender<Outbound>,

    is_closed: bool,
}

impl ModeratorActor {
    /// Create a new moderator actor
    ///
    /// # Arguments
    ///
    /// * `config` - Moderator configuration
    /// * `outbox` - Where chat announcements and replies are sent
    ///
    /// # Returns
    ///
    /// * `(ModeratorActor, ModeratorHandle)` - Actor and handle for sending messages
    pub fn new(config: ModeratorConfig, outbox: mpsc::Sender<Outbound>) -> (Self, ModeratorHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let session = Session::new(config.use_latest_reply, config.closest_without_going_over);

        let actor = Self {
            config,
            session,
            inbox,
            timer_sender: sender.downgrade(),
            outbox,
            is_closed: false,
        };

        (actor, ModeratorHandle::new(sender))
    }

    /// Run the moderator event loop until shut down or every handle is
    /// dropped
    pub async fn run(mut self) {
        log::info!(
            "Moderator starting (stop delay {}s, {} mode)",
            self.config.stopguess_delay,
            if self.config.closest_without_going_over {
                "closest without going over"
            } else {
                "closest"
            }
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Moderator stopped");
    }

    fn handle_message(&mut self, message: ModeratorMessage) {
        match message {
            ModeratorMessage::Command {
                invoker,
                command,
                response,
            } => {
                self.handle_command(&invoker, command, response);
            }

            ModeratorMessage::SubmitGuess {
                participant,
                raw,
                response,
            } => {
                let result = self.handle_guess(&participant, &raw);
                let _ = response.send(result);
            }

            ModeratorMessage::GetState { response } => {
                let _ = response.send(self.session.state());
            }

            ModeratorMessage::FinishStop(timer) => {
                let result = self.handle_finish_stop(timer.round);
                let _ = timer.response.send(result);
            }

            ModeratorMessage::Shutdown => {
                self.is_closed = true;
            }
        }
    }

    fn handle_command(
        &mut self,
        invoker: &str,
        command: BotCommand,
        response: oneshot::Sender<ModeratorResponse>,
    ) {
        log::debug!("{invoker} requested {command}");

        let result = match command {
            BotCommand::StartGuessing => match self.session.start() {
                Ok(()) => {
                    log::info!("{invoker} opened the guessing window");
                    self.announce(Outbound::Channel(WINDOW_OPEN_MESSAGE.to_string()));
                    ModeratorResponse::Started
                }
                Err(err) => self.reject(invoker, err),
            },

            BotCommand::StopGuessing => match self.session.begin_stop() {
                Ok(()) => {
                    log::info!(
                        "{invoker} closed the guessing window, scoring opens in {}s",
                        self.config.stopguess_delay
                    );
                    self.announce(Outbound::Channel(WINDOW_CLOSED_MESSAGE.to_string()));
                    self.schedule_finish_stop(response);
                    return;
                }
                Err(err) => self.reject(invoker, err),
            },

            BotCommand::ResetGuessing => {
                let discarded = self.session.reset();
                log::info!("{invoker} reset the round, discarding {discarded} guess(es)");
                self.announce(Outbound::Channel(WINDOW_RESET_MESSAGE.to_string()));
                ModeratorResponse::Reset { discarded }
            }

            BotCommand::Score { target } => match self.session.score(target) {
                Ok(result) => {
                    log::info!("Scored target {target}: {result}");
                    self.announce(Outbound::Channel(format!("Target {target}. {result}")));
                    ModeratorResponse::Scored(result)
                }
                Err(err) => self.reject(invoker, err),
            },

            BotCommand::AddGuess { value, participant } => {
                let participant = participant.unwrap_or_else(|| invoker.to_string());
                match self.session.add_guess(&participant, value) {
                    Ok(replaced) => {
                        log::info!("{invoker} added guess {value} for {participant}");
                        self.announce(Outbound::Reply {
                            to: invoker.to_string(),
                            text: format!("Added guess {value} for {participant}"),
                        });
                        ModeratorResponse::GuessAdded {
                            participant,
                            value,
                            replaced,
                        }
                    }
                    Err(err) => self.reject(invoker, err),
                }
            }

            BotCommand::Stats => match self.session.stats() {
                Ok(stats) => {
                    self.announce(Outbound::Channel(stats.to_string()));
                    ModeratorResponse::Stats(stats)
                }
                Err(err) => self.reject(invoker, err),
            },
        };

        let _ = response.send(result);
    }

    fn handle_guess(&mut self, participant: &str, raw: &str) -> ModeratorResponse {
        match self.session.submit_guess(participant, raw) {
            Ok(value) => {
                log::debug!("{participant} guessed {value}");
                ModeratorResponse::GuessAccepted(value)
            }
            Err(err @ GuessError::WrongState { .. }) => {
                log::debug!("Ignoring guess from {participant}: {err}");
                ModeratorResponse::Rejected(err)
            }
            Err(err) => {
                log::debug!("Invalid guess from {participant}: {err}");
                if self.config.report_invalid {
                    self.announce(Outbound::Reply {
                        to: participant.to_string(),
                        text: err.chat_message(),
                    });
                }
                ModeratorResponse::Rejected(err)
            }
        }
    }

    fn handle_finish_stop(&mut self, round: u64) -> ModeratorResponse {
        if round != self.session.round() {
            log::debug!("Stop delay from round {round} elapsed after a reset, ignoring");
        }
        match self.session.finish_stop_for(round) {
            Ok(summary) => {
                log::info!("Holding guesses for scoring: {summary}");
                self.announce(Outbound::Channel(summary.to_string()));
                ModeratorResponse::Stopped(summary)
            }
            Err(err) => ModeratorResponse::Rejected(err),
        }
    }

    /// Post `FinishStop` back to the inbox once the stop delay elapses
    fn schedule_finish_stop(&self, response: oneshot::Sender<ModeratorResponse>) {
        let delay = self.config.stop_delay();
        let sender = self.timer_sender.clone();
        let timer = StopTimer {
            round: self.session.round(),
            response,
        };

        tokio::spawn(async move {
            sleep(delay).await;

            match sender.upgrade() {
                Some(sender) => {
                    if sender
                        .send(ModeratorMessage::FinishStop(timer))
                        .await
                        .is_err()
                    {
                        log::warn!("Moderator closed before the stop delay elapsed");
                    }
                }
                None => log::debug!("Moderator dropped before the stop delay elapsed"),
            }
        });
    }

    fn reject(&self, invoker: &str, err: GuessError) -> ModeratorResponse {
        log::info!("Rejected request from {invoker}: {err}");
        self.announce(Outbound::Reply {
            to: invoker.to_string(),
            text: err.chat_message(),
        });
        ModeratorResponse::Rejected(err)
    }

    /// Chat output is best effort: a full outbox drops the message and the
    /// session carries on.
    fn announce(&self, outbound: Outbound) {
        match self.outbox.try_send(outbound) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(outbound)) => {
                log::warn!("Outbox full, dropping message: {outbound}");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Outbox closed, dropping message");
            }
        }
    }
}
