//! Moderator actor owning the guessing session.
//!
//! This module implements:
//! - ModeratorActor: Async actor that owns the one `Session` of a bot
//! - ModeratorHandle: Cloneable sender for chat events and commands
//! - The tagged command type and the outbound chat messages
//!
//! ## Architecture
//!
//! The actor runs in its own Tokio task with an mpsc inbox and handles one
//! message at a time. Chat output is pushed to an outbox channel that the
//! chat transport drains.
//!
//! ## Example
//!
//! ```no_run
//! use guess_moderator::{BotCommand, ModeratorActor, ModeratorConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (outbox, mut outbox_rx) = mpsc::channel(32);
//!     let (actor, handle) = ModeratorActor::new(ModeratorConfig::default(), outbox);
//!     tokio::spawn(actor.run());
//!
//!     handle.command("broadcaster", BotCommand::StartGuessing).await.unwrap();
//!     handle.submit_guess("viewer", "42").await.unwrap();
//!
//!     while let Some(message) = outbox_rx.recv().await {
//!         println!("{message}");
//!     }
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{HandleError, ModeratorActor, ModeratorHandle};
pub use config::ModeratorConfig;
pub use messages::{BotCommand, ModeratorMessage, ModeratorResponse, Outbound, StopTimer};
