//! Internal modules for the guessing game chat bot.
//!
//! This library provides configuration, logging, the chat transports and
//! the service loop used by the gm_bot binary.

pub mod config;
pub mod console;
pub mod irc;
pub mod logging;
pub mod service;
pub mod transport;
