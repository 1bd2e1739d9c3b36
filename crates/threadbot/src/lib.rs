//! A conversational assistant for forum threads on a chat platform.
//!
//! The crate includes a terminal harness for exercising the pipeline
//! locally. And you can also use it as a library to wire the assistant
//! into a real gateway connection.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod commands;
pub mod config;
pub mod platform;

pub use config::{BotConfig, ConfigError};

/// Re-exports of [`threadbot_core`] crate.
pub mod core {
    pub use threadbot_core::*;
}
