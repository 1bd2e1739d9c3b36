//! Core logic: conversation state, trigger policy, and the response
//! orchestration pipeline.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod completion_client;
pub mod conversation;
pub mod responder;
pub mod trigger;

pub use completion_client::CompletionClient;
pub use conversation::{ConversationStore, StoreStats, ThreadId, Transcript};
pub use responder::{Reply, Responder};
pub use trigger::{
    ChannelId, ChannelKind, HeuristicTrigger, MessageMeta, TriggerPolicy,
};
