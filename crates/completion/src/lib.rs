//! An abstraction layer for hosted completion services.
//!
//! This crate establishes the contract between the conversation core
//! and whatever service generates replies, so that the core can switch
//! services without modification.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod turn;

pub use error::*;
pub use provider::*;
pub use turn::*;
