//! Core abstractions for chatbot-rs
//!
//! Defines the `Agent` trait every conversational front-end talks to, the
//! per-turn `Context` that agents report into, and the shared error type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
