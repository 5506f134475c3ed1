//! Shared utilities for chatbot-rs
//!
//! Process-level setup used by the binaries: tracing subscriber and `.env`
//! loading.

pub mod env;
pub mod logging;

pub use env::load_dotenv;
pub use logging::init_tracing;
