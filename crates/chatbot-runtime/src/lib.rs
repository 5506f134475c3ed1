//! Agent runtime for chatbot-rs
//!
//! `AgentExecutor` runs the model/tool loop, `ToolAgent` exposes it through
//! the `Agent` trait, and `AgentRuntime` is the factory that wires a provider
//! and a tool registry into agents.

pub mod agents;
pub mod executor;
pub mod runtime;

// Re-export key types
pub use agents::ToolAgent;
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutionReport, ExecutorConfig, ExecutorEventHandler,
    MAX_ITERATIONS_REPLY, TRUNCATED_REPLY,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
