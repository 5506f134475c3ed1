//! Tool framework for chatbot-rs
//!
//! A tool is a named async function with a JSON Schema for its input. The
//! model picks tools by name; the registry resolves those names.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
