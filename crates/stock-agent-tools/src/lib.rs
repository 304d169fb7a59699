//! Tools the stock agents can call
//!
//! A [`Tool`] is a named async function with a JSON Schema for its input. The
//! [`ToolRegistry`] holds the set of tools an agent may use and turns them into
//! definitions for the model.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
