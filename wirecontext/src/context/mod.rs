//! The context container.
//!
//! This module provides:
//! - Context, a JSON-marshallable key/value map with cancellation
//! - ContextConfig for constructing contexts from a parent signal

mod config;
mod container;

pub use config::ContextConfig;
pub use container::Context;
