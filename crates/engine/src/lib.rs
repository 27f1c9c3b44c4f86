//! # TaaS Engine
//!
//! Command handlers behind the `taas` CLI. Handlers are plain async functions
//! over a [`CommandContext`], which carries the service API, the terminal and
//! the prompter, so the same code runs against the real services and against
//! test fakes.
//!
//! ## Modules
//!
//! - **`commands`**: one module per command group
//! - **`tail`**: the reconnecting log tail and its restart ceiling
//! - **`context`** / **`error`**: the handler environment and failure type

pub mod commands;
pub mod context;
pub mod error;
pub mod tail;

#[cfg(test)]
mod testing;

pub use context::CommandContext;
pub use error::CommandError;
pub use tail::{MAX_STREAM_RESTARTS, RestartCounter, tail};
