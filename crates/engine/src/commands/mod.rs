//! Handlers for every `taas` command.
//!
//! Each handler takes the shared [`CommandContext`](crate::CommandContext),
//! talks to the services through it and reports on its terminal.

pub mod bulk;
pub mod config;
pub mod cron;
pub mod diagnostic;
pub mod hooks;
pub mod register;
pub mod run;
pub mod secret;
