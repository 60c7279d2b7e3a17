//! Core domain + application logic for the Telegram book bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the Google Books
//! catalog live behind ports (traits) implemented in adapter crates.

pub mod books;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod poller;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
