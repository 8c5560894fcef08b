//! Core domain + application logic for the innkeep guesthouse admin console.
//!
//! This crate is framework-agnostic. The management REST API and the terminal
//! live behind ports (traits) implemented in adapter crates.

pub mod alert;
pub mod auth;
pub mod config;
pub mod contact;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod notifier;
pub mod ports;
pub mod seen;
pub mod store;

pub use errors::{Error, Result};
