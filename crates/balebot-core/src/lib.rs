//! Core domain + client logic for the Bale Bot messaging API.
//!
//! This crate is transport-agnostic: the HTTP wire layer lives behind the
//! [`transport::Transport`] port, implemented in the `balebot-http` adapter
//! crate. Everything here — polling, normalization, send/forward/copy,
//! dispatch — works against that port, which is what the tests mock.

pub mod bot;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod events;
pub mod keyboard;
pub mod logging;
pub mod send;
pub mod session;
pub mod transport;
pub mod updates;

pub use errors::{Error, Result};
