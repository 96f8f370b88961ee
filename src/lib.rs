//! A simulated ATM session.
//!
//! A single visitor inserts a card, authenticates with a PIN, deposits or
//! withdraws within configured limits, optionally takes a receipt and gets
//! the card back. The [`application::controller::SessionController`] state
//! machine drives all of it; rendering, receipts, ids and time are injected
//! through the ports in [`domain::ports`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;

pub use application::controller::SessionController;
pub use application::state::{Action, SessionState};
pub use config::AtmConfig;
pub use error::{AtmError, Result};
