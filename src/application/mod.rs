//! Application layer: the session state machine and everything it drives.
//!
//! `SessionController` is the single entry point. It owns the timer
//! scheduler, the input router and the bound card/account, and pushes a
//! `ScreenView` to the injected renderer after every mutation.

pub mod controller;
pub mod input;
pub mod layout;
pub mod scheduler;
pub mod state;
pub mod view;
