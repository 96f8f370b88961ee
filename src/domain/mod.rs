//! Domain model: cards, the account ledger, transactions and limits.
//!
//! Nothing in here knows about screens, pointers or timers.

pub mod account;
pub mod card;
pub mod entity;
pub mod instrument;
pub mod limits;
pub mod ports;
pub mod receipt;
pub mod transaction;
