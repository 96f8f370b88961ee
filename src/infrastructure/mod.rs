//! Adapters for the domain ports: id and time sources, renderers and receipt
//! exporters.

pub mod generators;
pub mod in_memory;
pub mod receipt_file;
pub mod terminal;
