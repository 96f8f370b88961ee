//! Outer surfaces: card input, statements and the command script.

pub mod csv;
pub mod json;
pub mod script;
