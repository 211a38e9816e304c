//! Command implementations.
//!
//! Each command returns the text to print; `dispatch` writes it to stdout.

pub mod environment;
pub mod resolve;
pub mod transform;
