//! Shared helper functions

mod date;

pub use date::*;
