//! Static configuration
//!
//! Loaded once at startup and handed to each component's constructor.

mod structs;

pub use structs::*;
