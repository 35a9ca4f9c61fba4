//! Application lifecycle
//!
//! `lifetime` builds and tears down the shared components; `modes` holds the
//! entry points `main` dispatches to.

pub mod lifetime;
pub mod modes;
