//! Progress reporting for migration attempts.

pub mod events;

pub use events::*;
