//! Utility Functions and Cross-Cutting Concerns
//!
//! - **inductor**: sequential chaining of dependent asynchronous sub-streams
//! - **serialization**: JSON serialization helpers for the JavaScript boundary

pub mod inductor;
pub mod serialization;

pub use inductor::{inductor, Inductor, StepStream};
