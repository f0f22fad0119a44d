//! Exchange Migration Orchestrator
//!
//! Walks a user through the dependent sequence of transactions that moves
//! their funds from one token to the other: cancel resting orders, create
//! a delegate account, grant a spending allowance, swap the balance.
//!
//! # Architecture
//!
//! - **plan**: pure computation of the remaining operations from on-chain
//!   snapshots
//! - **engine**: executes a plan strictly in order, streaming every
//!   transaction status update as a [`MigrationState`]
//! - **session**: per-attempt lifecycle - planning stream, single-run
//!   gating, explicit restart after a fiasco
//! - **progress**: translates state transitions into events for logging
//!   and display

pub mod engine;
pub mod plan;
pub mod progress;
pub mod session;
pub mod types;


pub use engine::{MigrationEngine, MigrationStateStream};
pub use plan::{build_plan, MigrationSnapshot, SnapshotRequest};
pub use session::{MigrationRun, MigrationSession};
pub use types::*;
