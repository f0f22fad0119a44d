//! Transaction submission boundary.

use futures::stream::BoxStream;

use crate::migration::types::{Operation, TxUpdate};

/// Progress reports for one submitted transaction.
pub type TxUpdateStream = BoxStream<'static, TxUpdate>;

/// Submits one blockchain transaction for an operation and reports its
/// progress.
///
/// The returned stream emits `WaitingForApproval` first, then zero or more
/// non-terminal updates, then exactly one terminal update, then completes;
/// nothing is emitted after a terminal status. Local submission failures
/// surface in-band as a `TxStatus::Error` update, not as a stream error -
/// the wallet prompt, propagation and mining all happen behind this trait.
pub trait TransactionSubmitter: Send + Sync {
    fn submit(&self, operation: &Operation) -> TxUpdateStream;
}
