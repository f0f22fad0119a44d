//! Migration engine - executes a plan one operation at a time.
//!
//! The engine is a step function over [`MigrationState`] driven by the
//! [`inductor`] combinator: each completed sub-stream's last state decides
//! what happens next, and every transaction status update the submitter
//! reports is republished as a fresh `InProgress` state.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{info, warn};

use crate::migration::types::{MigrationState, Operation, OperationInProgress};
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::submitter::TransactionSubmitter;
use crate::utils::inductor::{inductor, StepStream};

/// States of one migration attempt, in the order they happen.
pub type MigrationStateStream = BoxStream<'static, Result<MigrationState, MigrationError>>;

/// Drives a computed plan through the submitter, one operation at a time.
pub struct MigrationEngine<S> {
    submitter: Arc<S>,
}

impl<S> MigrationEngine<S>
where
    S: TransactionSubmitter + 'static,
{
    pub fn new(submitter: Arc<S>) -> Self {
        Self { submitter }
    }

    /// Turn a `Ready` plan into a running state stream.
    ///
    /// No operation is submitted until the stream is polled, and no
    /// operation is submitted after the stream is dropped; an empty plan
    /// goes straight to `Done`.
    pub fn start(&self, ready: MigrationState) -> MigrationResult<MigrationStateStream> {
        if !matches!(ready, MigrationState::Ready { .. }) {
            return Err(MigrationError::NotReady {
                status: ready.status_label().to_string(),
            });
        }
        let submitter = Arc::clone(&self.submitter);
        Ok(inductor(ready, move |state| next(&submitter, state)).boxed())
    }
}

/// One transition of the state machine: inspect the last state of the
/// finished stage and produce the stream of states for the next one, or
/// `None` once a terminal state has been reached.
fn next<S>(
    submitter: &Arc<S>,
    state: &MigrationState,
) -> Option<StepStream<MigrationState, MigrationError>>
where
    S: TransactionSubmitter + 'static,
{
    match state {
        MigrationState::Ready { pending } => {
            if pending.is_empty() {
                info!("[Migration] Empty plan, nothing to execute");
                return Some(single(MigrationState::Done { done: Vec::new() }));
            }
            let mut pending = pending.clone();
            let current = pending.remove(0);
            Some(submit_and_track(submitter, current, pending, Vec::new()))
        }

        MigrationState::InProgress {
            pending,
            current,
            done,
        } => {
            if current.succeeded() {
                let mut done = done.clone();
                done.push(current.clone());
                if pending.is_empty() {
                    info!("[Migration] All {} operation(s) confirmed", done.len());
                    return Some(single(MigrationState::Done { done }));
                }
                let mut pending = pending.clone();
                let up_next = pending.remove(0);
                Some(submit_and_track(submitter, up_next, pending, done))
            } else {
                warn!(
                    "[Migration] Operation {} ended with status {:?}",
                    current.operation.kind(),
                    current.tx_status
                );
                Some(single(MigrationState::Fiasco {
                    pending: pending.clone(),
                    current: current.clone(),
                    done: done.clone(),
                }))
            }
        }

        // Terminal states end the chain. Initializing never reaches the
        // engine: plans are seeded as Ready.
        MigrationState::Initializing
        | MigrationState::Done { .. }
        | MigrationState::Fiasco { .. } => None,
    }
}

fn single(state: MigrationState) -> StepStream<MigrationState, MigrationError> {
    stream::iter([Ok(state)]).boxed()
}

/// Submit `operation` and map every status update the submitter reports
/// into an `InProgress` state. Called exactly once per operation per
/// attempt - this is the only place a submission happens.
fn submit_and_track<S>(
    submitter: &Arc<S>,
    operation: Operation,
    pending: Vec<Operation>,
    done: Vec<OperationInProgress>,
) -> StepStream<MigrationState, MigrationError>
where
    S: TransactionSubmitter + 'static,
{
    info!(
        "[Migration] Submitting {} ({} pending, {} done)",
        operation.kind(),
        pending.len(),
        done.len()
    );
    submitter
        .submit(&operation)
        .map(move |update| {
            Ok(MigrationState::InProgress {
                pending: pending.clone(),
                current: OperationInProgress::track(operation.clone(), &update),
                done: done.clone(),
            })
        })
        .boxed()
}
