//! Attempt lifecycle: planning, start gating, explicit restart.
//!
//! One session corresponds to one user and direction. Planning and
//! execution are separate streams: `attempt` computes a plan from live
//! on-chain readings, `start` executes it, and `restart` after a fiasco is
//! nothing more than a fresh `attempt` - completed steps are reflected in
//! the new snapshot, so they are never redone.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::migration::engine::{MigrationEngine, MigrationStateStream};
use crate::migration::plan::build_plan;
use crate::migration::types::{MigrationDirection, MigrationState};
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult};
use crate::services::snapshot::SnapshotReader;
use crate::services::submitter::TransactionSubmitter;

/// Handle for running migrations of one direction for one user session.
pub struct MigrationSession<R, S> {
    reader: Arc<R>,
    engine: MigrationEngine<S>,
    config: MigrationConfig,
    slot: Arc<Mutex<()>>,
}

impl<R, S> MigrationSession<R, S>
where
    R: SnapshotReader + 'static,
    S: TransactionSubmitter + 'static,
{
    pub fn new(reader: Arc<R>, submitter: Arc<S>, config: MigrationConfig) -> Self {
        Self {
            reader,
            engine: MigrationEngine::new(submitter),
            config,
            slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn direction(&self) -> MigrationDirection {
        self.config.direction
    }

    /// Planning phase: emits `Initializing`, then the `Ready` plan computed
    /// from a fresh snapshot, then completes.
    ///
    /// A failed snapshot read is a stream error - it aborts the attempt
    /// before any operation is submitted, so there is no partial progress
    /// to report.
    pub fn attempt(&self) -> BoxStream<'static, Result<MigrationState, MigrationError>> {
        let reader = Arc::clone(&self.reader);
        let request = self.config.snapshot_request();
        let direction = self.config.direction;

        stream::iter([Ok(MigrationState::Initializing)])
            .chain(stream::once(async move {
                let snapshot = reader.read(&request).await?;
                let pending = build_plan(&snapshot, direction);
                info!(
                    "[Migration] Plan ready for {}: {} operation(s)",
                    direction,
                    pending.len()
                );
                Ok(MigrationState::Ready { pending })
            }))
            .boxed()
    }

    /// Re-enter planning against live on-chain state.
    ///
    /// This never replays a stale plan: a failed operation is reconsidered
    /// only if a fresh plan still requires it.
    pub fn restart(&self) -> BoxStream<'static, Result<MigrationState, MigrationError>> {
        info!("[Migration] Restart requested, recomputing plan");
        self.attempt()
    }

    /// Execute a prepared plan.
    ///
    /// Only one run may be live per session; a second `start` while the
    /// previous run's stream is still held fails with `AlreadyRunning`.
    /// Dropping the returned stream cancels the in-flight submission's
    /// subscription and frees the slot.
    pub fn start(&self, ready: MigrationState) -> MigrationResult<MigrationRun> {
        let slot = Arc::clone(&self.slot)
            .try_lock_owned()
            .map_err(|_| MigrationError::AlreadyRunning {
                direction: self.config.direction,
            })?;
        let states = self.engine.start(ready)?;
        Ok(MigrationRun {
            states,
            _slot: slot,
        })
    }
}

/// A live migration attempt. Holds the session's run slot for as long as
/// the consumer keeps the stream.
pub struct MigrationRun {
    states: MigrationStateStream,
    _slot: OwnedMutexGuard<()>,
}

impl Stream for MigrationRun {
    type Item = Result<MigrationState, MigrationError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().states.poll_next_unpin(cx)
    }
}
