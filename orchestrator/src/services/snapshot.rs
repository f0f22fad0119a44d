//! On-chain state snapshot boundary.

use async_trait::async_trait;

use crate::migration::plan::{MigrationSnapshot, SnapshotRequest};
use crate::services::errors::MigrationResult;

/// Reads the on-chain state the planner works from: source-token balance,
/// delegate account existence, the spending allowance, and the user's
/// resting orders on the requested markets.
///
/// Consulted at initial planning and again on every restart, so a plan is
/// always derived from live readings rather than a stale copy.
#[async_trait]
pub trait SnapshotReader: Send + Sync {
    async fn read(&self, request: &SnapshotRequest) -> MigrationResult<MigrationSnapshot>;
}
