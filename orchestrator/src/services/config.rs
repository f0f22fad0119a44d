//! Orchestrator configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::migration::plan::SnapshotRequest;
use crate::migration::types::{MigrationDirection, Token};

/// A trading pair scanned for the migrating user's resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub base: Token,
    pub quote: Token,
}

/// Settings for one migration session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Which way funds move.
    pub direction: MigrationDirection,
    /// Markets whose resting orders must be cancelled before the swap.
    pub order_markets: Vec<Market>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            direction: MigrationDirection::SaiToDai,
            order_markets: vec![Market {
                base: Token::Weth,
                quote: Token::Sai,
            }],
        }
    }
}

impl MigrationConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid migration config")
    }

    /// What the snapshot reader is asked to read for this session.
    pub fn snapshot_request(&self) -> SnapshotRequest {
        SnapshotRequest {
            direction: self.direction,
            order_markets: self.order_markets.clone(),
        }
    }
}
