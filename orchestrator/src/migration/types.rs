// Core types for the migration orchestrator - no UI imports belong here
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::utils::serialization::{deserialize_u128_flexible, serialize_u128_as_string};

/// Tokens the migration flow touches. WETH shows up as the base token of
/// the markets scanned for resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    Sai,
    Dai,
    Weth,
}

impl Token {
    pub fn symbol(self) -> &'static str {
        match self {
            Token::Sai => "SAI",
            Token::Dai => "DAI",
            Token::Weth => "WETH",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Which way funds move in this migration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MigrationDirection {
    SaiToDai,
    DaiToSai,
}

impl MigrationDirection {
    /// Token being migrated away from; balances, allowances and the swap
    /// amount are all read against this token.
    pub fn source(self) -> Token {
        match self {
            MigrationDirection::SaiToDai => Token::Sai,
            MigrationDirection::DaiToSai => Token::Dai,
        }
    }

    pub fn target(self) -> Token {
        match self {
            MigrationDirection::SaiToDai => Token::Dai,
            MigrationDirection::DaiToSai => Token::Sai,
        }
    }
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}2{}", self.source(), self.target())
    }
}

/// Token amount in wei.
///
/// Serialized as a decimal string: these values cross into a JavaScript UI
/// where anything past 2^53-1 loses precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_u128_as_string(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_u128_flexible(deserializer).map(Wei)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A resting order of the migrating user, as read from the orderbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: u64,
    pub side: OrderSide,
    pub amount: Wei,
    pub token: Token,
}

/// One planned unit of on-chain work, not yet started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    CancelOrder {
        order_id: u64,
        side: OrderSide,
        amount: Wei,
        token: Token,
    },
    CreateDelegateAccount,
    GrantAllowance {
        token: Token,
    },
    Swap {
        direction: MigrationDirection,
        amount: Wei,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CancelOrder { .. } => OperationKind::CancelOrder,
            Operation::CreateDelegateAccount => OperationKind::CreateDelegateAccount,
            Operation::GrantAllowance { .. } => OperationKind::GrantAllowance,
            Operation::Swap { .. } => OperationKind::Swap,
        }
    }
}

/// Discriminant of [`Operation`], for display and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    CancelOrder,
    CreateDelegateAccount,
    GrantAllowance,
    Swap,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::CancelOrder => "cancelOrder",
            OperationKind::CreateDelegateAccount => "createDelegateAccount",
            OperationKind::GrantAllowance => "grantAllowance",
            OperationKind::Swap => "swap",
        };
        f.write_str(label)
    }
}

/// Status of a submitted transaction as reported by the wallet/network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
    WaitingForApproval,
    WaitingForConfirmation,
    Propagating,
    Success,
    Failure,
    CancelledByUser,
    Error,
}

impl TxStatus {
    /// Terminal statuses end the submitter's update stream; only
    /// [`TxStatus::Success`] counts as succeeded.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TxStatus::Success | TxStatus::Failure | TxStatus::CancelledByUser | TxStatus::Error
        )
    }

    pub fn succeeded(self) -> bool {
        matches!(self, TxStatus::Success)
    }
}

/// One log entry from a mined transaction's receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// One progress report from the transaction submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxUpdate {
    pub status: TxStatus,
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub receipt_logs: Vec<ReceiptLog>,
}

impl TxUpdate {
    pub fn new(status: TxStatus) -> Self {
        Self {
            status,
            tx_hash: None,
            receipt_logs: Vec::new(),
        }
    }

    pub fn with_hash(status: TxStatus, tx_hash: impl Into<String>) -> Self {
        Self {
            status,
            tx_hash: Some(tx_hash.into()),
            receipt_logs: Vec::new(),
        }
    }
}

/// An [`Operation`] that has been submitted, with what we know about its
/// transaction so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInProgress {
    pub operation: Operation,
    pub tx_status: TxStatus,
    pub tx_hash: Option<String>,
}

impl OperationInProgress {
    pub fn track(operation: Operation, update: &TxUpdate) -> Self {
        Self {
            operation,
            tx_status: update.status,
            tx_hash: update.tx_hash.clone(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.tx_status.succeeded()
    }
}

/// Overall state of one migration attempt.
///
/// `pending`, `current` and `done` partition the operations the plan
/// originally contained, in execution order; `done` holds successes only.
/// `current` exists in exactly `InProgress` and `Fiasco` - in `Fiasco` it
/// carries the operation whose transaction did not succeed, so a restart
/// can re-derive a corrected plan without losing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MigrationState {
    Initializing,
    Ready {
        pending: Vec<Operation>,
    },
    InProgress {
        pending: Vec<Operation>,
        current: OperationInProgress,
        done: Vec<OperationInProgress>,
    },
    Done {
        done: Vec<OperationInProgress>,
    },
    Fiasco {
        pending: Vec<Operation>,
        current: OperationInProgress,
        done: Vec<OperationInProgress>,
    },
}

impl MigrationState {
    pub fn status_label(&self) -> &'static str {
        match self {
            MigrationState::Initializing => "initializing",
            MigrationState::Ready { .. } => "ready",
            MigrationState::InProgress { .. } => "inProgress",
            MigrationState::Done { .. } => "done",
            MigrationState::Fiasco { .. } => "fiasco",
        }
    }

    /// `Done` and `Fiasco` end the attempt; everything after is a fresh
    /// plan computation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MigrationState::Done { .. } | MigrationState::Fiasco { .. }
        )
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!TxStatus::WaitingForApproval.is_terminal());
        assert!(!TxStatus::WaitingForConfirmation.is_terminal());
        assert!(!TxStatus::Propagating.is_terminal());
        assert!(TxStatus::Success.is_terminal());
        assert!(TxStatus::Failure.is_terminal());
        assert!(TxStatus::CancelledByUser.is_terminal());
        assert!(TxStatus::Error.is_terminal());

        assert!(TxStatus::Success.succeeded());
        assert!(!TxStatus::Failure.succeeded());
    }

    #[test]
    fn direction_tokens() {
        assert_eq!(MigrationDirection::SaiToDai.source(), Token::Sai);
        assert_eq!(MigrationDirection::SaiToDai.target(), Token::Dai);
        assert_eq!(MigrationDirection::DaiToSai.source(), Token::Dai);
        assert_eq!(MigrationDirection::DaiToSai.target(), Token::Sai);
    }

    #[test]
    fn wei_serializes_as_string() {
        let amount = Wei(340_282_366_920_938_463_463_374_607_431_768_211_455);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"340282366920938463463374607431768211455\"");

        let back: Wei = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
        // Small numeric literals are accepted too.
        let small: Wei = serde_json::from_str("100").unwrap();
        assert_eq!(small, Wei(100));
    }

    #[test]
    fn state_serializes_with_status_tag() {
        let state = MigrationState::Ready {
            pending: vec![Operation::CreateDelegateAccount],
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["pending"][0]["kind"], "createDelegateAccount");
    }
}
