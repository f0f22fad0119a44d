//! Plan computation from on-chain snapshots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::migration::types::{MigrationDirection, OpenOrder, Operation, Wei};
use crate::services::config::Market;

/// What the snapshot reader is asked to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub direction: MigrationDirection,
    /// Markets scanned for the user's resting orders.
    pub order_markets: Vec<Market>,
}

/// On-chain readings a plan is derived from, taken at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSnapshot {
    /// Source-token balance; also the swap amount (no partial migration).
    pub balance: Wei,
    /// Whether the delegate account's allowance for the source token is
    /// already at or above the required threshold.
    pub allowance_granted: bool,
    /// Address of the user's delegate account, if one exists.
    pub delegate_account: Option<String>,
    /// The user's resting orders on the scanned markets.
    #[serde(default)]
    pub open_orders: Vec<OpenOrder>,
}

/// Compute the minimal ordered list of operations still needed to complete
/// a migration.
///
/// The order is the execution order: cancels, then the delegate account,
/// then the allowance, then exactly one swap of the whole balance. A zero
/// balance means there is nothing to migrate and the plan is empty.
pub fn build_plan(snapshot: &MigrationSnapshot, direction: MigrationDirection) -> Vec<Operation> {
    if snapshot.balance.is_zero() {
        return Vec::new();
    }

    let mut plan = Vec::new();

    // Resting orders hold funds on the book; they go first.
    for order in &snapshot.open_orders {
        plan.push(Operation::CancelOrder {
            order_id: order.order_id,
            side: order.side,
            amount: order.amount,
            token: order.token,
        });
    }

    if snapshot.delegate_account.is_none() {
        plan.push(Operation::CreateDelegateAccount);
    }

    if !snapshot.allowance_granted {
        plan.push(Operation::GrantAllowance {
            token: direction.source(),
        });
    }

    // The balance as read at planning time; a balance change between
    // planning and execution is only picked up by the next recompute.
    plan.push(Operation::Swap {
        direction,
        amount: snapshot.balance,
    });

    debug!("[Plan] {} operation(s) for {}", plan.len(), direction);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::types::{OperationKind, OrderSide, Token};

    fn snapshot(balance: u128) -> MigrationSnapshot {
        MigrationSnapshot {
            balance: Wei(balance),
            allowance_granted: false,
            delegate_account: None,
            open_orders: Vec::new(),
        }
    }

    #[test]
    fn zero_balance_yields_empty_plan() {
        let plan = build_plan(&snapshot(0), MigrationDirection::SaiToDai);
        assert!(plan.is_empty());
    }

    #[test]
    fn zero_balance_wins_over_resting_orders() {
        let mut snap = snapshot(0);
        snap.open_orders.push(OpenOrder {
            order_id: 7,
            side: OrderSide::Sell,
            amount: Wei(10),
            token: Token::Weth,
        });
        assert!(build_plan(&snap, MigrationDirection::SaiToDai).is_empty());
    }

    #[test]
    fn fresh_account_gets_the_full_sequence() {
        let plan = build_plan(&snapshot(100), MigrationDirection::SaiToDai);
        assert_eq!(
            plan,
            vec![
                Operation::CreateDelegateAccount,
                Operation::GrantAllowance { token: Token::Sai },
                Operation::Swap {
                    direction: MigrationDirection::SaiToDai,
                    amount: Wei(100),
                },
            ]
        );
    }

    #[test]
    fn prepared_account_gets_just_the_swap() {
        let mut snap = snapshot(100);
        snap.allowance_granted = true;
        snap.delegate_account = Some("0xproxy".to_string());

        let plan = build_plan(&snap, MigrationDirection::SaiToDai);
        assert_eq!(
            plan,
            vec![Operation::Swap {
                direction: MigrationDirection::SaiToDai,
                amount: Wei(100),
            }]
        );
    }

    #[test]
    fn resting_orders_are_cancelled_first() {
        let mut snap = snapshot(100);
        snap.open_orders = vec![
            OpenOrder {
                order_id: 1,
                side: OrderSide::Buy,
                amount: Wei(5),
                token: Token::Weth,
            },
            OpenOrder {
                order_id: 2,
                side: OrderSide::Sell,
                amount: Wei(9),
                token: Token::Weth,
            },
        ];

        let plan = build_plan(&snap, MigrationDirection::SaiToDai);
        let kinds: Vec<OperationKind> = plan.iter().map(Operation::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::CancelOrder,
                OperationKind::CancelOrder,
                OperationKind::CreateDelegateAccount,
                OperationKind::GrantAllowance,
                OperationKind::Swap,
            ]
        );
        assert_eq!(
            plan[0],
            Operation::CancelOrder {
                order_id: 1,
                side: OrderSide::Buy,
                amount: Wei(5),
                token: Token::Weth,
            }
        );
    }

    #[test]
    fn allowance_is_granted_for_the_source_token() {
        let mut snap = snapshot(50);
        snap.delegate_account = Some("0xproxy".to_string());

        let plan = build_plan(&snap, MigrationDirection::DaiToSai);
        assert_eq!(plan[0], Operation::GrantAllowance { token: Token::Dai });
        assert_eq!(
            plan[1],
            Operation::Swap {
                direction: MigrationDirection::DaiToSai,
                amount: Wei(50),
            }
        );
    }
}
