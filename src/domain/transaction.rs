use super::account::Amount;
use super::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a transaction reference code.
pub const REFERENCE_LEN: usize = 12;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => f.write_str("Deposit"),
            TransactionKind::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

/// A single ledger movement.
///
/// Created `Pending` by the ledger and moved to `Completed` (or `Failed`)
/// exactly once. Transactions are never retried.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    #[serde(flatten)]
    pub entity: Entity,
    pub kind: TransactionKind,
    pub amount: Amount,
    pub account_id: Uuid,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    pub reference: String,
}

impl Transaction {
    pub fn new(
        entity: Entity,
        kind: TransactionKind,
        amount: Amount,
        account_id: Uuid,
        reference: String,
    ) -> Self {
        let timestamp = entity.created_at;
        Self {
            entity,
            kind,
            amount,
            account_id,
            status: TransactionStatus::Pending,
            timestamp,
            reference,
        }
    }

    pub fn complete(&mut self) {
        if self.status == TransactionStatus::Pending {
            self.status = TransactionStatus::Completed;
        }
    }

    pub fn fail(&mut self) {
        if self.status == TransactionStatus::Pending {
            self.status = TransactionStatus::Failed;
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}
