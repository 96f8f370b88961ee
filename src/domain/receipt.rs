use super::account::Balance;
use super::instrument::CurrencyNote;
use super::transaction::Transaction;
use serde::Serialize;

/// Everything a receipt artifact needs about one completed transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptRecord {
    pub receipt_number: String,
    pub location: String,
    pub transaction: Transaction,
    pub previous_balance: Balance,
    pub new_balance: Balance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dispensed: Vec<CurrencyNote>,
}
