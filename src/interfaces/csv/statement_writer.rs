use crate::domain::transaction::{Transaction, TransactionKind, TransactionStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct StatementRow<'a> {
    reference: &'a str,
    #[serde(rename = "type")]
    kind: TransactionKind,
    amount: Decimal,
    status: TransactionStatus,
    timestamp: String,
}

/// Writes an account's transaction history as CSV.
///
/// Columns: `reference,type,amount,status,timestamp`.
pub struct StatementWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatementWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_transactions<'a>(
        &mut self,
        transactions: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<()> {
        let mut empty = true;
        for tx in transactions {
            empty = false;
            self.writer.serialize(StatementRow {
                reference: &tx.reference,
                kind: tx.kind,
                amount: tx.amount.value().round_dp(2),
                status: tx.status,
                timestamp: tx.timestamp.to_rfc3339(),
            })?;
        }
        if empty {
            self.writer
                .write_record(["reference", "type", "amount", "status", "timestamp"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
