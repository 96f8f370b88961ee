use crate::domain::instrument::Currency;
use crate::domain::ports::ReceiptExporter;
use crate::domain::receipt::ReceiptRecord;
use crate::domain::transaction::TransactionStatus;
use crate::error::{AtmError, Result};
use log::debug;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes each receipt as `atm_receipt_<number>.json` into a directory.
pub struct JsonReceiptExporter {
    dir: PathBuf,
}

impl JsonReceiptExporter {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, receipt: &ReceiptRecord) -> PathBuf {
        self.dir
            .join(format!("atm_receipt_{}.json", receipt.receipt_number))
    }
}

impl ReceiptExporter for JsonReceiptExporter {
    fn export(&mut self, receipt: &ReceiptRecord) -> Result<()> {
        let path = self.path_for(receipt);
        let file = File::create(&path)
            .map_err(|e| AtmError::ExportError(format!("{}: {e}", path.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(file), receipt)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

const SEPARATOR: &str = "--------------------------------";

/// Writes each receipt as a printable `atm_receipt_<number>.txt`.
pub struct TextReceiptExporter {
    dir: PathBuf,
    currency: Currency,
}

impl TextReceiptExporter {
    /// Creates the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>, currency: Currency) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, currency })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, receipt: &ReceiptRecord) -> PathBuf {
        self.dir
            .join(format!("atm_receipt_{}.txt", receipt.receipt_number))
    }
}

impl ReceiptExporter for TextReceiptExporter {
    fn export(&mut self, receipt: &ReceiptRecord) -> Result<()> {
        let path = self.path_for(receipt);
        fs::write(&path, receipt_text(receipt, &self.currency))
            .map_err(|e| AtmError::ExportError(format!("{}: {e}", path.display())))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Plain-text receipt body, one field per line.
pub fn receipt_text(receipt: &ReceiptRecord, currency: &Currency) -> String {
    let tx = &receipt.transaction;
    let money = |amount| currency.format(amount);
    let status = match tx.status {
        TransactionStatus::Pending => "PENDING",
        TransactionStatus::Completed => "COMPLETED",
        TransactionStatus::Failed => "FAILED",
    };

    let mut lines = vec![
        "=== ATM TRANSACTION RECEIPT ===".to_string(),
        format!("Receipt No: {}", receipt.receipt_number),
        format!("Date: {}", tx.timestamp.format("%Y-%m-%d")),
        format!("Time: {}", tx.timestamp.format("%H:%M:%S")),
        format!("ATM Location: {}", receipt.location),
        SEPARATOR.to_string(),
        format!("Transaction: {}", tx.kind.to_string().to_uppercase()),
        format!("Reference: {}", tx.reference),
        format!("Amount: {}", money(tx.amount.value())),
        format!("Previous Balance: {}", money(receipt.previous_balance.value())),
        format!("New Balance: {}", money(receipt.new_balance.value())),
    ];
    if !receipt.dispensed.is_empty() {
        lines.push("Notes dispensed:".to_string());
        lines.extend(receipt.dispensed.iter().map(|note| {
            format!("  {}{:<4} {}", currency.symbol, note.denomination, note.serial_number)
        }));
    }
    lines.push(SEPARATOR.to_string());
    lines.push(format!("Status: {status}"));
    lines.push("Thank you for banking with us!".to_string());
    lines.push("================================".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{Account, Balance};
    use crate::domain::entity::Entity;
    use crate::domain::instrument::dispense;
    use crate::infrastructure::generators::{FixedClock, SequentialIdGenerator};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_export_writes_named_json_file() {
        let dir = tempdir().unwrap();
        let mut exporter = JsonReceiptExporter::new(dir.path().join("receipts")).unwrap();

        let mut ids = SequentialIdGenerator::new();
        let clock = FixedClock::default();
        let entity = Entity::new(&mut ids, &clock);
        let mut account = Account::open(entity, "JOHN DOE", "USD", dec!(2500)).unwrap();
        let transaction = account.deposit(dec!(500), &mut ids, &clock).unwrap().clone();
        let receipt = ReceiptRecord {
            receipt_number: "000000042".to_string(),
            location: "ATM #001".to_string(),
            transaction,
            previous_balance: Balance::new(dec!(2500)),
            new_balance: account.balance(),
            dispensed: Vec::new(),
        };

        exporter.export(&receipt).unwrap();

        let path = exporter.dir().join("atm_receipt_000000042.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["location"], "ATM #001");
        assert_eq!(json["transaction"]["kind"], "deposit");
        assert_eq!(json["transaction"]["status"], "completed");
        assert!(json.get("dispensed").is_none());
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let mut exporter = JsonReceiptExporter::new(dir.path()).unwrap();
        exporter.dir = dir.path().join("gone");

        let mut ids = SequentialIdGenerator::new();
        let clock = FixedClock::default();
        let entity = Entity::new(&mut ids, &clock);
        let mut account = Account::open(entity, "JOHN DOE", "USD", dec!(100)).unwrap();
        let transaction = account.withdraw(dec!(100), &mut ids, &clock).unwrap().clone();
        let receipt = ReceiptRecord {
            receipt_number: "1".to_string(),
            location: String::new(),
            transaction,
            previous_balance: Balance::new(dec!(100)),
            new_balance: Balance::ZERO,
            dispensed: Vec::new(),
        };

        assert!(matches!(
            exporter.export(&receipt),
            Err(AtmError::ExportError(_))
        ));
    }

    #[test]
    fn test_text_export_lists_receipt_fields() {
        let dir = tempdir().unwrap();
        let mut exporter = TextReceiptExporter::new(dir.path(), Currency::default()).unwrap();

        let mut ids = SequentialIdGenerator::new();
        let clock = FixedClock::default();
        let entity = Entity::new(&mut ids, &clock);
        let mut account = Account::open(entity, "JOHN DOE", "USD", dec!(2500)).unwrap();
        let transaction = account.deposit(dec!(500), &mut ids, &clock).unwrap().clone();
        let reference = transaction.reference.clone();
        let receipt = ReceiptRecord {
            receipt_number: "000000042".to_string(),
            location: "ATM #001".to_string(),
            transaction,
            previous_balance: Balance::new(dec!(2500)),
            new_balance: account.balance(),
            dispensed: Vec::new(),
        };

        exporter.export(&receipt).unwrap();

        let text = fs::read_to_string(exporter.dir().join("atm_receipt_000000042.txt")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== ATM TRANSACTION RECEIPT ===");
        assert!(lines.contains(&"Receipt No: 000000042"));
        assert!(lines.contains(&"Date: 2024-01-01"));
        assert!(lines.contains(&"Time: 09:00:00"));
        assert!(lines.contains(&"ATM Location: ATM #001"));
        assert!(lines.contains(&"Transaction: DEPOSIT"));
        assert!(lines.contains(&format!("Reference: {reference}").as_str()));
        assert!(lines.contains(&"Amount: $500.00"));
        assert!(lines.contains(&"Previous Balance: $2500.00"));
        assert!(lines.contains(&"New Balance: $3000.00"));
        assert!(lines.contains(&"Status: COMPLETED"));
        assert!(!text.contains("Notes dispensed"));
        assert_eq!(lines.last(), Some(&"================================"));
    }

    #[test]
    fn test_text_receipt_lists_dispensed_notes() {
        let mut ids = SequentialIdGenerator::new();
        let clock = FixedClock::default();
        let entity = Entity::new(&mut ids, &clock);
        let mut account = Account::open(entity, "JOHN DOE", "USD", dec!(1000)).unwrap();
        let transaction = account.withdraw(dec!(120), &mut ids, &clock).unwrap().clone();
        let dispensed = dispense(dec!(120), "USD", &mut ids, &clock);
        let serials: Vec<String> = dispensed.iter().map(|n| n.serial_number.clone()).collect();
        let receipt = ReceiptRecord {
            receipt_number: "7".to_string(),
            location: "ATM #001".to_string(),
            transaction,
            previous_balance: Balance::new(dec!(1000)),
            new_balance: account.balance(),
            dispensed,
        };

        let text = receipt_text(&receipt, &Currency::default());

        assert!(text.contains("Transaction: WITHDRAWAL\n"));
        assert!(text.contains("New Balance: $880.00\n"));
        assert!(text.contains(&format!("  $100  {}\n", serials[0])));
        assert!(text.contains(&format!("  $20   {}\n", serials[1])));
    }
}
