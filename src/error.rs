use crate::domain::transaction::TransactionKind;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AtmError>;

#[derive(Error, Debug)]
pub enum AtmError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Guard(#[from] GuardViolation),
    #[error("Ledger error: {0}")]
    LedgerError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Export error: {0}")]
    ExportError(String),
    #[error("Script error on line {line}: {message}")]
    ScriptError { line: usize, message: String },
}

/// A single card issuance rule that the submitted data broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRule {
    OwnerNameTooShort,
    NumberNotSixteenDigits,
    ExpiryNotMmYy,
    CvvNotThreeDigits,
}

impl fmt::Display for CardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            CardRule::OwnerNameTooShort => "Cardholder name must be at least 3 characters",
            CardRule::NumberNotSixteenDigits => "Card number must be 16 digits",
            CardRule::ExpiryNotMmYy => "Expiry date must be in MM/YY format",
            CardRule::CvvNotThreeDigits => "CVV must be 3 digits",
        };
        f.write_str(message)
    }
}

/// Malformed card issuance data.
///
/// Carries every violated rule, in the order the fields are checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<CardRule>,
}

impl ValidationError {
    pub fn violates(&self, rule: CardRule) -> bool {
        self.violations.contains(&rule)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid card data: ")?;
        for (i, rule) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// A rejected session transition.
///
/// These never escape the controller as failures of the session itself: the
/// controller stays where it was and shows the violation as a notice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuardViolation {
    #[error("Please insert a card first")]
    NoCardInserted,
    #[error("A card is already inserted")]
    CardAlreadyInserted,
    #[error("Invalid PIN. Try again.")]
    PinMismatch,
    #[error("{kind} amount must be between ${min} and ${max}")]
    AmountOutOfBounds {
        kind: TransactionKind,
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },
    #[error("Insufficient funds")]
    InsufficientFunds { requested: Decimal, available: Decimal },
}
