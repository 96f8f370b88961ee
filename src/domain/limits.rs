use super::transaction::TransactionKind;
use crate::error::{AtmError, GuardViolation, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Per-transaction amount bounds. Configuration, not session state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_withdrawal: Decimal,
    pub max_withdrawal: Decimal,
    pub min_deposit: Decimal,
    pub max_deposit: Decimal,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_withdrawal: dec!(100),
            max_withdrawal: dec!(5000),
            min_deposit: dec!(50),
            max_deposit: dec!(10000),
        }
    }
}

impl Limits {
    pub fn new(
        min_withdrawal: Decimal,
        max_withdrawal: Decimal,
        min_deposit: Decimal,
        max_deposit: Decimal,
    ) -> Result<Self> {
        let limits = Self {
            min_withdrawal,
            max_withdrawal,
            min_deposit,
            max_deposit,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Every minimum must be positive so that an empty amount never passes.
    pub fn validate(&self) -> Result<()> {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            let (min, max) = self.bounds(kind);
            if min <= Decimal::ZERO {
                return Err(AtmError::ConfigError(format!(
                    "{kind} minimum must be positive, got {min}"
                )));
            }
            if min > max {
                return Err(AtmError::ConfigError(format!(
                    "{kind} minimum {min} exceeds maximum {max}"
                )));
            }
        }
        Ok(())
    }

    pub fn bounds(&self, kind: TransactionKind) -> (Decimal, Decimal) {
        match kind {
            TransactionKind::Deposit => (self.min_deposit, self.max_deposit),
            TransactionKind::Withdrawal => (self.min_withdrawal, self.max_withdrawal),
        }
    }

    pub fn check(
        &self,
        kind: TransactionKind,
        amount: Decimal,
    ) -> std::result::Result<(), GuardViolation> {
        let (min, max) = self.bounds(kind);
        if amount < min || amount > max {
            return Err(GuardViolation::AmountOutOfBounds {
                kind,
                amount,
                min,
                max,
            });
        }
        Ok(())
    }
}
