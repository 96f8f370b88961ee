use super::entity::Entity;
use super::ports::{Clock, IdGenerator};
use super::transaction::{REFERENCE_LEN, Transaction, TransactionKind};
use crate::error::{AtmError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{AddAssign, SubAssign};

/// Represents a monetary value held by an account.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific rules
/// and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for transactions.
///
/// Ensures that transaction amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AtmError::LedgerError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.round_dp(2))
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// The account bound to the inserted card, with its ledger.
///
/// The balance never goes below zero and only changes through `deposit` and
/// `withdraw`, each of which appends one completed transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    #[serde(flatten)]
    pub entity: Entity,
    pub owner_name: String,
    pub currency: String,
    balance: Balance,
    #[serde(skip)]
    pin: Option<String>,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn open(
        entity: Entity,
        owner_name: impl Into<String>,
        currency: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Self> {
        if initial_balance < Decimal::ZERO {
            return Err(AtmError::LedgerError(
                "Initial balance cannot be negative".to_string(),
            ));
        }
        Ok(Self {
            entity,
            owner_name: owner_name.into(),
            currency: currency.into(),
            balance: Balance::new(initial_balance),
            pin: None,
            transactions: Vec::new(),
        })
    }

    /// Sets the PIN if it is exactly four ASCII digits.
    pub fn set_pin(&mut self, pin: &str) -> bool {
        if is_pin(pin) {
            self.pin = Some(pin.to_string());
            true
        } else {
            false
        }
    }

    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin.as_deref() == Some(pin)
    }

    /// Deposits funds and records a completed deposit.
    pub fn deposit(
        &mut self,
        amount: Decimal,
        ids: &mut dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<&Transaction> {
        let amount = Amount::new(amount)?;
        self.balance += Balance::from(amount);
        Ok(self.record(TransactionKind::Deposit, amount, ids, clock))
    }

    /// Withdraws funds if sufficient and records a completed withdrawal.
    pub fn withdraw(
        &mut self,
        amount: Decimal,
        ids: &mut dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<&Transaction> {
        let amount = Amount::new(amount)?;
        if Balance::from(amount) > self.balance {
            return Err(AtmError::LedgerError("Insufficient funds".to_string()));
        }
        self.balance -= Balance::from(amount);
        Ok(self.record(TransactionKind::Withdrawal, amount, ids, clock))
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn history(&self) -> &[Transaction] {
        &self.transactions
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        amount: Amount,
        ids: &mut dyn IdGenerator,
        clock: &dyn Clock,
    ) -> &Transaction {
        let entity = Entity::new(ids, clock);
        let reference = ids.code(REFERENCE_LEN);
        let mut tx = Transaction::new(entity, kind, amount, self.entity.id, reference);
        tx.complete();
        self.transactions.push(tx);
        &self.transactions[self.transactions.len() - 1]
    }
}

pub(crate) fn is_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionStatus;
    use crate::infrastructure::generators::{FixedClock, SequentialIdGenerator};
    use rust_decimal_macros::dec;

    fn account(balance: Decimal) -> (Account, SequentialIdGenerator, FixedClock) {
        let mut ids = SequentialIdGenerator::new();
        let clock = FixedClock::default();
        let entity = Entity::new(&mut ids, &clock);
        let account = Account::open(entity, "JOHN DOE", "USD", balance).unwrap();
        (account, ids, clock)
    }

    #[test]
    fn test_balance_arithmetic() {
        let mut balance = Balance::new(dec!(10.0));
        balance += Balance::from(Amount::new(dec!(5.0)).unwrap());
        assert_eq!(balance, Balance::new(dec!(15.0)));
        balance -= Balance::new(dec!(2.5));
        assert_eq!(balance, Balance::new(dec!(12.5)));
        assert_eq!(balance.to_string(), "12.50");
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(AtmError::LedgerError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(AtmError::LedgerError(_))
        ));
    }

    #[test]
    fn test_open_rejects_negative_balance() {
        let mut ids = SequentialIdGenerator::new();
        let entity = Entity::new(&mut ids, &FixedClock::default());
        assert!(Account::open(entity, "JOHN DOE", "USD", dec!(-1)).is_err());
    }

    #[test]
    fn test_account_deposit() {
        let (mut account, mut ids, clock) = account(dec!(2500));
        let tx = account.deposit(dec!(500), &mut ids, &clock).unwrap();
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.reference.len(), REFERENCE_LEN);
        assert_eq!(account.balance(), Balance::new(dec!(3000)));
        assert_eq!(account.history().len(), 1);
        assert_eq!(account.history()[0].account_id, account.entity.id);
    }

    #[test]
    fn test_account_deposit_rejects_non_positive() {
        let (mut account, mut ids, clock) = account(dec!(100));
        assert!(account.deposit(dec!(0), &mut ids, &clock).is_err());
        assert!(account.deposit(dec!(-5), &mut ids, &clock).is_err());
        assert_eq!(account.balance(), Balance::new(dec!(100)));
        assert!(account.history().is_empty());
    }

    #[test]
    fn test_account_withdraw_success() {
        let (mut account, mut ids, clock) = account(dec!(10.0));
        let tx = account.withdraw(dec!(5.0), &mut ids, &clock).unwrap();
        assert_eq!(tx.kind, TransactionKind::Withdrawal);
        assert_eq!(account.balance(), Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_account_withdraw_entire_balance() {
        let (mut account, mut ids, clock) = account(dec!(10.0));
        assert!(account.withdraw(dec!(10.0), &mut ids, &clock).is_ok());
        assert_eq!(account.balance(), Balance::ZERO);
    }

    #[test]
    fn test_account_withdraw_insufficient() {
        let (mut account, mut ids, clock) = account(dec!(10.0));
        let result = account.withdraw(dec!(20.0), &mut ids, &clock);
        assert!(matches!(result, Err(AtmError::LedgerError(_))));
        assert_eq!(account.balance(), Balance::new(dec!(10.0)));
        assert!(account.history().is_empty());
    }

    #[test]
    fn test_pin_must_be_four_digits() {
        let (mut account, _, _) = account(dec!(0));
        assert!(!account.verify_pin("1234"));
        assert!(!account.set_pin("123"));
        assert!(!account.set_pin("12a4"));
        assert!(!account.set_pin("12345"));
        assert!(account.set_pin("4321"));
        assert!(account.verify_pin("4321"));
        assert!(!account.verify_pin("1234"));
    }

    #[test]
    fn test_references_are_unique() {
        let (mut account, mut ids, clock) = account(dec!(1000));
        account.deposit(dec!(1), &mut ids, &clock).unwrap();
        account.deposit(dec!(1), &mut ids, &clock).unwrap();
        let history = account.history();
        assert_ne!(history[0].reference, history[1].reference);
    }
}
