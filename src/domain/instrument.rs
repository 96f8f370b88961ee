use super::card::Card;
use super::entity::Entity;
use super::ports::{Clock, IdGenerator};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Note denominations the machine dispenses, largest first.
pub const DENOMINATIONS: [u32; 6] = [100, 50, 20, 10, 5, 1];

pub const SERIAL_LEN: usize = 10;

/// Currency with a fixed exchange-rate stub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    #[serde(default = "unit_rate")]
    pub exchange_rate: Decimal,
}

fn unit_rate() -> Decimal {
    Decimal::ONE
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            code: "USD".to_string(),
            name: "US Dollar".to_string(),
            symbol: "$".to_string(),
            exchange_rate: Decimal::ONE,
        }
    }
}

impl Currency {
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }

    /// Converts at the fixed rate. No real conversion is attempted.
    pub fn convert(&self, amount: Decimal) -> Decimal {
        amount * self.exchange_rate
    }

    /// Ignores non-positive rates.
    pub fn set_exchange_rate(&mut self, rate: Decimal) {
        if rate > Decimal::ZERO {
            self.exchange_rate = rate;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyNote {
    #[serde(flatten)]
    pub entity: Entity,
    pub denomination: u32,
    pub currency: String,
    pub serial_number: String,
}

/// The financial instruments the machine handles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstrumentKind {
    Card(Card),
    CurrencyNote(CurrencyNote),
}

impl InstrumentKind {
    pub fn entity(&self) -> &Entity {
        match self {
            InstrumentKind::Card(card) => card.entity(),
            InstrumentKind::CurrencyNote(note) => &note.entity,
        }
    }

    pub fn currency(&self) -> &str {
        match self {
            InstrumentKind::Card(card) => card.currency(),
            InstrumentKind::CurrencyNote(note) => &note.currency,
        }
    }

    /// Face value. Cards carry no value of their own.
    pub fn face_value(&self) -> Decimal {
        match self {
            InstrumentKind::Card(_) => Decimal::ZERO,
            InstrumentKind::CurrencyNote(note) => Decimal::from(note.denomination),
        }
    }
}

/// Breaks a whole amount into notes, greedily from the largest denomination.
///
/// Fractional amounts are truncated; the machine only pays out whole units.
pub fn dispense(
    amount: Decimal,
    currency: &str,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
) -> Vec<CurrencyNote> {
    let mut remaining = amount.trunc().to_u64().unwrap_or(0);
    let mut notes = Vec::new();
    for denomination in DENOMINATIONS {
        let value = u64::from(denomination);
        while remaining >= value {
            remaining -= value;
            notes.push(CurrencyNote {
                entity: Entity::new(ids, clock),
                denomination,
                currency: currency.to_string(),
                serial_number: ids.code(SERIAL_LEN),
            });
        }
    }
    notes
}
