//! Machine configuration.
//!
//! Loaded from an optional JSON file; every field has a default so a partial
//! file (or none at all) is fine.

use crate::application::layout::Screen;
use crate::domain::account::is_pin;
use crate::domain::instrument::Currency;
use crate::domain::limits::Limits;
use crate::error::{AtmError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    pub limits: Limits,
    /// Balance of the account opened when a card is inserted.
    pub initial_balance: Decimal,
    /// PIN assigned to every issued card.
    pub default_pin: String,
    pub currency: Currency,
    pub processing_delay_ms: u64,
    pub auto_eject_delay_ms: u64,
    pub screen: Screen,
    pub location: String,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            initial_balance: dec!(2500),
            default_pin: "1234".to_string(),
            currency: Currency::default(),
            processing_delay_ms: 2000,
            auto_eject_delay_ms: 3000,
            screen: Screen::default(),
            location: "ATM #001".to_string(),
        }
    }
}

impl AtmConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        if self.initial_balance < Decimal::ZERO {
            return Err(AtmError::ConfigError(
                "Initial balance cannot be negative".to_string(),
            ));
        }
        if !is_pin(&self.default_pin) {
            return Err(AtmError::ConfigError(
                "Default PIN must be exactly 4 digits".to_string(),
            ));
        }
        if self.screen.width <= 0.0 || self.screen.height <= 0.0 {
            return Err(AtmError::ConfigError(
                "Screen dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn auto_eject_delay(&self) -> Duration {
        Duration::from_millis(self.auto_eject_delay_ms)
    }
}
