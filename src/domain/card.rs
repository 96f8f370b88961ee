use super::entity::Entity;
use super::ports::{Clock, IdGenerator};
use crate::error::{CardRule, ValidationError};
use serde::{Deserialize, Serialize};

/// Length of the display identifier printed on an issued card.
pub const CARD_ID_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
    #[default]
    #[serde(other)]
    Other,
}

/// Card issuance input, as submitted by the card form.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CardRequest {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub bank_name: String,
    pub card_type: CardNetwork,
    pub card_color: String,
}

impl CardRequest {
    /// Checks every issuance rule and reports all of the violated ones.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if self.cardholder_name.chars().count() < 3 {
            violations.push(CardRule::OwnerNameTooShort);
        }
        let digits = strip_whitespace(&self.card_number);
        if digits.len() != 16 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            violations.push(CardRule::NumberNotSixteenDigits);
        }
        if !is_mm_yy(&self.expiry_date) {
            violations.push(CardRule::ExpiryNotMmYy);
        }
        if self.cvv.len() != 3 || !self.cvv.bytes().all(|b| b.is_ascii_digit()) {
            violations.push(CardRule::CvvNotThreeDigits);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_mm_yy(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b'/'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

/// An issued card. Immutable once issued.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct Card {
    #[serde(flatten)]
    entity: Entity,
    card_id: String,
    owner_name: String,
    #[serde(skip)]
    number: String,
    expiry: String,
    #[serde(skip)]
    cvv: String,
    #[serde(skip)]
    pin: String,
    bank_name: String,
    network: CardNetwork,
    color: String,
    currency: String,
}

impl Card {
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn card_id(&self) -> &str {
        &self.card_id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn network(&self) -> CardNetwork {
        self.network
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn last_four(&self) -> &str {
        &self.number[self.number.len() - 4..]
    }

    /// Card number grouped in fours, e.g. `4111 1111 1111 1111`.
    pub fn formatted_number(&self) -> String {
        group_in_fours(&self.number)
    }

    /// Card number with everything but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let hidden: String = "*".repeat(self.number.len() - 4);
        group_in_fours(&format!("{hidden}{}", self.last_four()))
    }
}

fn group_in_fours(value: &str) -> String {
    value
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Issues cards from validated requests.
pub struct CardIssuer {
    default_pin: String,
    currency: String,
}

impl CardIssuer {
    pub fn new(default_pin: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            default_pin: default_pin.into(),
            currency: currency.into(),
        }
    }

    pub fn issue(
        &self,
        request: &CardRequest,
        ids: &mut dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Card, ValidationError> {
        request.validate()?;

        Ok(Card {
            entity: Entity::new(ids, clock),
            card_id: ids.code(CARD_ID_LEN),
            owner_name: request.cardholder_name.to_uppercase(),
            number: strip_whitespace(&request.card_number),
            expiry: request.expiry_date.clone(),
            cvv: request.cvv.clone(),
            pin: self.default_pin.clone(),
            bank_name: request.bank_name.clone(),
            network: request.card_type,
            color: request.card_color.clone(),
            currency: self.currency.clone(),
        })
    }
}
