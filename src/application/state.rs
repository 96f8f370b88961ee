//! Session states, logical actions and the button-label contract.

use super::input::{ButtonSlot, Key, OptionBox};
use crate::error::GuardViolation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum PIN length accepted by the keypad.
pub const PIN_CAPACITY: usize = 4;
/// Maximum number of amount digits accepted by the keypad.
pub const AMOUNT_CAPACITY: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Welcome,
    PinEntry,
    TransactionType,
    AmountEntry,
    ReceiptChoice,
    Processing,
    ThankYou,
}

impl SessionState {
    pub const ALL: [SessionState; 7] = [
        SessionState::Welcome,
        SessionState::PinEntry,
        SessionState::TransactionType,
        SessionState::AmountEntry,
        SessionState::ReceiptChoice,
        SessionState::Processing,
        SessionState::ThankYou,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Welcome => "welcome",
            SessionState::PinEntry => "pinEntry",
            SessionState::TransactionType => "transactionType",
            SessionState::AmountEntry => "amountEntry",
            SessionState::ReceiptChoice => "receiptChoice",
            SessionState::Processing => "processing",
            SessionState::ThankYou => "thankYou",
        }
    }

    /// Side-button labels for this state. Blank slots are empty strings.
    pub fn labels(&self) -> [&'static str; 3] {
        match self {
            SessionState::Welcome => ["Insert Card", "Help", "Cancel"],
            SessionState::PinEntry => ["Enter", "Clear", "Cancel"],
            SessionState::TransactionType => ["Deposit", "Withdraw", "Cancel"],
            SessionState::AmountEntry => ["OK", "Clear", "Cancel"],
            SessionState::ReceiptChoice => ["Yes", "No", "Cancel"],
            SessionState::Processing => ["", "", "Cancel"],
            SessionState::ThankYou => ["OK", "", "Cancel"],
        }
    }

    /// How many characters the input buffer holds in this state.
    pub fn input_capacity(&self) -> usize {
        match self {
            SessionState::PinEntry => PIN_CAPACITY,
            SessionState::AmountEntry => AMOUNT_CAPACITY,
            _ => 0,
        }
    }

    pub fn shows_keypad(&self) -> bool {
        self.input_capacity() > 0
    }

    /// Maps a side-button press to the action it stands for in this state.
    pub fn button_action(&self, slot: ButtonSlot) -> Option<Action> {
        use Action::*;
        let actions: [Option<Action>; 3] = match self {
            SessionState::Welcome => [Some(Confirm), Some(Help), Some(Cancel)],
            SessionState::PinEntry | SessionState::AmountEntry => {
                [Some(Confirm), Some(Clear), Some(Cancel)]
            }
            SessionState::TransactionType => {
                [Some(ChooseDeposit), Some(ChooseWithdraw), Some(Cancel)]
            }
            SessionState::ReceiptChoice => [Some(ReceiptYes), Some(ReceiptNo), Some(Cancel)],
            SessionState::Processing => [None, None, Some(Cancel)],
            SessionState::ThankYou => [Some(Confirm), None, Some(Cancel)],
        };
        actions[slot.index()]
    }

    /// Maps any resolved key to a logical action for this state.
    pub fn action_for(&self, key: Key) -> Option<Action> {
        match key {
            Key::Digit(d) => Some(Action::Digit(d)),
            Key::Backspace => Some(Action::Backspace),
            Key::Button(slot) => self.button_action(slot),
            Key::Option(OptionBox::Deposit) => Some(Action::ChooseDeposit),
            Key::Option(OptionBox::Withdraw) => Some(Action::ChooseWithdraw),
            Key::Option(OptionBox::ReceiptYes) => Some(Action::ReceiptYes),
            Key::Option(OptionBox::ReceiptNo) => Some(Action::ReceiptNo),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A logical input, independent of where on screen it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Digit(u8),
    Backspace,
    Confirm,
    Clear,
    Cancel,
    Help,
    ChooseDeposit,
    ChooseWithdraw,
    ReceiptYes,
    ReceiptNo,
}

/// Message shown to the visitor until the next input.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Rejected(GuardViolation),
    Help,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Rejected(violation) => write!(f, "{violation}"),
            Notice::Help => f.write_str(
                "Insert your card, press Insert Card, then enter your PIN on the keypad",
            ),
        }
    }
}
