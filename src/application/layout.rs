//! Geometry of the machine's screen: side buttons, keypad and option boxes.
//!
//! All positions are fractions of the screen size, so the same layout scales
//! with any canvas.

use super::input::{ButtonSlot, HitRegion, Key, OptionBox, Rect};
use super::state::SessionState;
use serde::{Deserialize, Serialize};

pub const BACKSPACE_LABEL: &str = "⌫";

const KEYPAD: [[Option<Key>; 3]; 4] = [
    [Some(Key::Digit(1)), Some(Key::Digit(2)), Some(Key::Digit(3))],
    [Some(Key::Digit(4)), Some(Key::Digit(5)), Some(Key::Digit(6))],
    [Some(Key::Digit(7)), Some(Key::Digit(8)), Some(Key::Digit(9))],
    [None, Some(Key::Digit(0)), Some(Key::Backspace)],
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub width: f64,
    pub height: f64,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: 350.0,
            height: 500.0,
        }
    }
}

/// Hit-regions drawn for `state`: side buttons first, then keypad or options.
pub fn standard_layout(state: SessionState, screen: Screen) -> Vec<HitRegion> {
    let mut regions = side_buttons(state, screen);
    match state {
        SessionState::PinEntry | SessionState::AmountEntry => regions.extend(keypad(screen)),
        SessionState::TransactionType => regions.extend(option_boxes(
            screen,
            [
                ("Deposit", OptionBox::Deposit, 0.35),
                ("Withdraw", OptionBox::Withdraw, 0.45),
            ],
        )),
        SessionState::ReceiptChoice => regions.extend(option_boxes(
            screen,
            [
                ("Yes, print receipt", OptionBox::ReceiptYes, 0.3),
                ("No receipt", OptionBox::ReceiptNo, 0.4),
            ],
        )),
        _ => {}
    }
    regions
}

fn side_buttons(state: SessionState, screen: Screen) -> Vec<HitRegion> {
    let width = screen.width * 0.12;
    let height = screen.height * 0.06;
    let x = screen.width * 0.85;
    let spacing = screen.height * 0.08;
    let labels = state.labels();

    ButtonSlot::ALL
        .iter()
        .map(|slot| {
            let y = screen.height * 0.1 + slot.index() as f64 * spacing;
            HitRegion::new(
                labels[slot.index()],
                Rect::new(x, y, width, height),
                Key::Button(*slot),
            )
        })
        .collect()
}

fn keypad(screen: Screen) -> Vec<HitRegion> {
    let key_width = screen.width * 0.15;
    let key_height = screen.height * 0.08;
    let start_x = screen.width * 0.2;
    let start_y = screen.height * 0.5;
    let spacing = screen.width * 0.05;

    let mut regions = Vec::with_capacity(11);
    for (row, keys) in KEYPAD.iter().enumerate() {
        for (col, key) in keys.iter().enumerate() {
            let Some(key) = *key else { continue };
            let x = start_x + col as f64 * (key_width + spacing);
            let y = start_y + row as f64 * (key_height + spacing * 0.8);
            let label = match key {
                Key::Digit(d) => d.to_string(),
                _ => BACKSPACE_LABEL.to_string(),
            };
            regions.push(HitRegion::new(
                label,
                Rect::new(x, y, key_width, key_height),
                key,
            ));
        }
    }
    regions
}

fn option_boxes(screen: Screen, options: [(&str, OptionBox, f64); 2]) -> Vec<HitRegion> {
    options
        .iter()
        .map(|(label, option, y)| {
            HitRegion::new(
                *label,
                Rect::new(
                    screen.width * 0.25,
                    screen.height * y,
                    screen.width * 0.5,
                    screen.height * 0.08,
                ),
                Key::Option(*option),
            )
        })
        .collect()
}
