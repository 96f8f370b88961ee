use crate::application::input::HitRegion;
use crate::application::layout::standard_layout;
use crate::application::state::SessionState;
use crate::application::view::{Renderer, ScreenView};
use crate::domain::transaction::TransactionKind;
use log::warn;
use std::io::Write;

const RULE: &str = "+------------------------------------------+";

/// Prints each frame as a block of text.
///
/// Hit-regions come from the standard layout, so pointer input still works
/// against a screen that is only ever printed.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &ScreenView<'_>) -> Vec<HitRegion> {
        let mut text = String::new();
        for line in screen_lines(view) {
            text.push_str(&line);
            text.push('\n');
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!("Failed to draw {} screen: {e}", view.state);
        }
        standard_layout(view.state, view.screen)
    }
}

/// Text content of one frame, top to bottom.
pub fn screen_lines(view: &ScreenView<'_>) -> Vec<String> {
    let mut lines = vec![RULE.to_string()];
    let money = |amount| view.currency.format(amount);

    match view.state {
        SessionState::Welcome => {
            lines.push("Welcome to".to_string());
            lines.push("Fake Bank ATM".to_string());
            lines.push("Please insert your card".to_string());
            if view.card.is_some() {
                lines.push("Click \"Insert Card\" to begin".to_string());
            }
        }
        SessionState::PinEntry => {
            lines.push("Enter your PIN".to_string());
            lines.push(format!("[{:<4}]", "*".repeat(view.input.len())));
        }
        SessionState::TransactionType => {
            lines.push("Select Transaction".to_string());
            if let Some(balance) = view.balance {
                lines.push(format!("Balance: {}", money(balance.value())));
            }
        }
        SessionState::AmountEntry => {
            let kind = view.selected.unwrap_or(TransactionKind::Deposit);
            let (min, max) = view.limits.bounds(kind);
            let input = if view.input.is_empty() { "0" } else { view.input };
            lines.push(format!("Enter {kind} Amount"));
            lines.push(format!("{}{input}", view.currency.symbol));
            lines.push(format!("Min: {} | Max: {}", money(min), money(max)));
        }
        SessionState::ReceiptChoice => {
            lines.push("Print Receipt?".to_string());
            if let (Some(kind), Some(amount)) = (view.selected, view.last_amount) {
                lines.push(format!("{kind}: {}", money(amount)));
            }
        }
        SessionState::Processing => lines.push("Processing...".to_string()),
        SessionState::ThankYou => {
            lines.push("Thank You!".to_string());
            lines.push("Transaction completed successfully".to_string());
            if view.receipt_requested == Some(true) {
                lines.push("Receipt has been downloaded".to_string());
            }
            lines.push("Taking card...".to_string());
        }
    }

    if let Some(card) = view.card {
        lines.push(format!("Card: {} {}", card.masked_number(), card.owner_name()));
    }
    if let Some(notice) = view.notice {
        lines.push(format!("! {notice}"));
    }
    let buttons: Vec<String> = view
        .labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_empty())
        .map(|(index, label)| format!("[{}] {label}", index + 1))
        .collect();
    lines.push(buttons.join("  "));
    lines.push(RULE.to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout::Screen;
    use crate::application::state::Notice;
    use crate::domain::account::Balance;
    use crate::domain::card::{CardIssuer, CardNetwork, CardRequest};
    use crate::domain::instrument::Currency;
    use crate::domain::limits::Limits;
    use crate::error::GuardViolation;
    use crate::infrastructure::generators::{FixedClock, SequentialIdGenerator};
    use rust_decimal_macros::dec;

    fn view<'a>(state: SessionState, limits: &'a Limits, currency: &'a Currency) -> ScreenView<'a> {
        ScreenView {
            state,
            input: "",
            labels: state.labels(),
            card: None,
            balance: None,
            notice: None,
            selected: None,
            receipt_requested: None,
            last_amount: None,
            limits,
            currency,
            screen: Screen::default(),
        }
    }

    #[test]
    fn test_pin_is_masked() {
        let (limits, currency) = (Limits::default(), Currency::default());
        let mut view = view(SessionState::PinEntry, &limits, &currency);
        view.input = "123";
        let lines = screen_lines(&view);
        assert!(lines.contains(&"[*** ]".to_string()));
        assert!(!lines.iter().any(|l| l.contains("123")));
    }

    #[test]
    fn test_amount_entry_shows_limits() {
        let (limits, currency) = (Limits::default(), Currency::default());
        let mut view = view(SessionState::AmountEntry, &limits, &currency);
        view.selected = Some(TransactionKind::Withdrawal);
        let lines = screen_lines(&view);
        assert!(lines.contains(&"Enter Withdrawal Amount".to_string()));
        assert!(lines.contains(&"$0".to_string()));
        assert!(lines.contains(&"Min: $100.00 | Max: $5000.00".to_string()));
    }

    #[test]
    fn test_welcome_hint_needs_inserted_card() {
        let hint = "Click \"Insert Card\" to begin".to_string();
        let (limits, currency) = (Limits::default(), Currency::default());
        let request = CardRequest {
            cardholder_name: "John Doe".to_string(),
            card_number: "4111 1111 1111 1111".to_string(),
            expiry_date: "12/29".to_string(),
            cvv: "123".to_string(),
            card_type: CardNetwork::Visa,
            ..Default::default()
        };
        let card = CardIssuer::new("1234", "USD")
            .issue(&request, &mut SequentialIdGenerator::new(), &FixedClock::default())
            .unwrap();

        let mut view = view(SessionState::Welcome, &limits, &currency);
        assert!(!screen_lines(&view).contains(&hint));

        view.card = Some(&card);
        let lines = screen_lines(&view);
        assert!(lines.contains(&"Please insert your card".to_string()));
        assert!(lines.contains(&hint));
    }

    #[test]
    fn test_blank_buttons_are_not_printed() {
        let (limits, currency) = (Limits::default(), Currency::default());
        let lines = screen_lines(&view(SessionState::Processing, &limits, &currency));
        assert!(lines.contains(&"[3] Cancel".to_string()));
    }

    #[test]
    fn test_render_writes_and_returns_layout() {
        let (limits, currency) = (Limits::default(), Currency::default());
        let notice = Notice::Rejected(GuardViolation::PinMismatch);
        let mut view = view(SessionState::TransactionType, &limits, &currency);
        view.balance = Some(Balance::new(dec!(2500)));
        view.notice = Some(&notice);

        let mut renderer = TerminalRenderer::new(Vec::new());
        let regions = renderer.render(&view);
        let out = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(out.contains("Balance: $2500.00"));
        assert!(out.contains("! Invalid PIN. Try again."));
        assert_eq!(regions, standard_layout(SessionState::TransactionType, Screen::default()));
    }
}
