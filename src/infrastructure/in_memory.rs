use crate::application::input::HitRegion;
use crate::application::layout::standard_layout;
use crate::application::state::{Notice, SessionState};
use crate::application::view::{Renderer, ScreenView};
use crate::domain::account::Balance;
use crate::domain::ports::ReceiptExporter;
use crate::domain::receipt::ReceiptRecord;
use crate::domain::transaction::TransactionKind;
use crate::error::{AtmError, Result};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps exported receipts in memory.
///
/// Clones share the same list, so a test can hand one clone to the controller
/// and inspect the other.
#[derive(Default, Clone)]
pub struct InMemoryReceiptExporter {
    receipts: Arc<Mutex<Vec<ReceiptRecord>>>,
}

impl InMemoryReceiptExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every receipt exported so far, oldest first.
    pub fn receipts(&self) -> Vec<ReceiptRecord> {
        self.receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReceiptExporter for InMemoryReceiptExporter {
    fn export(&mut self, receipt: &ReceiptRecord) -> Result<()> {
        let mut receipts = self
            .receipts
            .lock()
            .map_err(|e| AtmError::ExportError(e.to_string()))?;
        receipts.push(receipt.clone());
        Ok(())
    }
}

/// One drawn frame, detached from the controller's borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub state: SessionState,
    pub input: String,
    pub labels: [&'static str; 3],
    pub notice: Option<Notice>,
    pub card_id: Option<String>,
    pub balance: Option<Balance>,
    pub selected: Option<TransactionKind>,
    pub receipt_requested: Option<bool>,
    pub last_amount: Option<Decimal>,
    pub regions: Vec<HitRegion>,
}

/// Renderer that draws nothing and records every frame instead.
#[derive(Default, Clone)]
pub struct FrameRecorder {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Renderer for FrameRecorder {
    fn render(&mut self, view: &ScreenView<'_>) -> Vec<HitRegion> {
        let regions = standard_layout(view.state, view.screen);
        let frame = Frame {
            state: view.state,
            input: view.input.to_string(),
            labels: view.labels,
            notice: view.notice.cloned(),
            card_id: view.card.map(|card| card.card_id().to_string()),
            balance: view.balance,
            selected: view.selected,
            receipt_requested: view.receipt_requested,
            last_amount: view.last_amount,
            regions: regions.clone(),
        };
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::layout::Screen;
    use crate::domain::account::Amount;
    use crate::domain::entity::Entity;
    use crate::domain::instrument::Currency;
    use crate::domain::limits::Limits;
    use crate::domain::transaction::Transaction;
    use crate::infrastructure::generators::{FixedClock, SequentialIdGenerator};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn receipt(number: &str) -> ReceiptRecord {
        let mut ids = SequentialIdGenerator::new();
        let entity = Entity::new(&mut ids, &FixedClock::default());
        let transaction = Transaction::new(
            entity,
            TransactionKind::Deposit,
            Amount::new(dec!(500)).unwrap(),
            Uuid::nil(),
            "REF000000001".to_string(),
        );
        ReceiptRecord {
            receipt_number: number.to_string(),
            location: "ATM #001".to_string(),
            transaction,
            previous_balance: Balance::new(dec!(2500)),
            new_balance: Balance::new(dec!(3000)),
            dispensed: Vec::new(),
        }
    }

    #[test]
    fn test_in_memory_exporter_shares_state() {
        let exporter = InMemoryReceiptExporter::new();
        let mut handle = exporter.clone();

        handle.export(&receipt("000000001")).unwrap();
        handle.export(&receipt("000000002")).unwrap();

        let receipts = exporter.receipts();
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[1].receipt_number, "000000002");
    }

    #[test]
    fn test_frame_recorder_returns_layout() {
        let recorder = FrameRecorder::new();
        let mut renderer = recorder.clone();
        let limits = Limits::default();
        let currency = Currency::default();
        let view = ScreenView {
            state: SessionState::PinEntry,
            input: "12",
            labels: SessionState::PinEntry.labels(),
            card: None,
            balance: None,
            notice: None,
            selected: None,
            receipt_requested: None,
            last_amount: None,
            limits: &limits,
            currency: &currency,
            screen: Screen::default(),
        };

        let regions = renderer.render(&view);
        assert_eq!(regions, standard_layout(SessionState::PinEntry, Screen::default()));

        let frame = recorder.last().unwrap();
        assert_eq!(frame.input, "12");
        assert_eq!(frame.labels, ["Enter", "Clear", "Cancel"]);
        assert_eq!(frame.regions.len(), regions.len());
    }
}
