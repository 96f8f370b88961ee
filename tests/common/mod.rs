#![allow(dead_code)]

use atm_sim::application::controller::SessionController;
use atm_sim::application::state::Action;
use atm_sim::config::AtmConfig;
use atm_sim::domain::card::{CardNetwork, CardRequest};
use atm_sim::infrastructure::generators::{FixedClock, SequentialIdGenerator};
use atm_sim::infrastructure::in_memory::{FrameRecorder, InMemoryReceiptExporter};

pub struct TestAtm {
    pub controller: SessionController,
    pub frames: FrameRecorder,
    pub receipts: InMemoryReceiptExporter,
}

pub fn atm() -> TestAtm {
    atm_with(AtmConfig::default())
}

pub fn atm_with(config: AtmConfig) -> TestAtm {
    let frames = FrameRecorder::new();
    let receipts = InMemoryReceiptExporter::new();
    let controller = SessionController::new(
        config,
        Box::new(frames.clone()),
        Box::new(receipts.clone()),
        Box::new(SequentialIdGenerator::new()),
        Box::new(FixedClock::default()),
    )
    .unwrap();
    TestAtm {
        controller,
        frames,
        receipts,
    }
}

pub fn card_request() -> CardRequest {
    CardRequest {
        cardholder_name: "John Doe".to_string(),
        card_number: "4111 1111 1111 1111".to_string(),
        expiry_date: "12/29".to_string(),
        cvv: "123".to_string(),
        bank_name: "Fake Bank".to_string(),
        card_type: CardNetwork::Visa,
        card_color: "gradient-blue".to_string(),
    }
}

pub fn insert_card(controller: &mut SessionController) {
    let card = controller.issue_card(&card_request()).unwrap();
    controller.insert_card(card).unwrap();
}

pub fn type_digits(controller: &mut SessionController, digits: &str) {
    for d in digits.bytes() {
        let _ = controller.apply(Action::Digit(d - b'0'));
    }
}

/// Card inserted and PIN accepted.
pub fn authenticate(controller: &mut SessionController) {
    insert_card(controller);
    controller.apply(Action::Confirm).unwrap();
    type_digits(controller, "1234");
    controller.apply(Action::Confirm).unwrap();
}

/// Presses the region carrying `label` in the current layout.
pub fn press(controller: &mut SessionController, label: &str) {
    let point = controller
        .router()
        .find(label)
        .unwrap_or_else(|| panic!("no '{label}' on {}", controller.state()))
        .bounds
        .center();
    let _ = controller.handle_pointer(point);
}
