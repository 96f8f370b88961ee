use super::input::HitRegion;
use super::layout::Screen;
use super::state::{Notice, SessionState};
use crate::domain::account::Balance;
use crate::domain::card::Card;
use crate::domain::instrument::Currency;
use crate::domain::limits::Limits;
use crate::domain::transaction::TransactionKind;
use rust_decimal::Decimal;

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ScreenView<'a> {
    pub state: SessionState,
    pub input: &'a str,
    pub labels: [&'static str; 3],
    pub card: Option<&'a Card>,
    pub balance: Option<Balance>,
    pub notice: Option<&'a Notice>,
    pub selected: Option<TransactionKind>,
    pub receipt_requested: Option<bool>,
    pub last_amount: Option<Decimal>,
    pub limits: &'a Limits,
    pub currency: &'a Currency,
    pub screen: Screen,
}

/// Draws the session screen.
///
/// Called after every state mutation. Returns the hit-regions of the frame it
/// just drew; the controller routes the next pointer event against them.
pub trait Renderer {
    fn render(&mut self, view: &ScreenView<'_>) -> Vec<HitRegion>;
}

pub type RendererBox = Box<dyn Renderer>;
