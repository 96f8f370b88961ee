use super::receipt::ReceiptRecord;
use crate::error::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of identifiers and reference codes.
///
/// Injected so sessions can be replayed deterministically.
pub trait IdGenerator {
    fn entity_id(&mut self) -> Uuid;
    /// Upper-case alphanumeric code of exactly `len` characters.
    fn code(&mut self, len: usize) -> String;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Produces the receipt artifact for a completed transaction.
pub trait ReceiptExporter {
    fn export(&mut self, receipt: &ReceiptRecord) -> Result<()>;
}

pub type IdGeneratorBox = Box<dyn IdGenerator>;
pub type ClockBox = Box<dyn Clock>;
pub type ReceiptExporterBox = Box<dyn ReceiptExporter>;
