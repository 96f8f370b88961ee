use super::ports::{Clock, IdGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and creation time shared by every domain record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(ids: &mut dyn IdGenerator, clock: &dyn Clock) -> Self {
        Self {
            id: ids.entity_id(),
            created_at: clock.now(),
        }
    }
}
