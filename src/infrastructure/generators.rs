use crate::domain::ports::{Clock, IdGenerator};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use uuid::Uuid;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random v4 ids and random alphanumeric codes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn entity_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }

    fn code(&mut self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect()
    }
}

/// Deterministic ids for tests and replays.
///
/// Ids count up from 1. Codes are the same counter in base 36, left-padded
/// with `0`, so they stay unique until the counter outgrows `len`.
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    next: u128,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u128 {
        self.next += 1;
        self.next
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn entity_id(&mut self) -> Uuid {
        Uuid::from_u128(self.bump())
    }

    fn code(&mut self, len: usize) -> String {
        let mut value = self.bump();
        let mut code = vec![b'0'; len];
        for slot in code.iter_mut().rev() {
            *slot = BASE36[(value % 36) as usize];
            value /= 36;
        }
        String::from_utf8_lossy(&code).into_owned()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    /// 2024-01-01 09:00:00 UTC.
    fn default() -> Self {
        Self(DateTime::UNIX_EPOCH + TimeDelta::seconds(1_704_099_600))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
