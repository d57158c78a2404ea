//! Bounded per-user trade history.
//!
//! Entries live in fixed storage slots `0..HISTORY_CAPACITY`. The cursor
//! tracks where the next entry goes and how many slots are filled, so adding
//! an entry writes one slot and the cursor, overwriting the oldest entry once
//! the buffer is full.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::storage::{get_history_cursor, get_history_entry, set_history_cursor, set_history_entry};
use crate::types::TradeRecord;

/// Maximum number of trade records kept per user
pub const HISTORY_CAPACITY: u32 = 100;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HistoryCursor {
    /// Slot the next entry is written to
    pub next: u32,
    /// Number of filled slots
    pub len: u32,
}

impl HistoryCursor {
    pub fn empty() -> Self {
        HistoryCursor { next: 0, len: 0 }
    }

    /// Claim the slot for a new entry and move past it.
    pub fn advance(&mut self, capacity: u32) -> u32 {
        let slot = self.next;
        self.next = (self.next + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        slot
    }

    /// Slot of the `index`-th oldest entry.
    pub fn slot_at(&self, index: u32, capacity: u32) -> u32 {
        (self.next + capacity - self.len + index) % capacity
    }
}

pub fn push(e: &Env, user: &Address, record: &TradeRecord) {
    let mut cursor = get_history_cursor(e, user);
    let slot = cursor.advance(HISTORY_CAPACITY);
    set_history_entry(e, user, slot, record);
    set_history_cursor(e, user, &cursor);
}

/// The user's history, oldest first.
pub fn read(e: &Env, user: &Address) -> Vec<TradeRecord> {
    let cursor = get_history_cursor(e, user);
    let mut records = Vec::new(e);
    for index in 0..cursor.len {
        if let Some(record) = get_history_entry(e, user, cursor.slot_at(index, HISTORY_CAPACITY)) {
            records.push_back(record);
        }
    }
    records
}
