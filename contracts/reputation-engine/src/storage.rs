use p2p_shared::types::{
    INSTANCE_TTL_AMOUNT, INSTANCE_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT, PERSISTENT_TTL_THRESHOLD,
};
use soroban_sdk::{Address, BytesN, Env};

use crate::history::HistoryCursor;
use crate::types::{EngineConfig, StorageKey, TradeRecord, UserReputation};

// ============================================================================
// INITIALIZATION STORAGE
// ============================================================================

pub fn is_initialized(e: &Env) -> bool {
    e.storage().instance().has(&StorageKey::Initialized)
}

pub fn set_initialized(e: &Env) {
    e.storage().instance().set(&StorageKey::Initialized, &true);
}

pub fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_AMOUNT);
}

// ============================================================================
// CONFIG STORAGE
// ============================================================================

pub fn get_config(e: &Env) -> Option<EngineConfig> {
    let key = StorageKey::Config;
    let config = e.storage().persistent().get::<_, EngineConfig>(&key);
    if config.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    config
}

pub fn set_config(e: &Env, config: &EngineConfig) {
    let key = StorageKey::Config;
    e.storage().persistent().set(&key, config);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// REPUTATION STORAGE
// ============================================================================

pub fn get_reputation(e: &Env, user: &Address) -> Option<UserReputation> {
    let key = StorageKey::User(user.clone());
    let reputation = e.storage().persistent().get::<_, UserReputation>(&key);
    if reputation.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    reputation
}

pub fn set_reputation(e: &Env, reputation: &UserReputation) {
    let key = StorageKey::User(reputation.user.clone());
    e.storage().persistent().set(&key, reputation);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// HISTORY STORAGE
// ============================================================================

pub fn get_history_cursor(e: &Env, user: &Address) -> HistoryCursor {
    let key = StorageKey::HistoryCursor(user.clone());
    match e.storage().persistent().get::<_, HistoryCursor>(&key) {
        Some(cursor) => {
            e.storage()
                .persistent()
                .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
            cursor
        }
        None => HistoryCursor::empty(),
    }
}

pub fn set_history_cursor(e: &Env, user: &Address, cursor: &HistoryCursor) {
    let key = StorageKey::HistoryCursor(user.clone());
    e.storage().persistent().set(&key, cursor);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn get_history_entry(e: &Env, user: &Address, slot: u32) -> Option<TradeRecord> {
    let key = StorageKey::HistoryEntry(user.clone(), slot);
    let record = e.storage().persistent().get::<_, TradeRecord>(&key);
    if record.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    record
}

pub fn set_history_entry(e: &Env, user: &Address, slot: u32, record: &TradeRecord) {
    let key = StorageKey::HistoryEntry(user.clone(), slot);
    e.storage().persistent().set(&key, record);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// IDEMPOTENCY STORAGE
// ============================================================================

pub fn is_sync_processed(e: &Env, sync_id: &BytesN<32>) -> bool {
    e.storage()
        .persistent()
        .has(&StorageKey::ProcessedSync(sync_id.clone()))
}

pub fn mark_sync_processed(e: &Env, sync_id: &BytesN<32>) {
    let key = StorageKey::ProcessedSync(sync_id.clone());
    e.storage().persistent().set(&key, &true);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn is_trade_recorded(e: &Env, trade_id: &BytesN<32>) -> bool {
    e.storage()
        .persistent()
        .has(&StorageKey::RecordedTrade(trade_id.clone()))
}

pub fn mark_trade_recorded(e: &Env, trade_id: &BytesN<32>) {
    let key = StorageKey::RecordedTrade(trade_id.clone());
    e.storage().persistent().set(&key, &true);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}
