use p2p_shared::types::{
    INSTANCE_TTL_AMOUNT, INSTANCE_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT, PERSISTENT_TTL_THRESHOLD,
};
use soroban_sdk::{Address, BytesN, Env};

use crate::types::{ChainConfig, PendingTransfer, RelayConfig, StorageKey};

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

pub fn get_config(e: &Env) -> Option<RelayConfig> {
    let key = StorageKey::Config;
    let config = e.storage().persistent().get::<_, RelayConfig>(&key);
    if config.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    config
}

pub fn set_config(e: &Env, config: &RelayConfig) {
    let key = StorageKey::Config;
    e.storage().persistent().set(&key, config);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn get_chain(e: &Env, chain_id: u64) -> Option<ChainConfig> {
    let key = StorageKey::Chain(chain_id);
    let chain = e.storage().persistent().get::<_, ChainConfig>(&key);
    if chain.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    chain
}

pub fn set_chain(e: &Env, chain: &ChainConfig) {
    let key = StorageKey::Chain(chain.chain_id);
    e.storage().persistent().set(&key, chain);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// LIQUIDITY STORAGE
// ============================================================================

pub fn get_pool(e: &Env, chain_id: u64) -> i128 {
    e.storage()
        .persistent()
        .get(&StorageKey::Pool(chain_id))
        .unwrap_or(0)
}

pub fn set_pool(e: &Env, chain_id: u64, balance: i128) {
    let key = StorageKey::Pool(chain_id);
    e.storage().persistent().set(&key, &balance);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn get_reserved(e: &Env, token: &Address) -> i128 {
    e.storage()
        .persistent()
        .get(&StorageKey::Reserved(token.clone()))
        .unwrap_or(0)
}

pub fn set_reserved(e: &Env, token: &Address, amount: i128) {
    let key = StorageKey::Reserved(token.clone());
    e.storage().persistent().set(&key, &amount);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// MESSAGE STORAGE
// ============================================================================

pub fn get_pending(e: &Env, message_id: &BytesN<32>) -> Option<PendingTransfer> {
    let key = StorageKey::Pending(message_id.clone());
    let transfer = e.storage().persistent().get::<_, PendingTransfer>(&key);
    if transfer.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    transfer
}

pub fn set_pending(e: &Env, transfer: &PendingTransfer) {
    let key = StorageKey::Pending(transfer.message_id.clone());
    e.storage().persistent().set(&key, transfer);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn is_processed(e: &Env, message_id: &BytesN<32>) -> bool {
    e.storage()
        .persistent()
        .has(&StorageKey::Processed(message_id.clone()))
}

pub fn mark_processed(e: &Env, message_id: &BytesN<32>) {
    let key = StorageKey::Processed(message_id.clone());
    e.storage().persistent().set(&key, &true);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}
