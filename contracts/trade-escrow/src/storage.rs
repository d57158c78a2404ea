use p2p_shared::types::{
    INSTANCE_TTL_AMOUNT, INSTANCE_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT, PERSISTENT_TTL_THRESHOLD,
};
use soroban_sdk::{Address, BytesN, Env, Vec};

use crate::types::{Dispute, EscrowConfig, StorageKey, Trade};

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

pub fn is_paused(e: &Env) -> bool {
    e.storage()
        .instance()
        .get(&StorageKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(e: &Env, paused: bool) {
    e.storage().instance().set(&StorageKey::Paused, &paused);
}

// ============================================================================
// CONFIG STORAGE
// ============================================================================

pub fn get_config(e: &Env) -> Option<EscrowConfig> {
    let key = StorageKey::Config;
    let config = e.storage().persistent().get::<_, EscrowConfig>(&key);
    if config.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    config
}

pub fn set_config(e: &Env, config: &EscrowConfig) {
    let key = StorageKey::Config;
    e.storage().persistent().set(&key, config);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn is_token_supported(e: &Env, token: &Address) -> bool {
    let key = StorageKey::SupportedToken(token.clone());
    let supported = e.storage().persistent().get::<_, bool>(&key).unwrap_or(false);
    if supported {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    supported
}

pub fn set_token_supported(e: &Env, token: &Address, supported: bool) {
    let key = StorageKey::SupportedToken(token.clone());
    if supported {
        e.storage().persistent().set(&key, &true);
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    } else {
        e.storage().persistent().remove(&key);
    }
}

// ============================================================================
// TRADE STORAGE
// ============================================================================

pub fn get_trade(e: &Env, trade_id: &BytesN<32>) -> Option<Trade> {
    let key = StorageKey::Trade(trade_id.clone());
    let trade = e.storage().persistent().get::<_, Trade>(&key);
    if trade.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    trade
}

pub fn has_trade(e: &Env, trade_id: &BytesN<32>) -> bool {
    e.storage()
        .persistent()
        .has(&StorageKey::Trade(trade_id.clone()))
}

pub fn set_trade(e: &Env, trade: &Trade) {
    let key = StorageKey::Trade(trade.id.clone());
    e.storage().persistent().set(&key, trade);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

/// Return the buyer's current nonce and advance it
pub fn next_buyer_nonce(e: &Env, buyer: &Address) -> u64 {
    let key = StorageKey::BuyerNonce(buyer.clone());
    let nonce = e.storage().persistent().get::<_, u64>(&key).unwrap_or(0);
    e.storage().persistent().set(&key, &(nonce + 1));
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    nonce
}

pub fn get_buyer_trades(e: &Env, buyer: &Address) -> Vec<BytesN<32>> {
    e.storage()
        .persistent()
        .get(&StorageKey::BuyerTrades(buyer.clone()))
        .unwrap_or(Vec::new(e))
}

pub fn add_buyer_trade(e: &Env, buyer: &Address, trade_id: &BytesN<32>) {
    let key = StorageKey::BuyerTrades(buyer.clone());
    let mut trades = get_buyer_trades(e, buyer);
    trades.push_back(trade_id.clone());
    e.storage().persistent().set(&key, &trades);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn get_seller_trades(e: &Env, seller: &Address) -> Vec<BytesN<32>> {
    e.storage()
        .persistent()
        .get(&StorageKey::SellerTrades(seller.clone()))
        .unwrap_or(Vec::new(e))
}

pub fn add_seller_trade(e: &Env, seller: &Address, trade_id: &BytesN<32>) {
    let key = StorageKey::SellerTrades(seller.clone());
    let mut trades = get_seller_trades(e, seller);
    trades.push_back(trade_id.clone());
    e.storage().persistent().set(&key, &trades);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// DISPUTE STORAGE
// ============================================================================

pub fn get_dispute(e: &Env, trade_id: &BytesN<32>) -> Option<Dispute> {
    let key = StorageKey::Dispute(trade_id.clone());
    let dispute = e.storage().persistent().get::<_, Dispute>(&key);
    if dispute.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    dispute
}

pub fn set_dispute(e: &Env, dispute: &Dispute) {
    let key = StorageKey::Dispute(dispute.trade_id.clone());
    e.storage().persistent().set(&key, dispute);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// COUNTERS
// ============================================================================

pub fn get_trade_count(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get(&StorageKey::TradeCount)
        .unwrap_or(0)
}

pub fn set_trade_count(e: &Env, count: u64) {
    e.storage().instance().set(&StorageKey::TradeCount, &count);
}

pub fn get_fees_collected(e: &Env, token: &Address) -> i128 {
    e.storage()
        .persistent()
        .get(&StorageKey::FeesCollected(token.clone()))
        .unwrap_or(0)
}

pub fn set_fees_collected(e: &Env, token: &Address, total: i128) {
    let key = StorageKey::FeesCollected(token.clone());
    e.storage().persistent().set(&key, &total);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}
