use p2p_shared::types::{
    INSTANCE_TTL_AMOUNT, INSTANCE_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT, PERSISTENT_TTL_THRESHOLD,
};
use p2p_shared::Tier;
use soroban_sdk::{Address, Env, Vec};

use crate::types::{Badge, StorageKey};

// ============================================================================
// INITIALIZATION STORAGE
// ============================================================================

pub fn is_initialized(e: &Env) -> bool {
    e.storage().instance().has(&StorageKey::Initialized)
}

pub fn set_initialized(e: &Env) {
    e.storage().instance().set(&StorageKey::Initialized, &true);
}

pub fn get_admin(e: &Env) -> Option<Address> {
    e.storage().instance().get(&StorageKey::Admin)
}

pub fn set_admin(e: &Env, admin: &Address) {
    e.storage().instance().set(&StorageKey::Admin, admin);
}

pub fn extend_instance_ttl(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_AMOUNT);
}

// ============================================================================
// TOKEN COUNTER STORAGE
// ============================================================================

/// Number of badges minted so far
pub fn get_token_counter(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get(&StorageKey::TokenCounter)
        .unwrap_or(0)
}

pub fn set_token_counter(e: &Env, counter: u64) {
    e.storage()
        .instance()
        .set(&StorageKey::TokenCounter, &counter);
}

// ============================================================================
// BADGE STORAGE
// ============================================================================

pub fn get_badge(e: &Env, token_id: u64) -> Option<Badge> {
    let key = StorageKey::Badge(token_id);
    let badge = e.storage().persistent().get::<_, Badge>(&key);
    if badge.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    badge
}

/// Badges are written exactly once, at mint.
pub fn set_badge(e: &Env, badge: &Badge) {
    let key = StorageKey::Badge(badge.token_id);
    e.storage().persistent().set(&key, badge);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// OWNER INDEX STORAGE
// ============================================================================

pub fn get_owner_tier_token(e: &Env, owner: &Address, tier: Tier) -> Option<u64> {
    let key = StorageKey::OwnerTier(owner.clone(), tier);
    let token = e.storage().persistent().get::<_, u64>(&key);
    if token.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    token
}

pub fn set_owner_tier_token(e: &Env, owner: &Address, tier: Tier, token_id: u64) {
    let key = StorageKey::OwnerTier(owner.clone(), tier);
    e.storage().persistent().set(&key, &token_id);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

pub fn get_owner_badges(e: &Env, owner: &Address) -> Vec<u64> {
    let key = StorageKey::OwnerBadges(owner.clone());
    let badges = e
        .storage()
        .persistent()
        .get::<_, Vec<u64>>(&key)
        .unwrap_or(Vec::new(e));
    if !badges.is_empty() {
        e.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    badges
}

pub fn add_owner_badge(e: &Env, owner: &Address, token_id: u64) {
    let key = StorageKey::OwnerBadges(owner.clone());
    let mut badges = get_owner_badges(e, owner);
    badges.push_back(token_id);
    e.storage().persistent().set(&key, &badges);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}

// ============================================================================
// HIGHEST TIER STORAGE
// ============================================================================

pub fn get_highest_tier(e: &Env, owner: &Address) -> Tier {
    let key = StorageKey::HighestTier(owner.clone());
    let tier = e.storage().persistent().get::<_, Tier>(&key);
    match tier {
        Some(tier) => {
            e.storage()
                .persistent()
                .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
            tier
        }
        None => Tier::None,
    }
}

/// Raise the owner's highest tier. Lower or equal tiers leave it untouched.
pub fn raise_highest_tier(e: &Env, owner: &Address, tier: Tier) {
    if tier <= get_highest_tier(e, owner) {
        return;
    }
    let key = StorageKey::HighestTier(owner.clone());
    e.storage().persistent().set(&key, &tier);
    e.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
}
