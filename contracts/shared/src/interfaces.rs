//! Cross-contract clients.
//!
//! Each trait mirrors the subset of a peer contract's entry points that other
//! contracts in the workspace call. Arguments and return values must keep the
//! same order and types as the implementing contract.

use soroban_sdk::{contractclient, Address, BytesN, Env};

use crate::types::Tier;

#[contractclient(name = "ReputationClient")]
pub trait ReputationInterface {
    fn register_user(env: Env, caller: Address, user: Address);

    fn record_trade(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        seller: Address,
        buyer: Address,
        amount: i128,
        seller_rating: u32,
        buyer_rating: u32,
    );

    fn record_dispute_resolution(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        winner: Address,
        loser: Address,
    );

    fn sync_cross_chain_reputation(
        env: Env,
        caller: Address,
        user: Address,
        source_chain: u64,
        add_trades: u64,
        add_rating_points: u64,
        add_rating_count: u64,
        sync_id: BytesN<32>,
    );

    /// `(successful_trades, rating_points, rating_count)` for `user`.
    fn get_sync_snapshot(env: Env, user: Address) -> (u64, u64, u64);
}

#[contractclient(name = "BadgeClient")]
pub trait BadgeInterface {
    fn mint_badge(
        env: Env,
        caller: Address,
        to: Address,
        tier: Tier,
        trades_at_mint: u64,
        rating_at_mint: u32,
        source_chain: u64,
    ) -> u64;

    fn user_highest_tier(env: Env, user: Address) -> Tier;
}
