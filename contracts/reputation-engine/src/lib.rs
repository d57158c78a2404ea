#![no_std]

//! # Reputation Engine
//!
//! Aggregates trade outcomes into a per-user score and drives badge issuance.
//!
//! - The trade escrow reports completed trades ([`ReputationEngine::record_trade`])
//!   and resolved disputes ([`ReputationEngine::record_dispute_resolution`]).
//! - The cross-chain relay merges reputation earned on other ledgers
//!   ([`ReputationEngine::sync_cross_chain_reputation`]), at most once per sync id.
//!
//! After every update the engine evaluates the user's tier and asks the badge
//! registry for a badge when the user qualifies for a tier above the one they
//! already hold. A rejected mint never fails the update that triggered it.

mod errors;
mod events;
mod history;
mod storage;
mod types;

#[cfg(test)]
mod test;

use p2p_shared::access;
use p2p_shared::guard::non_reentrant;
use p2p_shared::interfaces::BadgeClient;
use p2p_shared::types::is_valid_rating;
use p2p_shared::{Role, Tier};
use soroban_sdk::{contract, contractimpl, log, Address, BytesN, Env, Vec};

pub use crate::errors::Error;
use crate::events::*;
pub use crate::history::HISTORY_CAPACITY;
use crate::storage::*;
use crate::types::{is_valid_rating_total, policy};
pub use crate::types::{eligible_tier, EngineConfig, TradeRecord, UserReputation};

#[contract]
pub struct ReputationEngine;

#[contractimpl]
impl ReputationEngine {
    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Initialize the engine.
    ///
    /// # Arguments
    /// * `admin` - Address that will hold the admin role
    /// * `badge_registry` - Badge registry the engine mints through
    /// * `local_chain_id` - Identifier of this ledger, stamped on locally earned badges
    ///
    /// # Errors
    /// * `Error::AlreadyInitialized` - If the contract has already been initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        badge_registry: Address,
        local_chain_id: u64,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        let config = EngineConfig {
            admin: admin.clone(),
            badge_registry: badge_registry.clone(),
            local_chain_id,
            updated_at: env.ledger().timestamp(),
        };

        set_config(&env, &config);
        set_initialized(&env);
        access::grant_role(&env, Role::Admin, &admin);
        extend_instance_ttl(&env);

        InitializedEvent {
            admin,
            badge_registry,
            local_chain_id,
        }
        .publish(&env);

        Ok(())
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    pub fn get_config(env: Env) -> Result<EngineConfig, Error> {
        get_config(&env).ok_or(Error::NotInitialized)
    }

    /// Point the engine at a different badge registry (admin only)
    pub fn set_badge_registry(
        env: Env,
        admin: Address,
        badge_registry: Address,
    ) -> Result<(), Error> {
        let mut config = get_config(&env).ok_or(Error::NotInitialized)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        config.badge_registry = badge_registry.clone();
        config.updated_at = env.ledger().timestamp();
        set_config(&env, &config);

        BadgeRegistryUpdatedEvent {
            admin,
            badge_registry,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Grant `role` to `account` (admin only)
    pub fn grant_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if access::grant_role(&env, role, &account) {
            RoleGrantedEvent { role, account }.publish(&env);
        }

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Revoke `role` from `account` (admin only)
    pub fn revoke_role(
        env: Env,
        admin: Address,
        role: Role,
        account: Address,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if access::revoke_role(&env, role, &account) {
            RoleRevokedEvent { role, account }.publish(&env);
        }

        extend_instance_ttl(&env);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Start tracking `user`. Registering an already known user is a no-op.
    ///
    /// Users may register themselves; anyone else needs `Role::EscrowCaller`
    /// or `Role::CrossChainCaller`.
    pub fn register_user(env: Env, caller: Address, user: Address) -> Result<(), Error> {
        Self::require_initialized(&env)?;

        if caller == user {
            user.require_auth();
        } else {
            Self::require_roles(&env, &caller, policy::REGISTER_USER)?;
        }

        Self::ensure_registered(&env, &user);
        extend_instance_ttl(&env);
        Ok(())
    }

    // ========================================================================
    // TRADE OUTCOMES
    // ========================================================================

    /// Apply a completed trade to both parties.
    ///
    /// Each party gains a successful trade and the rating the other side gave
    /// them, and gets a history entry. Both are then checked for a tier
    /// promotion.
    ///
    /// # Arguments
    /// * `caller` - Must hold `Role::EscrowCaller`
    /// * `trade_id` - Escrow trade id, applied at most once
    /// * `seller_rating` - Rating the buyer gave the seller
    /// * `buyer_rating` - Rating the seller gave the buyer
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not the escrow
    /// * `Error::InvalidRating` - A rating is outside [100, 500]
    /// * `Error::InvalidParticipants` - Seller and buyer are the same account
    /// * `Error::TradeAlreadyRecorded` - `trade_id` was already applied
    pub fn record_trade(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        seller: Address,
        buyer: Address,
        amount: i128,
        seller_rating: u32,
        buyer_rating: u32,
    ) -> Result<(), Error> {
        let config = get_config(&env).ok_or(Error::NotInitialized)?;
        Self::require_roles(&env, &caller, policy::RECORD_TRADE)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            if !is_valid_rating(seller_rating) || !is_valid_rating(buyer_rating) {
                return Err(Error::InvalidRating);
            }

            if seller == buyer {
                return Err(Error::InvalidParticipants);
            }

            if is_trade_recorded(&env, &trade_id) {
                return Err(Error::TradeAlreadyRecorded);
            }
            mark_trade_recorded(&env, &trade_id);

            let now = env.ledger().timestamp();
            let seller_rep = Self::apply_trade(
                &env,
                &trade_id,
                &seller,
                &buyer,
                amount,
                seller_rating,
                false,
                now,
            )?;
            let buyer_rep = Self::apply_trade(
                &env,
                &trade_id,
                &buyer,
                &seller,
                amount,
                buyer_rating,
                true,
                now,
            )?;

            Self::evaluate_badge(&env, &config, &seller_rep, config.local_chain_id);
            Self::evaluate_badge(&env, &config, &buyer_rep, config.local_chain_id);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Count a resolved dispute as a win for `winner` and a loss for `loser`.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is neither a dispute resolver nor the escrow
    /// * `Error::InvalidParticipants` - Winner and loser are the same account
    pub fn record_dispute_resolution(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        winner: Address,
        loser: Address,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &caller, policy::RECORD_DISPUTE)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            if winner == loser {
                return Err(Error::InvalidParticipants);
            }

            let mut winner_rep = Self::ensure_registered(&env, &winner);
            winner_rep.disputes_won = winner_rep
                .disputes_won
                .checked_add(1)
                .ok_or(Error::Overflow)?;
            set_reputation(&env, &winner_rep);

            let mut loser_rep = Self::ensure_registered(&env, &loser);
            loser_rep.disputes_lost = loser_rep
                .disputes_lost
                .checked_add(1)
                .ok_or(Error::Overflow)?;
            set_reputation(&env, &loser_rep);

            DisputeRecordedEvent {
                trade_id,
                winner,
                loser,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // CROSS-CHAIN SYNC
    // ========================================================================

    /// Merge reputation earned on another ledger into `user`'s local record.
    ///
    /// The counters are added to the local ones. A `sync_id` that was already
    /// applied makes the call a no-op, so redelivered messages count once.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not the cross-chain relay
    /// * `Error::InvalidSyncData` - Rating points fall outside `[100, 500]` per rating
    pub fn sync_cross_chain_reputation(
        env: Env,
        caller: Address,
        user: Address,
        source_chain: u64,
        add_trades: u64,
        add_rating_points: u64,
        add_rating_count: u64,
        sync_id: BytesN<32>,
    ) -> Result<(), Error> {
        let config = get_config(&env).ok_or(Error::NotInitialized)?;
        Self::require_roles(&env, &caller, policy::SYNC_REPUTATION)?;

        if !is_valid_rating_total(add_rating_points, add_rating_count) {
            return Err(Error::InvalidSyncData);
        }

        non_reentrant(&env, Error::ReentrancyDetected, || {
            if is_sync_processed(&env, &sync_id) {
                log!(&env, "sync already applied", sync_id);
                return Ok(());
            }
            mark_sync_processed(&env, &sync_id);

            let mut rep = Self::ensure_registered(&env, &user);
            rep.total_trades = rep.total_trades.checked_add(add_trades).ok_or(Error::Overflow)?;
            rep.successful_trades = rep
                .successful_trades
                .checked_add(add_trades)
                .ok_or(Error::Overflow)?;
            rep.rating_points = rep
                .rating_points
                .checked_add(add_rating_points)
                .ok_or(Error::Overflow)?;
            rep.rating_count = rep
                .rating_count
                .checked_add(add_rating_count)
                .ok_or(Error::Overflow)?;
            rep.refresh_average()?;
            set_reputation(&env, &rep);

            ReputationSyncedEvent {
                user: user.clone(),
                source_chain,
                sync_id: sync_id.clone(),
                added_trades: add_trades,
                average_rating: rep.average_rating,
            }
            .publish(&env);

            Self::evaluate_badge(&env, &config, &rep, source_chain);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get_reputation(env: Env, user: Address) -> Result<UserReputation, Error> {
        get_reputation(&env, &user).ok_or(Error::UserNotFound)
    }

    /// Average received rating (x100), zero for unknown users
    pub fn get_average_rating(env: Env, user: Address) -> u32 {
        get_reputation(&env, &user)
            .map(|rep| rep.average_rating)
            .unwrap_or(0)
    }

    /// Up to the last `HISTORY_CAPACITY` trades of `user`, oldest first
    pub fn get_trade_history(env: Env, user: Address) -> Vec<TradeRecord> {
        history::read(&env, &user)
    }

    /// Highest tier `user` currently qualifies for
    pub fn get_eligible_tier(env: Env, user: Address) -> Tier {
        get_reputation(&env, &user)
            .map(|rep| eligible_tier(rep.successful_trades, rep.average_rating))
            .unwrap_or(Tier::None)
    }

    /// `(successful_trades, rating_points, rating_count)` exported to other ledgers
    pub fn get_sync_snapshot(env: Env, user: Address) -> (u64, u64, u64) {
        get_reputation(&env, &user)
            .map(|rep| (rep.successful_trades, rep.rating_points, rep.rating_count))
            .unwrap_or((0, 0, 0))
    }

    pub fn is_sync_processed(env: Env, sync_id: BytesN<32>) -> bool {
        is_sync_processed(&env, &sync_id)
    }

    pub fn is_trade_recorded(env: Env, trade_id: BytesN<32>) -> bool {
        is_trade_recorded(&env, &trade_id)
    }

    // ========================================================================
    // INTERNAL HELPERS
    // ========================================================================

    fn require_initialized(env: &Env) -> Result<(), Error> {
        if !is_initialized(env) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn require_roles(env: &Env, caller: &Address, allowed: &[Role]) -> Result<(), Error> {
        if !access::authorize(env, caller, allowed) {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn ensure_registered(env: &Env, user: &Address) -> UserReputation {
        if let Some(rep) = get_reputation(env, user) {
            if rep.is_active {
                return rep;
            }
        }

        let rep = UserReputation::new(user.clone(), env.ledger().timestamp());
        set_reputation(env, &rep);

        UserRegisteredEvent {
            user: user.clone(),
            joined_at: rep.joined_at,
        }
        .publish(env);

        rep
    }

    /// Credit one side of a completed trade and append it to their history.
    fn apply_trade(
        env: &Env,
        trade_id: &BytesN<32>,
        user: &Address,
        counterparty: &Address,
        amount: i128,
        rating_received: u32,
        as_buyer: bool,
        now: u64,
    ) -> Result<UserReputation, Error> {
        let mut rep = Self::ensure_registered(env, user);

        rep.total_trades = rep.total_trades.checked_add(1).ok_or(Error::Overflow)?;
        rep.successful_trades = rep.successful_trades.checked_add(1).ok_or(Error::Overflow)?;
        rep.rating_points = rep
            .rating_points
            .checked_add(rating_received as u64)
            .ok_or(Error::Overflow)?;
        rep.rating_count = rep.rating_count.checked_add(1).ok_or(Error::Overflow)?;
        rep.last_trade_at = now;
        rep.refresh_average()?;
        set_reputation(env, &rep);

        history::push(
            env,
            user,
            &TradeRecord {
                trade_id: trade_id.clone(),
                counterparty: counterparty.clone(),
                amount,
                rating: rating_received,
                timestamp: now,
                as_buyer,
            },
        );

        ReputationUpdatedEvent {
            user: user.clone(),
            trade_id: trade_id.clone(),
            rating_received,
            successful_trades: rep.successful_trades,
            average_rating: rep.average_rating,
        }
        .publish(env);

        Ok(rep)
    }

    /// Request a badge when `rep` qualifies for a tier above the one held.
    ///
    /// Registry failures are logged and dropped; they must not fail the trade
    /// or sync that triggered the check.
    fn evaluate_badge(env: &Env, config: &EngineConfig, rep: &UserReputation, source_chain: u64) {
        let tier = eligible_tier(rep.successful_trades, rep.average_rating);
        if tier == Tier::None {
            return;
        }

        let badges = BadgeClient::new(env, &config.badge_registry);
        let current = match badges.try_user_highest_tier(&rep.user) {
            Ok(Ok(current)) => current,
            _ => {
                log!(env, "badge registry unavailable", rep.user.clone());
                return;
            }
        };
        if tier <= current {
            return;
        }

        match badges.try_mint_badge(
            &env.current_contract_address(),
            &rep.user,
            &tier,
            &rep.successful_trades,
            &rep.average_rating,
            &source_chain,
        ) {
            Ok(Ok(token_id)) => {
                TierPromotedEvent {
                    user: rep.user.clone(),
                    tier,
                    token_id,
                }
                .publish(env);
            }
            _ => {
                log!(env, "badge mint skipped", rep.user.clone(), tier);
            }
        }
    }
}
