#![no_std]

//! # Trade Escrow
//!
//! Holds a buyer's payment while a peer-to-peer trade runs its course and
//! settles it exactly once.
//!
//! ## Lifecycle
//!
//! 1. **Create** ([`TradeEscrow::create_trade`]): the buyer locks `amount` of an
//!    allow-listed token. The platform fee is fixed at this point.
//! 2. **Accept / deliver**: the seller accepts before expiry, then marks the
//!    trade delivered with a proof.
//! 3. **Settle**: the buyer confirms and rates the seller, or anyone triggers
//!    [`TradeEscrow::auto_release`] once the release delay has passed. The seller
//!    receives `amount - platform_fee` and the fee collector the fee.
//! 4. **Dispute**: within the dispute window either party may contest a
//!    delivered trade; a dispute resolver later awards it to one side.
//! 5. **Timeouts**: the buyer may cancel before acceptance, and anyone may
//!    refund a trade that expired before delivery.
//!
//! Once the seller also rates the buyer, the trade outcome is reported to the
//! reputation engine.
//!
//! Every mutating entry point runs under the non-reentrancy guard. Token
//! transfers happen before the status write, and any error rolls back the
//! whole invocation including nested calls.

mod errors;
mod events;
mod storage;
mod types;


use p2p_shared::access;
use p2p_shared::guard::non_reentrant;
use p2p_shared::interfaces::ReputationClient;
use p2p_shared::types::{bps_of, is_valid_rating};
use p2p_shared::Role;
use soroban_sdk::{contract, contractimpl, token, xdr::ToXdr, Address, BytesN, Env, String, Vec};

pub use crate::errors::Error;
use crate::events::*;
use crate::storage::*;
use crate::types::policy;
pub use crate::types::{
    Dispute, EscrowConfig, Trade, TradeStatus, AUTO_RELEASE_RATING, DEFAULT_AUTO_RELEASE_DELAY,
    DEFAULT_DISPUTE_WINDOW, DEFAULT_TRADE_EXPIRY, MAX_PLATFORM_FEE_BPS,
};

#[contract]
pub struct TradeEscrow;

#[contractimpl]
impl TradeEscrow {
    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Initialize the escrow with default timing parameters.
    ///
    /// # Arguments
    /// * `admin` - Address that will hold the admin role
    /// * `reputation_engine` - Engine that receives trade outcomes. It must grant
    ///   this contract `Role::EscrowCaller`.
    /// * `fee_collector` - Receives platform fees
    /// * `platform_fee_bps` - Platform fee in basis points, at most `MAX_PLATFORM_FEE_BPS`
    ///
    /// # Errors
    /// * `Error::AlreadyInitialized` - If the contract has already been initialized
    /// * `Error::InvalidFee` - If the fee exceeds the maximum
    pub fn initialize(
        env: Env,
        admin: Address,
        reputation_engine: Address,
        fee_collector: Address,
        platform_fee_bps: u32,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(Error::InvalidFee);
        }

        let config = EscrowConfig {
            admin: admin.clone(),
            reputation_engine: reputation_engine.clone(),
            fee_collector: fee_collector.clone(),
            platform_fee_bps,
            default_expiry: DEFAULT_TRADE_EXPIRY,
            dispute_window: DEFAULT_DISPUTE_WINDOW,
            auto_release_delay: DEFAULT_AUTO_RELEASE_DELAY,
            updated_at: env.ledger().timestamp(),
        };

        set_config(&env, &config);
        set_initialized(&env);
        access::grant_role(&env, Role::Admin, &admin);
        extend_instance_ttl(&env);

        InitializedEvent {
            admin,
            reputation_engine,
            fee_collector,
            platform_fee_bps,
        }
        .publish(&env);

        Ok(())
    }

    // ========================================================================
    // TRADE LIFECYCLE
    // ========================================================================

    /// Open a trade and lock the buyer's payment.
    ///
    /// # Arguments
    /// * `buyer` - Pays and must authorize
    /// * `seller` - Counterparty that will deliver
    /// * `token` - Allow-listed payment token
    /// * `amount` - Amount locked, in the token's smallest unit
    /// * `description` - Free-form terms of the trade
    /// * `expiry_duration` - Seconds the seller has to act; zero uses the default
    ///
    /// # Returns
    /// The trade id, a hash over buyer, seller, the buyer's nonce and the
    /// ledger timestamp.
    ///
    /// # Errors
    /// * `Error::TokenNotSupported` - Token is not allow-listed
    /// * `Error::InsufficientAmount` - Amount is not positive
    /// * `Error::InvalidTrade` - Buyer and seller coincide or one of them is the escrow
    pub fn create_trade(
        env: Env,
        buyer: Address,
        seller: Address,
        token: Address,
        amount: i128,
        description: String,
        expiry_duration: u64,
    ) -> Result<BytesN<32>, Error> {
        let config = Self::load_config(&env)?;
        buyer.require_auth();
        Self::require_not_paused(&env)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            if !is_token_supported(&env, &token) {
                return Err(Error::TokenNotSupported);
            }

            if amount <= 0 {
                return Err(Error::InsufficientAmount);
            }

            let escrow = env.current_contract_address();
            if buyer == seller || buyer == escrow || seller == escrow {
                return Err(Error::InvalidTrade);
            }

            let platform_fee = bps_of(amount, config.platform_fee_bps).ok_or(Error::Overflow)?;
            let now = env.ledger().timestamp();
            let lifetime = if expiry_duration == 0 {
                config.default_expiry
            } else {
                expiry_duration
            };
            let expires_at = now.checked_add(lifetime).ok_or(Error::Overflow)?;

            let nonce = next_buyer_nonce(&env, &buyer);
            let trade_id = Self::derive_trade_id(&env, &buyer, &seller, nonce, now);
            if has_trade(&env, &trade_id) {
                return Err(Error::InvalidTrade);
            }

            token::Client::new(&env, &token).transfer(&buyer, &escrow, &amount);

            let trade = Trade {
                id: trade_id.clone(),
                buyer: buyer.clone(),
                seller: seller.clone(),
                token: token.clone(),
                amount,
                platform_fee,
                created_at: now,
                accepted_at: 0,
                delivered_at: 0,
                completed_at: 0,
                expires_at,
                status: TradeStatus::Created,
                description,
                delivery_proof: String::from_str(&env, ""),
                seller_rating: 0,
                buyer_rating: 0,
            };

            set_trade(&env, &trade);
            add_buyer_trade(&env, &buyer, &trade_id);
            add_seller_trade(&env, &seller, &trade_id);
            let count = get_trade_count(&env).checked_add(1).ok_or(Error::Overflow)?;
            set_trade_count(&env, count);

            let engine = ReputationClient::new(&env, &config.reputation_engine);
            engine.register_user(&escrow, &buyer);
            engine.register_user(&escrow, &seller);

            TradeCreatedEvent {
                trade_id: trade_id.clone(),
                buyer: buyer.clone(),
                seller: seller.clone(),
                token: token.clone(),
                amount,
                platform_fee,
                expires_at,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(trade_id)
        })
    }

    /// Seller commits to a trade before it expires.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not the trade's seller
    /// * `Error::InvalidStatus` - Trade is not `Created`
    /// * `Error::TradeExpired` - Expiry has passed
    pub fn accept_trade(env: Env, seller: Address, trade_id: BytesN<32>) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        seller.require_auth();
        Self::require_not_paused(&env)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if trade.seller != seller {
                return Err(Error::Unauthorized);
            }
            Self::ensure_transition(&trade, TradeStatus::SellerAccepted)?;

            let now = env.ledger().timestamp();
            if now > trade.expires_at {
                return Err(Error::TradeExpired);
            }

            trade.status = TradeStatus::SellerAccepted;
            trade.accepted_at = now;
            set_trade(&env, &trade);

            TradeAcceptedEvent { trade_id, seller }.publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Seller reports delivery along with a proof reference.
    pub fn mark_delivered(
        env: Env,
        seller: Address,
        trade_id: BytesN<32>,
        proof: String,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        seller.require_auth();
        Self::require_not_paused(&env)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if trade.seller != seller {
                return Err(Error::Unauthorized);
            }
            Self::ensure_transition(&trade, TradeStatus::Delivered)?;

            let now = env.ledger().timestamp();
            trade.status = TradeStatus::Delivered;
            trade.delivered_at = now;
            trade.delivery_proof = proof.clone();
            set_trade(&env, &trade);

            TradeDeliveredEvent {
                trade_id,
                delivery_proof: proof,
                delivered_at: now,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Buyer confirms delivery and rates the seller; the seller is paid out.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not the trade's buyer
    /// * `Error::InvalidRating` - Rating outside [100, 500]
    /// * `Error::InvalidStatus` - Trade is not `Delivered`
    pub fn confirm_delivery(
        env: Env,
        buyer: Address,
        trade_id: BytesN<32>,
        seller_rating: u32,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        buyer.require_auth();
        Self::require_not_paused(&env)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if trade.buyer != buyer {
                return Err(Error::Unauthorized);
            }
            if !is_valid_rating(seller_rating) {
                return Err(Error::InvalidRating);
            }
            Self::ensure_transition(&trade, TradeStatus::Completed)?;

            Self::complete(&env, &config, &mut trade, seller_rating, false)?;

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Seller rates the buyer of a completed trade.
    ///
    /// With both ratings in place the outcome is reported to the reputation
    /// engine.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not the trade's seller
    /// * `Error::InvalidRating` - Rating outside [100, 500]
    /// * `Error::InvalidStatus` - Trade is not `Completed`
    /// * `Error::AlreadyRated` - The buyer was already rated
    pub fn rate_buyer(
        env: Env,
        seller: Address,
        trade_id: BytesN<32>,
        buyer_rating: u32,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        seller.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if trade.seller != seller {
                return Err(Error::Unauthorized);
            }
            if !is_valid_rating(buyer_rating) {
                return Err(Error::InvalidRating);
            }
            if trade.status != TradeStatus::Completed {
                return Err(Error::InvalidStatus);
            }
            if trade.buyer_rating != 0 {
                return Err(Error::AlreadyRated);
            }

            trade.buyer_rating = buyer_rating;
            set_trade(&env, &trade);

            BuyerRatedEvent {
                trade_id: trade_id.clone(),
                buyer_rating,
            }
            .publish(&env);

            if trade.seller_rating != 0 {
                ReputationClient::new(&env, &config.reputation_engine).record_trade(
                    &env.current_contract_address(),
                    &trade_id,
                    &trade.seller,
                    &trade.buyer,
                    &trade.amount,
                    &trade.seller_rating,
                    &trade.buyer_rating,
                );
            }

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Buyer withdraws a trade the seller has not accepted yet; full refund.
    pub fn cancel_trade(env: Env, buyer: Address, trade_id: BytesN<32>) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        buyer.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if trade.buyer != buyer {
                return Err(Error::Unauthorized);
            }
            if trade.status != TradeStatus::Created {
                return Err(Error::InvalidStatus);
            }

            Self::refund_buyer(&env, &trade);

            trade.status = TradeStatus::Cancelled;
            trade.completed_at = env.ledger().timestamp();
            set_trade(&env, &trade);

            TradeCancelledEvent {
                trade_id,
                refund: trade.amount,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Refund the buyer of a trade that expired before delivery. Anyone may call.
    ///
    /// # Errors
    /// * `Error::InvalidStatus` - Trade is neither `Created` nor `SellerAccepted`
    /// * `Error::TradeNotExpired` - Expiry has not passed yet
    pub fn claim_expired_trade(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            Self::ensure_transition(&trade, TradeStatus::Expired)?;

            let now = env.ledger().timestamp();
            if now <= trade.expires_at {
                return Err(Error::TradeNotExpired);
            }

            Self::refund_buyer(&env, &trade);

            trade.status = TradeStatus::Expired;
            trade.completed_at = now;
            set_trade(&env, &trade);

            TradeExpiredEvent {
                trade_id,
                claimed_by: caller,
                refund: trade.amount,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Pay the seller of a delivered trade the buyer never confirmed.
    ///
    /// Anyone may call once `delivered_at + auto_release_delay` is reached. The
    /// seller is recorded with the maximum rating.
    ///
    /// # Errors
    /// * `Error::InvalidStatus` - Trade is not `Delivered`
    /// * `Error::TradeNotExpired` - Release delay has not elapsed
    pub fn auto_release(env: Env, caller: Address, trade_id: BytesN<32>) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_not_paused(&env)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            Self::ensure_transition(&trade, TradeStatus::Completed)?;

            let release_at = trade
                .delivered_at
                .checked_add(config.auto_release_delay)
                .ok_or(Error::Overflow)?;
            if env.ledger().timestamp() < release_at {
                return Err(Error::TradeNotExpired);
            }

            Self::complete(&env, &config, &mut trade, AUTO_RELEASE_RATING, true)?;

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // DISPUTES
    // ========================================================================

    /// Contest a delivered trade within the dispute window.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is neither buyer nor seller
    /// * `Error::InvalidStatus` - Trade is not `Delivered`
    /// * `Error::DisputeWindowClosed` - `delivered_at + dispute_window` has passed
    pub fn raise_dispute(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        reason: String,
        evidence: String,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        caller.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            if !trade.is_party(&caller) {
                return Err(Error::Unauthorized);
            }
            Self::ensure_transition(&trade, TradeStatus::Disputed)?;

            let now = env.ledger().timestamp();
            let closes_at = trade
                .delivered_at
                .checked_add(config.dispute_window)
                .ok_or(Error::Overflow)?;
            if now > closes_at {
                return Err(Error::DisputeWindowClosed);
            }

            let mut dispute = Dispute {
                trade_id: trade_id.clone(),
                initiator: caller.clone(),
                reason: reason.clone(),
                buyer_evidence: Vec::new(&env),
                seller_evidence: Vec::new(&env),
                winner: None,
                resolved: false,
                created_at: now,
                resolved_at: 0,
            };
            if caller == trade.buyer {
                dispute.buyer_evidence.push_back(evidence);
            } else {
                dispute.seller_evidence.push_back(evidence);
            }
            set_dispute(&env, &dispute);

            trade.status = TradeStatus::Disputed;
            set_trade(&env, &trade);

            DisputeRaisedEvent {
                trade_id,
                initiator: caller,
                reason,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Add evidence to an open dispute.
    pub fn submit_evidence(
        env: Env,
        caller: Address,
        trade_id: BytesN<32>,
        evidence: String,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let trade = Self::load_trade(&env, &trade_id)?;
            if !trade.is_party(&caller) {
                return Err(Error::Unauthorized);
            }
            if trade.status != TradeStatus::Disputed {
                return Err(Error::InvalidStatus);
            }

            let mut dispute = get_dispute(&env, &trade_id).ok_or(Error::DisputeNotFound)?;
            if caller == trade.buyer {
                dispute.buyer_evidence.push_back(evidence);
            } else {
                dispute.seller_evidence.push_back(evidence);
            }
            set_dispute(&env, &dispute);

            EvidenceSubmittedEvent {
                trade_id,
                submitter: caller,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Settle a dispute in favour of `winner`.
    ///
    /// A buyer win refunds the full amount and no fee is taken. A seller win
    /// pays `amount - platform_fee` to the seller and the fee to the collector.
    /// The outcome is reported to the reputation engine.
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller lacks `Role::DisputeResolver`
    /// * `Error::InvalidStatus` - Trade is not `Disputed`
    /// * `Error::InvalidWinner` - Winner is neither buyer nor seller
    pub fn resolve_dispute(
        env: Env,
        resolver: Address,
        trade_id: BytesN<32>,
        winner: Address,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        Self::require_roles(&env, &resolver, policy::RESOLVE_DISPUTE)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let mut trade = Self::load_trade(&env, &trade_id)?;
            Self::ensure_transition(&trade, TradeStatus::Resolved)?;
            if !trade.is_party(&winner) {
                return Err(Error::InvalidWinner);
            }
            let mut dispute = get_dispute(&env, &trade_id).ok_or(Error::DisputeNotFound)?;

            let (loser, seller_payout, buyer_refund, platform_fee) = if winner == trade.buyer {
                Self::refund_buyer(&env, &trade);
                (trade.seller.clone(), 0, trade.amount, 0)
            } else {
                let (payout, fee) = Self::pay_seller(&env, &config, &trade)?;
                (trade.buyer.clone(), payout, 0, fee)
            };

            let now = env.ledger().timestamp();
            dispute.winner = Some(winner.clone());
            dispute.resolved = true;
            dispute.resolved_at = now;
            set_dispute(&env, &dispute);

            trade.status = TradeStatus::Resolved;
            trade.completed_at = now;
            set_trade(&env, &trade);

            ReputationClient::new(&env, &config.reputation_engine).record_dispute_resolution(
                &env.current_contract_address(),
                &trade_id,
                &winner,
                &loser,
            );

            DisputeResolvedEvent {
                trade_id,
                winner,
                resolver,
                seller_payout,
                buyer_refund,
                platform_fee,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // ADMIN
    // ========================================================================

    /// Set the fee applied to trades created from now on (admin only)
    pub fn set_platform_fee(env: Env, admin: Address, fee_bps: u32) -> Result<(), Error> {
        let mut config = Self::load_config(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(Error::InvalidFee);
        }

        let old_fee_bps = config.platform_fee_bps;
        config.platform_fee_bps = fee_bps;
        config.updated_at = env.ledger().timestamp();
        set_config(&env, &config);

        PlatformFeeUpdatedEvent {
            old_fee_bps,
            new_fee_bps: fee_bps,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Set default expiry, dispute window and auto-release delay, in seconds (admin only)
    pub fn set_timing(
        env: Env,
        admin: Address,
        default_expiry: u64,
        dispute_window: u64,
        auto_release_delay: u64,
    ) -> Result<(), Error> {
        let mut config = Self::load_config(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if default_expiry == 0 || dispute_window == 0 || auto_release_delay == 0 {
            return Err(Error::InvalidConfig);
        }

        config.default_expiry = default_expiry;
        config.dispute_window = dispute_window;
        config.auto_release_delay = auto_release_delay;
        config.updated_at = env.ledger().timestamp();
        set_config(&env, &config);

        TimingUpdatedEvent {
            default_expiry,
            dispute_window,
            auto_release_delay,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    pub fn set_fee_collector(
        env: Env,
        admin: Address,
        fee_collector: Address,
    ) -> Result<(), Error> {
        let mut config = Self::load_config(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        config.fee_collector = fee_collector.clone();
        config.updated_at = env.ledger().timestamp();
        set_config(&env, &config);

        FeeCollectorUpdatedEvent { fee_collector }.publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Add `token` to or remove it from the payment allow-list (admin only)
    pub fn set_token_supported(
        env: Env,
        admin: Address,
        token: Address,
        supported: bool,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        set_token_supported(&env, &token, supported);
        TokenSupportUpdatedEvent { token, supported }.publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Toggle the circuit breaker (admin only).
    ///
    /// While paused no trade can be created, accepted, delivered or paid out.
    /// Refunds, ratings and dispute handling stay available.
    pub fn set_paused(env: Env, admin: Address, paused: bool) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        set_paused(&env, paused);
        PauseUpdatedEvent { paused }.publish(&env);

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

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get_trade(env: Env, trade_id: BytesN<32>) -> Result<Trade, Error> {
        get_trade(&env, &trade_id).ok_or(Error::TradeNotFound)
    }

    pub fn get_dispute(env: Env, trade_id: BytesN<32>) -> Result<Dispute, Error> {
        get_dispute(&env, &trade_id).ok_or(Error::DisputeNotFound)
    }

    pub fn get_config(env: Env) -> Result<EscrowConfig, Error> {
        Self::load_config(&env)
    }

    pub fn get_buyer_trades(env: Env, buyer: Address) -> Vec<BytesN<32>> {
        get_buyer_trades(&env, &buyer)
    }

    pub fn get_seller_trades(env: Env, seller: Address) -> Vec<BytesN<32>> {
        get_seller_trades(&env, &seller)
    }

    pub fn is_token_supported(env: Env, token: Address) -> bool {
        is_token_supported(&env, &token)
    }

    /// Fee a trade of `amount` would carry at the current rate
    pub fn calculate_fee(env: Env, amount: i128) -> Result<i128, Error> {
        let config = Self::load_config(&env)?;
        bps_of(amount, config.platform_fee_bps).ok_or(Error::Overflow)
    }

    pub fn get_trade_count(env: Env) -> u64 {
        get_trade_count(&env)
    }

    /// Total platform fees paid out in `token`
    pub fn get_fees_collected(env: Env, token: Address) -> i128 {
        get_fees_collected(&env, &token)
    }

    pub fn is_paused(env: Env) -> bool {
        is_paused(&env)
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
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

    fn load_config(env: &Env) -> Result<EscrowConfig, Error> {
        get_config(env).ok_or(Error::NotInitialized)
    }

    fn require_not_paused(env: &Env) -> Result<(), Error> {
        if is_paused(env) {
            return Err(Error::Paused);
        }
        Ok(())
    }

    fn require_roles(env: &Env, caller: &Address, allowed: &[Role]) -> Result<(), Error> {
        if !access::authorize(env, caller, allowed) {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn load_trade(env: &Env, trade_id: &BytesN<32>) -> Result<Trade, Error> {
        get_trade(env, trade_id).ok_or(Error::TradeNotFound)
    }

    fn ensure_transition(trade: &Trade, next: TradeStatus) -> Result<(), Error> {
        if !trade.status.can_transition_to(&next) {
            return Err(Error::InvalidStatus);
        }
        Ok(())
    }

    fn derive_trade_id(
        env: &Env,
        buyer: &Address,
        seller: &Address,
        nonce: u64,
        timestamp: u64,
    ) -> BytesN<32> {
        let preimage = (buyer.clone(), seller.clone(), nonce, timestamp).to_xdr(env);
        env.crypto().sha256(&preimage).to_bytes()
    }

    /// Pay the seller their share and the collector the fee.
    fn pay_seller(env: &Env, config: &EscrowConfig, trade: &Trade) -> Result<(i128, i128), Error> {
        let escrow = env.current_contract_address();
        let token_client = token::Client::new(env, &trade.token);

        let payout = trade.seller_payout();
        token_client.transfer(&escrow, &trade.seller, &payout);

        if trade.platform_fee > 0 {
            token_client.transfer(&escrow, &config.fee_collector, &trade.platform_fee);
            let total = get_fees_collected(env, &trade.token)
                .checked_add(trade.platform_fee)
                .ok_or(Error::Overflow)?;
            set_fees_collected(env, &trade.token, total);
        }

        Ok((payout, trade.platform_fee))
    }

    fn refund_buyer(env: &Env, trade: &Trade) {
        token::Client::new(env, &trade.token).transfer(
            &env.current_contract_address(),
            &trade.buyer,
            &trade.amount,
        );
    }

    /// Pay out a delivered trade and mark it completed.
    fn complete(
        env: &Env,
        config: &EscrowConfig,
        trade: &mut Trade,
        seller_rating: u32,
        auto_released: bool,
    ) -> Result<(), Error> {
        let (seller_payout, platform_fee) = Self::pay_seller(env, config, trade)?;

        trade.status = TradeStatus::Completed;
        trade.seller_rating = seller_rating;
        trade.completed_at = env.ledger().timestamp();
        set_trade(env, trade);

        TradeCompletedEvent {
            trade_id: trade.id.clone(),
            seller_payout,
            platform_fee,
            seller_rating,
            auto_released,
        }
        .publish(env);

        Ok(())
    }
}
