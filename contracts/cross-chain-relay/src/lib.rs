#![no_std]

//! # Cross-Chain Relay
//!
//! Moves tokens and reputation between this ledger and peer relays on other
//! ledgers through an external message router.
//!
//! Outbound, [`CrossChainRelay::bridge_tokens`] locks the sender's tokens
//! (less the bridge fee) and [`CrossChainRelay::sync_reputation`] exports a
//! user's reputation counters. Both encode a [`RelayPayload`] as XDR and hand
//! it to the router.
//!
//! Inbound, the router calls [`CrossChainRelay::receive_message`]. A message is
//! accepted only from the configured peer of its source chain and at most once
//! per message id, since the transport may deliver more than once.

mod errors;
mod events;
mod router;
mod storage;
mod types;

#[cfg(test)]
mod test;

use p2p_shared::access;
use p2p_shared::guard::non_reentrant;
use p2p_shared::interfaces::ReputationClient;
use p2p_shared::types::bps_of;
use p2p_shared::Role;
use soroban_sdk::{
    contract, contractimpl, token,
    xdr::{FromXdr, ToXdr},
    Address, Bytes, BytesN, Env,
};

pub use crate::errors::Error;
use crate::events::*;
pub use crate::router::{MessageRouter, RouterClient};
use crate::storage::*;
use crate::types::policy;
pub use crate::types::{
    ChainConfig, PendingTransfer, RelayConfig, RelayPayload, ReputationSyncPayload,
    TokenTransferPayload, MAX_BRIDGE_FEE_BPS,
};

#[contract]
pub struct CrossChainRelay;

#[contractimpl]
impl CrossChainRelay {
    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Initialize the relay.
    ///
    /// # Arguments
    /// * `admin` - Address that will hold the admin role
    /// * `router` - Message router; the only caller allowed to deliver messages
    /// * `reputation_engine` - Engine that receives remote reputation. It must
    ///   grant this contract `Role::CrossChainCaller`.
    /// * `fee_collector` - Receives bridge fees
    /// * `bridge_fee_bps` - Bridge fee in basis points, at most `MAX_BRIDGE_FEE_BPS`
    /// * `local_chain_id` - Identifier of this ledger
    ///
    /// # Errors
    /// * `Error::AlreadyInitialized` - If the contract has already been initialized
    /// * `Error::InvalidFee` - If the fee exceeds the maximum
    pub fn initialize(
        env: Env,
        admin: Address,
        router: Address,
        reputation_engine: Address,
        fee_collector: Address,
        bridge_fee_bps: u32,
        local_chain_id: u64,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        if bridge_fee_bps > MAX_BRIDGE_FEE_BPS {
            return Err(Error::InvalidFee);
        }

        let config = RelayConfig {
            admin: admin.clone(),
            router: router.clone(),
            reputation_engine: reputation_engine.clone(),
            fee_collector,
            bridge_fee_bps,
            local_chain_id,
            updated_at: env.ledger().timestamp(),
        };

        set_config(&env, &config);
        set_initialized(&env);
        access::grant_role(&env, Role::Admin, &admin);
        extend_instance_ttl(&env);

        InitializedEvent {
            admin,
            router,
            reputation_engine,
            local_chain_id,
        }
        .publish(&env);

        Ok(())
    }

    // ========================================================================
    // OUTBOUND
    // ========================================================================

    /// Lock `amount` and send it to `recipient` on `dest_chain`.
    ///
    /// The bridge fee goes to the fee collector and the rest stays locked in the
    /// relay. With `use_liquidity_pool` set and a pool that covers the net
    /// amount, the pool is debited and the message takes the fast lane.
    /// Otherwise it takes the standard lane.
    ///
    /// # Returns
    /// The router's message id, which also keys the pending transfer.
    ///
    /// # Errors
    /// * `Error::ChainNotSupported` - Destination is unknown or inactive
    /// * `Error::InsufficientAmount` - Nothing left after the fee
    pub fn bridge_tokens(
        env: Env,
        sender: Address,
        dest_chain: u64,
        recipient: Address,
        amount: i128,
        use_liquidity_pool: bool,
    ) -> Result<BytesN<32>, Error> {
        let config = Self::load_config(&env)?;
        sender.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let chain = Self::active_chain(&env, dest_chain)?;

            if amount <= 0 {
                return Err(Error::InsufficientAmount);
            }
            let fee = bps_of(amount, config.bridge_fee_bps).ok_or(Error::Overflow)?;
            let net = amount - fee;
            if net <= 0 {
                return Err(Error::InsufficientAmount);
            }

            let relay = env.current_contract_address();
            let token_client = token::Client::new(&env, &chain.local_token);
            token_client.transfer(&sender, &relay, &net);
            if fee > 0 {
                token_client.transfer(&sender, &config.fee_collector, &fee);
            }

            let fast = use_liquidity_pool && get_pool(&env, dest_chain) >= net;
            if fast {
                Self::adjust_pool(&env, &chain, -net)?;
            }

            let payload = RelayPayload::TokenTransfer(TokenTransferPayload {
                sender: sender.clone(),
                recipient: recipient.clone(),
                amount: net,
            });
            let message_id = RouterClient::new(&env, &config.router).send_message(
                &relay,
                &dest_chain,
                &chain.bridge,
                &payload.to_xdr(&env),
                &fast,
            );

            set_pending(
                &env,
                &PendingTransfer {
                    message_id: message_id.clone(),
                    sender: sender.clone(),
                    recipient: recipient.clone(),
                    dest_chain,
                    token: chain.local_token.clone(),
                    amount: net,
                    fee,
                    fast,
                    created_at: env.ledger().timestamp(),
                },
            );

            TokensBridgedEvent {
                message_id: message_id.clone(),
                sender: sender.clone(),
                dest_chain,
                recipient,
                amount: net,
                fee,
                fast,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(message_id)
        })
    }

    /// Export `user`'s reputation counters to `dest_chain`.
    ///
    /// # Errors
    /// * `Error::ChainNotSupported` - Destination is unknown or inactive
    pub fn sync_reputation(env: Env, user: Address, dest_chain: u64) -> Result<BytesN<32>, Error> {
        let config = Self::load_config(&env)?;
        user.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let chain = Self::active_chain(&env, dest_chain)?;

            let (successful_trades, rating_points, rating_count) =
                ReputationClient::new(&env, &config.reputation_engine).get_sync_snapshot(&user);

            let payload = RelayPayload::ReputationSync(ReputationSyncPayload {
                user: user.clone(),
                successful_trades,
                rating_points,
                rating_count,
            });
            let message_id = RouterClient::new(&env, &config.router).send_message(
                &env.current_contract_address(),
                &dest_chain,
                &chain.bridge,
                &payload.to_xdr(&env),
                &false,
            );

            ReputationExportedEvent {
                message_id: message_id.clone(),
                user,
                dest_chain,
                successful_trades,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(message_id)
        })
    }

    // ========================================================================
    // INBOUND
    // ========================================================================

    /// Apply a message delivered by the router.
    ///
    /// # Arguments
    /// * `message_id` - Router message id, applied at most once
    /// * `source_chain` - Chain the message was sent from
    /// * `source_bridge` - Sending contract on the source chain
    /// * `payload` - XDR-encoded [`RelayPayload`]
    ///
    /// # Errors
    /// * `Error::MessageAlreadyProcessed` - Message id was already applied
    /// * `Error::InvalidMessageSource` - Sender is not the peer configured for `source_chain`
    /// * `Error::InvalidPayload` - Payload is not a relay message
    /// * `Error::InsufficientLiquidity` - Relay cannot cover an inbound transfer
    pub fn receive_message(
        env: Env,
        message_id: BytesN<32>,
        source_chain: u64,
        source_bridge: Address,
        payload: Bytes,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        config.router.require_auth();

        non_reentrant(&env, Error::ReentrancyDetected, || {
            if is_processed(&env, &message_id) {
                return Err(Error::MessageAlreadyProcessed);
            }

            let chain = get_chain(&env, source_chain).ok_or(Error::InvalidMessageSource)?;
            if chain.bridge != source_bridge {
                return Err(Error::InvalidMessageSource);
            }

            mark_processed(&env, &message_id);

            let message =
                RelayPayload::from_xdr(&env, &payload).map_err(|_| Error::InvalidPayload)?;

            MessageReceivedEvent {
                message_id: message_id.clone(),
                source_chain,
            }
            .publish(&env);

            match message {
                RelayPayload::TokenTransfer(transfer) => {
                    Self::release_tokens(&env, &chain, &message_id, &transfer)?;
                }
                RelayPayload::ReputationSync(sync) => {
                    let sync_id =
                        Self::derive_sync_id(&env, &message_id, source_chain, &source_bridge);
                    ReputationClient::new(&env, &config.reputation_engine)
                        .sync_cross_chain_reputation(
                            &env.current_contract_address(),
                            &sync.user,
                            &source_chain,
                            &sync.successful_trades,
                            &sync.rating_points,
                            &sync.rating_count,
                            &sync_id,
                        );

                    ReputationImportedEvent {
                        message_id: message_id.clone(),
                        user: sync.user,
                        sync_id,
                    }
                    .publish(&env);
                }
            }

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // LIQUIDITY
    // ========================================================================

    /// Deposit fast-lane liquidity for transfers to `chain_id`
    pub fn add_liquidity(
        env: Env,
        operator: Address,
        chain_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &operator, policy::MANAGE_LIQUIDITY)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let chain = get_chain(&env, chain_id).ok_or(Error::ChainNotSupported)?;
            if amount <= 0 {
                return Err(Error::InsufficientAmount);
            }

            token::Client::new(&env, &chain.local_token).transfer(
                &operator,
                &env.current_contract_address(),
                &amount,
            );

            let pool_balance = Self::adjust_pool(&env, &chain, amount)?;

            LiquidityUpdatedEvent {
                chain_id,
                operator,
                delta: amount,
                pool_balance,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    /// Withdraw fast-lane liquidity for `chain_id`
    ///
    /// Inbound transfers the relay could not cover from unpooled funds have
    /// already been drawn from the pool, so only what remains can be withdrawn.
    pub fn remove_liquidity(
        env: Env,
        operator: Address,
        chain_id: u64,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &operator, policy::MANAGE_LIQUIDITY)?;

        non_reentrant(&env, Error::ReentrancyDetected, || {
            let chain = get_chain(&env, chain_id).ok_or(Error::ChainNotSupported)?;
            if amount <= 0 {
                return Err(Error::InsufficientAmount);
            }

            let relay = env.current_contract_address();
            let token_client = token::Client::new(&env, &chain.local_token);
            if get_pool(&env, chain_id) < amount || token_client.balance(&relay) < amount {
                return Err(Error::InsufficientLiquidity);
            }
            let pool_balance = Self::adjust_pool(&env, &chain, -amount)?;

            token_client.transfer(&relay, &operator, &amount);

            LiquidityUpdatedEvent {
                chain_id,
                operator,
                delta: -amount,
                pool_balance,
            }
            .publish(&env);

            extend_instance_ttl(&env);
            Ok(())
        })
    }

    // ========================================================================
    // ADMIN
    // ========================================================================

    /// Add or replace the route to `chain_id` (admin only)
    ///
    /// # Errors
    /// * `Error::InvalidChain` - `chain_id` is this ledger
    /// * `Error::PoolNotEmpty` - Changing the token of a route whose pool is funded
    pub fn configure_chain(
        env: Env,
        admin: Address,
        chain_id: u64,
        bridge: Address,
        local_token: Address,
        active: bool,
    ) -> Result<(), Error> {
        let config = Self::load_config(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if chain_id == config.local_chain_id {
            return Err(Error::InvalidChain);
        }
        if let Some(existing) = get_chain(&env, chain_id) {
            if existing.local_token != local_token && get_pool(&env, chain_id) > 0 {
                return Err(Error::PoolNotEmpty);
            }
        }

        set_chain(
            &env,
            &ChainConfig {
                chain_id,
                bridge: bridge.clone(),
                local_token: local_token.clone(),
                active,
            },
        );

        ChainConfiguredEvent {
            chain_id,
            bridge,
            local_token,
            active,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    /// Open or close the route to `chain_id` for outbound messages (admin only)
    pub fn set_chain_active(
        env: Env,
        admin: Address,
        chain_id: u64,
        active: bool,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        let mut chain = get_chain(&env, chain_id).ok_or(Error::ChainNotSupported)?;
        chain.active = active;
        set_chain(&env, &chain);

        ChainConfiguredEvent {
            chain_id,
            bridge: chain.bridge,
            local_token: chain.local_token,
            active,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(())
    }

    pub fn set_bridge_fee(env: Env, admin: Address, fee_bps: u32) -> Result<(), Error> {
        let mut config = Self::load_config(&env)?;
        Self::require_roles(&env, &admin, policy::CONFIGURE)?;

        if fee_bps > MAX_BRIDGE_FEE_BPS {
            return Err(Error::InvalidFee);
        }

        let old_fee_bps = config.bridge_fee_bps;
        config.bridge_fee_bps = fee_bps;
        config.updated_at = env.ledger().timestamp();
        set_config(&env, &config);

        BridgeFeeUpdatedEvent {
            old_fee_bps,
            new_fee_bps: fee_bps,
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

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get_config(env: Env) -> Result<RelayConfig, Error> {
        Self::load_config(&env)
    }

    pub fn get_chain_config(env: Env, chain_id: u64) -> Result<ChainConfig, Error> {
        get_chain(&env, chain_id).ok_or(Error::ChainNotSupported)
    }

    pub fn get_pending_transfer(
        env: Env,
        message_id: BytesN<32>,
    ) -> Result<PendingTransfer, Error> {
        get_pending(&env, &message_id).ok_or(Error::TransferNotFound)
    }

    pub fn is_message_processed(env: Env, message_id: BytesN<32>) -> bool {
        is_processed(&env, &message_id)
    }

    /// Fast-lane liquidity available for transfers to `chain_id`
    pub fn get_pool_balance(env: Env, chain_id: u64) -> i128 {
        get_pool(&env, chain_id)
    }

    /// Fee charged on bridging `amount` at the current rate
    pub fn calculate_bridge_fee(env: Env, amount: i128) -> Result<i128, Error> {
        let config = Self::load_config(&env)?;
        bps_of(amount, config.bridge_fee_bps).ok_or(Error::Overflow)
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

    fn load_config(env: &Env) -> Result<RelayConfig, Error> {
        get_config(env).ok_or(Error::NotInitialized)
    }

    fn require_roles(env: &Env, caller: &Address, allowed: &[Role]) -> Result<(), Error> {
        if !access::authorize(env, caller, allowed) {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    fn active_chain(env: &Env, chain_id: u64) -> Result<ChainConfig, Error> {
        match get_chain(env, chain_id) {
            Some(chain) if chain.active => Ok(chain),
            _ => Err(Error::ChainNotSupported),
        }
    }

    /// Engine-side idempotency key for an inbound reputation message
    fn derive_sync_id(
        env: &Env,
        message_id: &BytesN<32>,
        source_chain: u64,
        source_bridge: &Address,
    ) -> BytesN<32> {
        let preimage = (message_id.clone(), source_chain, source_bridge.clone()).to_xdr(env);
        env.crypto().sha256(&preimage).to_bytes()
    }

    /// Add `delta` to the pool of `chain` and to the reserve of its token.
    fn adjust_pool(env: &Env, chain: &ChainConfig, delta: i128) -> Result<i128, Error> {
        let pool = get_pool(env, chain.chain_id)
            .checked_add(delta)
            .ok_or(Error::Overflow)?;
        let reserved = get_reserved(env, &chain.local_token)
            .checked_add(delta)
            .ok_or(Error::Overflow)?;
        if pool < 0 || reserved < 0 {
            return Err(Error::InsufficientLiquidity);
        }
        set_pool(env, chain.chain_id, pool);
        set_reserved(env, &chain.local_token, reserved);
        Ok(pool)
    }

    fn release_tokens(
        env: &Env,
        chain: &ChainConfig,
        message_id: &BytesN<32>,
        transfer: &TokenTransferPayload,
    ) -> Result<(), Error> {
        if transfer.amount <= 0 {
            return Err(Error::InvalidPayload);
        }

        let relay = env.current_contract_address();
        let token_client = token::Client::new(env, &chain.local_token);
        let balance = token_client.balance(&relay);
        if balance < transfer.amount {
            return Err(Error::InsufficientLiquidity);
        }

        // Unpooled funds pay first, the source chain's pool covers the rest
        let unpooled = (balance - get_reserved(env, &chain.local_token)).max(0);
        let draw = transfer.amount - unpooled.min(transfer.amount);
        if draw > 0 {
            let pool_balance = Self::adjust_pool(env, chain, -draw)?;
            LiquidityUpdatedEvent {
                chain_id: chain.chain_id,
                operator: relay.clone(),
                delta: -draw,
                pool_balance,
            }
            .publish(env);
        }

        token_client.transfer(&relay, &transfer.recipient, &transfer.amount);

        TokensReleasedEvent {
            message_id: message_id.clone(),
            recipient: transfer.recipient.clone(),
            token: chain.local_token.clone(),
            amount: transfer.amount,
        }
        .publish(env);

        Ok(())
    }
}
