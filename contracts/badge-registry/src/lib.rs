#![no_std]

//! # Badge Registry
//!
//! Issues and tracks non-transferable tier credentials. Badges are minted by
//! accounts holding [`Role::BadgeMinter`] (in practice the reputation engine)
//! when a user crosses a tier threshold.
//!
//! Each owner holds at most one badge per [`Tier`], and the owner's highest
//! tier only ever moves up. The contract exposes no transfer or approval entry
//! point, so a badge stays bound to the account it was minted to.

mod errors;
mod events;
mod storage;
mod types;


use p2p_shared::access;
use p2p_shared::{Role, Tier};
use soroban_sdk::{contract, contractimpl, Address, Env, Vec};

pub use crate::errors::Error;
use crate::events::*;
use crate::storage::*;
pub use crate::types::Badge;
use crate::types::policy;

#[contract]
pub struct BadgeRegistry;

#[contractimpl]
impl BadgeRegistry {
    // ========================================================================
    // INITIALIZATION
    // ========================================================================

    /// Initialize the registry and grant `admin` the admin role.
    ///
    /// # Errors
    /// * `Error::AlreadyInitialized` - If the contract has already been initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        set_initialized(&env);
        set_admin(&env, &admin);
        access::grant_role(&env, Role::Admin, &admin);
        extend_instance_ttl(&env);

        InitializedEvent { admin }.publish(&env);

        Ok(())
    }

    // ========================================================================
    // ACCESS CONTROL
    // ========================================================================

    /// Grant `role` to `account` (admin only)
    pub fn grant_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &admin, policy::MANAGE_ROLES)?;

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
        Self::require_roles(&env, &admin, policy::MANAGE_ROLES)?;

        if access::revoke_role(&env, role, &account) {
            RoleRevokedEvent { role, account }.publish(&env);
        }

        extend_instance_ttl(&env);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        get_admin(&env).ok_or(Error::NotInitialized)
    }

    // ========================================================================
    // MINTING
    // ========================================================================

    /// Mint a badge of `tier` to `to`.
    ///
    /// # Arguments
    /// * `caller` - Minter address, must hold `Role::BadgeMinter`
    /// * `to` - Badge owner
    /// * `tier` - Tier reached, anything but `Tier::None`
    /// * `trades_at_mint` - Successful trades at the time the tier was reached
    /// * `rating_at_mint` - Average rating (x100) at the time the tier was reached
    /// * `source_chain` - Ledger whose activity earned the badge
    ///
    /// # Returns
    /// * Token id of the new badge
    ///
    /// # Errors
    /// * `Error::Unauthorized` - Caller is not a badge minter
    /// * `Error::InvalidRecipient` - `to` is the registry itself
    /// * `Error::InvalidTier` - `tier` is `Tier::None`
    /// * `Error::BadgeAlreadyExists` - `to` already holds a badge of `tier`
    pub fn mint_badge(
        env: Env,
        caller: Address,
        to: Address,
        tier: Tier,
        trades_at_mint: u64,
        rating_at_mint: u32,
        source_chain: u64,
    ) -> Result<u64, Error> {
        Self::require_initialized(&env)?;
        Self::require_roles(&env, &caller, policy::MINT_BADGE)?;

        if to == env.current_contract_address() {
            return Err(Error::InvalidRecipient);
        }

        if tier == Tier::None {
            return Err(Error::InvalidTier);
        }

        if get_owner_tier_token(&env, &to, tier).is_some() {
            return Err(Error::BadgeAlreadyExists);
        }

        let token_id = get_token_counter(&env)
            .checked_add(1)
            .ok_or(Error::Overflow)?;

        let badge = Badge {
            token_id,
            owner: to.clone(),
            tier,
            trades_at_mint,
            rating_at_mint,
            minted_at: env.ledger().timestamp(),
            source_chain,
        };

        set_badge(&env, &badge);
        set_token_counter(&env, token_id);
        set_owner_tier_token(&env, &to, tier, token_id);
        add_owner_badge(&env, &to, token_id);
        raise_highest_tier(&env, &to, tier);

        BadgeMintedEvent {
            owner: to,
            tier,
            token_id,
            trades_at_mint,
            rating_at_mint,
            source_chain,
        }
        .publish(&env);

        extend_instance_ttl(&env);
        Ok(token_id)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Get a badge by token id
    pub fn get_badge(env: Env, token_id: u64) -> Result<Badge, Error> {
        get_badge(&env, token_id).ok_or(Error::BadgeNotFound)
    }

    /// Get the badge `user` holds for `tier`
    pub fn badge_of_tier(env: Env, user: Address, tier: Tier) -> Result<Badge, Error> {
        let token_id = get_owner_tier_token(&env, &user, tier).ok_or(Error::BadgeNotFound)?;
        get_badge(&env, token_id).ok_or(Error::BadgeNotFound)
    }

    /// All badges held by `user`, in mint order
    pub fn get_user_badges(env: Env, user: Address) -> Vec<Badge> {
        let mut badges = Vec::new(&env);
        for token_id in get_owner_badges(&env, &user).iter() {
            if let Some(badge) = get_badge(&env, token_id) {
                badges.push_back(badge);
            }
        }
        badges
    }

    /// Whether `user`'s highest tier is at least `tier`
    pub fn has_minimum_tier(env: Env, user: Address, tier: Tier) -> bool {
        get_highest_tier(&env, &user) >= tier
    }

    pub fn user_highest_tier(env: Env, user: Address) -> Tier {
        get_highest_tier(&env, &user)
    }

    pub fn balance_of(env: Env, user: Address) -> u32 {
        get_owner_badges(&env, &user).len()
    }

    pub fn total_supply(env: Env) -> u64 {
        get_token_counter(&env)
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
}
