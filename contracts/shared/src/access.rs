use soroban_sdk::{contracttype, Address, Env};

use crate::types::{PERSISTENT_TTL_AMOUNT, PERSISTENT_TTL_THRESHOLD};

/// Roles that gate mutating entry points across the protocol.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Role {
    /// Configures the contract and manages role membership
    Admin = 0,
    /// The trade escrow contract, allowed to drive reputation updates
    EscrowCaller = 1,
    /// Settles disputed trades
    DisputeResolver = 2,
    /// The cross-chain relay, allowed to merge remote reputation
    CrossChainCaller = 3,
    /// Allowed to issue badges
    BadgeMinter = 4,
    /// Manages fast-path liquidity pools on the relay
    LiquidityOperator = 5,
}

#[contracttype]
#[derive(Clone)]
enum AccessKey {
    Member(Role, Address),
}

/// Check whether `account` holds `role` in the current contract.
pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    let key = AccessKey::Member(role, account.clone());
    let member = env
        .storage()
        .persistent()
        .get::<_, bool>(&key)
        .unwrap_or(false);
    if member {
        env.storage()
            .persistent()
            .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    }
    member
}

/// Add `account` to `role`. Returns false if it was already a member.
pub fn grant_role(env: &Env, role: Role, account: &Address) -> bool {
    if has_role(env, role, account) {
        return false;
    }
    let key = AccessKey::Member(role, account.clone());
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_AMOUNT);
    true
}

/// Remove `account` from `role`. Returns false if it was not a member.
pub fn revoke_role(env: &Env, role: Role, account: &Address) -> bool {
    if !has_role(env, role, account) {
        return false;
    }
    env.storage()
        .persistent()
        .remove(&AccessKey::Member(role, account.clone()));
    true
}

/// Require `caller`'s signature and membership in at least one of `allowed`.
///
/// Contract callers satisfy `require_auth` implicitly when they are the direct
/// invoker, so the same check covers both accounts and peer contracts.
pub fn authorize(env: &Env, caller: &Address, allowed: &[Role]) -> bool {
    caller.require_auth();
    allowed.iter().any(|role| has_role(env, *role, caller))
}
