use p2p_shared::{Role, Tier};
use soroban_sdk::{contracttype, Address};

/// Storage keys for the badge registry.
#[contracttype]
#[derive(Clone)]
pub enum StorageKey {
    /// Initialization flag
    Initialized,
    /// Admin address recorded at initialization
    Admin,
    /// Last issued token id
    TokenCounter,
    /// Badge record by token id
    Badge(u64),
    /// Token id held by an owner for one tier
    OwnerTier(Address, Tier),
    /// Token ids held by an owner, in mint order
    OwnerBadges(Address),
    /// Highest tier ever minted to an owner
    HighestTier(Address),
}

/// A non-transferable credential proving its owner reached a tier.
///
/// There is no transfer or approval entry point: a badge stays with the
/// account it was minted to.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Badge {
    pub token_id: u64,
    pub owner: Address,
    pub tier: Tier,
    /// Successful trades when the tier was reached
    pub trades_at_mint: u64,
    /// Average rating (x100) when the tier was reached
    pub rating_at_mint: u32,
    pub minted_at: u64,
    /// Ledger whose activity earned the badge
    pub source_chain: u64,
}

/// Roles permitted to call each gated entry point.
pub mod policy {
    use super::Role;

    pub const MINT_BADGE: &[Role] = &[Role::BadgeMinter];
    pub const MANAGE_ROLES: &[Role] = &[Role::Admin];
}
