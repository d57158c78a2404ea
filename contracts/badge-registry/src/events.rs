use p2p_shared::{Role, Tier};
use soroban_sdk::{contractevent, Address};

/// Event emitted when the registry is initialized
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    #[topic]
    pub admin: Address,
}

/// Event emitted when a badge is minted
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BadgeMintedEvent {
    #[topic]
    pub owner: Address,
    #[topic]
    pub tier: Tier,
    pub token_id: u64,
    pub trades_at_mint: u64,
    pub rating_at_mint: u32,
    pub source_chain: u64,
}

/// Event emitted when a role is granted
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleGrantedEvent {
    #[topic]
    pub role: Role,
    #[topic]
    pub account: Address,
}

/// Event emitted when a role is revoked
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRevokedEvent {
    #[topic]
    pub role: Role,
    #[topic]
    pub account: Address,
}
