use p2p_shared::{Role, Tier};
use soroban_sdk::{contractevent, Address, BytesN};

/// Event emitted when the engine is initialized
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    #[topic]
    pub admin: Address,
    pub badge_registry: Address,
    pub local_chain_id: u64,
}

/// Event emitted when the badge registry address changes
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BadgeRegistryUpdatedEvent {
    #[topic]
    pub admin: Address,
    pub badge_registry: Address,
}

/// Event emitted the first time a user is seen
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserRegisteredEvent {
    #[topic]
    pub user: Address,
    pub joined_at: u64,
}

/// Event emitted when a completed trade updates a user's reputation
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReputationUpdatedEvent {
    #[topic]
    pub user: Address,
    #[topic]
    pub trade_id: BytesN<32>,
    pub rating_received: u32,
    pub successful_trades: u64,
    pub average_rating: u32,
}

/// Event emitted when a dispute outcome is recorded
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeRecordedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub winner: Address,
    pub loser: Address,
}

/// Event emitted when remote reputation is merged
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReputationSyncedEvent {
    #[topic]
    pub user: Address,
    #[topic]
    pub source_chain: u64,
    pub sync_id: BytesN<32>,
    pub added_trades: u64,
    pub average_rating: u32,
}

/// Event emitted when a user is issued a badge for a new tier
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierPromotedEvent {
    #[topic]
    pub user: Address,
    #[topic]
    pub tier: Tier,
    pub token_id: u64,
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
