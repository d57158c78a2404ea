use p2p_shared::Role;
use soroban_sdk::{contractevent, Address, BytesN};

/// Event emitted when the relay is initialized
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    #[topic]
    pub admin: Address,
    pub router: Address,
    pub reputation_engine: Address,
    pub local_chain_id: u64,
}

/// Event emitted when a route to a remote chain is added or changed
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainConfiguredEvent {
    #[topic]
    pub chain_id: u64,
    pub bridge: Address,
    pub local_token: Address,
    pub active: bool,
}

/// Event emitted when tokens are locked and a transfer message is sent
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensBridgedEvent {
    #[topic]
    pub message_id: BytesN<32>,
    #[topic]
    pub sender: Address,
    pub dest_chain: u64,
    pub recipient: Address,
    pub amount: i128,
    pub fee: i128,
    pub fast: bool,
}

/// Event emitted when a user's reputation is exported to another chain
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReputationExportedEvent {
    #[topic]
    pub message_id: BytesN<32>,
    #[topic]
    pub user: Address,
    pub dest_chain: u64,
    pub successful_trades: u64,
}

/// Event emitted when an inbound message is accepted
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageReceivedEvent {
    #[topic]
    pub message_id: BytesN<32>,
    #[topic]
    pub source_chain: u64,
}

/// Event emitted when an inbound transfer is paid out
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensReleasedEvent {
    #[topic]
    pub message_id: BytesN<32>,
    #[topic]
    pub recipient: Address,
    pub token: Address,
    pub amount: i128,
}

/// Event emitted when remote reputation is handed to the engine
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReputationImportedEvent {
    #[topic]
    pub message_id: BytesN<32>,
    #[topic]
    pub user: Address,
    pub sync_id: BytesN<32>,
}

/// Event emitted when fast-lane liquidity changes
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidityUpdatedEvent {
    #[topic]
    pub chain_id: u64,
    #[topic]
    pub operator: Address,
    /// Positive when added, negative when removed
    pub delta: i128,
    pub pool_balance: i128,
}

/// Event emitted when the bridge fee changes
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeFeeUpdatedEvent {
    pub old_fee_bps: u32,
    pub new_fee_bps: u32,
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
