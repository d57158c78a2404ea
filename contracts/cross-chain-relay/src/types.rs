use p2p_shared::Role;
use soroban_sdk::{contracttype, Address, BytesN};

/// Highest bridge fee the admin may configure (5%)
pub const MAX_BRIDGE_FEE_BPS: u32 = 500;

/// Storage keys for the cross-chain relay.
#[contracttype]
#[derive(Clone)]
pub enum StorageKey {
    /// Initialization flag
    Initialized,
    /// Relay configuration
    Config,
    /// Route settings by remote chain id
    Chain(u64),
    /// Fast-lane liquidity by remote chain id
    Pool(u64),
    /// Sum of the pools held in one token
    Reserved(Address),
    /// Outbound transfers by router message id
    Pending(BytesN<32>),
    /// Inbound message ids already applied
    Processed(BytesN<32>),
}

/// Relay configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayConfig {
    pub admin: Address,
    /// Message router that carries payloads between ledgers
    pub router: Address,
    /// Engine that receives remote reputation
    pub reputation_engine: Address,
    /// Receives bridge fees
    pub fee_collector: Address,
    pub bridge_fee_bps: u32,
    /// Identifier of this ledger
    pub local_chain_id: u64,
    pub updated_at: u64,
}

/// Route to one remote chain
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Relay deployed on the remote chain, the only accepted message source
    pub bridge: Address,
    /// Token on this ledger that represents value moving to and from the chain
    pub local_token: Address,
    /// Outbound messages are refused while inactive
    pub active: bool,
}

/// Outbound transfer awaiting delivery on the remote chain
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingTransfer {
    pub message_id: BytesN<32>,
    pub sender: Address,
    pub recipient: Address,
    pub dest_chain: u64,
    pub token: Address,
    /// Amount delivered on the remote chain, after the fee
    pub amount: i128,
    pub fee: i128,
    /// Whether the fast lane carried the message
    pub fast: bool,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenTransferPayload {
    pub sender: Address,
    pub recipient: Address,
    pub amount: i128,
}

/// Reputation counters exported from the source chain
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReputationSyncPayload {
    pub user: Address,
    pub successful_trades: u64,
    pub rating_points: u64,
    pub rating_count: u64,
}

/// Message body exchanged between relays, XDR-encoded on the wire
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelayPayload {
    TokenTransfer(TokenTransferPayload),
    ReputationSync(ReputationSyncPayload),
}

/// Roles permitted to call each gated entry point.
pub mod policy {
    use super::Role;

    pub const MANAGE_LIQUIDITY: &[Role] = &[Role::LiquidityOperator];
    pub const CONFIGURE: &[Role] = &[Role::Admin];
}
