use p2p_shared::Role;
use soroban_sdk::{contractevent, Address, BytesN, String};

/// Event emitted when the escrow is initialized
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    #[topic]
    pub admin: Address,
    pub reputation_engine: Address,
    pub fee_collector: Address,
    pub platform_fee_bps: u32,
}

/// Event emitted when a buyer locks funds for a new trade
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeCreatedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    #[topic]
    pub buyer: Address,
    pub seller: Address,
    pub token: Address,
    pub amount: i128,
    pub platform_fee: i128,
    pub expires_at: u64,
}

/// Event emitted when the seller accepts a trade
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeAcceptedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    #[topic]
    pub seller: Address,
}

/// Event emitted when the seller marks a trade delivered
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeDeliveredEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub delivery_proof: String,
    pub delivered_at: u64,
}

/// Event emitted when the seller is paid for a delivered trade
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeCompletedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub seller_payout: i128,
    pub platform_fee: i128,
    pub seller_rating: u32,
    /// True when released after the buyer stayed silent
    pub auto_released: bool,
}

/// Event emitted when the seller rates the buyer
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuyerRatedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub buyer_rating: u32,
}

/// Event emitted when the buyer cancels before acceptance
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeCancelledEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub refund: i128,
}

/// Event emitted when an expired trade is refunded
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeExpiredEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    pub claimed_by: Address,
    pub refund: i128,
}

/// Event emitted when a party disputes a delivered trade
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeRaisedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    #[topic]
    pub initiator: Address,
    pub reason: String,
}

/// Event emitted when a party adds evidence to an open dispute
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvidenceSubmittedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    #[topic]
    pub submitter: Address,
}

/// Event emitted when a dispute is settled
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeResolvedEvent {
    #[topic]
    pub trade_id: BytesN<32>,
    #[topic]
    pub winner: Address,
    pub resolver: Address,
    pub seller_payout: i128,
    pub buyer_refund: i128,
    pub platform_fee: i128,
}

/// Event emitted when the platform fee changes
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlatformFeeUpdatedEvent {
    pub old_fee_bps: u32,
    pub new_fee_bps: u32,
}

/// Event emitted when expiry, dispute window or auto-release delay change
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimingUpdatedEvent {
    pub default_expiry: u64,
    pub dispute_window: u64,
    pub auto_release_delay: u64,
}

/// Event emitted when the fee collector changes
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeeCollectorUpdatedEvent {
    #[topic]
    pub fee_collector: Address,
}

/// Event emitted when a token is added to or removed from the allow-list
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenSupportUpdatedEvent {
    #[topic]
    pub token: Address,
    pub supported: bool,
}

/// Event emitted when the circuit breaker is toggled
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseUpdatedEvent {
    pub paused: bool,
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
