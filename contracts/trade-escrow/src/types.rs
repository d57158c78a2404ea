use p2p_shared::{Role, MAX_RATING};
use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

/// Highest platform fee the admin may configure (10%)
pub const MAX_PLATFORM_FEE_BPS: u32 = 1_000;

/// Trade lifetime used when the buyer passes zero (7 days)
pub const DEFAULT_TRADE_EXPIRY: u64 = 7 * 24 * 60 * 60;

/// Time after delivery during which either party may dispute (3 days)
pub const DEFAULT_DISPUTE_WINDOW: u64 = 3 * 24 * 60 * 60;

/// Time after delivery after which anyone may release funds to the seller (7 days)
pub const DEFAULT_AUTO_RELEASE_DELAY: u64 = 7 * 24 * 60 * 60;

/// Rating recorded for the seller when funds are auto-released
pub const AUTO_RELEASE_RATING: u32 = MAX_RATING;

/// Storage keys for the trade escrow.
#[contracttype]
#[derive(Clone)]
pub enum StorageKey {
    /// Initialization flag
    Initialized,
    /// Escrow configuration
    Config,
    /// Circuit breaker
    Paused,
    /// Trade by id
    Trade(BytesN<32>),
    /// Dispute by trade id
    Dispute(BytesN<32>),
    /// Trades created by a buyer so far, mixed into trade ids
    BuyerNonce(Address),
    /// Trade ids by buyer
    BuyerTrades(Address),
    /// Trade ids by seller
    SellerTrades(Address),
    /// Payment token allow-list
    SupportedToken(Address),
    /// Number of trades ever created
    TradeCount,
    /// Platform fees paid out, by token
    FeesCollected(Address),
}

/// Trade lifecycle.
///
/// `Created -> SellerAccepted -> Delivered -> Completed | Disputed`,
/// `Disputed -> Resolved`, `Created -> Cancelled`, and `Created | SellerAccepted -> Expired`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TradeStatus {
    Created = 0,
    SellerAccepted = 1,
    Delivered = 2,
    Completed = 3,
    Disputed = 4,
    Resolved = 5,
    Cancelled = 6,
    Expired = 7,
}

impl TradeStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: &TradeStatus) -> bool {
        use TradeStatus::*;
        matches!(
            (self, next),
            (Created, SellerAccepted)
                | (SellerAccepted, Delivered)
                | (Delivered, Completed)
                | (Delivered, Disputed)
                | (Disputed, Resolved)
                | (Created, Cancelled)
                | (Created, Expired)
                | (SellerAccepted, Expired)
        )
    }
}

/// A peer-to-peer trade whose payment is held by the escrow
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trade {
    pub id: BytesN<32>,
    pub buyer: Address,
    pub seller: Address,
    pub token: Address,
    /// Amount locked by the buyer
    pub amount: i128,
    /// Fee taken from `amount` when the seller is paid
    pub platform_fee: i128,
    pub created_at: u64,
    pub accepted_at: u64,
    pub delivered_at: u64,
    pub completed_at: u64,
    pub expires_at: u64,
    pub status: TradeStatus,
    pub description: String,
    pub delivery_proof: String,
    /// Rating the buyer gave the seller, zero until rated
    pub seller_rating: u32,
    /// Rating the seller gave the buyer, zero until rated
    pub buyer_rating: u32,
}

impl Trade {
    pub fn is_party(&self, account: &Address) -> bool {
        *account == self.buyer || *account == self.seller
    }

    /// What the seller receives when paid out
    pub fn seller_payout(&self) -> i128 {
        self.amount - self.platform_fee
    }
}

/// Contest of a delivered trade
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispute {
    pub trade_id: BytesN<32>,
    pub initiator: Address,
    pub reason: String,
    pub buyer_evidence: Vec<String>,
    pub seller_evidence: Vec<String>,
    pub winner: Option<Address>,
    pub resolved: bool,
    pub created_at: u64,
    pub resolved_at: u64,
}

/// Escrow configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowConfig {
    pub admin: Address,
    /// Reputation engine that receives trade outcomes
    pub reputation_engine: Address,
    /// Receives platform fees
    pub fee_collector: Address,
    pub platform_fee_bps: u32,
    /// Trade lifetime when the buyer does not choose one (seconds)
    pub default_expiry: u64,
    /// Dispute window after delivery (seconds)
    pub dispute_window: u64,
    /// Delay after delivery before funds may be auto-released (seconds)
    pub auto_release_delay: u64,
    pub updated_at: u64,
}

/// Roles permitted to call each gated entry point.
pub mod policy {
    use super::Role;

    pub const RESOLVE_DISPUTE: &[Role] = &[Role::DisputeResolver];
    pub const CONFIGURE: &[Role] = &[Role::Admin];
}
