use p2p_shared::{Role, Tier, MAX_RATING, MIN_RATING};
use soroban_sdk::{contracttype, Address, BytesN};

use crate::errors::Error;

/// Storage keys for the reputation engine.
#[contracttype]
#[derive(Clone)]
pub enum StorageKey {
    /// Initialization flag
    Initialized,
    /// Engine configuration
    Config,
    /// Reputation by user
    User(Address),
    /// Ring buffer cursor of a user's trade history
    HistoryCursor(Address),
    /// One ring buffer slot of a user's trade history
    HistoryEntry(Address, u32),
    /// Applied cross-chain sync ids
    ProcessedSync(BytesN<32>),
    /// Trade ids whose outcome has been applied
    RecordedTrade(BytesN<32>),
}

/// Engine configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub admin: Address,
    /// Badge registry that receives mint requests
    pub badge_registry: Address,
    /// Identifier of this ledger, stamped on badges earned locally
    pub local_chain_id: u64,
    pub updated_at: u64,
}

/// Aggregated reputation of one participant
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserReputation {
    pub user: Address,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub disputes_won: u64,
    pub disputes_lost: u64,
    /// Sum of received ratings (each x100)
    pub rating_points: u64,
    pub rating_count: u64,
    /// `rating_points / rating_count`, zero without ratings
    pub average_rating: u32,
    pub last_trade_at: u64,
    pub joined_at: u64,
    pub is_active: bool,
}

impl UserReputation {
    pub fn new(user: Address, now: u64) -> Self {
        UserReputation {
            user,
            total_trades: 0,
            successful_trades: 0,
            disputes_won: 0,
            disputes_lost: 0,
            rating_points: 0,
            rating_count: 0,
            average_rating: 0,
            last_trade_at: 0,
            joined_at: now,
            is_active: true,
        }
    }

    pub fn refresh_average(&mut self) -> Result<(), Error> {
        self.average_rating = if self.rating_count == 0 {
            0
        } else {
            u32::try_from(self.rating_points / self.rating_count)
                .map_err(|_| Error::Overflow)?
        };
        Ok(())
    }
}

/// Whether `points` could be the sum of `count` ratings in `[MIN_RATING, MAX_RATING]`.
pub fn is_valid_rating_total(points: u64, count: u64) -> bool {
    match (
        count.checked_mul(MIN_RATING as u64),
        count.checked_mul(MAX_RATING as u64),
    ) {
        (Some(low), Some(high)) => low <= points && points <= high,
        _ => false,
    }
}

/// One completed trade in a user's history
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeRecord {
    pub trade_id: BytesN<32>,
    pub counterparty: Address,
    pub amount: i128,
    /// Rating this user received for the trade
    pub rating: u32,
    pub timestamp: u64,
    /// True when this user was the buyer
    pub as_buyer: bool,
}

/// Successful trades and average rating (x100) a tier requires.
pub struct TierThreshold {
    pub tier: Tier,
    pub min_trades: u64,
    pub min_rating: u32,
}

/// Tier thresholds, highest first.
pub const TIER_THRESHOLDS: [TierThreshold; 5] = [
    TierThreshold {
        tier: Tier::Diamond,
        min_trades: 250,
        min_rating: 495,
    },
    TierThreshold {
        tier: Tier::Platinum,
        min_trades: 100,
        min_rating: 490,
    },
    TierThreshold {
        tier: Tier::Gold,
        min_trades: 50,
        min_rating: 480,
    },
    TierThreshold {
        tier: Tier::Silver,
        min_trades: 25,
        min_rating: 450,
    },
    TierThreshold {
        tier: Tier::Bronze,
        min_trades: 10,
        min_rating: 400,
    },
];

/// Highest tier whose trade count and rating thresholds are both met.
pub fn eligible_tier(successful_trades: u64, average_rating: u32) -> Tier {
    TIER_THRESHOLDS
        .iter()
        .find(|t| successful_trades >= t.min_trades && average_rating >= t.min_rating)
        .map(|t| t.tier)
        .unwrap_or(Tier::None)
}

/// Roles permitted to call each gated entry point.
pub mod policy {
    use super::Role;

    pub const REGISTER_USER: &[Role] = &[Role::EscrowCaller, Role::CrossChainCaller];
    pub const RECORD_TRADE: &[Role] = &[Role::EscrowCaller];
    pub const RECORD_DISPUTE: &[Role] = &[Role::DisputeResolver, Role::EscrowCaller];
    pub const SYNC_REPUTATION: &[Role] = &[Role::CrossChainCaller];
    pub const CONFIGURE: &[Role] = &[Role::Admin];
}
