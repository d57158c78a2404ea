use soroban_sdk::contracttype;

/// Lowest accepted rating (1.00 stars * 100)
pub const MIN_RATING: u32 = 100;

/// Highest accepted rating (5.00 stars * 100)
pub const MAX_RATING: u32 = 500;

/// Basis points denominator
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Number of ledgers in a day (assuming ~5 second block time)
pub const DAY_IN_LEDGERS: u32 = 17280;

/// TTL extension amount for persistent storage (90 days)
pub const PERSISTENT_TTL_AMOUNT: u32 = 90 * DAY_IN_LEDGERS;

/// TTL threshold for persistent storage
pub const PERSISTENT_TTL_THRESHOLD: u32 = PERSISTENT_TTL_AMOUNT - DAY_IN_LEDGERS;

/// TTL extension amount for instance storage (30 days)
pub const INSTANCE_TTL_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

/// TTL threshold before extending instance storage (29 days)
pub const INSTANCE_TTL_THRESHOLD: u32 = INSTANCE_TTL_AMOUNT - DAY_IN_LEDGERS;

/// Reputation tier, ordered from lowest to highest.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Tier {
    None = 0,
    Bronze = 1,
    Silver = 2,
    Gold = 3,
    Platinum = 4,
    Diamond = 5,
}

/// Whether `rating` lies in the accepted `[MIN_RATING, MAX_RATING]` band.
pub fn is_valid_rating(rating: u32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// `amount * bps / 10_000`, or `None` on overflow.
pub fn bps_of(amount: i128, bps: u32) -> Option<i128> {
    amount
        .checked_mul(bps as i128)?
        .checked_div(BPS_DENOMINATOR)
}
