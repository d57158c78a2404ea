use soroban_sdk::contracterror;

/// Error codes for the trade escrow contract.
/// Uses error codes starting at 100 to avoid conflicts with other contracts.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized
    AlreadyInitialized = 100,
    /// Contract has not been initialized
    NotInitialized = 101,
    /// Caller lacks the required role or is not a party to the trade
    Unauthorized = 102,
    /// No trade with this id
    TradeNotFound = 103,
    /// Operation not valid in the trade's current status
    InvalidStatus = 104,
    /// Rating outside [100, 500]
    InvalidRating = 105,
    /// Payment token is not on the allow-list
    TokenNotSupported = 106,
    /// Amount must be positive
    InsufficientAmount = 107,
    /// Buyer and seller are the same, or one of them is the escrow
    InvalidTrade = 108,
    /// Trade expiry has passed
    TradeExpired = 109,
    /// Deadline for the timeout path has not been reached yet
    TradeNotExpired = 110,
    /// Dispute window after delivery has closed
    DisputeWindowClosed = 111,
    /// This side of the trade has already been rated
    AlreadyRated = 112,
    /// No dispute recorded for this trade
    DisputeNotFound = 113,
    /// Dispute winner is neither the buyer nor the seller
    InvalidWinner = 114,
    /// Platform fee above the allowed maximum
    InvalidFee = 115,
    /// Timing parameter must be positive
    InvalidConfig = 116,
    /// Contract is paused
    Paused = 117,
    /// Nested call into a guarded entry point
    ReentrancyDetected = 118,
    /// Arithmetic overflow
    Overflow = 119,
}
