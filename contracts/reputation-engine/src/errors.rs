use soroban_sdk::contracterror;

/// Error codes for the reputation engine contract.
/// Uses error codes starting at 200 to avoid conflicts with other contracts.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized
    AlreadyInitialized = 200,
    /// Contract has not been initialized
    NotInitialized = 201,
    /// Caller does not have required role
    Unauthorized = 202,
    /// Rating outside [100, 500]
    InvalidRating = 203,
    /// No reputation recorded for this user
    UserNotFound = 204,
    /// Trade outcome was already applied
    TradeAlreadyRecorded = 205,
    /// Both sides of a trade or dispute are the same account
    InvalidParticipants = 206,
    /// Counter overflow
    Overflow = 207,
    /// Nested call into a guarded entry point
    ReentrancyDetected = 208,
    /// Synced rating totals cannot come from ratings in [100, 500]
    InvalidSyncData = 209,
}
