use soroban_sdk::contracterror;

/// Error codes for the badge registry contract.
/// Uses error codes starting at 300 to avoid conflicts with other contracts.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized
    AlreadyInitialized = 300,
    /// Contract has not been initialized
    NotInitialized = 301,
    /// Caller does not have required role
    Unauthorized = 302,
    /// Recipient cannot hold badges
    InvalidRecipient = 303,
    /// Tier `None` cannot be minted
    InvalidTier = 304,
    /// Recipient already holds a badge of this tier
    BadgeAlreadyExists = 305,
    /// Badge not found
    BadgeNotFound = 306,
    /// Token id counter overflow
    Overflow = 307,
}
