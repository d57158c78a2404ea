use soroban_sdk::contracterror;

/// Error codes for the cross-chain relay contract.
/// Uses error codes starting at 400 to avoid conflicts with other contracts.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized
    AlreadyInitialized = 400,
    /// Contract has not been initialized
    NotInitialized = 401,
    /// Caller does not have required role
    Unauthorized = 402,
    /// Destination chain is unknown or inactive
    ChainNotSupported = 403,
    /// Amount must be positive and exceed the bridge fee
    InsufficientAmount = 404,
    /// Relay or pool balance cannot cover the amount
    InsufficientLiquidity = 405,
    /// Message id was already applied
    MessageAlreadyProcessed = 406,
    /// Message did not come from the configured peer bridge
    InvalidMessageSource = 407,
    /// Message body could not be decoded
    InvalidPayload = 408,
    /// Bridge fee above the allowed maximum
    InvalidFee = 409,
    /// No pending transfer with this message id
    TransferNotFound = 410,
    /// Chain id refers to this ledger
    InvalidChain = 411,
    /// Arithmetic overflow
    Overflow = 412,
    /// Nested call into a guarded entry point
    ReentrancyDetected = 413,
    /// Route token cannot change while its pool holds liquidity
    PoolNotEmpty = 414,
}
