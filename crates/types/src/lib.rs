/// Shared types for the ClawdPFP mint console
///
/// This crate provides the value objects, constants, and error types
/// that are used across the contract reader, price feed, and orchestrator.

pub mod constants;
pub mod errors;
pub mod intent;
pub mod price;
pub mod selection;
pub mod snapshot;
pub mod units;

// Re-export all public types
pub use constants::*;
pub use errors::*;
pub use intent::*;
pub use price::*;
pub use selection::*;
pub use snapshot::*;
pub use units::*;

/// Result type alias using the shared error type
pub type ClawdResult<T> = std::result::Result<T, ClawdError>;
