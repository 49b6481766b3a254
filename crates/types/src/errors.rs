use thiserror::Error;

// ============================================================================
// Main Error Enum
// ============================================================================

/// Error enum shared by the contract reader, price feed and configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClawdError {
    // ========================================================================
    // Math Errors
    // ========================================================================

    /// Arithmetic overflow occurred
    #[error("Math overflow in '{operation}' with values: {values:?}")]
    MathOverflow { operation: String, values: Vec<String> },

    // ========================================================================
    // Contract State Errors
    // ========================================================================

    /// Snapshot violates a contract-level invariant
    #[error("Inconsistent contract snapshot: {reason}")]
    InconsistentSnapshot { reason: String },

    /// A snapshot field has not been read yet
    #[error("Contract field '{field}' not yet known")]
    FieldUnknown { field: String },

    /// Return data from a contract call could not be decoded
    #[error("Failed to decode '{function}' return data: {reason}")]
    AbiDecode { function: String, reason: String },

    // ========================================================================
    // Validation Errors
    // ========================================================================

    /// Invalid parameter
    #[error("Invalid parameter '{parameter}': got '{value}', expected '{expected}'")]
    InvalidParameter { parameter: String, value: String, expected: String },

    // ========================================================================
    // Network and RPC Errors
    // ========================================================================

    /// RPC communication error
    #[error("RPC error (code {code:?}): {message}")]
    RpcError { message: String, code: Option<i64> },

    /// Price feed request failed
    #[error("Price feed error for {token}: {reason}")]
    PriceFeed { token: String, reason: String },

    /// Price feed answered without any usable price
    #[error("No price available for {token}")]
    PriceUnavailable { token: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    /// Invalid configuration
    #[error("Invalid configuration for '{component}': {reason}")]
    InvalidConfiguration { component: String, reason: String },

    // ========================================================================
    // General Errors
    // ========================================================================

    /// Generic error with optional context
    #[error("Error: {message}")]
    Generic { message: String, context: Option<String> },
}

impl ClawdError {
    /// Create a math overflow error with context
    pub fn math_overflow(operation: &str, values: &[&str]) -> Self {
        Self::MathOverflow {
            operation: operation.to_string(),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create an inconsistent snapshot error
    pub fn inconsistent_snapshot(reason: &str) -> Self {
        Self::InconsistentSnapshot {
            reason: reason.to_string(),
        }
    }

    /// Create a field unknown error
    pub fn field_unknown(field: &str) -> Self {
        Self::FieldUnknown {
            field: field.to_string(),
        }
    }

    /// Create an ABI decode error
    pub fn abi_decode(function: &str, reason: &str) -> Self {
        Self::AbiDecode {
            function: function.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, value: &str, expected: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an RPC error
    pub fn rpc_error(message: &str, code: Option<i64>) -> Self {
        Self::RpcError {
            message: message.to_string(),
            code,
        }
    }

    /// Create a price feed error
    pub fn price_feed(token: &str, reason: &str) -> Self {
        Self::PriceFeed {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a price unavailable error
    pub fn price_unavailable(token: &str) -> Self {
        Self::PriceUnavailable {
            token: token.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(component: &str, reason: &str) -> Self {
        Self::InvalidConfiguration {
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a generic error
    pub fn generic(message: &str) -> Self {
        Self::Generic {
            message: message.to_string(),
            context: None,
        }
    }

    /// Create a parse error
    pub fn parse_error(message: &str, context: Option<&str>) -> Self {
        Self::Generic {
            message: format!("Parse error: {}", message),
            context: context.map(|s| s.to_string()),
        }
    }

    /// RPC code carried by the error, if any
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::RpcError { code, .. } => *code,
            _ => None,
        }
    }
}
