//! Error types for wallet write paths

use alloy_primitives::TxHash;
use clawd_types::ClawdError;
use thiserror::Error;

/// EIP-1193 code for a request the user declined
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Request rejected by user")]
    UserRejected,

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid mint request: {0}")]
    InvalidRequest(String),
}

impl From<ClawdError> for SubmissionError {
    fn from(err: ClawdError) -> Self {
        match err.rpc_code() {
            Some(USER_REJECTED_CODE) => SubmissionError::UserRejected,
            _ => match err {
                ClawdError::MathOverflow { .. } | ClawdError::FieldUnknown { .. } => {
                    SubmissionError::InvalidRequest(err.to_string())
                }
                other => SubmissionError::Rpc(other.to_string()),
            },
        }
    }
}
