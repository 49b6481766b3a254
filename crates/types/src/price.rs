//! Latest known USD price for a token

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State published by a price feed poller.
///
/// The price is only ever replaced by a successful fetch; failures keep the
/// previous value and record the error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceFeedState {
    /// Last successfully fetched USD price, 0.0 before the first success
    pub usd_price_per_token: f64,
    /// Time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared on success
    pub last_error: Option<String>,
}

impl PriceFeedState {
    /// State after a successful fetch
    pub fn with_price(&self, price: f64, at: DateTime<Utc>) -> Self {
        Self {
            usd_price_per_token: price,
            last_updated: Some(at),
            last_error: None,
        }
    }

    /// State after a failed fetch; the previous price is retained
    pub fn with_error(&self, error: impl Into<String>) -> Self {
        Self {
            usd_price_per_token: self.usd_price_per_token,
            last_updated: self.last_updated,
            last_error: Some(error.into()),
        }
    }

    pub fn has_price(&self) -> bool {
        self.usd_price_per_token > 0.0
    }
}
