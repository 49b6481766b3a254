//! Best-effort USD price polling
//!
//! A failed fetch never reaches the caller: the last good price stays
//! published and the failure is recorded on the state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use clawd_types::{ClawdError, ClawdResult, PriceFeedState, PRICE_POLL_INTERVAL};
use serde::Deserialize;
use tokio::sync::{watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::task::PollingHandle;

/// Source of USD prices keyed by token identifier
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_usd_price(&self, token: &str) -> ClawdResult<f64>;
}

// ============================================================================
// DexScreener
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<TradingPair>>,
}

#[derive(Debug, Deserialize)]
struct TradingPair {
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
}

/// Extract `pairs[0].priceUsd` from a DexScreener token response
pub fn parse_price_response(token: &str, body: &str) -> ClawdResult<f64> {
    let response: TokenPairsResponse = serde_json::from_str(body)
        .map_err(|e| ClawdError::price_feed(token, &format!("malformed response: {}", e)))?;

    let raw = response
        .pairs
        .and_then(|pairs| pairs.into_iter().next())
        .and_then(|pair| pair.price_usd)
        .ok_or_else(|| ClawdError::price_unavailable(token))?;

    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ClawdError::price_feed(token, &format!("unparsable priceUsd '{}'", raw)))?;

    if !price.is_finite() || price < 0.0 {
        return Err(ClawdError::price_feed(token, &format!("invalid priceUsd {}", price)));
    }

    Ok(price)
}

/// [`PriceSource`] backed by the DexScreener token endpoint
pub struct DexScreenerSource {
    client: reqwest::Client,
    endpoint: String,
}

impl DexScreenerSource {
    pub fn new(endpoint: &str, timeout: Duration) -> ClawdResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClawdError::generic(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for DexScreenerSource {
    async fn fetch_usd_price(&self, token: &str) -> ClawdResult<f64> {
        let url = format!("{}/{}", self.endpoint, token);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| ClawdError::price_feed(token, &e.to_string()))?
            .text()
            .await
            .map_err(|e| ClawdError::price_feed(token, &e.to_string()))?;

        parse_price_response(token, &body)
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Periodically fetches one token's USD price.
///
/// `start` fetches immediately and then every interval; `stop` aborts the
/// loop and returns only once it has unwound. Dropping the poller stops it.
pub struct PriceFeedPoller<S> {
    source: Arc<S>,
    interval: Duration,
    state: Arc<watch::Sender<PriceFeedState>>,
    task: Mutex<Option<PollingHandle>>,
}

impl<S: PriceSource + 'static> PriceFeedPoller<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_interval(source, PRICE_POLL_INTERVAL)
    }

    pub fn with_interval(source: Arc<S>, interval: Duration) -> Self {
        let (state, _) = watch::channel(PriceFeedState::default());
        Self {
            source,
            interval,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    /// Start polling `token`, replacing any running loop
    pub async fn start(&self, token: impl Into<String>) {
        let token = token.into();
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.stop().await;
        }

        info!("Polling {} USD price every {}s", token, self.interval.as_secs());

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        *task = Some(PollingHandle::new(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                fetch_into(source.as_ref(), &token, &state).await;
            }
        })));
    }

    /// Stop polling; no fetch fires after this returns
    pub async fn stop(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.stop().await;
            debug!("Price feed poller stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .map(|task| task.is_running())
            .unwrap_or(false)
    }

    /// Latest known price state
    pub fn current_price(&self) -> PriceFeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PriceFeedState> {
        self.state.subscribe()
    }
}

async fn fetch_into<S: PriceSource + ?Sized>(
    source: &S,
    token: &str,
    state: &watch::Sender<PriceFeedState>,
) {
    match source.fetch_usd_price(token).await {
        Ok(price) => {
            debug!("{} price: ${}", token, price);
            state.send_modify(|current| *current = current.with_price(price, Utc::now()));
        }
        Err(e) => {
            warn!("Failed to fetch {} price, keeping last value: {}", token, e);
            state.send_modify(|current| *current = current.with_error(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPriceSource;

    const CLAWD: &str = "0x9f86dB9fc6f7c9408e8Fda3Ff8ce4e78ac7a6b07";

    #[test]
    fn test_parse_first_pair() {
        let body = r#"{"schemaVersion":"1.0.0","pairs":[{"priceUsd":"0.002"},{"priceUsd":"0.5"}]}"#;
        assert_eq!(parse_price_response(CLAWD, body).unwrap(), 0.002);
    }

    #[test]
    fn test_parse_empty_and_null_pairs() {
        assert_eq!(
            parse_price_response(CLAWD, r#"{"pairs":[]}"#),
            Err(ClawdError::price_unavailable(CLAWD))
        );
        assert_eq!(
            parse_price_response(CLAWD, r#"{"pairs":null}"#),
            Err(ClawdError::price_unavailable(CLAWD))
        );
        assert_eq!(
            parse_price_response(CLAWD, r#"{}"#),
            Err(ClawdError::price_unavailable(CLAWD))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_price_response(CLAWD, "<html>").is_err());
        assert!(parse_price_response(CLAWD, r#"{"pairs":[{"priceUsd":"n/a"}]}"#).is_err());
        assert!(parse_price_response(CLAWD, r#"{"pairs":[{"priceUsd":"-1"}]}"#).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let source = Arc::new(ScriptedPriceSource::new(vec![Ok(0.002), Ok(0.003)]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(poller.current_price().usd_price_per_token, 0.002);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(poller.current_price().usd_price_per_token, 0.003);

        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_retains_previous_price() {
        let source = Arc::new(ScriptedPriceSource::new(vec![
            Ok(0.002),
            Err(ClawdError::price_feed(CLAWD, "connection reset")),
            Err(ClawdError::price_unavailable(CLAWD)),
        ]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        time::sleep(Duration::from_secs(60)).await;

        let state = poller.current_price();
        assert_eq!(source.calls(), 2);
        assert_eq!(state.usd_price_per_token, 0.002);
        assert!(state.last_error.as_deref().unwrap().contains("connection reset"));

        time::sleep(Duration::from_secs(60)).await;
        let state = poller.current_price();
        assert_eq!(state.usd_price_per_token, 0.002);
        assert!(state.last_updated.is_some());

        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_before_first_success_stays_zero() {
        let source = Arc::new(ScriptedPriceSource::new(vec![Err(ClawdError::price_unavailable(CLAWD))]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;

        let state = poller.current_price();
        assert_eq!(state.usd_price_per_token, 0.0);
        assert!(state.last_updated.is_none());
        assert!(state.last_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_fetches() {
        let source = Arc::new(ScriptedPriceSource::new(vec![]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        assert!(poller.is_running().await);
        poller.stop().await;
        assert!(!poller.is_running().await);

        let calls = source.calls();
        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_fetches_immediately() {
        let source = Arc::new(ScriptedPriceSource::new(vec![]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        poller.stop().await;
        assert_eq!(source.calls(), 1);

        time::sleep(Duration::from_secs(30)).await;
        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(source.last_token().as_deref(), Some(CLAWD));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_loop() {
        let source = Arc::new(ScriptedPriceSource::new(vec![]));
        let poller = PriceFeedPoller::new(source.clone());

        poller.start(CLAWD).await;
        time::sleep(Duration::from_millis(1)).await;
        drop(poller);

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 1);
    }
}
