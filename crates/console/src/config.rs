use std::fs;
use std::time::Duration;

use alloy_primitives::Address;
use clawd_types::{
    ClawdError, ClawdResult, BASE_CHAIN_ID, BASE_NETWORK_NAME, BASE_WETH_ADDRESS,
    CLAWD_TOKEN_ADDRESS, CONTRACT_POLL_INTERVAL, DEXSCREENER_TOKENS_ENDPOINT, NATIVE_SYMBOL,
    PRICE_POLL_INTERVAL, RECEIPT_POLL_INTERVAL,
};
use serde::{Deserialize, Serialize};

/// Console configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Target network the console operates against
    pub network: NetworkConfig,

    /// ClawdPFP contract
    pub contract: ContractConfig,

    /// USD price feed
    pub price_feed: PriceFeedConfig,

    /// Wallet endpoint used for chain switching and transaction submission
    pub wallet: WalletConfig,
}

/// Target network
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Display name, e.g. "Base"
    pub name: String,

    /// EIP-155 chain id
    pub chain_id: u64,

    /// JSON-RPC endpoint used for contract reads
    pub rpc_url: String,

    /// Native currency symbol
    pub native_symbol: String,
}

/// Contract location and refresh cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractConfig {
    /// Deployed ClawdPFP address
    pub address: Address,

    /// Seconds between contract state refreshes
    pub poll_interval_secs: u64,
}

/// External USD price feed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceFeedConfig {
    /// Token endpoint; the token identifier is appended as a path segment
    pub endpoint: String,

    /// Token burned on every mint
    pub burn_token: String,

    /// Token used to price the native currency
    pub native_token: String,

    /// Seconds between fetches
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Wallet endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
    /// EIP-1193 style JSON-RPC endpoint holding the signing account
    pub endpoint: String,

    /// Milliseconds between receipt polls while awaiting confirmation
    pub receipt_poll_interval_ms: u64,
}

impl ConsoleConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> ClawdResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ClawdError::generic(&format!("Failed to read config file {}: {}", path, e)))?;

        let config: ConsoleConfig = toml::from_str(&content)
            .map_err(|e| ClawdError::parse_error(&format!("Failed to parse config file {}: {}", path, e), None))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> ClawdResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClawdError::parse_error(&format!("Failed to serialize config: {}", e), None))?;
        fs::write(path, content)
            .map_err(|e| ClawdError::generic(&format!("Failed to write config file {}: {}", path, e)))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ClawdResult<()> {
        self.network.validate()?;
        self.contract.validate()?;
        self.price_feed.validate()?;
        self.wallet.validate()?;
        Ok(())
    }
}

impl NetworkConfig {
    fn validate(&self) -> ClawdResult<()> {
        if self.chain_id == 0 {
            return Err(ClawdError::invalid_parameter("network.chain_id", "0", "greater than 0"));
        }

        if self.name.is_empty() {
            return Err(ClawdError::invalid_parameter("network.name", "empty", "non-empty string"));
        }

        if !is_http_url(&self.rpc_url) {
            return Err(ClawdError::invalid_parameter("network.rpc_url", &self.rpc_url, "http(s) URL"));
        }

        Ok(())
    }
}

impl ContractConfig {
    fn validate(&self) -> ClawdResult<()> {
        if self.address == Address::ZERO {
            return Err(ClawdError::invalid_configuration(
                "contract",
                "address is unset; point contract.address at the deployed ClawdPFP contract",
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ClawdError::invalid_parameter("contract.poll_interval_secs", "0", "greater than 0"));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl PriceFeedConfig {
    fn validate(&self) -> ClawdResult<()> {
        if !is_http_url(&self.endpoint) {
            return Err(ClawdError::invalid_parameter("price_feed.endpoint", &self.endpoint, "http(s) URL"));
        }

        if self.burn_token.is_empty() || self.native_token.is_empty() {
            return Err(ClawdError::invalid_parameter("price_feed tokens", "empty", "token identifiers"));
        }

        if self.poll_interval_secs == 0 {
            return Err(ClawdError::invalid_parameter("price_feed.poll_interval_secs", "0", "greater than 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ClawdError::invalid_parameter("price_feed.request_timeout_secs", "0", "greater than 0"));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl WalletConfig {
    fn validate(&self) -> ClawdResult<()> {
        if !is_http_url(&self.endpoint) {
            return Err(ClawdError::invalid_parameter("wallet.endpoint", &self.endpoint, "http(s) URL"));
        }

        if self.receipt_poll_interval_ms == 0 {
            return Err(ClawdError::invalid_parameter("wallet.receipt_poll_interval_ms", "0", "greater than 0"));
        }

        Ok(())
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            contract: ContractConfig::default(),
            price_feed: PriceFeedConfig::default(),
            wallet: WalletConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: BASE_NETWORK_NAME.to_string(),
            chain_id: BASE_CHAIN_ID,
            rpc_url: "https://mainnet.base.org".to_string(),
            native_symbol: NATIVE_SYMBOL.to_string(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            poll_interval_secs: CONTRACT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEXSCREENER_TOKENS_ENDPOINT.to_string(),
            burn_token: CLAWD_TOKEN_ADDRESS.to_string(),
            native_token: BASE_WETH_ADDRESS.to_string(),
            poll_interval_secs: PRICE_POLL_INTERVAL.as_secs(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            receipt_poll_interval_ms: RECEIPT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

/// Create example configuration file.
///
/// The contract address is left unset and must be filled in before use.
pub fn create_example_config(path: &str) -> ClawdResult<()> {
    ConsoleConfig::default().save(path)
}
