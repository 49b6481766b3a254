//! Lightweight EVM JSON-RPC client
//!
//! Implements only the methods the console needs for contract reads, chain
//! switching and transaction submission.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use clawd_types::{ClawdError, ClawdResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Lightweight JSON-RPC client over HTTP
pub struct EvmRpcClient {
    url: String,
    agent: ureq::Agent,
    next_id: AtomicU64,
}

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// RPC error structure
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Transaction handed to the wallet endpoint for signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Subset of a transaction receipt the console inspects
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<U64>,
    /// 1 on success, 0 on revert
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(false)
    }
}

impl EvmRpcClient {
    /// Create a new JSON-RPC client
    pub fn new(url: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .build();

        Self {
            url,
            agent,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a JSON-RPC call whose result may legitimately be null
    pub async fn call_optional<T>(&self, method: &str, params: Value) -> ClawdResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params
        });

        debug!("RPC call: {} with params: {:?}", method, params);

        // ureq is sync, keep it off the async workers
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || {
                let response = match agent
                    .post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)
                {
                    Ok(response) => response,
                    // Wallet endpoints report JSON-RPC errors with 4xx bodies
                    Err(ureq::Error::Status(_, response)) => response,
                    Err(e) => return Err(e.to_string()),
                };

                response.into_string().map_err(|e| e.to_string())
            }
        })
        .await
        .map_err(|e| ClawdError::rpc_error(&format!("RPC task failed: {}", e), None))?
        .map_err(|e| ClawdError::rpc_error(&format!("{} transport error: {}", method, e), None))?;

        let rpc_response: RpcResponse<T> = serde_json::from_str(&response_body)
            .map_err(|e| ClawdError::parse_error(&e.to_string(), Some(method)))?;

        if let Some(error) = rpc_response.error {
            return Err(ClawdError::rpc_error(&error.message, Some(error.code)));
        }

        Ok(rpc_response.result)
    }

    /// Make a JSON-RPC call that must return a result
    pub async fn call<T>(&self, method: &str, params: Value) -> ClawdResult<T>
    where
        T: DeserializeOwned,
    {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| ClawdError::rpc_error(&format!("No result in {} response", method), None))
    }

    /// Current chain id of the endpoint
    pub async fn chain_id(&self) -> ClawdResult<u64> {
        let chain_id: U64 = self.call("eth_chainId", json!([])).await?;
        Ok(chain_id.to::<u64>())
    }

    /// Accounts exposed by the endpoint
    pub async fn accounts(&self) -> ClawdResult<Vec<Address>> {
        self.call("eth_accounts", json!([])).await
    }

    /// Read-only contract call against the latest block
    pub async fn eth_call(&self, to: Address, data: Bytes) -> ClawdResult<Bytes> {
        self.call("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    /// Ask the endpoint to switch chains (EIP-3326)
    pub async fn switch_chain(&self, chain_id: u64) -> ClawdResult<()> {
        let _: Option<Value> = self
            .call_optional(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("{:#x}", chain_id) }]),
            )
            .await?;
        Ok(())
    }

    /// Submit a transaction for signing and broadcast
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> ClawdResult<TxHash> {
        self.call("eth_sendTransaction", json!([tx])).await
    }

    /// Receipt for a transaction, `None` while pending
    pub async fn transaction_receipt(&self, hash: TxHash) -> ClawdResult<Option<TransactionReceipt>> {
        self.call_optional("eth_getTransactionReceipt", json!([hash]))
            .await
    }
}
