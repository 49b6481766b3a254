//! Wallet capability
//!
//! The console never holds keys. Signing, chain switching and account
//! selection are delegated to an injected wallet.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use clawd_types::RECEIPT_POLL_INTERVAL;
use tracing::{debug, info, warn};

use crate::error::SubmissionError;
use crate::rpc_client::{EvmRpcClient, TransactionRequest};

#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Selected account, `None` when no wallet is connected
    async fn connected_address(&self) -> Option<Address>;

    /// Chain the wallet is currently on
    async fn current_chain_id(&self) -> Option<u64>;

    /// Ask the wallet to move to `chain_id`; resolves once the wallet answers
    async fn switch_network(&self, chain_id: u64) -> Result<(), SubmissionError>;

    /// Sign, broadcast and wait for the transaction to be confirmed
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, SubmissionError>;
}

/// Wallet reached through an EIP-1193 style JSON-RPC endpoint
pub struct RpcWallet {
    client: Arc<EvmRpcClient>,
    receipt_poll_interval: Duration,
}

impl RpcWallet {
    pub fn new(client: Arc<EvmRpcClient>) -> Self {
        Self::with_receipt_poll_interval(client, RECEIPT_POLL_INTERVAL)
    }

    pub fn with_receipt_poll_interval(client: Arc<EvmRpcClient>, receipt_poll_interval: Duration) -> Self {
        Self {
            client,
            receipt_poll_interval,
        }
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxHash, SubmissionError> {
        loop {
            match self.client.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.succeeded() => {
                    info!(
                        "Transaction {} confirmed in block {:?}",
                        tx_hash, receipt.block_number
                    );
                    return Ok(tx_hash);
                }
                Ok(Some(_)) => return Err(SubmissionError::Reverted { tx_hash }),
                Ok(None) => debug!("Transaction {} pending", tx_hash),
                Err(e) => warn!("Receipt lookup for {} failed: {}", tx_hash, e),
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl WalletCapability for RpcWallet {
    async fn connected_address(&self) -> Option<Address> {
        match self.client.accounts().await {
            Ok(accounts) => accounts.into_iter().next(),
            Err(e) => {
                debug!("Wallet accounts unavailable: {}", e);
                None
            }
        }
    }

    async fn current_chain_id(&self) -> Option<u64> {
        match self.client.chain_id().await {
            Ok(chain_id) => Some(chain_id),
            Err(e) => {
                debug!("Wallet chain id unavailable: {}", e);
                None
            }
        }
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), SubmissionError> {
        self.client.switch_chain(chain_id).await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, SubmissionError> {
        let tx_hash = self.client.send_transaction(&tx).await?;
        info!("Transaction {} submitted", tx_hash);
        self.wait_for_receipt(tx_hash).await
    }
}
