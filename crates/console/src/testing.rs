//! In-memory doubles for the contract, wallet and price feed

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use clawd_types::{tokens_to_wei, ClawdError, ClawdResult};
use tokio::sync::Notify;

use crate::contract::ContractReads;
use crate::error::SubmissionError;
use crate::price_feed::PriceSource;
use crate::rpc_client::TransactionRequest;
use crate::wallet::WalletCapability;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Contract
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockContractState {
    pub mint_price_wei: U256,
    pub burn_per_mint_wei: U256,
    pub total_minted: U256,
    pub total_burned: U256,
    pub treasury_balance_wei: U256,
    pub max_supply: U256,
    pub mint_active: bool,
    pub owner: Address,
    pub fail_mint_price: bool,
    pub fail_all: bool,
}

impl Default for MockContractState {
    fn default() -> Self {
        Self {
            mint_price_wei: U256::from(10_000_000_000_000_000u128),
            burn_per_mint_wei: tokens_to_wei(1_000),
            total_minted: U256::from(3u64),
            total_burned: tokens_to_wei(3_000),
            treasury_balance_wei: tokens_to_wei(97_000),
            max_supply: U256::from(100u64),
            mint_active: true,
            owner: Address::repeat_byte(0x11),
            fail_mint_price: false,
            fail_all: false,
        }
    }
}

/// Contract whose view functions answer from memory
#[derive(Debug, Default)]
pub struct MockContract {
    state: Mutex<MockContractState>,
}

impl MockContract {
    pub fn state(&self) -> MockContractState {
        lock(&self.state).clone()
    }

    pub fn set_total_minted(&self, total_minted: U256) {
        lock(&self.state).total_minted = total_minted;
    }

    pub fn set_mint_active(&self, active: bool) {
        lock(&self.state).mint_active = active;
    }

    pub fn fail_mint_price(&self, fail: bool) {
        lock(&self.state).fail_mint_price = fail;
    }

    pub fn fail_all_reads(&self, fail: bool) {
        lock(&self.state).fail_all = fail;
    }

    /// Apply the on-chain effect of minting `quantity` tokens
    pub fn record_mint(&self, quantity: u32) {
        let mut state = lock(&self.state);
        let quantity = U256::from(quantity);
        state.total_minted += quantity;
        let burned = state.burn_per_mint_wei * quantity;
        state.total_burned += burned;
    }

    fn read<T>(&self, field: &str, value: impl FnOnce(&MockContractState) -> T) -> ClawdResult<T> {
        let state = lock(&self.state);
        if state.fail_all || (field == "mintPrice" && state.fail_mint_price) {
            return Err(ClawdError::rpc_error(&format!("{} read failed", field), Some(-32000)));
        }
        Ok(value(&state))
    }
}

#[async_trait]
impl ContractReads for MockContract {
    async fn mint_price(&self) -> ClawdResult<U256> {
        self.read("mintPrice", |s| s.mint_price_wei)
    }

    async fn burn_amount_per_mint(&self) -> ClawdResult<U256> {
        self.read("burnAmountPerMint", |s| s.burn_per_mint_wei)
    }

    async fn total_minted(&self) -> ClawdResult<U256> {
        self.read("totalMinted", |s| s.total_minted)
    }

    async fn total_burned(&self) -> ClawdResult<U256> {
        self.read("totalClawdBurned", |s| s.total_burned)
    }

    async fn treasury_balance(&self) -> ClawdResult<U256> {
        self.read("clawdTreasury", |s| s.treasury_balance_wei)
    }

    async fn max_supply(&self) -> ClawdResult<U256> {
        self.read("maxSupply", |s| s.max_supply)
    }

    async fn mint_active(&self) -> ClawdResult<bool> {
        self.read("mintActive", |s| s.mint_active)
    }

    async fn owner(&self) -> ClawdResult<Address> {
        self.read("owner", |s| s.owner)
    }
}

// ============================================================================
// Wallet
// ============================================================================

#[derive(Debug, Default)]
struct MockWalletState {
    address: Option<Address>,
    chain_id: Option<u64>,
    sent: Vec<TransactionRequest>,
    switch_requests: Vec<u64>,
    next_send_error: Option<SubmissionError>,
    next_send_panics: bool,
    switch_error: Option<SubmissionError>,
}

/// Wallet that records every request and confirms instantly unless held
#[derive(Debug, Default)]
pub struct MockWallet {
    state: Mutex<MockWalletState>,
    contract: Mutex<Option<Arc<MockContract>>>,
    hold: AtomicBool,
    release: Notify,
    submitted: Notify,
}

impl MockWallet {
    pub fn connected_on(chain_id: u64) -> Self {
        let wallet = Self::default();
        {
            let mut state = lock(&wallet.state);
            state.address = Some(Address::repeat_byte(0xaa));
            state.chain_id = Some(chain_id);
        }
        wallet
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Confirmed mints are applied to `contract`
    pub fn with_contract(self, contract: Arc<MockContract>) -> Self {
        *lock(&self.contract) = Some(contract);
        self
    }

    pub fn set_address(&self, address: Option<Address>) {
        lock(&self.state).address = address;
    }

    pub fn fail_next_send(&self, error: SubmissionError) {
        lock(&self.state).next_send_error = Some(error);
    }

    /// Make the next `send_transaction` panic after recording the request
    pub fn panic_next_send(&self) {
        lock(&self.state).next_send_panics = true;
    }

    pub fn fail_switch(&self, error: SubmissionError) {
        lock(&self.state).switch_error = Some(error);
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        lock(&self.state).sent.clone()
    }

    pub fn switch_requests(&self) -> Vec<u64> {
        lock(&self.state).switch_requests.clone()
    }

    /// Keep submissions pending until [`MockWallet::release_submissions`]
    pub fn hold_submissions(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release_submissions(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.release.notify_waiters();
        self.release.notify_one();
    }

    /// Resolves once a transaction has reached the wallet
    pub async fn wait_for_submission(&self) {
        self.submitted.notified().await;
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    async fn connected_address(&self) -> Option<Address> {
        lock(&self.state).address
    }

    async fn current_chain_id(&self) -> Option<u64> {
        lock(&self.state).chain_id
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), SubmissionError> {
        let mut state = lock(&self.state);
        state.switch_requests.push(chain_id);
        match state.switch_error.take() {
            Some(error) => Err(error),
            None => {
                state.chain_id = Some(chain_id);
                Ok(())
            }
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, SubmissionError> {
        let (count, error, panics) = {
            let mut state = lock(&self.state);
            state.sent.push(tx.clone());
            let panics = std::mem::take(&mut state.next_send_panics);
            (state.sent.len(), state.next_send_error.take(), panics)
        };
        self.submitted.notify_one();

        if panics {
            panic!("wallet crashed while signing");
        }

        while self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }

        if let Some(error) = error {
            return Err(error);
        }

        let contract = lock(&self.contract).clone();
        if let Some(contract) = contract {
            let price = contract.state().mint_price_wei;
            if !price.is_zero() {
                contract.record_mint((tx.value / price).saturating_to::<u32>());
            }
        }

        Ok(TxHash::with_last_byte(count as u8))
    }
}

// ============================================================================
// Price Feed
// ============================================================================

/// Answers from a script; once exhausted every fetch reports no price
#[derive(Debug, Default)]
pub struct ScriptedPriceSource {
    script: Mutex<VecDeque<ClawdResult<f64>>>,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl ScriptedPriceSource {
    pub fn new(script: Vec<ClawdResult<f64>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        lock(&self.last_token).clone()
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch_usd_price(&self, token: &str) -> ClawdResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_token) = Some(token.to_string());
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(ClawdError::price_unavailable(token)))
    }
}
