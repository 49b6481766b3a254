//! Mint orchestration
//!
//! The console state is never stored. It is re-derived from the wallet, the
//! latest contract snapshot and the two in-flight flags every time it is
//! asked for, so it cannot drift from the inputs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use clawd_types::{
    MintIntent, MintSelection, PartialSnapshot, BASE_CHAIN_ID, BASE_NETWORK_NAME, NATIVE_SYMBOL,
};
use tracing::{info, warn};

use crate::contract::{ContractReads, ContractStateReader, MintCall};
use crate::error::SubmissionError;
use crate::rpc_client::TransactionRequest;
use crate::wallet::WalletCapability;

// ============================================================================
// State Machine
// ============================================================================

/// Everything the state machine looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInputs {
    pub wallet_connected: bool,
    pub current_chain_id: Option<u64>,
    pub target_chain_id: u64,
    pub mint_active: Option<bool>,
    pub mint_price_known: bool,
    pub submission_in_flight: bool,
    pub switch_in_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    NoWallet,
    WrongNetwork,
    Switching,
    MintPaused,
    AwaitingContractState,
    ReadyToMint,
    Submitting,
}

impl OrchestratorState {
    /// Derive the state. Checks run in priority order and the first match wins.
    pub fn evaluate(inputs: &StateInputs) -> Self {
        if !inputs.wallet_connected {
            return Self::NoWallet;
        }
        if inputs.current_chain_id != Some(inputs.target_chain_id) {
            return if inputs.switch_in_flight {
                Self::Switching
            } else {
                Self::WrongNetwork
            };
        }
        // An unread flag counts as paused
        if inputs.mint_active != Some(true) {
            return Self::MintPaused;
        }
        if inputs.submission_in_flight {
            return Self::Submitting;
        }
        if !inputs.mint_price_known {
            return Self::AwaitingContractState;
        }
        Self::ReadyToMint
    }
}

// ============================================================================
// Primary Action
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    None,
    SwitchNetwork,
    Mint,
}

/// Names shown on the primary action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLabels {
    pub network_name: String,
    pub native_symbol: String,
}

impl Default for ActionLabels {
    fn default() -> Self {
        Self {
            network_name: BASE_NETWORK_NAME.to_string(),
            native_symbol: NATIVE_SYMBOL.to_string(),
        }
    }
}

/// The single button the console offers in a given state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAction {
    pub kind: ActionKind,
    pub label: String,
    pub enabled: bool,
    pub busy: bool,
}

impl PrimaryAction {
    pub fn for_state(
        state: OrchestratorState,
        selection: MintSelection,
        intent: &MintIntent,
        labels: &ActionLabels,
    ) -> Self {
        match state {
            OrchestratorState::NoWallet => Self::disabled("Connect wallet to mint".to_string()),
            OrchestratorState::WrongNetwork => Self {
                kind: ActionKind::SwitchNetwork,
                label: format!("Switch to {}", labels.network_name),
                enabled: true,
                busy: false,
            },
            OrchestratorState::Switching => Self {
                kind: ActionKind::SwitchNetwork,
                label: "Switching...".to_string(),
                enabled: false,
                busy: true,
            },
            OrchestratorState::MintPaused => Self::disabled("Minting Paused".to_string()),
            OrchestratorState::AwaitingContractState => {
                Self::disabled("Loading contract state...".to_string())
            }
            OrchestratorState::ReadyToMint => {
                let quantity = selection.quantity();
                Self {
                    kind: ActionKind::Mint,
                    label: format!(
                        "Mint {} PFP{} for {:.4} {}",
                        quantity,
                        if quantity > 1 { "s" } else { "" },
                        intent.total_cost_eth(),
                        labels.native_symbol
                    ),
                    enabled: true,
                    busy: false,
                }
            }
            OrchestratorState::Submitting => Self {
                kind: ActionKind::Mint,
                label: "Minting...".to_string(),
                enabled: false,
                busy: true,
            },
        }
    }

    fn disabled(label: String) -> Self {
        Self {
            kind: ActionKind::None,
            label,
            enabled: false,
            busy: false,
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    Requested,
    Failed(SubmissionError),
    AlreadySwitching,
    NotNeeded(OrchestratorState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MintOutcome {
    Minted { tx_hash: TxHash, call: MintCall },
    AlreadySubmitting,
    NotReady(OrchestratorState),
    /// `call` is `None` when the request could not be built
    Failed {
        call: Option<MintCall>,
        error: SubmissionError,
    },
}

/// Result of pressing the primary action
#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome {
    Switch(SwitchOutcome),
    Mint(MintOutcome),
    Disabled(OrchestratorState),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Holds an in-flight flag for as long as it lives.
///
/// Owns its flag so it can move into a spawned task and outlive the caller.
struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl FlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy)]
struct WalletStatus {
    address: Option<Address>,
    chain_id: Option<u64>,
}

/// Sequences network switches and mint submissions
pub struct MintOrchestrator<W, C> {
    wallet: Arc<W>,
    reader: Arc<ContractStateReader<C>>,
    contract_address: Address,
    target_chain_id: u64,
    labels: ActionLabels,
    submission_in_flight: Arc<AtomicBool>,
    switch_in_flight: Arc<AtomicBool>,
}

impl<W, C> MintOrchestrator<W, C>
where
    W: WalletCapability + 'static,
    C: ContractReads + 'static,
{
    pub fn new(wallet: Arc<W>, reader: Arc<ContractStateReader<C>>, contract_address: Address) -> Self {
        Self {
            wallet,
            reader,
            contract_address,
            target_chain_id: BASE_CHAIN_ID,
            labels: ActionLabels::default(),
            submission_in_flight: Arc::new(AtomicBool::new(false)),
            switch_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_target_chain(mut self, chain_id: u64, labels: ActionLabels) -> Self {
        self.target_chain_id = chain_id;
        self.labels = labels;
        self
    }

    pub fn target_chain_id(&self) -> u64 {
        self.target_chain_id
    }

    pub fn labels(&self) -> &ActionLabels {
        &self.labels
    }

    pub fn reader(&self) -> &Arc<ContractStateReader<C>> {
        &self.reader
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_in_flight.load(Ordering::Acquire)
    }

    pub fn is_switching(&self) -> bool {
        self.switch_in_flight.load(Ordering::Acquire)
    }

    pub async fn connected_address(&self) -> Option<Address> {
        self.wallet.connected_address().await
    }

    async fn wallet_status(&self) -> WalletStatus {
        let (address, chain_id) = tokio::join!(
            self.wallet.connected_address(),
            self.wallet.current_chain_id()
        );
        WalletStatus { address, chain_id }
    }

    fn inputs(&self, wallet: &WalletStatus, snapshot: &PartialSnapshot) -> StateInputs {
        StateInputs {
            wallet_connected: wallet.address.is_some(),
            current_chain_id: wallet.chain_id,
            target_chain_id: self.target_chain_id,
            mint_active: snapshot.mint_active,
            mint_price_known: snapshot.mint_price_known(),
            submission_in_flight: self.is_submitting(),
            switch_in_flight: self.is_switching(),
        }
    }

    /// Current state from live wallet status, the latest snapshot and the flags
    pub async fn state(&self) -> OrchestratorState {
        let wallet = self.wallet_status().await;
        OrchestratorState::evaluate(&self.inputs(&wallet, &self.reader.snapshot()))
    }

    pub async fn primary_action(&self, selection: MintSelection, intent: &MintIntent) -> PrimaryAction {
        PrimaryAction::for_state(self.state().await, selection, intent, &self.labels)
    }

    /// Ask the wallet to move to the target chain. One attempt, no retry.
    pub async fn request_network_switch(&self) -> SwitchOutcome {
        let Some(_guard) = FlightGuard::acquire(&self.switch_in_flight) else {
            return SwitchOutcome::AlreadySwitching;
        };

        let wallet = self.wallet_status().await;
        let mut inputs = self.inputs(&wallet, &self.reader.snapshot());
        inputs.switch_in_flight = false;
        let state = OrchestratorState::evaluate(&inputs);
        if state != OrchestratorState::WrongNetwork {
            return SwitchOutcome::NotNeeded(state);
        }

        info!(
            "Requesting switch from chain {:?} to {} ({})",
            wallet.chain_id, self.target_chain_id, self.labels.network_name
        );

        match self.wallet.switch_network(self.target_chain_id).await {
            Ok(()) => SwitchOutcome::Requested,
            Err(e) => {
                warn!("Network switch failed: {}", e);
                SwitchOutcome::Failed(e)
            }
        }
    }

    /// Submit a mint for `selection` and wait for confirmation.
    ///
    /// A request made while another is in flight is rejected, not queued.
    /// Sending, confirmation and the follow-up refresh run on their own task,
    /// which holds the submission flag until the wallet answers even if this
    /// future is dropped first.
    pub async fn request_mint(&self, selection: MintSelection) -> MintOutcome {
        let Some(guard) = FlightGuard::acquire(&self.submission_in_flight) else {
            warn!("Mint already in flight, ignoring request");
            return MintOutcome::AlreadySubmitting;
        };

        let wallet = self.wallet_status().await;
        let snapshot = self.reader.snapshot();
        let mut inputs = self.inputs(&wallet, &snapshot);
        inputs.submission_in_flight = false;
        let state = OrchestratorState::evaluate(&inputs);

        let (Some(from), Some(mint_price_wei), OrchestratorState::ReadyToMint) =
            (wallet.address, snapshot.mint_price_wei, state)
        else {
            return MintOutcome::NotReady(state);
        };

        let call = match MintCall::for_selection(mint_price_wei, selection) {
            Ok(call) => call,
            Err(e) => {
                warn!("Could not build mint request: {}", e);
                return MintOutcome::Failed {
                    call: None,
                    error: e.into(),
                };
            }
        };

        info!(
            "Submitting {} for {} PFP(s) with {} wei",
            call.function_name(),
            call.quantity(),
            call.value()
        );

        let tx = TransactionRequest {
            from,
            to: self.contract_address,
            value: call.value(),
            data: call.calldata(),
        };

        let wallet = Arc::clone(&self.wallet);
        let reader = Arc::clone(&self.reader);
        let submission = tokio::spawn(async move {
            let _guard = guard;
            match wallet.send_transaction(tx).await {
                Ok(tx_hash) => {
                    info!("Minted {} PFP(s) in {}", call.quantity(), tx_hash);
                    reader.refresh().await;
                    MintOutcome::Minted { tx_hash, call }
                }
                Err(error) => {
                    warn!("Mint of {} PFP(s) failed: {}", call.quantity(), error);
                    MintOutcome::Failed {
                        call: Some(call),
                        error,
                    }
                }
            }
        });

        match submission.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Mint submission task ended abnormally: {}", e);
                MintOutcome::Failed {
                    call: Some(call),
                    error: SubmissionError::Rpc(format!("submission task failed: {}", e)),
                }
            }
        }
    }

    /// Perform whatever the primary action currently offers
    pub async fn press_primary(&self, selection: MintSelection) -> PressOutcome {
        match self.state().await {
            OrchestratorState::WrongNetwork => PressOutcome::Switch(self.request_network_switch().await),
            OrchestratorState::ReadyToMint => PressOutcome::Mint(self.request_mint(selection).await),
            state => PressOutcome::Disabled(state),
        }
    }
}
