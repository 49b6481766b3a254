//! End-to-end mint flows against in-memory wallet, contract and price feed

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use clawd_console::testing::{MockContract, MockWallet};
use clawd_console::{
    ConsoleConfig, ContractStateReader, MintCall, MintConsole, MintOrchestrator, MintOutcome,
    OrchestratorState, PriceSource, SubmissionError, SwitchOutcome,
};
use clawd_types::{
    ClawdError, ClawdResult, MintSelection, BASE_CHAIN_ID, BASE_WETH_ADDRESS, CLAWD_TOKEN_ADDRESS,
};

const CONTRACT: Address = Address::repeat_byte(0xcc);

/// Fixed USD prices keyed by token
struct TokenPrices {
    eth: f64,
    clawd: f64,
}

#[async_trait]
impl PriceSource for TokenPrices {
    async fn fetch_usd_price(&self, token: &str) -> ClawdResult<f64> {
        match token {
            BASE_WETH_ADDRESS => Ok(self.eth),
            CLAWD_TOKEN_ADDRESS => Ok(self.clawd),
            other => Err(ClawdError::price_unavailable(other)),
        }
    }
}

async fn setup(
    chain_id: u64,
) -> (
    Arc<MockContract>,
    Arc<MockWallet>,
    Arc<MintOrchestrator<MockWallet, MockContract>>,
) {
    let contract = Arc::new(MockContract::default());
    let wallet = Arc::new(MockWallet::connected_on(chain_id).with_contract(contract.clone()));
    let reader = Arc::new(ContractStateReader::new(contract.clone()));
    reader.refresh().await;
    let orchestrator = Arc::new(MintOrchestrator::new(wallet.clone(), reader, CONTRACT));
    (contract, wallet, orchestrator)
}

#[tokio::test]
async fn test_second_mint_rejected_while_first_in_flight() {
    let (_contract, wallet, orchestrator) = setup(BASE_CHAIN_ID).await;
    wallet.hold_submissions();

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.request_mint(MintSelection::new(2)).await }
    });
    wallet.wait_for_submission().await;

    assert_eq!(orchestrator.state().await, OrchestratorState::Submitting);
    assert_eq!(
        orchestrator.request_mint(MintSelection::new(1)).await,
        MintOutcome::AlreadySubmitting
    );

    wallet.release_submissions();
    let outcome = first.await.unwrap();

    assert!(matches!(
        outcome,
        MintOutcome::Minted {
            call: MintCall::Batch { quantity: 2, .. },
            ..
        }
    ));
    assert_eq!(wallet.sent_transactions().len(), 1);
    assert!(!orchestrator.is_submitting());
}

#[tokio::test]
async fn test_abandoned_mint_keeps_submission_guard() {
    let (contract, wallet, orchestrator) = setup(BASE_CHAIN_ID).await;
    wallet.hold_submissions();

    // caller gives up while the wallet is still signing
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.request_mint(MintSelection::new(2)),
    )
    .await;
    assert!(abandoned.is_err());

    assert!(orchestrator.is_submitting());
    assert_eq!(orchestrator.state().await, OrchestratorState::Submitting);
    assert_eq!(
        orchestrator.request_mint(MintSelection::new(1)).await,
        MintOutcome::AlreadySubmitting
    );
    assert_eq!(wallet.sent_transactions().len(), 1);

    wallet.release_submissions();
    tokio::time::timeout(Duration::from_secs(1), async {
        while orchestrator.is_submitting() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("submission should finish once released");

    assert_eq!(wallet.sent_transactions().len(), 1);
    assert_eq!(contract.state().total_minted, U256::from(5u64));
    assert_eq!(orchestrator.reader().snapshot().total_minted, Some(U256::from(5u64)));
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);
}

#[tokio::test]
async fn test_snapshot_refreshed_after_confirmation() {
    let (_contract, _wallet, orchestrator) = setup(BASE_CHAIN_ID).await;
    assert_eq!(orchestrator.reader().snapshot().total_minted, Some(U256::from(3u64)));

    let outcome = orchestrator.request_mint(MintSelection::new(4)).await;
    assert!(matches!(outcome, MintOutcome::Minted { .. }));

    // refreshed before the guard was released
    assert_eq!(orchestrator.reader().snapshot().total_minted, Some(U256::from(7u64)));
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);
}

#[tokio::test]
async fn test_wrong_network_converges_after_switch() {
    let (_contract, wallet, orchestrator) = setup(1).await;
    assert_eq!(orchestrator.state().await, OrchestratorState::WrongNetwork);

    assert_eq!(
        orchestrator.request_mint(MintSelection::new(1)).await,
        MintOutcome::NotReady(OrchestratorState::WrongNetwork)
    );
    assert_eq!(orchestrator.request_network_switch().await, SwitchOutcome::Requested);
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);

    assert!(matches!(
        orchestrator.request_mint(MintSelection::new(1)).await,
        MintOutcome::Minted {
            call: MintCall::Single { .. },
            ..
        }
    ));
    assert_eq!(wallet.switch_requests(), vec![BASE_CHAIN_ID]);
}

#[tokio::test]
async fn test_contract_conditions_gate_minting() {
    let (contract, wallet, orchestrator) = setup(BASE_CHAIN_ID).await;

    contract.set_mint_active(false);
    orchestrator.reader().refresh().await;
    assert_eq!(orchestrator.state().await, OrchestratorState::MintPaused);
    assert_eq!(
        orchestrator.request_mint(MintSelection::new(1)).await,
        MintOutcome::NotReady(OrchestratorState::MintPaused)
    );

    contract.set_mint_active(true);
    orchestrator.reader().refresh().await;
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);

    wallet.set_address(None);
    assert_eq!(orchestrator.state().await, OrchestratorState::NoWallet);
    assert!(wallet.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_price_unknown_until_first_read() {
    let contract = Arc::new(MockContract::default());
    contract.fail_mint_price(true);
    let wallet = Arc::new(MockWallet::connected_on(BASE_CHAIN_ID));
    let reader = Arc::new(ContractStateReader::new(contract.clone()));
    reader.refresh().await;
    let orchestrator = MintOrchestrator::new(wallet.clone(), reader.clone(), CONTRACT);

    assert_eq!(orchestrator.state().await, OrchestratorState::AwaitingContractState);
    assert_eq!(
        orchestrator.request_mint(MintSelection::new(3)).await,
        MintOutcome::NotReady(OrchestratorState::AwaitingContractState)
    );

    contract.fail_mint_price(false);
    reader.refresh().await;
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);
}

#[tokio::test]
async fn test_rejected_mint_returns_to_ready() {
    let (contract, wallet, orchestrator) = setup(BASE_CHAIN_ID).await;
    wallet.fail_next_send(SubmissionError::UserRejected);

    let outcome = orchestrator.request_mint(MintSelection::new(2)).await;
    assert_eq!(
        outcome,
        MintOutcome::Failed {
            call: Some(MintCall::Batch {
                quantity: 2,
                value: U256::from(20_000_000_000_000_000u128)
            }),
            error: SubmissionError::UserRejected,
        }
    );
    assert_eq!(contract.state().total_minted, U256::from(3u64));
    assert_eq!(orchestrator.state().await, OrchestratorState::ReadyToMint);

    // a fresh request goes through
    assert!(matches!(
        orchestrator.request_mint(MintSelection::new(2)).await,
        MintOutcome::Minted { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_console_reference_scenario() {
    let mut config = ConsoleConfig::default();
    config.contract.address = CONTRACT;

    let contract = Arc::new(MockContract::default());
    let wallet = Arc::new(MockWallet::connected_on(BASE_CHAIN_ID).with_contract(contract.clone()));
    let prices = Arc::new(TokenPrices {
        eth: 3000.0,
        clawd: 0.002,
    });
    let console = MintConsole::new(config, wallet, contract, prices);

    console.start().await;
    console.refresh().await;
    console.wait_for_prices(Duration::from_secs(10)).await;

    assert_eq!(console.native_price().usd_price_per_token, 3000.0);
    assert_eq!(console.burn_token_price().usd_price_per_token, 0.002);

    let view = console.view(MintSelection::new(3)).await;
    assert_eq!(view.mint.total_cost, "0.0300 ETH");
    assert_eq!(view.mint.total_cost_usd.as_deref(), Some("$90.00"));
    assert_eq!(view.mint.total_burn, "3,000");
    assert_eq!(view.mint.total_burn_usd.as_deref(), Some("$6.00"));
    assert_eq!(view.mint.action.label, "Mint 3 PFPs for 0.0300 ETH");
    assert_eq!(view.stats.remaining.to_string(), "97");

    console.stop().await;
}
