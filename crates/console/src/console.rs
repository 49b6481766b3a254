//! Console wiring
//!
//! Ties the pollers, the contract reader and the orchestrator together and
//! builds the screen from their latest values.

use std::sync::Arc;
use std::time::Duration;

use clawd_types::{ClawdResult, MintSelection, PriceFeedState};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::contract::{ContractReads, ContractStateReader, RpcContract};
use crate::orchestrator::{ActionLabels, MintOrchestrator};
use crate::presentation::{ConsoleView, DisplayLabels, ViewInputs};
use crate::price_feed::{DexScreenerSource, PriceFeedPoller, PriceSource};
use crate::rpc_client::EvmRpcClient;
use crate::task::PollingHandle;
use crate::wallet::{RpcWallet, WalletCapability};

/// Console backed by live endpoints
pub type RpcMintConsole = MintConsole<RpcWallet, RpcContract, DexScreenerSource>;

pub struct MintConsole<W, C, S> {
    config: ConsoleConfig,
    reader: Arc<ContractStateReader<C>>,
    orchestrator: MintOrchestrator<W, C>,
    native_price: PriceFeedPoller<S>,
    burn_token_price: PriceFeedPoller<S>,
    labels: DisplayLabels,
    reader_task: Mutex<Option<PollingHandle>>,
}

impl<W, C, S> MintConsole<W, C, S>
where
    W: WalletCapability + 'static,
    C: ContractReads + 'static,
    S: PriceSource + 'static,
{
    pub fn new(config: ConsoleConfig, wallet: Arc<W>, contract: Arc<C>, prices: Arc<S>) -> Self {
        let action = ActionLabels {
            network_name: config.network.name.clone(),
            native_symbol: config.network.native_symbol.clone(),
        };
        let labels = DisplayLabels {
            action: action.clone(),
            burn_token: config.price_feed.burn_token.clone(),
            contract_address: Some(config.contract.address),
            ..DisplayLabels::default()
        };

        let reader = Arc::new(ContractStateReader::new(contract));
        let orchestrator = MintOrchestrator::new(wallet, Arc::clone(&reader), config.contract.address)
            .with_target_chain(config.network.chain_id, action);
        let interval = config.price_feed.poll_interval();

        Self {
            native_price: PriceFeedPoller::with_interval(Arc::clone(&prices), interval),
            burn_token_price: PriceFeedPoller::with_interval(prices, interval),
            config,
            reader,
            orchestrator,
            labels,
            reader_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &MintOrchestrator<W, C> {
        &self.orchestrator
    }

    pub fn reader(&self) -> &Arc<ContractStateReader<C>> {
        &self.reader
    }

    pub fn native_price(&self) -> PriceFeedState {
        self.native_price.current_price()
    }

    pub fn burn_token_price(&self) -> PriceFeedState {
        self.burn_token_price.current_price()
    }

    /// Start contract polling and both price feeds
    pub async fn start(&self) {
        let mut reader_task = self.reader_task.lock().await;
        if reader_task.is_none() {
            *reader_task = Some(self.reader.spawn_polling(self.config.contract.poll_interval()));
        }
        drop(reader_task);

        self.native_price.start(self.config.price_feed.native_token.clone()).await;
        self.burn_token_price.start(self.config.price_feed.burn_token.clone()).await;
        info!("Console started for contract {}", self.config.contract.address);
    }

    /// Stop every background task
    pub async fn stop(&self) {
        if let Some(task) = self.reader_task.lock().await.take() {
            task.stop().await;
        }
        futures::join!(self.native_price.stop(), self.burn_token_price.stop());
        debug!("Console stopped");
    }

    /// Read the contract once, outside the polling schedule
    pub async fn refresh(&self) {
        self.reader.refresh().await;
    }

    /// Wait until both feeds have answered once, or `timeout` passes
    pub async fn wait_for_prices(&self, timeout: Duration) {
        let mut native = self.native_price.subscribe();
        let mut burn = self.burn_token_price.subscribe();

        let settled = |state: &PriceFeedState| state.last_updated.is_some() || state.last_error.is_some();
        let wait = async {
            let _ = native.wait_for(settled).await;
            let _ = burn.wait_for(settled).await;
        };

        if tokio::time::timeout(timeout, wait).await.is_err() {
            warn!("Price feed did not answer within {}s", timeout.as_secs());
        }
    }

    /// Current screen for `selection`
    pub async fn view(&self, selection: MintSelection) -> ConsoleView {
        let (state, connected_address) = tokio::join!(
            self.orchestrator.state(),
            self.orchestrator.connected_address()
        );
        let snapshot = self.reader.snapshot();
        let native_price = self.native_price.current_price();
        let burn_token_price = self.burn_token_price.current_price();

        ConsoleView::build(&ViewInputs {
            snapshot: &snapshot,
            native_price: &native_price,
            burn_token_price: &burn_token_price,
            selection,
            state,
            connected_address,
            labels: &self.labels,
        })
    }
}

impl RpcMintConsole {
    /// Build a console against the endpoints named in `config`
    pub fn connect(config: ConsoleConfig) -> ClawdResult<Self> {
        config.validate()?;

        let reads = Arc::new(EvmRpcClient::new(config.network.rpc_url.clone()));
        let wallet_client = Arc::new(EvmRpcClient::new(config.wallet.endpoint.clone()));
        info!(
            "Reading {} via {}, wallet at {}",
            config.network.name,
            reads.url(),
            wallet_client.url()
        );

        let wallet = Arc::new(RpcWallet::with_receipt_poll_interval(
            wallet_client,
            config.wallet.receipt_poll_interval(),
        ));
        let contract = Arc::new(RpcContract::new(reads, config.contract.address));
        let prices = Arc::new(DexScreenerSource::new(
            &config.price_feed.endpoint,
            config.price_feed.request_timeout(),
        )?);

        Ok(Self::new(config, wallet, contract, prices))
    }
}
