pub mod config;
pub mod console;
pub mod contract;
pub mod cost;
pub mod error;
pub mod orchestrator;
pub mod presentation;
pub mod price_feed;
pub mod rpc_client;
pub mod task;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wallet;

pub use config::ConsoleConfig;
pub use console::{MintConsole, RpcMintConsole};
pub use contract::{ContractReads, ContractStateReader, MintCall, RpcContract};
pub use cost::{cost, cost_for_snapshot};
pub use error::SubmissionError;
pub use orchestrator::{
    ActionKind, ActionLabels, MintOrchestrator, MintOutcome, OrchestratorState, PressOutcome,
    PrimaryAction, StateInputs, SwitchOutcome,
};
pub use presentation::{ConsoleView, DisplayLabels, ViewInputs};
pub use price_feed::{DexScreenerSource, PriceFeedPoller, PriceSource};
pub use rpc_client::{EvmRpcClient, TransactionReceipt, TransactionRequest};
pub use wallet::{RpcWallet, WalletCapability};
