//! ClawdPFP contract bindings and the snapshot reader
//!
//! Every snapshot field is read through its own view function so that a
//! single failed read only leaves that field stale.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolType, SolValue};
use async_trait::async_trait;
use clawd_types::{ClawdError, ClawdResult, MintSelection, PartialSnapshot};
use tokio::sync::{watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::rpc_client::EvmRpcClient;
use crate::task::PollingHandle;

sol! {
    /// Entry points of the ClawdPFP contract used by the console
    interface IClawdPFP {
        function mintPrice() external view returns (uint256);
        function burnAmountPerMint() external view returns (uint256);
        function totalMinted() external view returns (uint256);
        function totalClawdBurned() external view returns (uint256);
        function clawdTreasury() external view returns (uint256);
        function maxSupply() external view returns (uint256);
        function mintActive() external view returns (bool);
        function owner() external view returns (address);

        function mint() external payable;
        function mintBatch(uint256 quantity) external payable;
    }
}

// ============================================================================
// Read Interface
// ============================================================================

/// One read per snapshot field
#[async_trait]
pub trait ContractReads: Send + Sync {
    async fn mint_price(&self) -> ClawdResult<U256>;
    async fn burn_amount_per_mint(&self) -> ClawdResult<U256>;
    async fn total_minted(&self) -> ClawdResult<U256>;
    async fn total_burned(&self) -> ClawdResult<U256>;
    async fn treasury_balance(&self) -> ClawdResult<U256>;
    async fn max_supply(&self) -> ClawdResult<U256>;
    async fn mint_active(&self) -> ClawdResult<bool>;
    async fn owner(&self) -> ClawdResult<Address>;
}

/// [`ContractReads`] over `eth_call`
pub struct RpcContract {
    client: Arc<EvmRpcClient>,
    address: Address,
}

impl RpcContract {
    pub fn new(client: Arc<EvmRpcClient>, address: Address) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C, T>(&self, call: C) -> ClawdResult<T>
    where
        C: SolCall + Send,
        T: SolValue + From<<<T as SolValue>::SolType as SolType>::RustType>,
    {
        let data = self.client.eth_call(self.address, call.abi_encode().into()).await?;
        decode_return::<T>(C::SIGNATURE, &data)
    }
}

/// Decode a single static return value
pub fn decode_return<T>(function: &str, data: &[u8]) -> ClawdResult<T>
where
    T: SolValue + From<<<T as SolValue>::SolType as SolType>::RustType>,
{
    if data.is_empty() {
        // eth_call against an address without code returns 0x
        return Err(ClawdError::abi_decode(function, "empty return data"));
    }
    T::abi_decode(data).map_err(|e| ClawdError::abi_decode(function, &e.to_string()))
}

#[async_trait]
impl ContractReads for RpcContract {
    async fn mint_price(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::mintPriceCall {}).await
    }

    async fn burn_amount_per_mint(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::burnAmountPerMintCall {}).await
    }

    async fn total_minted(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::totalMintedCall {}).await
    }

    async fn total_burned(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::totalClawdBurnedCall {}).await
    }

    async fn treasury_balance(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::clawdTreasuryCall {}).await
    }

    async fn max_supply(&self) -> ClawdResult<U256> {
        self.read(IClawdPFP::maxSupplyCall {}).await
    }

    async fn mint_active(&self) -> ClawdResult<bool> {
        self.read(IClawdPFP::mintActiveCall {}).await
    }

    async fn owner(&self) -> ClawdResult<Address> {
        self.read(IClawdPFP::ownerCall {}).await
    }
}

// ============================================================================
// Write Interface
// ============================================================================

/// Payable mint entry point chosen for a selection.
///
/// Quantity 1 must go through `mint()`; only `mintBatch(uint256)` accepts a
/// quantity argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintCall {
    Single { value: U256 },
    Batch { quantity: u32, value: U256 },
}

impl MintCall {
    pub fn for_selection(mint_price_wei: U256, selection: MintSelection) -> ClawdResult<Self> {
        let quantity = selection.quantity();
        if selection.is_single() {
            return Ok(Self::Single {
                value: mint_price_wei,
            });
        }

        let value = mint_price_wei
            .checked_mul(U256::from(quantity))
            .ok_or_else(|| {
                ClawdError::math_overflow(
                    "mint value",
                    &[&mint_price_wei.to_string(), &quantity.to_string()],
                )
            })?;

        Ok(Self::Batch { quantity, value })
    }

    /// Native payment attached to the call
    pub fn value(&self) -> U256 {
        match self {
            Self::Single { value } | Self::Batch { value, .. } => *value,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            Self::Single { .. } => 1,
            Self::Batch { quantity, .. } => *quantity,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Single { .. } => "mint",
            Self::Batch { .. } => "mintBatch",
        }
    }

    /// ABI-encoded call data for the chosen entry point
    pub fn calldata(&self) -> Bytes {
        match self {
            Self::Single { .. } => IClawdPFP::mintCall {}.abi_encode().into(),
            Self::Batch { quantity, .. } => IClawdPFP::mintBatchCall {
                quantity: U256::from(*quantity),
            }
            .abi_encode()
            .into(),
        }
    }
}

// ============================================================================
// Snapshot Reader
// ============================================================================

/// Publishes the latest known [`PartialSnapshot`].
///
/// Each refresh composes a fresh snapshot from eight independent reads; a
/// failed read keeps that field's previous value.
pub struct ContractStateReader<C> {
    contract: Arc<C>,
    snapshot: watch::Sender<PartialSnapshot>,
    refresh_lock: Mutex<()>,
}

impl<C: ContractReads> ContractStateReader<C> {
    pub fn new(contract: Arc<C>) -> Self {
        let (snapshot, _) = watch::channel(PartialSnapshot::default());
        Self {
            contract,
            snapshot,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Latest known snapshot
    pub fn snapshot(&self) -> PartialSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PartialSnapshot> {
        self.snapshot.subscribe()
    }

    /// Re-read every field and publish the result
    pub async fn refresh(&self) -> PartialSnapshot {
        // Serialize refreshes so an older read never lands after a newer one
        let _guard = self.refresh_lock.lock().await;

        let contract = &self.contract;
        let (mint_price, burn_per_mint, total_minted, total_burned, treasury, max_supply, mint_active, owner) = tokio::join!(
            contract.mint_price(),
            contract.burn_amount_per_mint(),
            contract.total_minted(),
            contract.total_burned(),
            contract.treasury_balance(),
            contract.max_supply(),
            contract.mint_active(),
            contract.owner(),
        );

        let previous = self.snapshot();
        let next = PartialSnapshot {
            mint_price_wei: keep_on_error("mintPrice", mint_price, previous.mint_price_wei),
            burn_per_mint_wei: keep_on_error("burnAmountPerMint", burn_per_mint, previous.burn_per_mint_wei),
            total_minted: keep_on_error("totalMinted", total_minted, previous.total_minted),
            total_burned: keep_on_error("totalClawdBurned", total_burned, previous.total_burned),
            treasury_balance_wei: keep_on_error("clawdTreasury", treasury, previous.treasury_balance_wei),
            max_supply: keep_on_error("maxSupply", max_supply, previous.max_supply),
            mint_active: keep_on_error("mintActive", mint_active, previous.mint_active),
            owner: keep_on_error("owner", owner, previous.owner),
        };

        if next.is_complete() {
            if let Err(e) = next.complete() {
                warn!("Contract reported inconsistent state: {}", e);
            }
        }

        if next != previous {
            debug!("Contract snapshot updated: {:?}", next);
        }

        self.snapshot.send_replace(next.clone());
        next
    }
}

impl<C: ContractReads + 'static> ContractStateReader<C> {
    /// Refresh now and then every `interval` until the handle is dropped
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> PollingHandle {
        let reader = Arc::clone(self);
        info!("Polling contract state every {}s", interval.as_secs());

        PollingHandle::new(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                reader.refresh().await;
            }
        }))
    }
}

fn keep_on_error<T>(field: &str, result: ClawdResult<T>, previous: Option<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Read of {} failed, keeping last value: {}", field, e);
            previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockContract;

    #[test]
    fn test_single_mint_call() {
        let price = U256::from(10_000_000_000_000_000u128);
        let call = MintCall::for_selection(price, MintSelection::new(1)).unwrap();
        assert_eq!(call, MintCall::Single { value: price });
        assert_eq!(call.function_name(), "mint");
        // keccak256("mint()")[..4]
        assert_eq!(call.calldata().as_ref(), &[0x12, 0x49, 0xc5, 0x8b]);
    }

    #[test]
    fn test_batch_mint_call() {
        let price = U256::from(10_000_000_000_000_000u128);
        let call = MintCall::for_selection(price, MintSelection::new(5)).unwrap();
        assert_eq!(
            call,
            MintCall::Batch {
                quantity: 5,
                value: U256::from(50_000_000_000_000_000u128)
            }
        );

        let data = call.calldata();
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], IClawdPFP::mintBatchCall::SELECTOR.as_slice());
        assert_eq!(data[35], 5);
    }

    #[test]
    fn test_batch_value_overflow() {
        assert!(MintCall::for_selection(U256::MAX, MintSelection::new(2)).is_err());
    }

    #[test]
    fn test_decode_returns() {
        let mut word = [0u8; 32];
        word[31] = 42;
        assert_eq!(decode_return::<U256>("mintPrice()", &word).unwrap(), U256::from(42u64));

        word[31] = 1;
        assert!(decode_return::<bool>("mintActive()", &word).unwrap());

        let mut word = [0u8; 32];
        word[12..].copy_from_slice(Address::repeat_byte(0x22).as_slice());
        assert_eq!(decode_return::<Address>("owner()", &word).unwrap(), Address::repeat_byte(0x22));

        assert!(decode_return::<U256>("mintPrice()", &[]).is_err());
    }

    #[tokio::test]
    async fn test_refresh_composes_snapshot() {
        let contract = Arc::new(MockContract::default());
        let reader = ContractStateReader::new(contract.clone());

        assert!(!reader.snapshot().mint_price_known());
        let snapshot = reader.refresh().await;
        assert!(snapshot.is_complete());
        assert_eq!(reader.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn test_failed_field_keeps_previous_value() {
        let contract = Arc::new(MockContract::default());
        let reader = ContractStateReader::new(contract.clone());
        reader.refresh().await;

        contract.set_total_minted(U256::from(9u64));
        contract.fail_mint_price(true);
        let snapshot = reader.refresh().await;

        assert_eq!(snapshot.mint_price_wei, Some(contract.state().mint_price_wei));
        assert_eq!(snapshot.total_minted, Some(U256::from(9u64)));
    }

    #[tokio::test]
    async fn test_failed_first_read_is_absent() {
        let contract = Arc::new(MockContract::default());
        contract.fail_mint_price(true);
        let reader = ContractStateReader::new(contract);

        let snapshot = reader.refresh().await;
        assert!(!snapshot.mint_price_known());
        assert!(snapshot.mint_active.is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_whole_snapshot() {
        let contract = Arc::new(MockContract::default());
        let reader = ContractStateReader::new(contract.clone());
        let before = reader.refresh().await;

        contract.set_total_minted(U256::from(9u64));
        contract.set_mint_active(false);
        contract.fail_all_reads(true);
        let after = reader.refresh().await;

        assert_eq!(after, before);
        assert_eq!(after.total_minted, Some(U256::from(3u64)));
        assert_eq!(after.mint_active, Some(true));

        contract.fail_all_reads(false);
        assert_eq!(reader.refresh().await.total_minted, Some(U256::from(9u64)));
    }

    #[tokio::test]
    async fn test_failed_first_refresh_stays_empty() {
        let contract = Arc::new(MockContract::default());
        contract.fail_all_reads(true);
        let reader = ContractStateReader::new(contract);

        assert_eq!(reader.refresh().await, PartialSnapshot::default());
    }
}
