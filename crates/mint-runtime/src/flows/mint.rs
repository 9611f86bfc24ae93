//! # Mint Flow
//!
//! 1. Mint a basic NFT and log its token URI
//! 2. Read the random NFT mint fee
//! 3. Request a random NFT through the coordinator, waiting for the oracle
//!    callback; on a development chain the request action also makes the
//!    mock oracle answer
//! 4. Log the random NFT's token URI, or how the wait ended

use crate::config::RuntimeConfig;
use crate::ports::{ChainError, Collection, MintClient, RandomnessOracle};
use fulfillment_coordinator::{CancelSignal, CoordinatorError, FulfillmentCoordinator, WaitOutcome};
use mint_telemetry::{log_event, log_request_event, MINT_FLOWS};
use parking_lot::Mutex;
use serde::Serialize;
use shared_types::RequestId;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Mint flow errors.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("chain call failed: {0}")]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

/// What one run of the flow did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReport {
    pub basic_token_id: u64,
    pub basic_token_uri: String,
    pub mint_fee_wei: u128,
    pub request_id: Option<RequestId>,
    pub outcome: WaitOutcome,
    /// Token URI read back from the contract after fulfilment
    pub random_token_uri: Option<String>,
}

impl MintReport {
    /// Metric label for the run.
    pub fn result_label(&self) -> &'static str {
        self.outcome.label()
    }
}

/// The mint flow and its collaborators.
pub struct MintFlow<C: MintClient + ?Sized> {
    client: Arc<C>,
    oracle: Option<Arc<dyn RandomnessOracle>>,
    coordinator: FulfillmentCoordinator,
    timeout: Duration,
    fulfill_delay: Duration,
}

impl<C: MintClient + ?Sized + 'static> MintFlow<C> {
    pub fn new(client: Arc<C>, coordinator: FulfillmentCoordinator, config: &RuntimeConfig) -> Self {
        Self {
            client,
            oracle: None,
            coordinator,
            timeout: config.timeout(),
            fulfill_delay: config.fulfill_delay(),
        }
    }

    /// Drive `oracle` from the request action, as on a development chain.
    pub fn with_oracle(mut self, oracle: Arc<dyn RandomnessOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn coordinator(&self) -> &FulfillmentCoordinator {
        &self.coordinator
    }

    /// Run the flow once.
    pub async fn run(&self, cancel: CancelSignal) -> Result<MintReport, FlowError> {
        let result = self.run_inner(cancel).await;
        let label = match &result {
            Ok(report) => report.result_label(),
            Err(_) => "failed",
        };
        MINT_FLOWS.with_label_values(&[label]).inc();
        result
    }

    async fn run_inner(&self, cancel: CancelSignal) -> Result<MintReport, FlowError> {
        // Basic NFT
        let basic_token_id = self.client.mint_basic().await?;
        let basic_token_uri = self.client.token_uri(Collection::Basic, basic_token_id).await?;
        log_event!(
            info,
            "flow",
            "Basic NFT minted",
            token_id = basic_token_id,
            token_uri = %basic_token_uri
        );

        // Random IPFS NFT
        let mint_fee_wei = self.client.mint_fee().await?;
        let requested: Mutex<Option<RequestId>> = Mutex::new(None);

        let outcome = self
            .coordinator
            .submit_and_await_cancellable(
                || self.request_random_nft(mint_fee_wei, &requested),
                Some(self.timeout),
                cancel,
            )
            .await?;
        let request_id = requested.lock().take();

        let random_token_uri = match &outcome {
            WaitOutcome::Fulfilled(payload) => Some(self.reconcile(payload.token_id, &payload.token_uri).await),
            WaitOutcome::TimedOut => {
                log_event!(
                    warn,
                    "flow",
                    "Random NFT not minted before the deadline",
                    request_id = ?request_id,
                    timeout_secs = self.timeout.as_secs()
                );
                None
            }
            WaitOutcome::Cancelled => {
                log_event!(warn, "flow", "Random NFT wait cancelled", request_id = ?request_id);
                None
            }
        };

        Ok(MintReport {
            basic_token_id,
            basic_token_uri,
            mint_fee_wei,
            request_id,
            outcome,
            random_token_uri,
        })
    }

    /// Submit the request; on a development chain also answer it.
    async fn request_random_nft(
        &self,
        fee: u128,
        requested: &Mutex<Option<RequestId>>,
    ) -> Result<RequestId, ChainError> {
        let request_id = self.client.request_nft(fee).await?;
        *requested.lock() = Some(request_id.clone());
        log_request_event!(info, "flow", "Random NFT requested", request_id, fee_wei = %fee);

        if let Some(oracle) = &self.oracle {
            tokio::time::sleep(self.fulfill_delay).await;
            oracle.fulfill(&request_id).await?;
        }

        Ok(request_id)
    }

    /// Read the minted token back from the contract, preferring the chain's
    /// answer over the event payload.
    async fn reconcile(&self, token_id: Option<u64>, event_uri: &str) -> String {
        let Some(token_id) = token_id else {
            log_event!(info, "flow", "Random NFT minted", token_uri = %event_uri);
            return event_uri.to_string();
        };

        match self.client.token_uri(Collection::RandomIpfs, token_id).await {
            Ok(chain_uri) => {
                if chain_uri != event_uri {
                    log_event!(
                        warn,
                        "flow",
                        "Event token URI differs from contract",
                        token_id,
                        event_uri = %event_uri,
                        chain_uri = %chain_uri
                    );
                }
                log_event!(info, "flow", "Random NFT minted", token_id, token_uri = %chain_uri);
                chain_uri
            }
            Err(err) => {
                log_event!(warn, "flow", "Could not read minted token back", token_id, error = %err);
                event_uri.to_string()
            }
        }
    }
}
