//! # Development Chain
//!
//! In-process stand-in for a local node running the two NFT contracts and a
//! mock randomness coordinator. Contract events go out on the shared bus the
//! way a node would emit logs.
//!
//! Request ids are sequential from 1; token ids are sequential from 0 per
//! collection.

use crate::config::RuntimeConfig;
use crate::ports::{ChainError, Collection, MintClient, RandomnessOracle};
use async_trait::async_trait;
use mint_telemetry::{log_event, log_request_event, CHAIN_TRANSACTIONS};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, InMemoryEventBus, MintEvent};
use shared_types::{CompletionEvent, FulfillmentPayload, RequestId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Development chain parameters.
#[derive(Debug, Clone)]
pub struct DevChainConfig {
    pub deployer: String,
    pub mint_fee_wei: u128,
    pub basic_token_uri: String,
}

impl From<&RuntimeConfig> for DevChainConfig {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            deployer: config.deployer.clone(),
            mint_fee_wei: config.mint_fee_wei,
            basic_token_uri: config.basic_token_uri.clone(),
        }
    }
}

#[derive(Default)]
struct ChainState {
    basic_tokens: Vec<String>,
    random_tokens: Vec<String>,
    last_request_id: u64,
    /// Open randomness requests and who paid for them
    pending: HashMap<RequestId, String>,
    rejection: Option<String>,
}

/// Simulated chain implementing [`MintClient`].
pub struct DevChain {
    bus: Arc<InMemoryEventBus>,
    config: DevChainConfig,
    state: Mutex<ChainState>,
}

impl DevChain {
    pub fn new(bus: Arc<InMemoryEventBus>, config: DevChainConfig) -> Self {
        Self {
            bus,
            config,
            state: Mutex::new(ChainState::default()),
        }
    }

    /// Make every following `request_nft` revert with `reason`.
    pub fn reject_requests_with(&self, reason: impl Into<String>) {
        self.state.lock().rejection = Some(reason.into());
    }

    /// Randomness requests still waiting for the oracle.
    pub fn pending_requests(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Oracle callback: mint the random NFT for `request_id` with
    /// `token_uri` and emit `NftMinted`. Returns the new token id.
    pub async fn fulfill_random_words(
        &self,
        request_id: &RequestId,
        token_uri: String,
    ) -> Result<u64, ChainError> {
        let token_id = {
            let mut state = self.state.lock();
            if state.pending.remove(request_id).is_none() {
                return Err(ChainError::UnknownRequest(request_id.clone()));
            }
            let token_id = next_token_id(&state.random_tokens);
            state.random_tokens.push(token_uri.clone());
            token_id
        };

        log_request_event!(info, "chain", "Random NFT minted", request_id, token_id, token_uri = %token_uri);

        let payload = FulfillmentPayload::with_uri(token_uri).token_id(token_id);
        self.bus
            .publish(MintEvent::NftMinted(CompletionEvent::new(request_id.clone(), payload)))
            .await;

        Ok(token_id)
    }
}

/// Token ids count up from zero per collection.
fn next_token_id(minted: &[String]) -> u64 {
    u64::try_from(minted.len()).unwrap_or(u64::MAX)
}

#[async_trait]
impl MintClient for DevChain {
    async fn mint_basic(&self) -> Result<u64, ChainError> {
        let token_id = {
            let mut state = self.state.lock();
            let token_id = next_token_id(&state.basic_tokens);
            state.basic_tokens.push(self.config.basic_token_uri.clone());
            token_id
        };
        CHAIN_TRANSACTIONS.with_label_values(&["mint_basic"]).inc();
        log_event!(debug, "chain", "Basic NFT minted", token_id);

        self.bus.publish(MintEvent::BasicNftMinted { token_id }).await;
        Ok(token_id)
    }

    async fn token_uri(&self, collection: Collection, token_id: u64) -> Result<String, ChainError> {
        let state = self.state.lock();
        let tokens = match collection {
            Collection::Basic => &state.basic_tokens,
            Collection::RandomIpfs => &state.random_tokens,
        };
        usize::try_from(token_id)
            .ok()
            .and_then(|index| tokens.get(index))
            .cloned()
            .ok_or(ChainError::UnknownToken { collection, token_id })
    }

    async fn mint_fee(&self) -> Result<u128, ChainError> {
        Ok(self.config.mint_fee_wei)
    }

    async fn request_nft(&self, value: u128) -> Result<RequestId, ChainError> {
        let request_id = {
            let mut state = self.state.lock();
            if let Some(reason) = &state.rejection {
                return Err(ChainError::Reverted(reason.clone()));
            }
            state.last_request_id += 1;
            let request_id = RequestId::from(state.last_request_id);
            state
                .pending
                .insert(request_id.clone(), self.config.deployer.clone());
            request_id
        };
        CHAIN_TRANSACTIONS.with_label_values(&["request_nft"]).inc();
        log_request_event!(debug, "chain", "Random NFT requested", request_id, value = %value);

        self.bus
            .publish(MintEvent::NftRequested {
                request_id: request_id.clone(),
                requester: self.config.deployer.clone(),
            })
            .await;
        Ok(request_id)
    }
}

/// Mock randomness coordinator for development chains.
///
/// Hands out the configured token URIs in rotation.
pub struct DevRandomnessOracle {
    chain: Arc<DevChain>,
    token_uris: Vec<String>,
    next: AtomicUsize,
}

impl DevRandomnessOracle {
    pub fn new(chain: Arc<DevChain>, token_uris: Vec<String>) -> Self {
        Self {
            chain,
            token_uris,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RandomnessOracle for DevRandomnessOracle {
    async fn fulfill(&self, request_id: &RequestId) -> Result<(), ChainError> {
        if self.token_uris.is_empty() {
            return Err(ChainError::Reverted("oracle has no token URIs".to_string()));
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.token_uris.len();
        let token_uri = self.token_uris[index].clone();

        log_request_event!(debug, "oracle", "Fulfilling randomness request", request_id);
        self.chain.fulfill_random_words(request_id, token_uri).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, EventTopic};

    fn chain() -> (Arc<InMemoryEventBus>, Arc<DevChain>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let chain = Arc::new(DevChain::new(
            Arc::clone(&bus),
            DevChainConfig::from(&RuntimeConfig::default()),
        ));
        (bus, chain)
    }

    #[tokio::test]
    async fn test_basic_mint_assigns_token_zero() {
        let (bus, chain) = chain();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Basic]));

        assert_eq!(chain.mint_basic().await.unwrap(), 0);
        assert_eq!(
            chain.token_uri(Collection::Basic, 0).await.unwrap(),
            crate::config::DEFAULT_BASIC_TOKEN_URI
        );
        assert_eq!(sub.recv().await, Some(MintEvent::BasicNftMinted { token_id: 0 }));
    }

    #[tokio::test]
    async fn test_token_ids_count_per_collection() {
        let (_bus, chain) = chain();
        assert_eq!(chain.mint_basic().await.unwrap(), 0);
        assert_eq!(chain.mint_basic().await.unwrap(), 1);

        let request_id = chain.request_nft(0).await.unwrap();
        let token_id = chain
            .fulfill_random_words(&request_id, "ipfs://pug".to_string())
            .await
            .unwrap();
        assert_eq!(token_id, 0);
        assert_eq!(chain.token_uri(Collection::RandomIpfs, 0).await.unwrap(), "ipfs://pug");
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (_bus, chain) = chain();
        assert_eq!(
            chain.token_uri(Collection::RandomIpfs, 0).await,
            Err(ChainError::UnknownToken {
                collection: Collection::RandomIpfs,
                token_id: 0
            })
        );
    }

    #[tokio::test]
    async fn test_request_then_fulfill_emits_completion() {
        let (bus, chain) = chain();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Fulfillment]));
        let oracle = DevRandomnessOracle::new(
            Arc::clone(&chain),
            vec!["ipfs://pug".to_string(), "ipfs://shiba".to_string()],
        );

        let request_id = chain.request_nft(crate::config::DEFAULT_MINT_FEE_WEI).await.unwrap();
        assert_eq!(request_id, RequestId::from(1u64));
        assert_eq!(chain.pending_requests(), 1);

        oracle.fulfill(&request_id).await.unwrap();
        assert_eq!(chain.pending_requests(), 0);

        let expected = CompletionEvent::new(
            request_id.clone(),
            FulfillmentPayload::with_uri("ipfs://pug").token_id(0),
        );
        assert_eq!(sub.recv().await, Some(MintEvent::NftMinted(expected)));
        assert_eq!(chain.token_uri(Collection::RandomIpfs, 0).await.unwrap(), "ipfs://pug");

        // A request is fulfilled once
        assert_eq!(
            oracle.fulfill(&request_id).await,
            Err(ChainError::UnknownRequest(request_id.clone()))
        );
    }

    #[tokio::test]
    async fn test_oracle_rotates_uris() {
        let (_bus, chain) = chain();
        let oracle = DevRandomnessOracle::new(
            Arc::clone(&chain),
            vec!["ipfs://a".to_string(), "ipfs://b".to_string()],
        );

        for _ in 0..3 {
            let id = chain.request_nft(0).await.unwrap();
            oracle.fulfill(&id).await.unwrap();
        }
        assert_eq!(chain.token_uri(Collection::RandomIpfs, 1).await.unwrap(), "ipfs://b");
        assert_eq!(chain.token_uri(Collection::RandomIpfs, 2).await.unwrap(), "ipfs://a");
    }

    #[tokio::test]
    async fn test_rejected_request() {
        let (_bus, chain) = chain();
        chain.reject_requests_with("RandomIpfsNft__NotEnoughETH");

        assert_eq!(
            chain.request_nft(0).await,
            Err(ChainError::Reverted("RandomIpfsNft__NotEnoughETH".to_string()))
        );
        assert_eq!(chain.pending_requests(), 0);
    }
}
