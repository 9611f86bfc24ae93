//! # Chain Ports
//!
//! What the mint flow needs from a chain: the two NFT contracts and, on
//! development networks, the randomness oracle it has to drive by hand.

use async_trait::async_trait;
use shared_types::RequestId;
use thiserror::Error;

/// The two NFT contracts the flow mints from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Fixed-URI NFT, minted synchronously.
    Basic,
    /// Randomness-backed NFT, minted by the oracle callback.
    RandomIpfs,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "BasicNft"),
            Self::RandomIpfs => write!(f, "RandomIpfsNft"),
        }
    }
}

/// Chain call errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("{collection} token {token_id} does not exist")]
    UnknownToken { collection: Collection, token_id: u64 },

    #[error("no pending randomness request {0}")]
    UnknownRequest(RequestId),
}

/// Contract calls made by the mint flow.
#[async_trait]
pub trait MintClient: Send + Sync {
    /// Mint a basic NFT and wait for the transaction; returns the token id.
    async fn mint_basic(&self) -> Result<u64, ChainError>;

    /// Token URI of a minted token.
    async fn token_uri(&self, collection: Collection, token_id: u64) -> Result<String, ChainError>;

    /// Fee the random NFT contract charges, in wei.
    async fn mint_fee(&self) -> Result<u128, ChainError>;

    /// Request a random NFT paying `value` wei; returns the oracle request id
    /// from the transaction receipt.
    async fn request_nft(&self, value: u128) -> Result<RequestId, ChainError>;
}

/// Randomness oracle that can be told to answer a request.
#[async_trait]
pub trait RandomnessOracle: Send + Sync {
    /// Deliver randomness for `request_id`, which mints the token and emits
    /// the completion event.
    async fn fulfill(&self, request_id: &RequestId) -> Result<(), ChainError>;
}
