use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use exchange_solana_client::NetworkUserInterface;

use client::ClientState;
use resolve::AccountResolver;

mod client;
pub mod market;
pub mod resolve;

pub use client::{ClientError, ClientResult};
pub use exchange_solana_client::TransactionBuilder;
pub use market::{
    InitializeOfferParams, InitializeOrderParams, OperationOutput, OrderActionParams,
};

/// Central client object for interacting with the exchange-market program
#[derive(Clone)]
pub struct ExchangeClient<I> {
    client: Arc<ClientState<I>>,
}

impl<I: NetworkUserInterface> ExchangeClient<I> {
    /// Create the client state
    pub fn new(interface: I) -> Self {
        Self {
            client: Arc::new(ClientState::new(interface)),
        }
    }

    /// The wallet address used to sign and pay for operations
    pub fn signer(&self) -> Pubkey {
        self.client.signer()
    }

    /// Get the account resolver for this client's wallet
    pub fn resolver(&self) -> AccountResolver<'_, I> {
        AccountResolver::new(self.client.network(), self.client.signer())
    }
}
