//! Native RPC transport for the exchange client.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

use exchange_client::ExchangeClient;
use exchange_solana_client::NetworkUserInterface;

pub type ExchangeRpcClient = ExchangeClient<RpcConnection>;

/// A connection to a Solana RPC node paired with a local signing wallet.
#[derive(Clone)]
pub struct RpcConnection {
    rpc: Arc<RpcClient>,
    wallet: Arc<Keypair>,
}

impl RpcConnection {
    pub fn new(rpc: RpcClient, wallet: Keypair) -> Self {
        Self {
            rpc: Arc::new(rpc),
            wallet: Arc::new(wallet),
        }
    }
}

impl Debug for RpcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RpcConnection")
            .field(&self.wallet.pubkey())
            .finish()
    }
}

#[async_trait(?Send)]
impl NetworkUserInterface for RpcConnection {
    type Error = solana_client::client_error::ClientError;

    fn signer(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, Self::Error> {
        self.rpc.get_latest_blockhash().await
    }

    async fn get_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, Self::Error> {
        self.rpc.get_multiple_accounts(addresses).await
    }

    async fn sign_and_send(&self, mut transaction: Transaction) -> Result<Signature, Self::Error> {
        let recent_blockhash = transaction.message.recent_blockhash;
        transaction.partial_sign(&[self.wallet.as_ref()], recent_blockhash);

        self.rpc.send_and_confirm_transaction(&transaction).await
    }
}
