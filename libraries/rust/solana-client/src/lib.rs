use std::any::Any;

use anchor_lang::AccountDeserialize;
use async_trait::async_trait;
use thiserror::Error;

use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};

pub mod transaction;
mod util;

pub use transaction::TransactionBuilder;
pub use util::keypair::{clone_keypair, clone_keypair_vec};

/// A type that provides an interface to interact with the Solana network, and an associated
/// wallet that can sign transactions to be sent to the network.
#[async_trait(?Send)]
pub trait NetworkUserInterface: Clone + 'static {
    type Error: Any + std::fmt::Debug;

    /// The signing address used by this interface when sending transactions
    fn signer(&self) -> Pubkey;

    /// Get the latest blockhash from the network
    async fn get_latest_blockhash(&self) -> Result<Hash, Self::Error>;

    /// Retrieve multiple accounts in one operation
    async fn get_accounts(&self, addresses: &[Pubkey])
        -> Result<Vec<Option<Account>>, Self::Error>;

    /// Add the wallet signature to a partially signed transaction, then submit it
    /// and wait for confirmation.
    async fn sign_and_send(&self, transaction: Transaction) -> Result<Signature, Self::Error>;
}

#[async_trait(?Send)]
pub trait NetworkUserInterfaceExt: NetworkUserInterface {
    async fn get_accounts_all(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, ExtError<Self>> {
        let mut result = vec![];

        for chunk in addresses.chunks(100) {
            let accounts = self
                .get_accounts(chunk)
                .await
                .map_err(|e| ExtError::Interface(e))?;

            result.extend(accounts);
        }

        Ok(result)
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ExtError<Self>> {
        self.get_accounts_all(&[*address])
            .await
            .map(|list| list.into_iter().next().unwrap())
    }

    async fn get_anchor_accounts<T: AccountDeserialize>(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<T>>, ExtError<Self>> {
        self.get_accounts_all(addresses)
            .await?
            .into_iter()
            .enumerate()
            .map(|(i, account_info)| match account_info {
                None => Ok(None),
                Some(account) => T::try_deserialize(&mut &account.data[..])
                    .map(|a| Some(a))
                    .map_err(|e| ExtError::Deserialize {
                        address: addresses[i],
                        error: e,
                    }),
            })
            .collect()
    }

    async fn get_anchor_account<T: AccountDeserialize>(
        &self,
        address: &Pubkey,
    ) -> Result<Option<T>, ExtError<Self>> {
        Ok(self.get_anchor_accounts(&[*address]).await?.pop().unwrap())
    }
}

#[derive(Error, Debug)]
pub enum ExtError<I: NetworkUserInterface> {
    #[error("interface error")]
    Interface(I::Error),

    #[error("error deserializing account {address}: {error}")]
    Deserialize {
        address: Pubkey,
        error: anchor_lang::error::Error,
    },
}

impl<T: NetworkUserInterface> NetworkUserInterfaceExt for T {}
