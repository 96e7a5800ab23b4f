//! Expands a minimal caller intent into the complete account set an
//! operation needs.
//!
//! Resolution performs the minimum on-chain reads required and delegates all
//! address math to the pure derivation in [exchange_instructions]. Reads can
//! fail or go stale; derivation cannot, which is why the two live apart.

use solana_sdk::pubkey::Pubkey;

use exchange_instructions::exchange_market::{Order, Retailer};
use exchange_instructions::{ExchangeIxBuilder, OfferAccounts, OrderAccounts, OrderActionAccounts};
use exchange_solana_client::{ExtError, NetworkUserInterface, NetworkUserInterfaceExt};

use crate::client::{ClientError, ClientResult};

/// Resolves the participant account set for each operation on behalf of a
/// wallet.
pub struct AccountResolver<'a, I> {
    network: &'a I,
    builder: ExchangeIxBuilder,
}

impl<'a, I: NetworkUserInterface> AccountResolver<'a, I> {
    pub fn new(network: &'a I, wallet: Pubkey) -> Self {
        Self {
            network,
            builder: ExchangeIxBuilder::new(wallet),
        }
    }

    /// Accounts for creating an offer. A retailer being created has no
    /// existing state, so this is pure derivation with no network access.
    pub fn for_offer(&self, retailer: &Pubkey, bid_mint: &Pubkey) -> OfferAccounts {
        self.builder.offer_accounts(retailer, bid_mint)
    }

    /// Accounts for opening an order against an existing retailer. Reads the
    /// retailer record to learn its bid mint; everything else is derived.
    pub async fn for_order(&self, retailer: &Pubkey) -> ClientResult<I, OrderAccounts> {
        let record = self.retailer(retailer).await?;

        log::debug!("resolved retailer {retailer} with bid mint {}", record.bid_mint);
        Ok(self.builder.order_accounts(retailer, &record.bid_mint))
    }

    /// Accounts for executing against an existing order. Reads the order to
    /// discover its owning retailer, then the retailer for its bid mint.
    /// Shared by buy and sell, which bind the result to opposite sides.
    pub async fn for_order_action(&self, order: &Pubkey) -> ClientResult<I, OrderActionAccounts> {
        let record = self.order(order).await?;
        let retailer = self.retailer(&record.retailer).await?;

        log::debug!(
            "resolved order {order} against retailer {} with bid mint {}",
            record.retailer,
            retailer.bid_mint
        );
        Ok(self
            .builder
            .order_action_accounts(order, &record.retailer, &retailer.bid_mint))
    }

    /// Fetch a retailer record. An account that is missing or does not hold
    /// a well-formed retailer record resolves to
    /// [ClientError::RetailerNotFound].
    pub async fn retailer(&self, address: &Pubkey) -> ClientResult<I, Retailer> {
        match self.network.get_anchor_account::<Retailer>(address).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ClientError::RetailerNotFound(*address)),
            Err(ExtError::Interface(e)) => Err(ClientError::Interface(e)),
            Err(error) => {
                log::warn!("malformed retailer record at {address}: {error}");
                Err(ClientError::RetailerNotFound(*address))
            }
        }
    }

    /// Fetch an order record, with the same missing/malformed policy as
    /// [Self::retailer].
    pub async fn order(&self, address: &Pubkey) -> ClientResult<I, Order> {
        match self.network.get_anchor_account::<Order>(address).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ClientError::OrderNotFound(*address)),
            Err(ExtError::Interface(e)) => Err(ClientError::Interface(e)),
            Err(error) => {
                log::warn!("malformed order record at {address}: {error}");
                Err(ClientError::OrderNotFound(*address))
            }
        }
    }
}
