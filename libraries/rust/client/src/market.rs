//! The four market operations: create an offer, open an order, buy, sell.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

use exchange_instructions::ExchangeIxBuilder;
use exchange_solana_client::{NetworkUserInterface, TransactionBuilder};

use crate::client::ClientResult;
use crate::ExchangeClient;

/// The outcome of one operation: the built transaction, and its signature
/// when it was submitted.
#[derive(Debug)]
pub struct OperationOutput {
    /// Set only when the transaction was submitted and confirmed
    pub signature: Option<Signature>,

    /// The built transaction, including any generated signers
    pub transaction: TransactionBuilder,
}

/// Parameters for creating a retailer's standing offer.
pub struct InitializeOfferParams {
    /// The asset the retailer is buying
    pub bid_mint: Pubkey,

    /// Quantity offered
    pub bid_total: u64,

    /// Fixed exchange rate
    pub bid_point: u64,

    /// Keypair for the new retailer account. Generated when absent.
    pub retailer: Option<Keypair>,

    /// Submit and confirm the transaction. When false, the built transaction
    /// is returned without touching the network.
    pub send_and_confirm: bool,
}

impl InitializeOfferParams {
    pub fn new(bid_mint: Pubkey, bid_total: u64, bid_point: u64) -> Self {
        Self {
            bid_mint,
            bid_total,
            bid_point,
            retailer: None,
            send_and_confirm: true,
        }
    }

    pub fn with_retailer(mut self, retailer: Keypair) -> Self {
        self.retailer = Some(retailer);
        self
    }

    pub fn build_only(mut self) -> Self {
        self.send_and_confirm = false;
        self
    }
}

/// Parameters for opening an order against a retailer.
pub struct InitializeOrderParams {
    /// The retailer to trade against
    pub retailer: Pubkey,

    pub ask_amount: u64,
    pub ask_point: u64,

    /// Keypair for the new order account. Generated when absent.
    pub order: Option<Keypair>,

    pub send_and_confirm: bool,
}

impl InitializeOrderParams {
    pub fn new(retailer: Pubkey, ask_amount: u64, ask_point: u64) -> Self {
        Self {
            retailer,
            ask_amount,
            ask_point,
            order: None,
            send_and_confirm: true,
        }
    }

    pub fn with_order(mut self, order: Keypair) -> Self {
        self.order = Some(order);
        self
    }

    pub fn build_only(mut self) -> Self {
        self.send_and_confirm = false;
        self
    }
}

/// Parameters for executing an existing order, as either side.
pub struct OrderActionParams {
    pub order: Pubkey,
    pub send_and_confirm: bool,
}

impl OrderActionParams {
    pub fn new(order: Pubkey) -> Self {
        Self {
            order,
            send_and_confirm: true,
        }
    }

    pub fn build_only(mut self) -> Self {
        self.send_and_confirm = false;
        self
    }
}

impl<I: NetworkUserInterface> ExchangeClient<I> {
    fn ix_builder(&self) -> ExchangeIxBuilder {
        ExchangeIxBuilder::new(self.signer())
    }

    /// Create a standing offer for a new retailer account.
    pub async fn initialize_offer(
        &self,
        params: InitializeOfferParams,
    ) -> ClientResult<I, OperationOutput> {
        let retailer = params.retailer.unwrap_or_else(Keypair::new);
        let accounts = self.resolver().for_offer(&retailer.pubkey(), &params.bid_mint);

        let ix =
            self.ix_builder()
                .initialize_offer(&accounts, params.bid_total, params.bid_point)?;

        let transaction = TransactionBuilder::from(ix).with_signer(retailer);
        self.execute(transaction, params.send_and_confirm).await
    }

    /// Open an order against an existing retailer. The ask side is resolved
    /// from the retailer's record.
    pub async fn initialize_order(
        &self,
        params: InitializeOrderParams,
    ) -> ClientResult<I, OperationOutput> {
        let order = params.order.unwrap_or_else(Keypair::new);
        let accounts = self.resolver().for_order(&params.retailer).await?;

        let ix = self.ix_builder().initialize_order(
            &order.pubkey(),
            &accounts,
            params.ask_amount,
            params.ask_point,
        )?;

        let transaction = TransactionBuilder::from(ix).with_signer(order);
        self.execute(transaction, params.send_and_confirm).await
    }

    /// Execute an order as the buyer, acquiring the asset the retailer is
    /// selling.
    pub async fn buy(&self, params: OrderActionParams) -> ClientResult<I, OperationOutput> {
        let accounts = self.resolver().for_order_action(&params.order).await?;
        let ix = self.ix_builder().buy(&accounts);

        self.execute(ix.into(), params.send_and_confirm).await
    }

    /// Execute an order as the seller, selling into the retailer's offer.
    pub async fn sell(&self, params: OrderActionParams) -> ClientResult<I, OperationOutput> {
        let accounts = self.resolver().for_order_action(&params.order).await?;
        let ix = self.ix_builder().sell(&accounts);

        self.execute(ix.into(), params.send_and_confirm).await
    }

    async fn execute(
        &self,
        transaction: TransactionBuilder,
        send_and_confirm: bool,
    ) -> ClientResult<I, OperationOutput> {
        if !send_and_confirm {
            return Ok(OperationOutput {
                signature: None,
                transaction,
            });
        }

        let signature = self.client.send(&transaction).await?;
        Ok(OperationOutput {
            signature: Some(signature),
            transaction,
        })
    }
}
