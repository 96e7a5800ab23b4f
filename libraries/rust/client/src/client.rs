use thiserror::Error;

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use exchange_instructions::ExchangeIxError;
use exchange_solana_client::{NetworkUserInterface, TransactionBuilder};

pub type ClientResult<I, T> = std::result::Result<T, ClientError<I>>;

#[derive(Error)]
pub enum ClientError<I: NetworkUserInterface> {
    /// The network interface failed, either while reading state or while
    /// submitting a transaction. Submission rejections by the program are
    /// surfaced here verbatim.
    #[error("interface error")]
    Interface(I::Error),

    #[error("no retailer found at {0}")]
    RetailerNotFound(Pubkey),

    #[error("no order found at {0}")]
    OrderNotFound(Pubkey),

    #[error(transparent)]
    Instruction(#[from] ExchangeIxError),
}

impl<I: NetworkUserInterface> std::fmt::Debug for ClientError<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "interface error: {e:?}"),
            Self::RetailerNotFound(address) => write!(f, "no retailer found at {address}"),
            Self::OrderNotFound(address) => write!(f, "no order found at {address}"),
            Self::Instruction(e) => write!(f, "instruction error: {e}"),
        }
    }
}

/// Central object for client implementations, containing the network
/// interface used for state reads and submission.
pub struct ClientState<I> {
    network: I,
}

impl<I: NetworkUserInterface> ClientState<I> {
    pub fn new(network: I) -> Self {
        Self { network }
    }

    pub fn signer(&self) -> Pubkey {
        self.network.signer()
    }

    pub fn network(&self) -> &I {
        &self.network
    }

    /// Compile a built transaction against the latest blockhash and hand it
    /// to the network interface for wallet signing and submission.
    pub async fn send(&self, transaction: &TransactionBuilder) -> ClientResult<I, Signature> {
        let blockhash = self
            .network
            .get_latest_blockhash()
            .await
            .map_err(ClientError::Interface)?;

        let compiled = transaction
            .clone()
            .compile_partial(Some(&self.signer()), blockhash);

        log::debug!(
            "sending transaction with {} instructions",
            compiled.message.instructions.len()
        );

        let signature = self
            .network
            .sign_and_send(compiled)
            .await
            .map_err(ClientError::Interface)?;

        log::info!("tx confirmed: {signature}");
        Ok(signature)
    }
}
