pub mod exchange;

/// Interface definitions for the exchange-market program
pub mod exchange_market;

pub use exchange::{
    derive_treasurer, derive_treasury, parse_address, ExchangeIxBuilder, ExchangeIxError,
    OfferAccounts, OrderAccounts, OrderActionAccounts, TREASURER_SEED,
};

pub use exchange_market::ID as EXCHANGE_MARKET_PROGRAM;
