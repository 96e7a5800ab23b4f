use std::str::FromStr;

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program::ID as SYSTEM_PROGRAM_ID;
use solana_sdk::sysvar::{rent::Rent, SysvarId};
use thiserror::Error;

use anchor_lang::{InstructionData, ToAccountMetas};
use spl_associated_token_account::get_associated_token_address;

use crate::exchange_market::{self, accounts as ix_account, instruction as ix_data};

/// Seed tag for the authority over a retailer's treasuries
pub const TREASURER_SEED: &[u8] = b"treasurer";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeIxError {
    /// The input is not a well-formed account address.
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    /// A numeric parameter is outside the range the program accepts.
    #[error("constraint violation: {0}")]
    ConstraintViolation(&'static str),
}

/// Parse a base58 account address.
pub fn parse_address(address: &str) -> Result<Pubkey, ExchangeIxError> {
    Pubkey::from_str(address).map_err(|_| ExchangeIxError::InvalidAddress(address.to_owned()))
}

/// Derive the address of the authority controlling a retailer's treasuries.
///
/// Pure derivation: the same retailer always yields the same treasurer.
pub fn derive_treasurer(retailer: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[TREASURER_SEED, retailer.as_ref()], &exchange_market::ID).0
}

/// Derive the escrow token account held by a retailer's treasurer for a mint.
pub fn derive_treasury(retailer: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(&derive_treasurer(retailer), mint)
}

/// Accounts used to create a retailer's standing offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferAccounts {
    pub authority: Pubkey,
    pub retailer: Pubkey,
    pub treasurer: Pubkey,
    pub bid_mint: Pubkey,
    pub bid_treasury: Pubkey,
    pub bid_token_account: Pubkey,
}

/// Accounts used to open an order against a retailer. The ask side always
/// uses the retailer's bid mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAccounts {
    pub authority: Pubkey,
    pub retailer: Pubkey,
    pub treasurer: Pubkey,
    pub ask_mint: Pubkey,
    pub ask_treasury: Pubkey,
    pub ask_token_account: Pubkey,
}

/// Accounts used to execute against an existing order. The same set backs
/// both buy and sell; the two instructions bind the wallet accounts to
/// opposite sides of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderActionAccounts {
    pub authority: Pubkey,
    pub order: Pubkey,
    pub retailer: Pubkey,
    pub treasurer: Pubkey,
    pub mint: Pubkey,
    pub treasury: Pubkey,
    pub token_account: Pubkey,
}

/// Utility for creating instructions to interact with the exchange-market
/// program on behalf of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeIxBuilder {
    /// The wallet creating offers or taking orders
    pub authority: Pubkey,
}

impl ExchangeIxBuilder {
    pub fn new(authority: Pubkey) -> Self {
        Self { authority }
    }

    /// Expand a retailer identity and bid mint into the full account set for
    /// [Self::initialize_offer]. Pure derivation, no state reads.
    pub fn offer_accounts(&self, retailer: &Pubkey, bid_mint: &Pubkey) -> OfferAccounts {
        let treasurer = derive_treasurer(retailer);

        OfferAccounts {
            authority: self.authority,
            retailer: *retailer,
            treasurer,
            bid_mint: *bid_mint,
            bid_treasury: get_associated_token_address(&treasurer, bid_mint),
            bid_token_account: get_associated_token_address(&self.authority, bid_mint),
        }
    }

    /// Expand a retailer and its bid mint into the account set for
    /// [Self::initialize_order].
    pub fn order_accounts(&self, retailer: &Pubkey, bid_mint: &Pubkey) -> OrderAccounts {
        let treasurer = derive_treasurer(retailer);

        OrderAccounts {
            authority: self.authority,
            retailer: *retailer,
            treasurer,
            ask_mint: *bid_mint,
            ask_treasury: get_associated_token_address(&treasurer, bid_mint),
            ask_token_account: get_associated_token_address(&self.authority, bid_mint),
        }
    }

    /// Expand an order, its owning retailer and the retailer's bid mint into
    /// the account set shared by [Self::buy] and [Self::sell].
    pub fn order_action_accounts(
        &self,
        order: &Pubkey,
        retailer: &Pubkey,
        bid_mint: &Pubkey,
    ) -> OrderActionAccounts {
        let treasurer = derive_treasurer(retailer);

        OrderActionAccounts {
            authority: self.authority,
            order: *order,
            retailer: *retailer,
            treasurer,
            mint: *bid_mint,
            treasury: get_associated_token_address(&treasurer, bid_mint),
            token_account: get_associated_token_address(&self.authority, bid_mint),
        }
    }

    /// Get instruction to create a standing offer.
    ///
    /// The retailer account is a freshly allocated keypair account, not a
    /// PDA; its keypair must sign the transaction.
    pub fn initialize_offer(
        &self,
        accounts: &OfferAccounts,
        bid_total: u64,
        bid_point: u64,
    ) -> Result<Instruction, ExchangeIxError> {
        if bid_total == 0 {
            return Err(ExchangeIxError::ConstraintViolation(
                "bid_total must be greater than zero",
            ));
        }
        if bid_point == 0 {
            return Err(ExchangeIxError::ConstraintViolation(
                "bid_point must express a positive rate",
            ));
        }

        let accounts = ix_account::InitializeOffer {
            authority: accounts.authority,
            retailer: accounts.retailer,
            treasurer: accounts.treasurer,
            bid_mint: accounts.bid_mint,
            bid_treasury: accounts.bid_treasury,
            bid_token_account: accounts.bid_token_account,
            system_program: SYSTEM_PROGRAM_ID,
            token_program: spl_token::ID,
            associated_token_program: spl_associated_token_account::ID,
            rent: Rent::id(),
        };

        Ok(Instruction {
            program_id: exchange_market::ID,
            data: ix_data::InitializeOffer {
                bid_total,
                bid_point,
            }
            .data(),
            accounts: accounts.to_account_metas(None),
        })
    }

    /// Get instruction to open an order against a retailer.
    ///
    /// The order account is a freshly allocated keypair account whose keypair
    /// must sign the transaction.
    pub fn initialize_order(
        &self,
        order: &Pubkey,
        accounts: &OrderAccounts,
        ask_amount: u64,
        ask_point: u64,
    ) -> Result<Instruction, ExchangeIxError> {
        if ask_amount == 0 {
            return Err(ExchangeIxError::ConstraintViolation(
                "ask_amount must be greater than zero",
            ));
        }
        if ask_point == 0 {
            return Err(ExchangeIxError::ConstraintViolation(
                "ask_point must express a positive rate",
            ));
        }

        let accounts = ix_account::InitializeOrder {
            authority: accounts.authority,
            retailer: accounts.retailer,
            treasurer: accounts.treasurer,
            order: *order,
            ask_mint: accounts.ask_mint,
            ask_treasury: accounts.ask_treasury,
            ask_token_account: accounts.ask_token_account,
            system_program: SYSTEM_PROGRAM_ID,
            token_program: spl_token::ID,
            associated_token_program: spl_associated_token_account::ID,
            rent: Rent::id(),
        };

        Ok(Instruction {
            program_id: exchange_market::ID,
            data: ix_data::InitializeOrder {
                ask_amount,
                ask_point,
            }
            .data(),
            accounts: accounts.to_account_metas(None),
        })
    }

    /// Get instruction to execute an order as the buyer.
    ///
    /// The wallet accounts are bound to the ask side: the wallet acquires
    /// the asset the retailer is selling. Quantity is implied by the order's
    /// remaining ask amount.
    pub fn buy(&self, accounts: &OrderActionAccounts) -> Instruction {
        let accounts = ix_account::Buy {
            authority: accounts.authority,
            retailer: accounts.retailer,
            treasurer: accounts.treasurer,
            order: accounts.order,
            ask_mint: accounts.mint,
            ask_treasury: accounts.treasury,
            ask_token_account: accounts.token_account,
            system_program: SYSTEM_PROGRAM_ID,
            token_program: spl_token::ID,
            associated_token_program: spl_associated_token_account::ID,
            rent: Rent::id(),
        };

        Instruction {
            program_id: exchange_market::ID,
            data: ix_data::Buy.data(),
            accounts: accounts.to_account_metas(None),
        }
    }

    /// Get instruction to execute an order as the seller.
    ///
    /// Same account set as [Self::buy], but the wallet accounts are bound to
    /// the bid side: the wallet sells into the retailer's offer.
    pub fn sell(&self, accounts: &OrderActionAccounts) -> Instruction {
        let accounts = ix_account::Sell {
            authority: accounts.authority,
            retailer: accounts.retailer,
            treasurer: accounts.treasurer,
            order: accounts.order,
            bid_mint: accounts.mint,
            bid_treasury: accounts.treasury,
            seller_token_account: accounts.token_account,
            system_program: SYSTEM_PROGRAM_ID,
            token_program: spl_token::ID,
            associated_token_program: spl_associated_token_account::ID,
            rent: Rent::id(),
        };

        Instruction {
            program_id: exchange_market::ID,
            data: ix_data::Sell.data(),
            accounts: accounts.to_account_metas(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Discriminator;

    #[test]
    fn treasurer_derivation_is_deterministic() {
        let retailer = Pubkey::new_unique();

        let first = derive_treasurer(&retailer);
        let second = derive_treasurer(&retailer);

        assert_eq!(first, second);
        assert_eq!(
            first,
            Pubkey::find_program_address(
                &[b"treasurer", retailer.as_ref()],
                &exchange_market::ID
            )
            .0
        );
    }

    #[test]
    fn treasury_is_the_treasurer_holding_account() {
        let retailer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        assert_eq!(
            derive_treasury(&retailer, &mint),
            get_associated_token_address(&derive_treasurer(&retailer), &mint)
        );
    }

    #[test]
    fn parse_address_accepts_base58_and_rejects_garbage() {
        let address = Pubkey::new_unique();
        assert_eq!(Ok(address), parse_address(&address.to_string()));

        assert!(matches!(
            parse_address("not-an-address"),
            Err(ExchangeIxError::InvalidAddress(_))
        ));
    }

    #[test]
    fn initialize_offer_rejects_empty_offer() {
        let builder = ExchangeIxBuilder::new(Pubkey::new_unique());
        let accounts = builder.offer_accounts(&Pubkey::new_unique(), &Pubkey::new_unique());

        assert!(matches!(
            builder.initialize_offer(&accounts, 0, 1),
            Err(ExchangeIxError::ConstraintViolation(_))
        ));
        assert!(matches!(
            builder.initialize_offer(&accounts, 1000, 0),
            Err(ExchangeIxError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn initialize_offer_binds_derived_accounts() {
        let wallet = Pubkey::new_unique();
        let retailer = Pubkey::new_unique();
        let bid_mint = Pubkey::new_unique();

        let builder = ExchangeIxBuilder::new(wallet);
        let accounts = builder.offer_accounts(&retailer, &bid_mint);
        let ix = builder.initialize_offer(&accounts, 1000, 1).unwrap();

        assert_eq!(exchange_market::ID, ix.program_id);
        assert_eq!(wallet, ix.accounts[0].pubkey);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(retailer, ix.accounts[1].pubkey);
        assert!(ix.accounts[1].is_signer);
        assert_eq!(derive_treasurer(&retailer), ix.accounts[2].pubkey);
        assert_eq!(bid_mint, ix.accounts[3].pubkey);
        assert_eq!(derive_treasury(&retailer, &bid_mint), ix.accounts[4].pubkey);
        assert_eq!(
            get_associated_token_address(&wallet, &bid_mint),
            ix.accounts[5].pubkey
        );
    }

    #[test]
    fn initialize_order_rejects_empty_order() {
        let builder = ExchangeIxBuilder::new(Pubkey::new_unique());
        let accounts = builder.order_accounts(&Pubkey::new_unique(), &Pubkey::new_unique());
        let order = Pubkey::new_unique();

        assert!(matches!(
            builder.initialize_order(&order, &accounts, 0, 2),
            Err(ExchangeIxError::ConstraintViolation(_))
        ));
        assert!(matches!(
            builder.initialize_order(&order, &accounts, 100, 0),
            Err(ExchangeIxError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn buy_and_sell_swap_only_the_instruction_selector() {
        let builder = ExchangeIxBuilder::new(Pubkey::new_unique());
        let accounts = builder.order_action_accounts(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        );

        let buy = builder.buy(&accounts);
        let sell = builder.sell(&accounts);

        // the wallet's token account serves the ask side in a buy and the
        // bid side in a sell; on the wire that shows up as the same account
        // list under different instruction selectors
        assert_eq!(buy.accounts, sell.accounts);
        assert_eq!(
            &buy.data[..8],
            &crate::exchange_market::instruction::Buy::DISCRIMINATOR[..]
        );
        assert_eq!(
            &sell.data[..8],
            &crate::exchange_market::instruction::Sell::DISCRIMINATOR[..]
        );
        assert_eq!(buy.accounts[6].pubkey, accounts.token_account);
        assert!(buy.accounts[0].is_signer);
        assert!(!buy.accounts[6].is_signer);
    }
}
