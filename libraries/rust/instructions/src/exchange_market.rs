//! Account schemas and instruction wire format for the exchange-market
//! on-chain program.
//!
//! The program itself is deployed separately; everything here must match its
//! account layouts, discriminators and account ordering exactly, or the
//! program will reject the transaction.

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::{borsh, Pubkey};
use anchor_lang::{
    AccountDeserialize, AccountSerialize, AnchorDeserialize, AnchorSerialize, Discriminator, Owner,
};

anchor_lang::declare_id!("Gx9Vab1RKnqq9vTBYy5rhEnfCqRwJtj1dgxseeJvmWu7");

pub const DISCRIMINATOR_SIZE: usize = 8;
pub const PUBKEY_SIZE: usize = 32;
pub const U64_SIZE: usize = 8;

/// A market maker's standing offer: a quantity of the bid asset locked at a
/// fixed exchange rate.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Retailer {
    /// The wallet that created the offer
    pub authority: Pubkey,
    /// The record's own address, written back at creation
    pub retailer: Pubkey,
    /// The asset the retailer is buying. Never changes after creation.
    pub bid_mint: Pubkey,
    /// Remaining quantity offered
    pub bid_total: u64,
    /// Fixed exchange rate
    pub bid_point: u64,
}

impl Retailer {
    pub const LEN: usize = DISCRIMINATOR_SIZE + PUBKEY_SIZE * 3 + U64_SIZE * 2;
}

/// A taker's counter-position against a retailer. The ask side always uses
/// the owning retailer's bid mint.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// The wallet that created the order
    pub authority: Pubkey,
    /// The owning retailer. Immutable after creation.
    pub retailer: Pubkey,
    pub ask_point: u64,
    pub ask_amount: u64,
}

impl Order {
    pub const LEN: usize = DISCRIMINATOR_SIZE + PUBKEY_SIZE * 2 + U64_SIZE * 2;
}

macro_rules! impl_anchor_account {
    ($Account:ident, $discriminator:expr) => {
        impl Discriminator for $Account {
            const DISCRIMINATOR: [u8; 8] = $discriminator;
        }

        impl Owner for $Account {
            fn owner() -> Pubkey {
                ID
            }
        }

        impl AccountSerialize for $Account {
            fn try_serialize<W: std::io::Write>(&self, writer: &mut W) -> anchor_lang::Result<()> {
                if writer.write_all(&Self::DISCRIMINATOR).is_err() {
                    return Err(ErrorCode::AccountDidNotSerialize.into());
                }
                if AnchorSerialize::serialize(self, writer).is_err() {
                    return Err(ErrorCode::AccountDidNotSerialize.into());
                }
                Ok(())
            }
        }

        impl AccountDeserialize for $Account {
            fn try_deserialize(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
                if buf.len() < Self::DISCRIMINATOR.len() {
                    return Err(ErrorCode::AccountDiscriminatorNotFound.into());
                }
                if buf[..Self::DISCRIMINATOR.len()] != Self::DISCRIMINATOR[..] {
                    return Err(ErrorCode::AccountDiscriminatorMismatch.into());
                }
                Self::try_deserialize_unchecked(buf)
            }

            fn try_deserialize_unchecked(buf: &mut &[u8]) -> anchor_lang::Result<Self> {
                let mut data: &[u8] = &buf[Self::DISCRIMINATOR.len()..];
                AnchorDeserialize::deserialize(&mut data)
                    .map_err(|_| ErrorCode::AccountDidNotDeserialize.into())
            }
        }
    };
}

// sha256("account:Retailer")[..8]
impl_anchor_account!(Retailer, [194, 215, 198, 69, 112, 0, 156, 243]);
// sha256("account:Order")[..8]
impl_anchor_account!(Order, [134, 173, 223, 185, 77, 86, 28, 51]);

/// Instruction argument data, in program entrypoint order.
pub mod instruction {
    use super::*;
    use anchor_lang::InstructionData;

    #[derive(AnchorSerialize, AnchorDeserialize)]
    pub struct InitializeOffer {
        pub bid_total: u64,
        pub bid_point: u64,
    }

    impl Discriminator for InitializeOffer {
        // sha256("global:initialize_offer")[..8]
        const DISCRIMINATOR: [u8; 8] = [41, 143, 90, 114, 58, 124, 142, 87];
    }

    impl InstructionData for InitializeOffer {}

    #[derive(AnchorSerialize, AnchorDeserialize)]
    pub struct InitializeOrder {
        pub ask_amount: u64,
        pub ask_point: u64,
    }

    impl Discriminator for InitializeOrder {
        // sha256("global:initialize_order")[..8]
        const DISCRIMINATOR: [u8; 8] = [133, 110, 74, 175, 112, 159, 245, 159];
    }

    impl InstructionData for InitializeOrder {}

    #[derive(AnchorSerialize, AnchorDeserialize)]
    pub struct Buy;

    impl Discriminator for Buy {
        // sha256("global:buy")[..8]
        const DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
    }

    impl InstructionData for Buy {}

    #[derive(AnchorSerialize, AnchorDeserialize)]
    pub struct Sell;

    impl Discriminator for Sell {
        // sha256("global:sell")[..8]
        const DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];
    }

    impl InstructionData for Sell {}
}

/// Account lists per instruction, in the order the program declares them.
/// Writable/signer flags match the program's account constraints.
pub mod accounts {
    use super::*;
    use anchor_lang::solana_program::instruction::AccountMeta;
    use anchor_lang::ToAccountMetas;

    pub struct InitializeOffer {
        pub authority: Pubkey,
        pub retailer: Pubkey,
        pub treasurer: Pubkey,
        pub bid_mint: Pubkey,
        pub bid_treasury: Pubkey,
        pub bid_token_account: Pubkey,
        pub system_program: Pubkey,
        pub token_program: Pubkey,
        pub associated_token_program: Pubkey,
        pub rent: Pubkey,
    }

    impl ToAccountMetas for InitializeOffer {
        fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.authority, true),
                // the retailer account is freshly allocated, so it signs its
                // own initialization
                AccountMeta::new(self.retailer, true),
                AccountMeta::new_readonly(self.treasurer, false),
                AccountMeta::new_readonly(self.bid_mint, false),
                AccountMeta::new(self.bid_treasury, false),
                AccountMeta::new(self.bid_token_account, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.associated_token_program, false),
                AccountMeta::new_readonly(self.rent, false),
            ]
        }
    }

    pub struct InitializeOrder {
        pub authority: Pubkey,
        pub retailer: Pubkey,
        pub treasurer: Pubkey,
        pub order: Pubkey,
        pub ask_mint: Pubkey,
        pub ask_treasury: Pubkey,
        pub ask_token_account: Pubkey,
        pub system_program: Pubkey,
        pub token_program: Pubkey,
        pub associated_token_program: Pubkey,
        pub rent: Pubkey,
    }

    impl ToAccountMetas for InitializeOrder {
        fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.authority, true),
                AccountMeta::new(self.retailer, false),
                AccountMeta::new_readonly(self.treasurer, false),
                AccountMeta::new(self.order, true),
                AccountMeta::new_readonly(self.ask_mint, false),
                AccountMeta::new(self.ask_treasury, false),
                AccountMeta::new(self.ask_token_account, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.associated_token_program, false),
                AccountMeta::new_readonly(self.rent, false),
            ]
        }
    }

    /// The wallet takes the ask side of the order.
    pub struct Buy {
        pub authority: Pubkey,
        pub retailer: Pubkey,
        pub treasurer: Pubkey,
        pub order: Pubkey,
        pub ask_mint: Pubkey,
        pub ask_treasury: Pubkey,
        pub ask_token_account: Pubkey,
        pub system_program: Pubkey,
        pub token_program: Pubkey,
        pub associated_token_program: Pubkey,
        pub rent: Pubkey,
    }

    impl ToAccountMetas for Buy {
        fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.authority, true),
                AccountMeta::new(self.retailer, false),
                AccountMeta::new_readonly(self.treasurer, false),
                AccountMeta::new(self.order, false),
                AccountMeta::new(self.ask_mint, false),
                AccountMeta::new(self.ask_treasury, false),
                AccountMeta::new(self.ask_token_account, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.associated_token_program, false),
                AccountMeta::new_readonly(self.rent, false),
            ]
        }
    }

    /// The wallet takes the bid side, selling into the retailer's offer.
    pub struct Sell {
        pub authority: Pubkey,
        pub retailer: Pubkey,
        pub treasurer: Pubkey,
        pub order: Pubkey,
        pub bid_mint: Pubkey,
        pub bid_treasury: Pubkey,
        pub seller_token_account: Pubkey,
        pub system_program: Pubkey,
        pub token_program: Pubkey,
        pub associated_token_program: Pubkey,
        pub rent: Pubkey,
    }

    impl ToAccountMetas for Sell {
        fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
            vec![
                AccountMeta::new(self.authority, true),
                AccountMeta::new(self.retailer, false),
                AccountMeta::new_readonly(self.treasurer, false),
                AccountMeta::new(self.order, false),
                AccountMeta::new(self.bid_mint, false),
                AccountMeta::new(self.bid_treasury, false),
                AccountMeta::new(self.seller_token_account, false),
                AccountMeta::new_readonly(self.system_program, false),
                AccountMeta::new_readonly(self.token_program, false),
                AccountMeta::new_readonly(self.associated_token_program, false),
                AccountMeta::new_readonly(self.rent, false),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::InstructionData;
    use solana_sdk::hash::hash;

    fn anchor_discriminator(preimage: &str) -> [u8; 8] {
        let digest = hash(preimage.as_bytes());
        <[u8; 8]>::try_from(&digest.to_bytes()[..8]).unwrap()
    }

    #[test]
    fn discriminators_match_their_preimages() {
        assert_eq!(Retailer::DISCRIMINATOR, anchor_discriminator("account:Retailer"));
        assert_eq!(Order::DISCRIMINATOR, anchor_discriminator("account:Order"));
        assert_eq!(
            instruction::InitializeOffer::DISCRIMINATOR,
            anchor_discriminator("global:initialize_offer")
        );
        assert_eq!(
            instruction::InitializeOrder::DISCRIMINATOR,
            anchor_discriminator("global:initialize_order")
        );
        assert_eq!(instruction::Buy::DISCRIMINATOR, anchor_discriminator("global:buy"));
        assert_eq!(instruction::Sell::DISCRIMINATOR, anchor_discriminator("global:sell"));
    }

    #[test]
    fn retailer_account_roundtrip() {
        let retailer = Retailer {
            authority: Pubkey::new_unique(),
            retailer: Pubkey::new_unique(),
            bid_mint: Pubkey::new_unique(),
            bid_total: 1000,
            bid_point: 2,
        };

        let mut data = vec![];
        retailer.try_serialize(&mut data).unwrap();
        assert_eq!(Retailer::LEN, data.len());

        let decoded = Retailer::try_deserialize(&mut &data[..]).unwrap();
        assert_eq!(retailer, decoded);
    }

    // The next two tests lay the record bytes out by hand so the structs
    // cannot drift from the account layout the program allocates.

    #[test]
    fn retailer_layout_matches_the_on_chain_record() {
        let authority = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let bid_mint = Pubkey::new_unique();

        let mut data = Vec::with_capacity(Retailer::LEN);
        data.extend_from_slice(&Retailer::DISCRIMINATOR);
        data.extend_from_slice(authority.as_ref());
        data.extend_from_slice(address.as_ref());
        data.extend_from_slice(bid_mint.as_ref());
        data.extend_from_slice(&1000u64.to_le_bytes());
        data.extend_from_slice(&2u64.to_le_bytes());
        assert_eq!(Retailer::LEN, data.len());

        let decoded = Retailer::try_deserialize(&mut &data[..]).unwrap();
        assert_eq!(authority, decoded.authority);
        assert_eq!(address, decoded.retailer);
        assert_eq!(bid_mint, decoded.bid_mint);
        assert_eq!(1000, decoded.bid_total);
        assert_eq!(2, decoded.bid_point);
    }

    #[test]
    fn order_layout_puts_the_rate_before_the_amount() {
        let authority = Pubkey::new_unique();
        let retailer = Pubkey::new_unique();

        let mut data = Vec::with_capacity(Order::LEN);
        data.extend_from_slice(&Order::DISCRIMINATOR);
        data.extend_from_slice(authority.as_ref());
        data.extend_from_slice(retailer.as_ref());
        data.extend_from_slice(&2u64.to_le_bytes());
        data.extend_from_slice(&100u64.to_le_bytes());
        assert_eq!(Order::LEN, data.len());

        let decoded = Order::try_deserialize(&mut &data[..]).unwrap();
        assert_eq!(authority, decoded.authority);
        assert_eq!(retailer, decoded.retailer);
        assert_eq!(2, decoded.ask_point);
        assert_eq!(100, decoded.ask_amount);
    }

    #[test]
    fn order_account_rejects_foreign_discriminator() {
        let order = Order {
            authority: Pubkey::new_unique(),
            retailer: Pubkey::new_unique(),
            ask_point: 2,
            ask_amount: 100,
        };

        let mut data = vec![];
        order.try_serialize(&mut data).unwrap();
        data[..8].copy_from_slice(&Retailer::DISCRIMINATOR);

        assert!(Order::try_deserialize(&mut &data[..]).is_err());
    }

    #[test]
    fn instruction_data_is_prefixed_with_discriminator() {
        let data = instruction::InitializeOffer {
            bid_total: 1000,
            bid_point: 2,
        }
        .data();

        assert_eq!(&data[..8], &instruction::InitializeOffer::DISCRIMINATOR[..]);
        assert_eq!(&data[8..16], &1000u64.to_le_bytes()[..]);
        assert_eq!(&data[16..24], &2u64.to_le_bytes()[..]);
    }
}
