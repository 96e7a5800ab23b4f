use std::collections::HashSet;

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;

use crate::util::keypair::clone_keypair_vec;

/// A group of instructions that are expected to execute in the same
/// transaction, along with any generated keypairs that must sign it.
///
/// The signers here are typically accounts being initialized by the included
/// instructions. The payer and the user's wallet are not included; their
/// signatures are added by the network interface at submission time.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    /// see above
    pub instructions: Vec<Instruction>,

    /// Generated keypairs required by the included instructions.
    pub signers: Vec<Keypair>,
}

impl Clone for TransactionBuilder {
    fn clone(&self) -> Self {
        Self {
            instructions: self.instructions.clone(),
            signers: clone_keypair_vec(&self.signers),
        }
    }
}

impl From<Vec<Instruction>> for TransactionBuilder {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: vec![],
        }
    }
}

impl From<Instruction> for TransactionBuilder {
    fn from(ix: Instruction) -> Self {
        Self {
            instructions: vec![ix],
            signers: vec![],
        }
    }
}

impl TransactionBuilder {
    /// Attach a generated keypair that must sign the transaction.
    pub fn with_signer(mut self, signer: Keypair) -> Self {
        self.signers.push(signer);
        self
    }

    /// Cleans up any duplicate or unneeded signers.
    pub fn prune(&mut self) {
        let mut signer_pubkeys = HashSet::new();
        for signer in std::mem::take(&mut self.signers) {
            let pubkey = signer.pubkey();
            if !signer_pubkeys.contains(&pubkey) && self.instructions.needs_signature(pubkey) {
                signer_pubkeys.insert(pubkey);
                self.signers.push(signer);
            }
        }
    }

    /// Convert into a solana Transaction signed by the generated keypairs only.
    ///
    /// Intended to have other signatures, such as the payer's, added later.
    pub fn compile_partial(mut self, payer: Option<&Pubkey>, recent_blockhash: Hash) -> Transaction {
        self.prune();
        let mut tx = Transaction::new_unsigned(Message::new(&self.instructions, payer));
        tx.partial_sign(&self.signers.iter().collect::<Vec<_>>(), recent_blockhash);
        tx
    }

    /// Convert into a fully signed solana Transaction.
    ///
    /// Handles the typical situation where the payer is the only additional
    /// signer needed.
    pub fn compile<S: Signer>(self, payer: &S, recent_blockhash: Hash) -> Transaction {
        let mut tx = self.compile_partial(Some(&payer.pubkey()), recent_blockhash);
        tx.partial_sign(&[payer], recent_blockhash);
        tx
    }
}

pub trait NeedsSignature {
    fn needs_signature(&self, potential_signer: Pubkey) -> bool;
}

impl NeedsSignature for Instruction {
    fn needs_signature(&self, potential_signer: Pubkey) -> bool {
        self.accounts
            .iter()
            .any(|a| a.is_signer && potential_signer == a.pubkey)
    }
}

impl NeedsSignature for Vec<Instruction> {
    fn needs_signature(&self, potential_signer: Pubkey) -> bool {
        self.iter().any(|ix| ix.needs_signature(potential_signer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    fn dummy_ix(signer: Pubkey) -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![AccountMeta::new(signer, true)],
            data: vec![],
        }
    }

    #[test]
    fn prune_drops_unneeded_signers() {
        let needed = Keypair::new();
        let needed_pubkey = needed.pubkey();
        let unneeded = Keypair::new();

        let mut builder = TransactionBuilder::from(dummy_ix(needed_pubkey))
            .with_signer(needed)
            .with_signer(unneeded);

        builder.prune();
        assert_eq!(1, builder.signers.len());
        assert_eq!(needed_pubkey, builder.signers[0].pubkey());
    }

    #[test]
    fn compile_partial_signs_with_generated_keypairs() {
        let account = Keypair::new();
        let payer = Keypair::new();

        let builder = TransactionBuilder::from(dummy_ix(account.pubkey()))
            .with_signer(account);

        let tx = builder.compile_partial(Some(&payer.pubkey()), Hash::default());
        assert!(tx.signatures.iter().any(|sig| *sig != Default::default()));
    }
}
