use solana_sdk::signature::Keypair;

/// Clone a keypair through its byte representation, since [Keypair] does not
/// implement [Clone].
pub fn clone_keypair(keypair: &Keypair) -> Keypair {
    Keypair::from_bytes(&keypair.to_bytes()).unwrap()
}

pub fn clone_keypair_vec(keypairs: &[Keypair]) -> Vec<Keypair> {
    keypairs.iter().map(clone_keypair).collect()
}
