use ed25519_dalek as ed25519;
use std::fmt;
use zeroize::Zeroizing;

use crate::threadrand::SecureRng;

const SEED_LENGTH: usize = 32;

#[derive(Debug)]
pub enum KeypairError {
    InvalidAccountId(stellar_strkey::DecodeError),
    InvalidSeed,
}

impl std::error::Error for KeypairError {}

impl fmt::Display for KeypairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeypairError::InvalidAccountId(e) => {
                write!(f, "KeypairError: Invalid Stellar account ID: {e}")
            }
            KeypairError::InvalidSeed => {
                write!(f, "KeypairError: Seed must be {SEED_LENGTH} hex-encoded bytes")
            }
        }
    }
}

/// An ed25519 keypair minted for a single guardian.
///
/// The account ID is the StrKey `G...` form of the public key. For storage the raw 32-byte seed is
/// hex encoded; the StrKey `S...` form is what Stellar wallets import.
pub struct GuardianKeypair {
    signing_key: ed25519::SigningKey,
}

impl GuardianKeypair {
    pub fn random() -> Self {
        Self {
            signing_key: ed25519::SigningKey::generate(&mut SecureRng),
        }
    }

    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self, KeypairError> {
        let seed = Zeroizing::new(
            hex::decode(private_key_hex).map_err(|_| KeypairError::InvalidSeed)?,
        );
        let seed: &[u8; SEED_LENGTH] = seed
            .as_slice()
            .try_into()
            .map_err(|_| KeypairError::InvalidSeed)?;

        Ok(Self {
            signing_key: ed25519::SigningKey::from_bytes(seed),
        })
    }

    pub fn account(&self) -> String {
        stellar_strkey::ed25519::PublicKey(self.signing_key.verifying_key().to_bytes()).to_string()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn secret_seed(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(stellar_strkey::ed25519::PrivateKey(*seed).to_string())
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(hex::encode(*seed))
    }
}

/// Decodes a StrKey `G...` account ID into its raw ed25519 public key.
pub fn decode_account_id(account_id: &str) -> Result<[u8; 32], KeypairError> {
    let public_key = stellar_strkey::ed25519::PublicKey::from_string(account_id)
        .map_err(KeypairError::InvalidAccountId)?;

    Ok(public_key.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ed25519_dalek::{Signer, Verifier};
    use std::collections::HashSet;

    #[test]
    fn account_id_is_strkey_public_key() {
        let keypair = GuardianKeypair::random();
        let account = keypair.account();

        assert_eq!(account.len(), 56);
        assert!(account.starts_with('G'));
        assert_eq!(decode_account_id(&account).unwrap(), keypair.public_key_bytes());
    }

    #[test]
    fn secret_seed_is_strkey_private_key() {
        let keypair = GuardianKeypair::random();
        let secret_seed = keypair.secret_seed();

        assert_eq!(secret_seed.len(), 56);
        assert!(secret_seed.starts_with('S'));
    }

    #[test]
    fn hex_seed_restores_same_keypair() {
        let keypair = GuardianKeypair::random();
        let private_key_hex = keypair.private_key_hex();

        assert_eq!(private_key_hex.len(), 64);

        let restored = GuardianKeypair::from_private_key_hex(&private_key_hex).unwrap();
        assert_eq!(restored.account(), keypair.account());

        let message = b"guardian approval";
        let signature = restored.signing_key.sign(message);
        assert!(keypair
            .signing_key
            .verifying_key()
            .verify(message, &signature)
            .is_ok());
    }

    #[test]
    fn minted_keypairs_are_distinct() {
        let accounts: HashSet<String> = (0..32).map(|_| GuardianKeypair::random().account()).collect();
        assert_eq!(accounts.len(), 32);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            GuardianKeypair::from_private_key_hex("abcd"),
            Err(KeypairError::InvalidSeed)
        ));
        assert!(matches!(
            GuardianKeypair::from_private_key_hex("not hex at all"),
            Err(KeypairError::InvalidSeed)
        ));

        let secret_seed = GuardianKeypair::random().secret_seed();
        assert!(decode_account_id(&secret_seed).is_err());
        assert!(decode_account_id("GABC").is_err());
    }
}
