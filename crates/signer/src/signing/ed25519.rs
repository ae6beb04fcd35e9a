use anyhow::Result;
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};

use super::signer::MessageSigner;

/// EdDSA signer over Curve25519.
///
/// Created from a seed string — the SHA-256 hash of the seed
/// becomes the 32-byte private key.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    pub fn from_seed(seed: &str) -> Result<Self> {
        let hash: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Ok(Self {
            signing_key: SigningKey::from_bytes(&hash),
        })
    }
}

impl MessageSigner for Ed25519Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    fn algorithm(&self) -> &str {
        "ed25519"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn deterministic_signing() {
        let signer = Ed25519Signer::from_seed("test-seed").unwrap();
        let sig1 = signer.sign(b"hello").unwrap();
        let sig2 = signer.sign(b"hello").unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn different_seeds_produce_different_keys() {
        let signer_a = Ed25519Signer::from_seed("seed-a").unwrap();
        let signer_b = Ed25519Signer::from_seed("seed-b").unwrap();
        assert_ne!(signer_a.public_key_bytes(), signer_b.public_key_bytes());
    }

    #[test]
    fn signature_is_64_bytes() {
        let signer = Ed25519Signer::from_seed("test-seed").unwrap();
        let sig = signer.sign(b"data").unwrap();
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn public_key_is_32_bytes() {
        let signer = Ed25519Signer::from_seed("test-seed").unwrap();
        assert_eq!(signer.public_key_bytes().len(), 32);
    }

    #[test]
    fn signature_verifies_as_detached() {
        let signer = Ed25519Signer::from_seed("test-seed").unwrap();
        let sig_bytes = signer.sign(b"payload").unwrap();

        let verifying_key = signer.signing_key.verifying_key();
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        assert!(verifying_key.verify(b"payload", &signature).is_ok());
    }

    #[test]
    fn algorithm_is_ed25519() {
        let signer = Ed25519Signer::from_seed("test-seed").unwrap();
        assert_eq!(signer.algorithm(), "ed25519");
    }
}
