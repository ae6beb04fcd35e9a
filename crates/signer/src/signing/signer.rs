/// Trait for producing detached signatures over raw message bytes.
///
/// Implementations are sync — signing is CPU-bound.
/// For async backends (e.g. KMS), use `spawn_blocking`.
pub trait MessageSigner: Send + Sync {
    /// Sign raw message bytes. Returns raw signature bytes.
    fn sign(&self, message: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Public key bytes (32 bytes for ed25519, 33 compressed for secp256k1).
    fn public_key_bytes(&self) -> Vec<u8>;

    /// Algorithm identifier string (e.g. "ed25519").
    fn algorithm(&self) -> &str;
}
