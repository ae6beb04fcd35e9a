use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::SignerError;
use crate::vault::Vault;

/// Algorithm prefix for 32-byte (ed25519) public keys.
const ED25519_PREFIX: &str = "01";
/// Algorithm prefix for 33-byte (compressed secp256k1) public keys.
const SECP256K1_PREFIX: &str = "02";

/// Classifies a raw public key by byte length and returns its
/// prefixed, lowercase-hex identity string.
pub fn prefixed_hex(public_key: &[u8]) -> Result<String, SignerError> {
    let prefix = match public_key.len() {
        32 => ED25519_PREFIX,
        33 => SECP256K1_PREFIX,
        other => return Err(SignerError::UnrecognizedKeyFormat(other)),
    };
    Ok(format!("{prefix}{}", hex::encode(public_key)))
}

/// Prefixed hex identity of the vault's active key.
pub fn active_public_key(vault: &Vault) -> Result<String, SignerError> {
    prefixed_hex(&vault.selected_public_key()?)
}

/// Base64 transport encoding of the vault's active key, no prefix.
pub fn selected_public_key_base64(vault: &Vault) -> Result<String, SignerError> {
    Ok(BASE64.encode(vault.selected_public_key()?))
}
