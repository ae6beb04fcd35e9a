mod signer;
mod ed25519;
mod secp256k1;

pub use signer::MessageSigner;
pub use ed25519::Ed25519Signer;
pub use self::secp256k1::Secp256k1Signer;
