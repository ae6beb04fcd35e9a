pub mod error;
pub mod identity;
pub mod manager;
pub mod popup;
pub mod server;
pub mod signing;
pub mod store;
pub mod vault;

pub use error::SignerError;
pub use manager::SigningManager;
pub use server::{AppState, router, run};
pub use signing::{Ed25519Signer, MessageSigner, Secp256k1Signer};
pub use vault::Vault;
