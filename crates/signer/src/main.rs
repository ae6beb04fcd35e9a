use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use signing_gate::{
    Ed25519Signer, MessageSigner, Secp256k1Signer, SigningManager, Vault, run,
};

#[derive(Debug, Clone, ValueEnum)]
enum SigningAlgorithm {
    Ed25519,
    Secp256k1,
}

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: Option<String>,
    #[clap(long, default_value = "3000")]
    port: Option<u16>,
    #[clap(long, env = "SIGNING_KEY_SEED")]
    signing_key_seed: Option<String>,
    #[clap(long, env = "SIGNING_ALGORITHM", default_value = "ed25519")]
    signing_algorithm: SigningAlgorithm,
    /// Undecided requests are rejected after this many seconds.
    #[clap(long, env = "APPROVAL_TIMEOUT_SECS")]
    approval_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let vault = Arc::new(Vault::new());
    if let Some(seed) = args.signing_key_seed {
        let signer: Arc<dyn MessageSigner> = match args.signing_algorithm {
            SigningAlgorithm::Ed25519 => Arc::new(
                Ed25519Signer::from_seed(&seed).expect("failed to create ed25519 signer"),
            ),
            SigningAlgorithm::Secp256k1 => Arc::new(
                Secp256k1Signer::from_seed(&seed).expect("failed to create secp256k1 signer"),
            ),
        };
        vault.connect();
        vault.select(signer);
    }

    let mut manager = SigningManager::headless(vault);
    if let Some(secs) = args.approval_timeout_secs {
        manager = manager.with_decision_timeout(Duration::from_secs(secs));
    }

    println!("Running");
    run(args.host.unwrap(), args.port.unwrap(), Arc::new(manager))
        .await
        .unwrap();
}
