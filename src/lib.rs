pub mod authenticator;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod kdf;
pub mod keystore;
pub mod passkey;
pub mod records;
pub mod up;
pub mod vault;
pub mod wallet;

pub use error::{Error, Result};
pub use kdf::{CredentialMaterial, SymmetricKey, derive_key};
pub use records::{CredentialRecord, RecordStore};
pub use vault::{WalletState, WalletVault};
pub use wallet::{EncryptedWallet, Wallet};

use std::path::Path;
use std::sync::Arc;

use config::{Command, Config};

const KEYS_DIR: &str = "keys";
const RECORDS_DIR: &str = "records";
const DEVICE_KEY_FILE: &str = "device_key.bin";

pub async fn run(cfg: Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    let data_dir = cfg.resolve_data_dir()?;
    let user = match &cfg.command {
        Command::Setup { user } | Command::Unlock { user } | Command::Status { user } => user.clone(),
        Command::Wipe => return wipe(&data_dir),
    };

    // Preflight checks
    diagnostics::check(&cfg, &data_dir)?;

    let device_key = load_or_create_device_key(&data_dir.join(DEVICE_KEY_FILE))?;
    let keys_dir = data_dir.join(KEYS_DIR);
    std::fs::create_dir_all(&keys_dir)?;
    let keys = keystore::KeyStore::load(*device_key, keys_dir)
        .map_err(|e| anyhow::anyhow!("Failed to load resident keys: {e}"))?;
    tracing::info!(count = keys.credential_count(), "Resident keys loaded");

    let verifier: Arc<dyn up::UserVerifier> = if cfg.assume_yes {
        Arc::new(up::AlwaysApprove)
    } else {
        Arc::new(up::PinentryVerifier::new(&cfg.pinentry))
    };
    let authenticator = Arc::new(authenticator::SoftwareAuthenticator::new(keys, verifier));

    let records = Arc::new(records::FileRecordStore::new(data_dir.join(RECORDS_DIR), user.as_str()));
    let mut vault = WalletVault::new(authenticator, records, cfg.rp_id.clone());

    match cfg.command {
        Command::Setup { .. } => {
            let wallet = vault.setup(&user).await?;
            println!("Wallet created for {user}");
            print_public(wallet)?;
        }
        Command::Unlock { .. } => match vault.unlock().await {
            Ok(wallet) => {
                println!("Wallet unlocked for {user}");
                print_public(wallet)?;
            }
            Err(Error::DecryptionFailed) => {
                anyhow::bail!("stored wallet failed authentication: it may be corrupted or tampered with");
            }
            Err(e @ (Error::NoCredentialFound | Error::AssertionFailed(_))) => {
                anyhow::bail!("{e}; run `setup {user}` to create a new wallet");
            }
            Err(e) => return Err(e.into()),
        },
        Command::Status { .. } => match vault.refresh().await? {
            Some(record) => {
                println!("credentialId: {}", record.credential_id);
                println!("publicKey:    {}", record.public_key);
                println!("createdAt:    {}", record.created_at);
            }
            None => println!("No wallet for {user}"),
        },
        Command::Wipe => {}
    }
    Ok(())
}

fn print_public(wallet: &Wallet) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&wallet.public_jwk())?);
    Ok(())
}

/// Delete resident keys, credential records and the device key.
pub fn wipe(data_dir: &Path) -> anyhow::Result<()> {
    let mut count = 0usize;
    for sub in [KEYS_DIR, RECORDS_DIR] {
        let dir = data_dir.join(sub);
        if dir.exists() {
            for entry in std::fs::read_dir(&dir)? {
                std::fs::remove_file(entry?.path())?;
                count += 1;
            }
        }
    }
    let device_key = data_dir.join(DEVICE_KEY_FILE);
    if device_key.exists() {
        std::fs::remove_file(&device_key)?;
    }
    println!("Deleted {count} file(s) from {}", data_dir.display());
    Ok(())
}

/// Read the 32-byte key that encrypts resident keys at rest, creating it on first use.
pub fn load_or_create_device_key(path: &Path) -> anyhow::Result<zeroize::Zeroizing<[u8; 32]>> {
    use rand::RngCore;

    let mut key = zeroize::Zeroizing::new([0u8; 32]);
    if path.exists() {
        let bytes = zeroize::Zeroizing::new(std::fs::read(path)?);
        if bytes.len() != key.len() {
            anyhow::bail!("{} is {} bytes, expected 32", path.display(), bytes.len());
        }
        key.copy_from_slice(&bytes);
        return Ok(key);
    }

    rand::rngs::OsRng.fill_bytes(key.as_mut());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_private(path, key.as_ref())?;
    tracing::info!(path = %path.display(), "Device key created");
    Ok(key)
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}
