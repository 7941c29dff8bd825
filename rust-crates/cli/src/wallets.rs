use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use eth_keystore::{
    decrypt_key,
    encrypt_key,
};
use rpassword::prompt_password;
use wager_client::{
    LocalSigner,
    Signer,
};

#[derive(Clone, Debug)]
pub struct WalletDescriptor {
    pub name: String,
    pub path: PathBuf,
}

impl WalletDescriptor {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

pub fn default_wallet_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").wrap_err("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".wager").join("wallets"))
}

pub fn resolve_wallet_dir(dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(raw) => {
            let expanded = shellexpand::tilde(raw);
            Ok(PathBuf::from(expanded.into_owned()))
        }
        None => default_wallet_dir(),
    }
}

pub fn list_wallets(dir: &Path) -> Result<Vec<WalletDescriptor>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wallets = Vec::new();
    for entry in fs::read_dir(dir).wrap_err("Failed to read wallet directory")? {
        let entry = entry.wrap_err("Failed to read wallet entry")?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("wallet") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| eyre!("Invalid wallet filename {:?}", path))?
            .to_owned();
        wallets.push(WalletDescriptor::new(name, path));
    }
    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}

pub fn find_wallet(dir: &Path, name: &str) -> Result<WalletDescriptor> {
    let wallets = list_wallets(dir)?;
    wallets
        .into_iter()
        .find(|w| w.name == name)
        .ok_or_else(|| eyre!("Wallet '{name}' not found in {}", dir.display()))
}

/// Generate a fresh keypair and write it as an encrypted keystore file.
pub fn create_wallet(dir: &Path, name: &str) -> Result<(WalletDescriptor, String)> {
    fs::create_dir_all(dir).wrap_err("Failed to create wallet directory")?;
    let existing = list_wallets(dir)?;
    if existing.iter().any(|w| w.name == name) {
        return Err(eyre!("Wallet '{name}' already exists in {}", dir.display()));
    }

    let password = prompt_password(format!("Choose a password for wallet '{name}': "))
        .wrap_err("Failed to read wallet password")?;
    let confirm = prompt_password("Confirm password: ").wrap_err("Failed to read wallet password")?;
    if password != confirm {
        return Err(eyre!("Passwords do not match"));
    }

    let signer = LocalSigner::random();
    let file_name = format!("{name}.wallet");
    encrypt_key(
        dir,
        &mut rand::thread_rng(),
        signer.key_bytes(),
        password.as_bytes(),
        Some(file_name.as_str()),
    )
    .map_err(|e| eyre!("Failed to write keystore file: {e}"))?;

    let descriptor = WalletDescriptor::new(name, dir.join(file_name));
    Ok((descriptor, signer.address().to_string()))
}

pub fn unlock_wallet(descriptor: &WalletDescriptor) -> Result<LocalSigner> {
    let prompt = format!("Enter password for wallet '{}': ", descriptor.name);
    let password = prompt_password(prompt).wrap_err("Failed to read wallet password")?;

    let secret = decrypt_key(&descriptor.path, password.as_bytes())
        .map_err(|_| eyre!("Invalid password for wallet '{}'", descriptor.name))?;

    LocalSigner::from_key_bytes(&secret).map_err(|_| {
        eyre!(
            "Wallet '{}' contained unsupported key material",
            descriptor.name
        )
    })
}
