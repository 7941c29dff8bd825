//! Signing capability injected into the relay invoker. The invoker never
//! signs anything itself; wallet custody stays behind this trait.

use ed25519_dalek::{
    Signer as _,
    SigningKey,
    VerifyingKey,
};
use rand::rngs::OsRng;
use sha2::{
    Digest,
    Sha256,
};

use crate::error::{
    Error,
    Result,
};

pub trait Signer {
    /// The connected wallet address, `0x`-prefixed hex.
    fn address(&self) -> &str;

    /// Sign the canonical message text with the user's key.
    fn sign_message(&self, message: &str) -> impl Future<Output = Result<String>>;
}

/// In-process signer over an ed25519 keypair. Used by the CLI once a
/// keystore file has been decrypted, and by tests.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: String,
}

impl LocalSigner {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let address = derive_address(&key.verifying_key());
        Self { key, address }
    }

    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Signing(format!("expected a 32-byte key, got {}", bytes.len())))?;
        Ok(Self::from_seed(&seed))
    }

    pub fn random() -> Self {
        let key = SigningKey::generate(&mut OsRng);
        let address = derive_address(&key.verifying_key());
        Self { key, address }
    }

    pub fn key_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self.key.sign(message.as_bytes());
        Ok(format!("0x{}", hex::encode(signature.to_bytes())))
    }
}

/// Address = `0x` + first 20 bytes of sha256(public key), hex-encoded.
fn derive_address(verifying_key: &VerifyingKey) -> String {
    let digest = Sha256::digest(verifying_key.to_bytes());
    format!("0x{}", hex::encode(&digest[..20]))
}
