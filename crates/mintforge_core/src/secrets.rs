use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::MintforgeConfig;

const AES_NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;
const SALT_FILENAME: &str = "storage.salt";
const SECRETS_FILENAME: &str = "secrets.enc";

/// Storage key names for the pinning provider credentials, in fallback order.
pub const PINNING_TOKEN_KEYS: [&str; 3] = [
    "pinning_token_primary",
    "pinning_token_backup",
    "pinning_token_backup2",
];

/// Environment variables that override stored pinning credentials, in
/// fallback order.
const PINNING_TOKEN_ENV: [&str; 3] = [
    "MINTFORGE_PINNING_JWT",
    "MINTFORGE_PINNING_JWT_BACKUP",
    "MINTFORGE_PINNING_JWT_BACKUP2",
];

/// Encrypted storage for pinning credentials and other sensitive values.
/// Uses AES-256-GCM with a key derived via Argon2id from machine-specific
/// context and a persisted random salt.
pub struct SecretStore {
    cipher: Aes256Gcm,
    secrets_path: PathBuf,
}

impl SecretStore {
    /// Open the default store under `~/.mintforge/`.
    ///
    /// The salt is loaded from (or generated and saved to)
    /// `~/.mintforge/storage.salt`.
    pub fn open() -> Result<Self> {
        let base = MintforgeConfig::base_dir()?;
        Self::open_in(&base)
    }

    /// Open a store rooted at a custom directory. Useful for testing without
    /// touching `~/.mintforge/`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let key_material = Self::derive_key(&dir.join(SALT_FILENAME))?;
        let key = Key::<Aes256Gcm>::from_slice(&key_material);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
            secrets_path: dir.join(SECRETS_FILENAME),
        })
    }

    /// Encrypt a plaintext string, returning hex-encoded ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes: [u8; AES_NONCE_LEN] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("Encryption failed: {e}"))?;

        // Nonce travels with the ciphertext.
        let mut payload = nonce_bytes.to_vec();
        payload.extend_from_slice(&ciphertext);

        Ok(hex::encode(payload))
    }

    /// Decrypt a hex-encoded ciphertext string.
    pub fn decrypt(&self, hex_ciphertext: &str) -> Result<String> {
        let data = hex::decode(hex_ciphertext).context("Invalid hex")?;
        if data.len() < AES_NONCE_LEN {
            anyhow::bail!("Ciphertext too short");
        }

        let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow::anyhow!("Decryption failed: {e}"))?;

        String::from_utf8(plaintext).context("Decrypted data is not valid UTF-8")
    }

    /// Store a named secret, replacing any previous value. An empty value
    /// removes the entry.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut map = self.load_map();
        if value.is_empty() {
            map.remove(name);
        } else {
            map.insert(name.to_string(), self.encrypt(value)?);
        }
        self.save_map(&map)
    }

    /// Retrieve a named secret. Returns `None` on any error (missing entry,
    /// decryption failure) so callers degrade gracefully.
    pub fn get(&self, name: &str) -> Option<String> {
        let map = self.load_map();
        let encrypted = map.get(name)?;
        match self.decrypt(encrypted) {
            Ok(plaintext) if !plaintext.is_empty() => Some(plaintext),
            _ => None,
        }
    }

    /// Resolve the ordered pinning credential list: environment variables
    /// first, then the encrypted store. Duplicate and empty entries are
    /// dropped; the result preserves fallback order.
    pub fn pinning_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for var in PINNING_TOKEN_ENV {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() && !tokens.contains(&value) {
                    tokens.push(value);
                }
            }
        }
        for key in PINNING_TOKEN_KEYS {
            if let Some(value) = self.get(key) {
                if !tokens.contains(&value) {
                    tokens.push(value);
                }
            }
        }
        tokens
    }

    // -----------------------------------------------------------------------
    // On-disk map helpers
    // -----------------------------------------------------------------------

    /// Load the encrypted secret map from disk. Returns an empty map if the
    /// file is missing or unreadable.
    fn load_map(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.secrets_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn save_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.secrets_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.secrets_path, content)
            .with_context(|| format!("Failed to write secret store: {}", self.secrets_path.display()))?;

        // Restrict file permissions to owner-only on Unix (0o600 = rw-------).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.secrets_path, fs::Permissions::from_mode(0o600))
                .context("failed to set secret store file permissions")?;
        }
        Ok(())
    }

    /// Load a salt from disk, or generate and persist a new one.
    fn load_or_create_salt(salt_path: &Path) -> Result<[u8; SALT_LEN]> {
        if let Ok(data) = fs::read(salt_path) {
            if data.len() == SALT_LEN {
                let mut salt = [0u8; SALT_LEN];
                salt.copy_from_slice(&data);
                return Ok(salt);
            }
            // Wrong-length salt file: fall through and regenerate.
        }

        let salt: [u8; SALT_LEN] = rand::random();

        if let Some(parent) = salt_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::write(salt_path, salt)
            .with_context(|| format!("Failed to write salt file {}", salt_path.display()))?;

        Ok(salt)
    }

    /// Derive a 256-bit key using Argon2id with a persisted random salt and
    /// machine-specific context (username + home directory).
    ///
    /// Parameters: Argon2id, m=19456 KiB (~19 MB), t=2 iterations, p=1 lane.
    fn derive_key(salt_path: &Path) -> Result<[u8; 32]> {
        let salt = Self::load_or_create_salt(salt_path)?;

        let username = whoami::username();
        let home = dirs::home_dir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let password = format!("mintforge-secret-store-v1:{username}:{home}");

        let params = Params::new(19_456, 2, 1, Some(32))
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), &salt, &mut key)
            .map_err(|e| anyhow::anyhow!("Argon2 key derivation failed: {e}"))?;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &Path) -> SecretStore {
        SecretStore::open_in(dir).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        let plaintext = "eyJhbGciOiJIUzI1NiJ9.fake-jwt-for-tests";
        let encrypted = store.encrypt(plaintext).unwrap();
        let decrypted = store.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn encrypt_produces_hex() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        let encrypted = store.encrypt("test").unwrap();
        assert!(hex::decode(&encrypted).is_ok());
    }

    #[test]
    fn encrypt_different_each_time() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        let a = store.encrypt("same-value").unwrap();
        let b = store.encrypt("same-value").unwrap();
        // Random nonces should make each encryption unique.
        assert_ne!(a, b);
    }

    #[test]
    fn set_and_get_secret() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());

        store.set("pinning_token_primary", "token-value").unwrap();
        assert_eq!(store.get("pinning_token_primary").unwrap(), "token-value");
    }

    #[test]
    fn get_missing_secret_returns_none() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        assert!(store.get("does-not-exist").is_none());
    }

    #[test]
    fn set_empty_removes_secret() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());

        store.set("pinning_token_backup", "value").unwrap();
        store.set("pinning_token_backup", "").unwrap();
        assert!(store.get("pinning_token_backup").is_none());
    }

    #[test]
    fn secrets_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = store_in(tmp.path());
            store.set("pinning_token_primary", "persisted").unwrap();
        }
        let reopened = store_in(tmp.path());
        assert_eq!(reopened.get("pinning_token_primary").unwrap(), "persisted");
    }

    #[test]
    fn decrypt_garbage_fails() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        assert!(store.decrypt("zz-not-hex").is_err());
        assert!(store.decrypt("00ff").is_err());
    }

    #[test]
    fn pinning_tokens_preserve_store_order() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        store.set("pinning_token_backup", "b").unwrap();
        store.set("pinning_token_primary", "a").unwrap();

        let tokens = store.pinning_tokens();
        let a = tokens.iter().position(|t| t == "a").unwrap();
        let b = tokens.iter().position(|t| t == "b").unwrap();
        assert!(a < b);
    }
}
