//! Local filesystem object store.
//!
//! Objects are written under a base directory at their key path:
//! ```text
//! {base_path}/
//! ├── 1/
//! │   └── 1718000000000-9f86d081884c7d65.pdf
//! └── 2/
//!     └── 1718000000123-2c26b46b68ffc68f.txt
//! ```
//!
//! Download URLs point back at this server's `/api/objects/*key` route and
//! carry an expiry plus an HMAC-SHA256 signature over `key \n expires`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{validate_key, ObjectStore, PutMetadata, StorageError};

type HmacSha256 = Hmac<Sha256>;

/// Object store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
    public_base_url: String,
    signing_key: Vec<u8>,
}

impl LocalObjectStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        signing_secret: &str,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        if signing_secret.is_empty() {
            return Err(StorageError::Signing("empty signing secret".to_string()));
        }

        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            signing_key: signing_secret.as_bytes().to_vec(),
        })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full filesystem path for a key.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    /// Unsigned locator for a key.
    pub fn locator(&self, key: &str) -> String {
        format!("{}/api/objects/{}", self.public_base_url, key)
    }

    /// Read an object's bytes.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check a download signature and its expiry (unix seconds).
    pub fn verify(&self, key: &str, expires: i64, signature: &str) -> bool {
        if expires < chrono::Utc::now().timestamp() {
            return false;
        }
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        match self.mac(key, expires) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }

    fn sign(&self, key: &str, expires: i64) -> Result<String, StorageError> {
        let mac = self.mac(key, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self, key: &str, expires: i64) -> Result<HmacSha256, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        _metadata: &PutMetadata,
    ) -> Result<String, StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(self.locator(key))
    }

    async fn signed_get_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        let expires = chrono::Utc::now().timestamp() + ttl.as_secs() as i64;
        let signature = self.sign(key, expires)?;
        Ok(format!(
            "{}?expires={}&signature={}",
            self.locator(key),
            expires,
            signature
        ))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
