//! Read-merge-write persistence of generated account credentials.

use starknet_types_core::felt::Felt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::credentials::env_file::{self, EnvMap};

pub const ACCOUNT_PRIVATE_KEY: &str = "ACCOUNT_PRIVATE_KEY";
pub const ACCOUNT_PUBLIC_KEY: &str = "ACCOUNT_PUBLIC_KEY";
pub const ACCOUNT_ADDRESS: &str = "ACCOUNT_ADDRESS";
pub const ACCOUNT_CLASS_HASH: &str = "ACCOUNT_CLASS_HASH";

/// Errors while persisting credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// The credentials of one freshly generated account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub private_key: Felt,
    pub public_key: Felt,
    pub address: Felt,
    pub class_hash: Felt,
}

impl AccountCredentials {
    /// Entries written to the credential file.
    pub fn to_entries(&self) -> EnvMap {
        [
            (ACCOUNT_PRIVATE_KEY, self.private_key),
            (ACCOUNT_PUBLIC_KEY, self.public_key),
            (ACCOUNT_ADDRESS, self.address),
            (ACCOUNT_CLASS_HASH, self.class_hash),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), format!("{value:#x}")))
        .collect()
    }
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("private_key", &"<redacted>")
            .field("public_key", &format_args!("{:#x}", self.public_key))
            .field("address", &format_args!("{:#x}", self.address))
            .field("class_hash", &format_args!("{:#x}", self.class_hash))
            .finish()
    }
}

/// Overlay `new_entries` on `existing`. New values win on key collision.
pub fn merge(existing: EnvMap, new_entries: EnvMap) -> EnvMap {
    let mut merged = existing;
    merged.extend(new_entries);
    merged
}

/// `.env`-style credential file.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    path: PathBuf,
}

impl EnvCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, merge `new_entries` over it, and write the result back.
    ///
    /// Keys not present in `new_entries` are preserved. Comments and other
    /// non-entry lines move to the top of the file, ahead of the sorted
    /// entries. The write goes to a sibling temporary file that is then
    /// renamed into place.
    pub fn save(&self, new_entries: EnvMap) -> Result<EnvMap, CredentialError> {
        let mut document = env_file::read_document(&self.path).map_err(|source| {
            CredentialError::Read {
                path: self.path.clone(),
                source,
            }
        })?;
        document.entries = merge(std::mem::take(&mut document.entries), new_entries);
        self.write(&document.render())?;

        tracing::info!(
            path = %self.path.display(),
            keys = document.entries.len(),
            "Credentials persisted"
        );
        Ok(document.entries)
    }

    fn write(&self, content: &str) -> Result<(), CredentialError> {
        let write_err = |source| CredentialError::Write {
            path: self.path.clone(),
            source,
        };

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".env".to_string());
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        let mut file = fs::File::create(&tmp_path).map_err(write_err)?;
        file.write_all(content.as_bytes())
            .map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            write_err(source)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_keeps_existing_keys() {
        let merged = merge(map(&[("A", "1")]), map(&[("B", "2")]));
        assert_eq!(merged, map(&[("A", "1"), ("B", "2")]));
    }

    #[test]
    fn test_merge_new_value_wins() {
        let merged = merge(map(&[("A", "1")]), map(&[("A", "2")]));
        assert_eq!(merged, map(&[("A", "2")]));
    }

    #[test]
    fn test_save_preserves_untouched_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "STARKNET_RPC_URL=http://node\nACCOUNT_ADDRESS=0xold\n").unwrap();

        let store = EnvCredentialStore::new(&path);
        store.save(map(&[("ACCOUNT_ADDRESS", "0xnew")])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "ACCOUNT_ADDRESS=0xnew\nSTARKNET_RPC_URL=http://node\n");
    }

    #[test]
    fn test_save_keeps_operator_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# Sepolia node\nSTARKNET_RPC_URL=http://node\n# old account\nACCOUNT_ADDRESS=0xold\n",
        )
        .unwrap();

        let store = EnvCredentialStore::new(&path);
        store.save(map(&[("ACCOUNT_ADDRESS", "0xnew")])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Sepolia node\n# old account\nACCOUNT_ADDRESS=0xnew\nSTARKNET_RPC_URL=http://node\n"
        );
    }

    #[test]
    fn test_save_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.env");

        let store = EnvCredentialStore::new(&path);
        let merged = store.save(map(&[("B", "2"), ("A", "1")])).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "A=1\nB=2\n");
        assert!(!dir.path().join(".fresh.env.tmp").exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvCredentialStore::new(dir.path().join("nope").join(".env"));
        let result = store.save(map(&[("A", "1")]));
        assert!(matches!(result, Err(CredentialError::Write { .. })));
    }

    #[test]
    fn test_credentials_entries() {
        let credentials = AccountCredentials {
            private_key: Felt::from(1u64),
            public_key: Felt::from(2u64),
            address: Felt::from(3u64),
            class_hash: Felt::from(4u64),
        };
        let entries = credentials.to_entries();
        assert_eq!(entries[ACCOUNT_PRIVATE_KEY], "0x1");
        assert_eq!(entries[ACCOUNT_PUBLIC_KEY], "0x2");
        assert_eq!(entries[ACCOUNT_ADDRESS], "0x3");
        assert_eq!(entries[ACCOUNT_CLASS_HASH], "0x4");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("private_key: \"<redacted>\""));
        assert!(debug.contains("public_key: 0x2"));
    }
}
