//! Persistence backends for session entries
//!
//! A session is persisted as two string entries: the bearer token under
//! [`TOKEN_KEY`] and the JSON-serialized user under [`USER_KEY`]. Stores only
//! move strings around; interpretation happens in [`super::SessionContext`].
//!
//! Three backends are provided:
//!
//! - [`MemorySessionStore`] keeps entries for the life of the process.
//! - [`FileSessionStore`] keeps a small JSON map on disk.
//! - [`KeyringSessionStore`] uses the operating system's credential store.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;

use crate::error::{ClinicError, Result};

/// Entry holding the opaque bearer token.
pub const TOKEN_KEY: &str = "token";

/// Entry holding the serialized [`crate::models::UserInfo`].
pub const USER_KEY: &str = "user";

/// Key-value storage for session entries.
///
/// Implementations must treat removing a missing key as success.
pub trait SessionStore: Send + Sync {
    /// Reads an entry, `Ok(None)` when it was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes or replaces an entry.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes an entry.
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// Process-local store. Entries vanish when the store is dropped.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClinicError::SessionStore("memory store lock poisoned".into()).into())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileSessionStore
// ---------------------------------------------------------------------------

/// Stores entries as a JSON object in a single file.
///
/// The file is read on every access so that several processes (for example
/// two CLI invocations) observe each other's login and logout. Parent
/// directories are created on first write.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Opens a store at the default location in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::SessionStore`] if no home directory can be
    /// determined.
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "clinic", "clinic").ok_or_else(|| {
            ClinicError::SessionStore("could not determine data directory".to_string())
        })?;
        Ok(Self::with_path(proj_dirs.data_dir().join("session.json")))
    }

    /// Opens a store backed by `path`. Nothing is touched until first use.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ClinicError::SessionStore(format!(
                    "corrupt session file {}: {}",
                    self.path.display(),
                    e
                ))
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ClinicError::Io(e).into()),
        }
    }

    /// Like [`Self::read_all`], but a corrupt file reads as empty so that the
    /// next write replaces it. Login, logout and the 401 path must always be
    /// able to reset the session.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_all() {
            Err(e)
                if matches!(
                    e.downcast_ref::<ClinicError>(),
                    Some(ClinicError::SessionStore(_))
                ) =>
            {
                tracing::warn!("{}; overwriting", e);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash mid-write never leaves a truncated session file.
    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = open_private(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClinicError::SessionStore("file store lock poisoned".into()))?;
        let mut entries = self.read_for_update()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

/// Creates (or truncates) `path` readable by the owner only. The file holds
/// a bearer token.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

// ---------------------------------------------------------------------------
// KeyringSessionStore
// ---------------------------------------------------------------------------

/// Stores each entry in the OS keyring (Keychain, Secret Service, Windows
/// Credential Manager) under a shared service name.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    /// Default keyring service namespace.
    pub const DEFAULT_SERVICE: &'static str = "clinic-session";

    /// Creates a store under [`Self::DEFAULT_SERVICE`].
    pub fn new() -> Self {
        Self::with_service(Self::DEFAULT_SERVICE)
    }

    /// Creates a store under a custom service name, e.g. one per backend.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|e| ClinicError::Keyring(e).into())
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ClinicError::Keyring(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(ClinicError::Keyring)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ClinicError::Keyring(e).into()),
        }
    }
}
