//! # Contract Store
//!
//! Keeps contracts and indoor-climate records as JSON files:
//!
//! ```text
//! <root>/contracts/<project id>.json
//! <root>/indoor_climas/<project id>.json
//! ```
//!
//! - **Atomic saves**: write `<file>.json.tmp`, fsync, rename over the target
//! - **File locking**: an fs2 lock plus a `.json.lock` file naming the holder
//! - **Version validation**: every file carries the schema version it was written with
//!
//! Loading a contract refreshes VAT and EUROBOR from the store's
//! [`RateProvider`]; saving one runs the calculation engine first so the
//! stored tables and headline fields are always current.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use epc_core::contract::Contract;
//! use epc_core::file_io::{ContractStore, FileContractStore};
//! use epc_core::project::ProjectSnapshot;
//! use epc_core::rates::StaticRates;
//! use rust_decimal::Decimal;
//!
//! let rates = StaticRates::new(Decimal::ZERO).with_default_vat(Decimal::new(21, 2));
//! let store = FileContractStore::new("data", Arc::new(rates), "operator");
//!
//! let project = ProjectSnapshot::new("Latvia");
//! let mut contract = Contract::new(project.id);
//! store.save(&mut contract, &project)?;
//!
//! let loaded = store.load(&project)?;
//! assert_eq!(loaded.vat, Decimal::new(21, 2));
//! # Ok::<(), epc_core::errors::EpcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::Calculation;
use crate::contract::Contract;
use crate::entity::{Entity, EntityKind, Reference, Stored};
use crate::errors::{EpcError, EpcResult};
use crate::indoor_clima::IndoorClima;
use crate::project::ProjectSnapshot;
use crate::rates::RateProvider;

/// Schema version written into every stored file.
pub const SCHEMA_VERSION: &str = "0.1.0";

const EXTENSION: &str = "json";

/// Lock file metadata stored next to the locked file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock
    pub user_id: String,
    /// Machine name where the lock was taken
    pub machine: String,
    /// Process holding the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a stored file, released on drop.
///
/// The OS lock (fs2) keeps other processes out; the `.lock` file tells a
/// human who is holding it.
pub struct FileLock {
    path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Lock `path` for `user_id`. Fails with [`EpcError::FileLocked`] when a
    /// live lock is held elsewhere; stale locks are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> EpcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = Self::check(path) {
            return Err(EpcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| EpcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            EpcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|()| lock_file.sync_all())
            .map_err(|e| EpcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of a live lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path)
            .ok()
            .filter(|info| !is_lock_stale(info))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> EpcResult<LockInfo> {
    let contents = read_text(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone (same machine only) or it is
/// older than a day.
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().is_some_and(|machine| machine == info.machine) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > 24
}

fn read_text(path: &Path, operation: &str) -> EpcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| EpcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| EpcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Write through a `.tmp` sibling and rename, so a crash never leaves a
/// half-written file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> EpcResult<()> {
    let tmp_path = path.with_extension(format!("{EXTENSION}.tmp"));

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| EpcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(bytes)
        .map_err(|e| EpcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| EpcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EpcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Check that a file version is readable by this build.
///
/// Major versions must match; while the major is 0, a newer minor is
/// rejected as well.
pub fn validate_version(file_version: &str) -> EpcResult<()> {
    let parse = |version: &str| -> Vec<u32> {
        version.split('.').filter_map(|p| p.parse().ok()).collect()
    };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    let mismatch = || EpcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

/// On-disk wrapper around a stored record.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: String,
    saved_at: DateTime<Utc>,
    stored: Stored,
}

/// Load and save contracts.
pub trait ContractStore {
    /// Load the contract of `project` with current rates applied.
    fn load(&self, project: &ProjectSnapshot) -> EpcResult<Contract>;

    /// Recalculate `contract` and persist it.
    fn save(&self, contract: &mut Contract, project: &ProjectSnapshot) -> EpcResult<Calculation>;
}

/// [`ContractStore`] writing one JSON file per record under a root directory.
pub struct FileContractStore {
    root: PathBuf,
    rates: Arc<dyn RateProvider>,
    user_id: String,
}

impl FileContractStore {
    pub fn new(root: impl Into<PathBuf>, rates: Arc<dyn RateProvider>, user_id: impl Into<String>) -> Self {
        FileContractStore {
            root: root.into(),
            rates,
            user_id: user_id.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the record `kind`/`key`.
    pub fn path_for(&self, kind: EntityKind, key: &str) -> PathBuf {
        self.root.join(kind.as_str()).join(format!("{key}.{EXTENSION}"))
    }

    pub fn exists(&self, reference: &Reference) -> bool {
        self.path_for(reference.kind, &reference.key).exists()
    }

    /// Write any stored record. Records it depends on must already be
    /// stored; projects live elsewhere and are not checked.
    pub fn put(&self, stored: Stored) -> EpcResult<PathBuf> {
        let entity = stored.as_entity();
        for dependency in entity.dependencies() {
            if dependency.kind != EntityKind::Project && !self.exists(&dependency) {
                return Err(EpcError::invalid_input(
                    "dependency",
                    format!("{}/{}", dependency.kind, dependency.key),
                    "not stored",
                ));
            }
        }

        let path = self.path_for(entity.kind(), &entity.key());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| EpcError::file_error("create dir", parent.display().to_string(), e.to_string()))?;
        }

        let _lock = FileLock::acquire(&path, self.user_id.clone())?;
        let envelope = Envelope {
            version: SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            stored,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        write_atomic(&path, json.as_bytes())?;
        tracing::debug!(path = %path.display(), "record saved");
        Ok(path)
    }

    /// Read the record `kind`/`key`.
    pub fn get(&self, kind: EntityKind, key: &str) -> EpcResult<Stored> {
        let path = self.path_for(kind, key);
        let contents = read_text(&path, "open")?;
        let envelope: Envelope = serde_json::from_str(&contents).map_err(|e| EpcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;
        validate_version(&envelope.version)?;
        if envelope.stored.as_entity().kind() != kind {
            return Err(EpcError::SerializationError {
                reason: format!("{} does not hold a {kind} record", path.display()),
            });
        }
        Ok(envelope.stored)
    }

    pub fn save_indoor_clima(&self, clima: &IndoorClima) -> EpcResult<PathBuf> {
        self.put(Stored::from(clima))
    }

    pub fn load_indoor_clima(&self, project: Uuid) -> EpcResult<IndoorClima> {
        self.get(EntityKind::IndoorClima, &project.to_string())?
            .into_indoor_clima()
            .ok_or_else(|| EpcError::internal("indoor climate record expected"))
    }

    /// Holder of a live lock on the contract of `project`.
    pub fn lock_holder(&self, project: Uuid) -> Option<LockInfo> {
        FileLock::check(&self.path_for(EntityKind::Contract, &project.to_string()))
    }
}

impl ContractStore for FileContractStore {
    fn load(&self, project: &ProjectSnapshot) -> EpcResult<Contract> {
        let mut contract = self
            .get(EntityKind::Contract, &project.id.to_string())?
            .into_contract()
            .ok_or_else(|| EpcError::internal("contract record expected"))?;

        let added = contract.fill_missing_tables();
        if added > 0 {
            tracing::info!(project = %project.id, added, "catalog tables added to stored contract");
        }
        contract.apply_rates(self.rates.as_ref(), &project.country_key())?;
        Ok(contract)
    }

    fn save(&self, contract: &mut Contract, project: &ProjectSnapshot) -> EpcResult<Calculation> {
        contract.apply_rates(self.rates.as_ref(), &project.country_key())?;
        let calculation = contract.prepare_for_save(project)?;
        let path = self.put(Stored::from(contract.clone()))?;
        tracing::info!(project = %project.id, path = %path.display(), "contract saved");
        Ok(calculation)
    }
}
