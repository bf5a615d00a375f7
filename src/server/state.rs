//! Server shared state
//!
//! Holds configuration and the query store for the HTTP server.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{StoreWriter, TideStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Query store; only locked for in-memory work or from blocking tasks
    store: Arc<Mutex<TideStore>>,

    /// Writes store snapshots to disk outside the store lock
    writer: Arc<StoreWriter>,

    /// Directory served at `/`
    static_dir: PathBuf,

    started: Instant,
}

impl AppState {
    /// Create state with the store named by the configuration
    pub fn new(config: Config) -> Result<Self> {
        let store = TideStore::open(&config.storage)?;
        Ok(Self::with_store(config, store))
    }

    /// Create state around an already opened store
    pub fn with_store(config: Config, store: TideStore) -> Self {
        let static_dir = resolve_static_dir(&config.server.static_dir);
        Self {
            config: Arc::new(RwLock::new(config)),
            store: Arc::new(Mutex::new(store)),
            writer: Arc::new(StoreWriter::new()),
            static_dir,
            started: Instant::now(),
        }
    }

    /// Snapshot of the current configuration
    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Shared handle for moving into blocking tasks
    pub fn store_handle(&self) -> Arc<Mutex<TideStore>> {
        Arc::clone(&self.store)
    }

    /// Shared writer for persisting store snapshots from blocking tasks
    pub fn writer_handle(&self) -> Arc<StoreWriter> {
        Arc::clone(&self.writer)
    }

    /// Lock the store for a short, non-blocking read
    pub fn store(&self) -> Result<MutexGuard<'_, TideStore>> {
        lock_store(&self.store)
    }

    pub fn static_dir(&self) -> &PathBuf {
        &self.static_dir
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Lock a store handle, mapping poisoning to a server error
pub fn lock_store(store: &Mutex<TideStore>) -> Result<MutexGuard<'_, TideStore>> {
    store
        .lock()
        .map_err(|_| Error::Server("Store lock poisoned".to_string()))
}

/// Find the static directory
///
/// Relative paths are tried against the working directory first, then next to
/// the executable.
fn resolve_static_dir(configured: &str) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() || path.exists() {
        return path;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(configured)))
        .filter(|candidate| candidate.exists())
        .unwrap_or(path)
}
