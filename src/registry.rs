//! # Protocol Registry
//!
//! A process-wide map from protocol name to the factory that constructs a
//! filesystem instance for it. Mirrors the way `path_resolver.rs` models a
//! pluggable strategy behind a narrow trait, but at process scope instead
//! of per-call.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::{Fs, VfsError, VfsResult};

/// Constructs a boxed, type-erased [`Fs`] backend from per-protocol kwargs.
pub type FsFactory = Arc<dyn Fn(&HashMap<String, String>) -> VfsResult<Arc<dyn Fs>> + Send + Sync>;

struct Entry {
    factory: FsFactory,
    available: bool,
}

/// Process-wide protocol → factory map.
///
/// Obtained via [`Registry::global`]. Registration is rare and guarded by a
/// single `RwLock`; lookups are the hot path and only take a read lock.
pub struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide singleton registry.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register a factory under `protocol`.
    ///
    /// Fails if the name is already registered and `clobber` is `false`.
    /// `clobber` defaults to `false` for safety: a caller must opt in to
    /// overwrite an existing registration.
    pub fn register(&self, protocol: &str, factory: FsFactory, clobber: bool) -> VfsResult<()> {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        if entries.contains_key(protocol) && !clobber {
            return Err(VfsError::Backend(crate::FsError::AlreadyExists {
                path: protocol.into(),
                operation: "register",
            }));
        }
        entries.insert(
            protocol.to_string(),
            Entry {
                factory,
                available: true,
            },
        );
        Ok(())
    }

    /// Look up the factory for `protocol`.
    pub fn get(&self, protocol: &str) -> VfsResult<FsFactory> {
        let entries = self.entries.read().expect("registry lock poisoned");
        entries
            .get(protocol)
            .map(|e| e.factory.clone())
            .ok_or_else(|| VfsError::ProtocolUnknown {
                protocol: protocol.to_string(),
            })
    }

    /// All registered protocol names, regardless of availability.
    pub fn known(&self) -> Vec<String> {
        let entries = self.entries.read().expect("registry lock poisoned");
        entries.keys().cloned().collect()
    }

    /// Protocol names whose factory is currently usable.
    ///
    /// Distinguishes "registered" from "importable" the way a dynamically
    /// loaded backend might fail to initialize (missing native library,
    /// disabled feature) without removing its registration entirely.
    pub fn available(&self) -> Vec<String> {
        let entries = self.entries.read().expect("registry lock poisoned");
        entries
            .iter()
            .filter(|(_, e)| e.available)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Mark a protocol unavailable without removing it from [`known`](Self::known).
    pub fn set_available(&self, protocol: &str, available: bool) {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        if let Some(entry) = entries.get_mut(protocol) {
            entry.available = available;
        }
    }

    /// Clear all registrations. Test isolation only (`spec.md` §9 "Global state").
    pub fn reset(&self) {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        entries.clear();
    }
}
