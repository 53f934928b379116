/// Name-keyed registry of shared resource handles.
///
/// One registry instance is the single source of truth for a kind of named
/// resource (render passes, render pipelines). Every subsystem that resolves
/// `"gbuffer"` through the same registry gets the same `Arc`.
///
/// The registry has an explicit lifecycle: it starts uninitialized,
/// [`initialize`](NameRegistry::initialize) makes it empty and ready, and
/// [`shutdown`](NameRegistry::shutdown) releases every handle and returns it
/// to the uninitialized state.
///
/// Misuse (lookup miss, access before initialize, double initialize) is
/// reported as a logged `Err` in every build configuration and never
/// changes the registry state.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_trace, engine_warn};

type Entries<T> = FxHashMap<String, Arc<T>>;

/// Name → shared handle mapping with initialize/shutdown lifecycle
///
/// Names are case-insensitive. Registering an existing name replaces the old
/// handle (last write wins), which is what asset hot-reloading relies on.
/// The registry only drops its own reference: the old resource is destroyed
/// when its last holder lets go.
///
/// Reads share an `RwLock`; `register`, `unregister` and `shutdown` take it
/// exclusively. Resource construction during a bulk load runs outside the
/// lock.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lamp_engine::lamp::registry::NameRegistry;
///
/// let registry = NameRegistry::<u32>::new();
/// registry.initialize()?;
/// registry.register("PassA", Arc::new(1))?;
/// assert_eq!(*registry.get("passa")?, 1);
/// registry.shutdown();
/// assert!(registry.get("PassA").is_err());
/// # Ok::<(), lamp_engine::lamp::Error>(())
/// ```
pub struct NameRegistry<T> {
    source: &'static str,
    entries: RwLock<Option<Entries<T>>>,
}

impl<T> NameRegistry<T> {
    /// Create an uninitialized registry
    pub fn new() -> Self {
        Self::with_source("lamp::NameRegistry")
    }

    /// Create an uninitialized registry that logs under `source`
    /// (e.g. `"lamp::RenderPassRegistry"`)
    pub fn with_source(source: &'static str) -> Self {
        Self {
            source,
            entries: RwLock::new(None),
        }
    }

    /// Log source of this registry
    pub fn source(&self) -> &'static str {
        self.source
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Option<Entries<T>>>> {
        self.entries.read()
            .map_err(|_| engine_err!(self.source, BackendError, "{} lock poisoned", self.source))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Option<Entries<T>>>> {
        self.entries.write()
            .map_err(|_| engine_err!(self.source, BackendError, "{} lock poisoned", self.source))
    }

    fn uninitialized(&self, operation: &str) -> Error {
        engine_err!(self.source, UninitializedAccess,
            "{} called before initialize on {}", operation, self.source)
    }

    // ===== LIFECYCLE =====

    /// Transition from uninitialized to empty-and-ready
    ///
    /// # Errors
    ///
    /// `DoubleInitialize` if the registry is already initialized. The
    /// existing entries are left untouched.
    pub fn initialize(&self) -> Result<()> {
        let mut lock = self.write()?;
        if lock.is_some() {
            engine_bail!(self.source, DoubleInitialize,
                "{} is already initialized", self.source);
        }
        *lock = Some(Entries::default());
        drop(lock);

        engine_debug!(self.source, "Initialized");
        Ok(())
    }

    /// Initialize, then bulk-load `entries` through `construct`
    ///
    /// Loading is synchronous: every entry has been constructed (or has
    /// failed) when this returns. Returns the number of distinct names
    /// registered.
    pub fn initialize_with<P, I, F>(&self, entries: I, construct: F) -> Result<usize>
    where
        I: IntoIterator<Item = (String, P)>,
        F: FnMut(&str, P) -> Result<Arc<T>>,
    {
        self.initialize()?;
        self.load_all(entries, construct)
    }

    /// Construct and register every `(name, parameters)` pair
    ///
    /// `construct` turns the parameters into a handle. An entry whose
    /// construction fails is logged and skipped; the remaining entries are
    /// still loaded. Returns the number of distinct names registered by this
    /// call: entries repeating a name (case-insensitively) replace the
    /// earlier one and are counted once.
    ///
    /// # Errors
    ///
    /// `UninitializedAccess` if the registry is not initialized.
    pub fn load_all<P, I, F>(&self, entries: I, mut construct: F) -> Result<usize>
    where
        I: IntoIterator<Item = (String, P)>,
        F: FnMut(&str, P) -> Result<Arc<T>>,
    {
        if !self.is_initialized() {
            return Err(self.uninitialized("load_all"));
        }

        let mut loaded = FxHashSet::default();
        let mut failed = 0;
        for (name, params) in entries {
            match construct(&name, params) {
                Ok(handle) => {
                    self.register(&name, handle)?;
                    loaded.insert(Self::key(&name));
                }
                Err(err) => {
                    engine_error!(self.source, "Unable to create '{}': {}", name, err);
                    failed += 1;
                }
            }
        }

        let loaded = loaded.len();
        if failed > 0 {
            engine_warn!(self.source, "Loaded {} entries, {} failed", loaded, failed);
        } else {
            engine_info!(self.source, "Loaded {} entries", loaded);
        }
        Ok(loaded)
    }

    /// Release every handle and return to the uninitialized state
    ///
    /// Safe to call on a registry that was never initialized (no-op).
    /// A poisoned lock does not prevent the handles from being released.
    pub fn shutdown(&self) {
        let entries = match self.entries.write() {
            Ok(mut lock) => lock.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        // Handles are dropped outside the lock: a resource's Drop may call
        // back into the graphics device.
        if let Some(entries) = entries {
            engine_debug!(self.source, "Shutdown, released {} entries", entries.len());
        }
    }

    /// Whether `initialize` has been called (and not undone by `shutdown`)
    pub fn is_initialized(&self) -> bool {
        self.entries.read().map(|lock| lock.is_some()).unwrap_or(false)
    }

    // ===== ENTRIES =====

    /// Insert or replace the handle registered under `name`
    ///
    /// Replacing drops the registry's reference to the previous handle.
    ///
    /// # Errors
    ///
    /// `UninitializedAccess` if the registry is not initialized.
    pub fn register(&self, name: &str, handle: Arc<T>) -> Result<()> {
        let previous = {
            let mut lock = self.write()?;
            let Some(entries) = lock.as_mut() else {
                return Err(self.uninitialized("register"));
            };
            entries.insert(Self::key(name), handle)
        };

        if previous.is_some() {
            engine_warn!(self.source, "'{}' was already registered, replacing it", name);
        } else {
            engine_trace!(self.source, "Registered '{}'", name);
        }
        Ok(())
    }

    /// Look up the handle registered under `name`
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is registered under `name`
    /// - `UninitializedAccess` if the registry is not initialized
    pub fn get(&self, name: &str) -> Result<Arc<T>> {
        let handle = {
            let lock = self.read()?;
            let Some(entries) = lock.as_ref() else {
                return Err(self.uninitialized("get"));
            };
            entries.get(&Self::key(name)).cloned()
        };

        handle.ok_or_else(|| {
            engine_error!(self.source, "Unable to find '{}'", name);
            Error::NotFound(name.to_string())
        })
    }

    /// Remove the entry registered under `name` and return its handle
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is registered under `name`
    /// - `UninitializedAccess` if the registry is not initialized
    pub fn unregister(&self, name: &str) -> Result<Arc<T>> {
        let removed = {
            let mut lock = self.write()?;
            let Some(entries) = lock.as_mut() else {
                return Err(self.uninitialized("unregister"));
            };
            entries.remove(&Self::key(name))
        };

        match removed {
            Some(handle) => {
                engine_debug!(self.source, "Unregistered '{}'", name);
                Ok(handle)
            }
            None => Err(engine_err!(self.source, NotFound, "{}", name)),
        }
    }

    /// Whether a handle is registered under `name` (never logs)
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read()
            .map(|lock| lock.as_ref().is_some_and(|entries| entries.contains_key(&Self::key(name))))
            .unwrap_or(false)
    }

    /// Number of registered entries (0 when uninitialized)
    pub fn len(&self) -> usize {
        self.entries.read()
            .map(|lock| lock.as_ref().map_or(0, |entries| entries.len()))
            .unwrap_or(0)
    }

    /// Whether no entry is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered (lowercased) names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read()
            .map(|lock| lock.as_ref()
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Snapshot of every entry, ordered by name
    ///
    /// The snapshot holds its own references; later registrations do not
    /// affect it.
    pub fn all(&self) -> BTreeMap<String, Arc<T>> {
        self.entries.read()
            .map(|lock| lock.as_ref()
                .map(|entries| entries.iter()
                    .map(|(name, handle)| (name.clone(), Arc::clone(handle)))
                    .collect())
                .unwrap_or_default())
            .unwrap_or_default()
    }
}

impl<T> Default for NameRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "name_registry_tests.rs"]
mod tests;
