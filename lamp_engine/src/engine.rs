/// Lamp Engine - process-wide owner of the render registries and the logger
///
/// Render passes and pipelines must resolve to the same instances wherever
/// they are looked up, so the engine keeps one registry of each behind
/// thread-safe static storage. The registries themselves are plain objects
/// (see [`NameRegistry`](crate::registry::NameRegistry)) and can be built
/// standalone in tests or tools.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::render::{setup_pass_overrides, RenderManifest, RenderPassRegistry, RenderPipelineRegistry};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding the engine singletons
struct EngineState {
    render_passes: RwLock<Option<Arc<RenderPassRegistry>>>,
    render_pipelines: RwLock<Option<Arc<RenderPipelineRegistry>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            render_passes: RwLock::new(None),
            render_pipelines: RwLock::new(None),
        }
    }

    fn has_registries(&self) -> Result<bool> {
        let passes = self.render_passes.read()
            .map_err(|_| Engine::poisoned("RenderPassRegistry"))?
            .is_some();
        let pipelines = self.render_pipelines.read()
            .map_err(|_| Engine::poisoned("RenderPipelineRegistry"))?
            .is_some();
        Ok(passes || pipelines)
    }

    /// Take both registries out of the state and shut them down
    ///
    /// Passes go first: they hold references to pipelines.
    fn release_registries(&self) -> bool {
        let passes = match self.render_passes.write() {
            Ok(mut lock) => lock.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let pipelines = match self.render_pipelines.write() {
            Ok(mut lock) => lock.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let released = passes.is_some() || pipelines.is_some();
        if let Some(passes) = passes {
            passes.shutdown();
        }
        if let Some(pipelines) = pipelines {
            pipelines.shutdown();
        }
        released
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use lamp_engine::lamp::Engine;
/// use lamp_engine::lamp::graphics_device::{GraphicsDevice, MockGraphicsDevice};
/// use lamp_engine::lamp::render::RenderManifest;
///
/// Engine::initialize()?;
///
/// let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(MockGraphicsDevice::new()));
/// let manifest = RenderManifest::load("Engine/RenderManifest.ron")?;
/// Engine::create_render_registries(device, &manifest)?;
///
/// let gbuffer = Engine::render_pass_registry()?.get("GBuffer")?;
///
/// Engine::shutdown();
/// # Ok::<(), lamp_engine::lamp::Error>(())
/// ```
pub struct Engine;

impl Engine {
    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| crate::engine_err!("lamp::Engine", UninitializedAccess,
            "Engine not initialized. Call Engine::initialize() first."))
    }

    fn poisoned(what: &str) -> Error {
        crate::engine_err!("lamp::Engine", BackendError, "{} lock poisoned", what)
    }

    /// Initialize the engine
    ///
    /// Idempotent: the engine state is created once per process and
    /// reused after [`shutdown`](Engine::shutdown).
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and release every registry
    ///
    /// Safe to call when nothing was created.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if state.release_registries() {
                crate::engine_info!("lamp::Engine", "Render registries released");
            }
        }
    }

    // ===== RENDER REGISTRIES =====

    /// Build the render pipeline and render pass registries from `manifest`
    ///
    /// Pipelines are loaded first, then passes, then the pass pipeline
    /// references are resolved. Loading is synchronous. Entries the device
    /// rejects are logged and skipped. No engine lock is held while the
    /// device creates resources; the registries become visible once both
    /// are fully loaded.
    ///
    /// # Errors
    ///
    /// - `UninitializedAccess` if the engine is not initialized
    /// - `DoubleInitialize` if the registries already exist
    pub fn create_render_registries(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        manifest: &RenderManifest,
    ) -> Result<()> {
        let state = Self::state()?;
        if state.has_registries()? {
            crate::engine_bail!("lamp::Engine", DoubleInitialize,
                "Render registries already exist. Call Engine::destroy_render_registries() first.");
        }

        // Built with no engine lock held: the device (or a logger) may query
        // the engine while resources are created.
        let pipelines = RenderPipelineRegistry::render_pipelines();
        pipelines.initialize()?;
        let pipeline_count = pipelines.load_manifest(&device, manifest)?;

        let passes = RenderPassRegistry::render_passes();
        passes.initialize()?;
        let pass_count = passes.load_manifest(&device, manifest)?;

        let unresolved = setup_pass_overrides(&passes, &pipelines)?;
        if unresolved > 0 {
            crate::engine_warn!("lamp::Engine", "{} render pass pipeline references unresolved", unresolved);
        }

        {
            let mut passes_lock = state.render_passes.write()
                .map_err(|_| Self::poisoned("RenderPassRegistry"))?;
            let mut pipelines_lock = state.render_pipelines.write()
                .map_err(|_| Self::poisoned("RenderPipelineRegistry"))?;

            if passes_lock.is_none() && pipelines_lock.is_none() {
                *pipelines_lock = Some(Arc::new(pipelines));
                *passes_lock = Some(Arc::new(passes));
            } else {
                // Lost a race with another create: release ours after unlocking
                drop(passes_lock);
                drop(pipelines_lock);
                passes.shutdown();
                pipelines.shutdown();
                crate::engine_bail!("lamp::Engine", DoubleInitialize,
                    "Render registries were created concurrently. Call Engine::destroy_render_registries() first.");
            }
        }

        crate::engine_info!("lamp::Engine",
            "Render registries created ({} pipelines, {} passes)", pipeline_count, pass_count);
        Ok(())
    }

    /// Get the render pass registry
    ///
    /// # Errors
    ///
    /// `UninitializedAccess` if the engine is not initialized or the
    /// registries have not been created.
    pub fn render_pass_registry() -> Result<Arc<RenderPassRegistry>> {
        let state = Self::state()?;
        let lock = state.render_passes.read()
            .map_err(|_| Self::poisoned("RenderPassRegistry"))?;

        lock.clone().ok_or_else(|| crate::engine_err!("lamp::Engine", UninitializedAccess,
            "RenderPassRegistry not created. Call Engine::create_render_registries() first."))
    }

    /// Get the render pipeline registry
    ///
    /// # Errors
    ///
    /// `UninitializedAccess` if the engine is not initialized or the
    /// registries have not been created.
    pub fn render_pipeline_registry() -> Result<Arc<RenderPipelineRegistry>> {
        let state = Self::state()?;
        let lock = state.render_pipelines.read()
            .map_err(|_| Self::poisoned("RenderPipelineRegistry"))?;

        lock.clone().ok_or_else(|| crate::engine_err!("lamp::Engine", UninitializedAccess,
            "RenderPipelineRegistry not created. Call Engine::create_render_registries() first."))
    }

    /// Shut down and remove both render registries
    ///
    /// Handles obtained earlier stay valid until dropped; lookups through
    /// registry `Arc`s obtained earlier fail with `UninitializedAccess`.
    ///
    /// # Errors
    ///
    /// `UninitializedAccess` if the engine is not initialized.
    pub fn destroy_render_registries() -> Result<()> {
        let state = Self::state()?;
        if state.release_registries() {
            crate::engine_info!("lamp::Engine", "Render registries destroyed");
        }
        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            state.release_registries();
        }
    }

    // ===== LOGGING API =====

    /// Replace the current logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        match logger_lock.write() {
            Ok(mut lock) => *lock = Box::new(logger),
            Err(poisoned) => *poisoned.into_inner() = Box::new(logger),
        }
    }

    /// Reset logger to [`DefaultLogger`]
    pub fn reset_logger() {
        Self::set_logger(DefaultLogger);
    }

    /// Log without file:line (used by `engine_info!`, `engine_warn!`, ...)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line (used by `engine_error!`)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
