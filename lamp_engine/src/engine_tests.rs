//! Unit tests for Engine singleton manager
//!
//! Tests initialization, render registry management, and logging APIs.
//!
//! IMPORTANT: ENGINE_STATE is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::lamp::{Engine, Error};
use crate::lamp::graphics_device::{DeviceHandle, GraphicsDevice, MockGraphicsDevice};
use crate::lamp::log::{Logger, LogEntry, LogSeverity};
use crate::lamp::render::{RenderManifest, RenderPassDesc, RenderPipelineDesc};
use crate::lamp::Result;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(format!("{:?}: {}", entry.severity, entry.message));
    }
}

fn install_test_logger() -> Arc<Mutex<Vec<String>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });
    entries
}

/// Reset engine state before each test
///
/// ENGINE_STATE is a OnceLock, so once initialized it stays initialized.
fn setup() {
    Engine::reset_for_testing();
    let _ = Engine::initialize();
}

fn create_mock_device() -> (Arc<Mutex<MockGraphicsDevice>>, Arc<Mutex<dyn GraphicsDevice>>) {
    let mock = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let device: Arc<Mutex<dyn GraphicsDevice>> = mock.clone();
    (mock, device)
}

/// Device that looks up the engine registries while creating a render pass
struct QueryingDevice {
    inner: MockGraphicsDevice,
    lookups: Arc<Mutex<Vec<bool>>>,
}

impl GraphicsDevice for QueryingDevice {
    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<DeviceHandle> {
        let visible = Engine::render_pipeline_registry().is_ok()
            || Engine::render_pass_registry().is_ok();
        self.lookups.lock().unwrap().push(visible);
        self.inner.create_render_pass(desc)
    }

    fn create_pipeline(&mut self, desc: &RenderPipelineDesc) -> Result<DeviceHandle> {
        self.inner.create_pipeline(desc)
    }

    fn destroy(&mut self, handle: DeviceHandle) {
        self.inner.destroy(handle);
    }
}

fn sample_manifest() -> RenderManifest {
    let mut lighting = RenderPassDesc::new("Lighting");
    lighting.override_pipeline = Some("Deferred".to_string());
    lighting.compute_pipeline = Some("Bloom".to_string());

    RenderManifest {
        pipelines: vec![
            RenderPipelineDesc::graphics("Deferred", "deferred.hlsl"),
            RenderPipelineDesc::compute("Bloom", "bloom.hlsl"),
        ],
        passes: vec![RenderPassDesc::new("GBuffer"), lighting],
    }
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_engine_initialize_is_idempotent() {
    setup();
    assert!(Engine::initialize().is_ok());
    assert!(Engine::initialize().is_ok());
}

#[test]
#[serial]
fn test_engine_shutdown_without_registries() {
    setup();
    Engine::shutdown();
    Engine::shutdown();
    assert!(Engine::initialize().is_ok());
}

// ============================================================================
// RENDER REGISTRY TESTS
// ============================================================================

#[test]
#[serial]
fn test_registry_access_before_creation_fails() {
    setup();
    assert!(matches!(Engine::render_pass_registry(), Err(Error::UninitializedAccess(_))));
    assert!(matches!(Engine::render_pipeline_registry(), Err(Error::UninitializedAccess(_))));
}

#[test]
#[serial]
fn test_create_render_registries() {
    setup();
    let (mock, device) = create_mock_device();

    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    let passes = Engine::render_pass_registry().unwrap();
    let pipelines = Engine::render_pipeline_registry().unwrap();
    assert_eq!(passes.len(), 2);
    assert_eq!(pipelines.len(), 2);
    assert_eq!(mock.lock().unwrap().live_count(), 4);

    let lighting = passes.get("lighting").unwrap();
    let links = lighting.links();
    assert!(Arc::ptr_eq(&links.override_pipeline.unwrap(), &pipelines.get("Deferred").unwrap()));
    assert_eq!(links.compute_pipeline.unwrap().name(), "Bloom");

    drop(lighting);
    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_registries_return_same_instance() {
    setup();
    let (_mock, device) = create_mock_device();
    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    let first = Engine::render_pass_registry().unwrap();
    let second = Engine::render_pass_registry().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.get("GBuffer").unwrap(), &second.get("gbuffer").unwrap()));

    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_create_render_registries_twice_fails() {
    setup();
    let (_mock, device) = create_mock_device();
    Engine::create_render_registries(device.clone(), &sample_manifest()).unwrap();

    let result = Engine::create_render_registries(device, &RenderManifest::default());
    assert!(matches!(result, Err(Error::DoubleInitialize(_))));

    // Existing registries are untouched
    assert_eq!(Engine::render_pass_registry().unwrap().len(), 2);

    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_device_may_query_engine_during_creation() {
    setup();
    let lookups = Arc::new(Mutex::new(Vec::new()));
    let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(QueryingDevice {
        inner: MockGraphicsDevice::new(),
        lookups: lookups.clone(),
    }));

    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let result = Engine::create_render_registries(device, &sample_manifest());
        let _ = sender.send(result);
    });

    let result = receiver.recv_timeout(Duration::from_secs(5))
        .expect("create_render_registries must not block on its own locks");
    assert!(result.is_ok());

    // Registries are only published once fully loaded
    assert_eq!(*lookups.lock().unwrap(), vec![false, false]);
    assert_eq!(Engine::render_pass_registry().unwrap().len(), 2);

    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_destroy_render_registries_releases_device_objects() {
    setup();
    let (mock, device) = create_mock_device();
    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    let old_passes = Engine::render_pass_registry().unwrap();
    Engine::destroy_render_registries().unwrap();

    assert_eq!(mock.lock().unwrap().live_count(), 0);
    assert!(matches!(Engine::render_pass_registry(), Err(Error::UninitializedAccess(_))));
    assert!(matches!(old_passes.get("GBuffer"), Err(Error::UninitializedAccess(_))));
}

#[test]
#[serial]
fn test_recreate_after_destroy() {
    setup();
    let (_mock, device) = create_mock_device();
    Engine::create_render_registries(device.clone(), &sample_manifest()).unwrap();
    Engine::destroy_render_registries().unwrap();

    Engine::create_render_registries(device, &RenderManifest::default()).unwrap();
    assert!(Engine::render_pass_registry().unwrap().is_empty());

    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_shutdown_releases_registries() {
    setup();
    let (mock, device) = create_mock_device();
    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    Engine::shutdown();

    assert_eq!(mock.lock().unwrap().live_count(), 0);
    assert!(matches!(Engine::render_pipeline_registry(), Err(Error::UninitializedAccess(_))));
}

#[test]
#[serial]
fn test_failed_entries_are_skipped() {
    setup();
    let (mock, device) = create_mock_device();
    mock.lock().unwrap().fail_on("GBuffer");

    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    let passes = Engine::render_pass_registry().unwrap();
    assert!(matches!(passes.get("GBuffer"), Err(Error::NotFound(_))));
    assert!(passes.contains("Lighting"));

    Engine::reset_for_testing();
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_entries() {
    let entries = install_test_logger();

    Engine::log(LogSeverity::Info, "test", "hello".to_string());
    Engine::log_detailed(LogSeverity::Error, "test", "boom".to_string(), "engine_tests.rs", 1);

    let captured = entries.lock().unwrap().clone();
    assert!(captured.contains(&"Info: hello".to_string()));
    assert!(captured.contains(&"Error: boom".to_string()));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_lookup_miss_is_logged() {
    setup();
    let (_mock, device) = create_mock_device();
    Engine::create_render_registries(device, &sample_manifest()).unwrap();

    let entries = install_test_logger();
    let result = Engine::render_pass_registry().unwrap().get("Missing");
    assert!(matches!(result, Err(Error::NotFound(_))));

    let captured = entries.lock().unwrap().clone();
    assert!(captured.iter().any(|line| line.starts_with("Error:") && line.contains("Missing")));

    Engine::reset_logger();
    Engine::reset_for_testing();
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let entries = install_test_logger();
    Engine::reset_logger();

    Engine::log(LogSeverity::Debug, "test", "not captured".to_string());
    assert!(!entries.lock().unwrap().iter().any(|line| line.contains("not captured")));
}
