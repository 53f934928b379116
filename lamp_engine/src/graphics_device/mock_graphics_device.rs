/// Mock graphics device (no GPU required)
///
/// Hands out increasing handles and keeps track of which ones are still
/// alive, so tests can observe when the registries release resources.

use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::engine_bail;
use crate::render::{RenderPassDesc, RenderPipelineDesc};
use super::{DeviceHandle, GraphicsDevice};

/// Headless [`GraphicsDevice`]
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    next_handle: u64,
    live: FxHashMap<DeviceHandle, String>,
    destroyed: Vec<DeviceHandle>,
    failing: FxHashSet<String>,
}

impl MockGraphicsDevice {
    /// Create a device with no live objects
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later creation of a resource named `name` fail
    pub fn fail_on(&mut self, name: &str) {
        self.failing.insert(name.to_string());
    }

    /// Number of created and not yet destroyed objects
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `handle` is alive
    pub fn is_live(&self, handle: DeviceHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Name of the resource a live handle was created for
    pub fn name_of(&self, handle: DeviceHandle) -> Option<&str> {
        self.live.get(&handle).map(String::as_str)
    }

    /// Handles destroyed so far, in destruction order
    pub fn destroyed(&self) -> &[DeviceHandle] {
        &self.destroyed
    }

    fn allocate(&mut self, name: &str) -> Result<DeviceHandle> {
        if self.failing.contains(name) {
            engine_bail!("lamp::MockGraphicsDevice", BackendError,
                "Creation of '{}' rejected", name);
        }

        // 0 is kept as the null handle
        self.next_handle += 1;
        let handle = DeviceHandle(self.next_handle);
        self.live.insert(handle, name.to_string());
        Ok(handle)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<DeviceHandle> {
        self.allocate(&desc.name)
    }

    fn create_pipeline(&mut self, desc: &RenderPipelineDesc) -> Result<DeviceHandle> {
        self.allocate(&desc.name)
    }

    fn destroy(&mut self, handle: DeviceHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed.push(handle);
        }
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
