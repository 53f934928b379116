//! Graphics device module - the backend seam for render resources
//!
//! The core never talks to Vulkan directly. Render passes and pipelines are
//! created and destroyed through a [`GraphicsDevice`], which a backend crate
//! implements. [`MockGraphicsDevice`] stands in for it when no GPU is around.

mod mock_graphics_device;

pub use mock_graphics_device::MockGraphicsDevice;

use std::fmt;
use crate::error::Result;
use crate::render::{RenderPassDesc, RenderPipelineDesc};

/// Opaque backend handle of a GPU object (render pass, pipeline)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceHandle(pub u64);

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Resource-construction collaborator implemented by graphics backends
///
/// Shared as `Arc<Mutex<dyn GraphicsDevice>>`: every resource keeps a
/// reference so it can destroy its backend object when dropped.
pub trait GraphicsDevice: Send {
    /// Create the backend object for a render pass
    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> Result<DeviceHandle>;

    /// Create the backend object for a graphics or compute pipeline
    fn create_pipeline(&mut self, desc: &RenderPipelineDesc) -> Result<DeviceHandle>;

    /// Destroy a backend object previously returned by this device
    fn destroy(&mut self, handle: DeviceHandle);
}
