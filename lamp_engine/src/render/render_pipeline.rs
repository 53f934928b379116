/// Render pipeline resource and descriptor
///
/// A pipeline is registered by name in the [`RenderPipelineRegistry`] and
/// looked up by render passes (override/compute/exclusive/excluded
/// references) and by materials at draw time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::graphics_device::{DeviceHandle, GraphicsDevice};
use crate::registry::NameRegistry;
use crate::{engine_bail, engine_err};
use super::RenderManifest;

/// Registry of render pipelines, keyed by pipeline name
pub type RenderPipelineRegistry = NameRegistry<RenderPipeline>;

// ===== DESCRIPTOR =====

/// Kind of pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PipelineType {
    #[default]
    Graphics,
    Compute,
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
    TriangleStrip,
    PatchList,
}

/// Face culling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    Front,
    #[default]
    Back,
    FrontAndBack,
    None,
}

/// Polygon fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

/// Depth buffer access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthMode {
    Read,
    Write,
    #[default]
    ReadWrite,
    None,
}

/// Construction parameters of a render pipeline
///
/// Everything except `name` and `shader` is optional in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderPipelineDesc {
    /// Registry name
    pub name: String,

    #[serde(default)]
    pub pipeline_type: PipelineType,

    /// Shader the pipeline is built from
    pub shader: String,

    #[serde(default)]
    pub topology: Topology,

    #[serde(default)]
    pub cull_mode: CullMode,

    #[serde(default)]
    pub fill_mode: FillMode,

    #[serde(default)]
    pub depth_mode: DepthMode,
}

impl RenderPipelineDesc {
    /// Graphics pipeline with default raster state
    pub fn graphics(name: &str, shader: &str) -> Self {
        Self {
            name: name.to_string(),
            pipeline_type: PipelineType::Graphics,
            shader: shader.to_string(),
            topology: Topology::default(),
            cull_mode: CullMode::default(),
            fill_mode: FillMode::default(),
            depth_mode: DepthMode::default(),
        }
    }

    /// Compute pipeline
    pub fn compute(name: &str, shader: &str) -> Self {
        Self {
            pipeline_type: PipelineType::Compute,
            ..Self::graphics(name, shader)
        }
    }

    /// Check the descriptor before handing it to a device
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the name or the shader is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            engine_bail!("lamp::RenderPipeline", InvalidResource,
                "Pipeline name is empty (shader '{}')", self.shader);
        }
        if self.shader.trim().is_empty() {
            engine_bail!("lamp::RenderPipeline", InvalidResource,
                "Pipeline '{}' has no shader", self.name);
        }
        Ok(())
    }

    /// Stable hash of the descriptor
    ///
    /// Render passes store these hashes for their exclusive/excluded
    /// pipeline filters.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

// ===== RESOURCE =====

/// A created render pipeline
///
/// Owns its backend object and destroys it when the last `Arc` is dropped.
pub struct RenderPipeline {
    desc: RenderPipelineDesc,
    handle: DeviceHandle,
    hash: u64,
    device: Arc<Mutex<dyn GraphicsDevice>>,
}

impl RenderPipeline {
    /// Validate `desc` and create the backend pipeline through `device`
    pub fn create(device: Arc<Mutex<dyn GraphicsDevice>>, desc: RenderPipelineDesc) -> Result<Arc<Self>> {
        desc.validate()?;

        let handle = device.lock()
            .map_err(|_| engine_err!("lamp::RenderPipeline", BackendError, "GraphicsDevice lock poisoned"))?
            .create_pipeline(&desc)?;

        let hash = desc.hash_value();
        Ok(Arc::new(Self { desc, handle, hash, device }))
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Construction parameters
    pub fn desc(&self) -> &RenderPipelineDesc {
        &self.desc
    }

    /// Graphics or compute
    pub fn pipeline_type(&self) -> PipelineType {
        self.desc.pipeline_type
    }

    /// Backend handle
    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Descriptor hash (see [`RenderPipelineDesc::hash_value`])
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("name", &self.desc.name)
            .field("pipeline_type", &self.desc.pipeline_type)
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        if let Ok(mut device) = self.device.lock() {
            device.destroy(self.handle);
        }
    }
}

// ===== REGISTRY =====

impl NameRegistry<RenderPipeline> {
    /// Uninitialized pipeline registry logging as `lamp::RenderPipelineRegistry`
    pub fn render_pipelines() -> Self {
        Self::with_source("lamp::RenderPipelineRegistry")
    }

    /// Create and register every pipeline of `manifest`
    ///
    /// Returns the number of registered pipelines; pipelines the device
    /// rejects are logged and skipped.
    pub fn load_manifest(
        &self,
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        manifest: &RenderManifest,
    ) -> Result<usize> {
        self.load_all(manifest.pipeline_entries(), |_, desc| {
            RenderPipeline::create(Arc::clone(device), desc)
        })
    }
}

#[cfg(test)]
#[path = "render_pipeline_tests.rs"]
mod tests;
