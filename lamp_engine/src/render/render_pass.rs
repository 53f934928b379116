/// Render pass resource and descriptor
///
/// Passes reference pipelines by name. After both registries are loaded,
/// [`setup_pass_overrides`] resolves those names into pipeline handles and
/// hashes.

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::graphics_device::{DeviceHandle, GraphicsDevice};
use crate::registry::NameRegistry;
use crate::{engine_bail, engine_debug, engine_err, engine_error};
use super::{PipelineType, RenderManifest, RenderPipeline, RenderPipelineRegistry};

/// Registry of render passes, keyed by pass name
pub type RenderPassRegistry = NameRegistry<RenderPass>;

// ===== DESCRIPTOR =====

/// What a pass draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawType {
    /// A single fullscreen triangle/quad (post-processing)
    FullscreenQuad,
    /// Scene geometry
    #[default]
    Opaque,
}

fn default_resizeable() -> bool {
    true
}

/// Construction parameters of a render pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderPassDesc {
    /// Registry name
    pub name: String,

    #[serde(default)]
    pub draw_type: DrawType,

    /// Ordering key, lower runs first
    #[serde(default)]
    pub priority: i32,

    /// Whether the pass framebuffer follows the viewport size
    #[serde(default = "default_resizeable")]
    pub resizeable: bool,

    /// Graphics pipeline used for every draw of the pass
    #[serde(default)]
    pub override_pipeline: Option<String>,

    /// Compute pipeline dispatched by the pass
    #[serde(default)]
    pub compute_pipeline: Option<String>,

    /// Only draws using this graphics pipeline are accepted
    #[serde(default)]
    pub exclusive_pipeline: Option<String>,

    /// Draws using these graphics pipelines are skipped
    #[serde(default)]
    pub excluded_pipelines: Vec<String>,
}

impl RenderPassDesc {
    /// Opaque pass without pipeline references
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            draw_type: DrawType::default(),
            priority: 0,
            resizeable: default_resizeable(),
            override_pipeline: None,
            compute_pipeline: None,
            exclusive_pipeline: None,
            excluded_pipelines: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// `InvalidResource` if the name is empty, or if the pass has both an
    /// exclusive pipeline and excluded pipelines.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            engine_bail!("lamp::RenderPass", InvalidResource, "Render pass name is empty");
        }
        if self.exclusive_pipeline.is_some() && !self.excluded_pipelines.is_empty() {
            engine_bail!("lamp::RenderPass", InvalidResource,
                "Render pass '{}' has both an exclusive and excluded pipelines", self.name);
        }
        Ok(())
    }
}

// ===== RESOURCE =====

/// Pipeline references of a pass, resolved by [`setup_pass_overrides`]
#[derive(Debug, Clone, Default)]
pub struct PassLinks {
    pub override_pipeline: Option<Arc<RenderPipeline>>,
    pub compute_pipeline: Option<Arc<RenderPipeline>>,
    pub exclusive_pipeline_hash: Option<u64>,
    pub excluded_pipeline_hashes: Vec<u64>,
}

/// A created render pass
///
/// Owns its backend object and destroys it when the last `Arc` is dropped.
pub struct RenderPass {
    desc: RenderPassDesc,
    handle: DeviceHandle,
    links: RwLock<PassLinks>,
    device: Arc<Mutex<dyn GraphicsDevice>>,
}

impl RenderPass {
    /// Validate `desc` and create the backend render pass through `device`
    pub fn create(device: Arc<Mutex<dyn GraphicsDevice>>, desc: RenderPassDesc) -> Result<Arc<Self>> {
        desc.validate()?;

        let handle = device.lock()
            .map_err(|_| engine_err!("lamp::RenderPass", BackendError, "GraphicsDevice lock poisoned"))?
            .create_render_pass(&desc)?;

        Ok(Arc::new(Self {
            desc,
            handle,
            links: RwLock::new(PassLinks::default()),
            device,
        }))
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Construction parameters
    pub fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }

    /// Backend handle
    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Copy of the resolved pipeline references
    pub fn links(&self) -> PassLinks {
        match self.links.read() {
            Ok(links) => links.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_links(&self, links: PassLinks) {
        match self.links.write() {
            Ok(mut current) => *current = links,
            Err(poisoned) => *poisoned.into_inner() = links,
        }
    }

    /// Whether a draw using the pipeline with `pipeline_hash` belongs in
    /// this pass
    ///
    /// With an exclusive pipeline only that pipeline is accepted; otherwise
    /// everything except the excluded pipelines is.
    pub fn accepts_pipeline(&self, pipeline_hash: u64) -> bool {
        let links = self.links();
        match links.exclusive_pipeline_hash {
            Some(exclusive) => exclusive == pipeline_hash,
            None => !links.excluded_pipeline_hashes.contains(&pipeline_hash),
        }
    }
}

impl fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPass")
            .field("name", &self.desc.name)
            .field("handle", &self.handle)
            .finish()
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        if let Ok(mut device) = self.device.lock() {
            device.destroy(self.handle);
        }
    }
}

// ===== REGISTRY =====

impl NameRegistry<RenderPass> {
    /// Uninitialized pass registry logging as `lamp::RenderPassRegistry`
    pub fn render_passes() -> Self {
        Self::with_source("lamp::RenderPassRegistry")
    }

    /// Create and register every pass of `manifest`
    ///
    /// Returns the number of registered passes; passes the device rejects
    /// are logged and skipped.
    pub fn load_manifest(
        &self,
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        manifest: &RenderManifest,
    ) -> Result<usize> {
        self.load_all(manifest.pass_entries(), |_, desc| {
            RenderPass::create(Arc::clone(device), desc)
        })
    }
}

/// Resolve the pipeline names of every registered pass
///
/// Override and exclusive/excluded references must name graphics pipelines,
/// compute references a compute pipeline. A reference that is missing or of
/// the wrong type is logged and left unresolved. Links are rebuilt from
/// scratch, so this can run again after a hot reload.
///
/// Returns the number of unresolved references.
///
/// # Errors
///
/// `UninitializedAccess` if either registry is not initialized.
pub fn setup_pass_overrides(
    passes: &RenderPassRegistry,
    pipelines: &RenderPipelineRegistry,
) -> Result<usize> {
    if !passes.is_initialized() || !pipelines.is_initialized() {
        engine_bail!("lamp::RenderPassRegistry", UninitializedAccess,
            "Pass overrides resolved before the registries were initialized");
    }

    let available = pipelines.all();
    let find = |name: &str, expected: PipelineType| -> Option<Arc<RenderPipeline>> {
        available
            .get(&name.to_lowercase())
            .filter(|pipeline| pipeline.pipeline_type() == expected)
            .cloned()
    };

    let mut unresolved = 0;
    for pass in passes.all().values() {
        let desc = pass.desc();
        let mut links = PassLinks::default();

        if let Some(name) = &desc.override_pipeline {
            links.override_pipeline = find(name, PipelineType::Graphics);
            if links.override_pipeline.is_none() {
                engine_error!("lamp::RenderPassRegistry",
                    "Unable to find override pipeline {} for render pass {}!", name, desc.name);
                unresolved += 1;
            }
        }

        if let Some(name) = &desc.compute_pipeline {
            links.compute_pipeline = find(name, PipelineType::Compute);
            if links.compute_pipeline.is_none() {
                engine_error!("lamp::RenderPassRegistry",
                    "Unable to find compute pipeline {} for render pass {}!", name, desc.name);
                unresolved += 1;
            }
        }

        if let Some(name) = &desc.exclusive_pipeline {
            links.exclusive_pipeline_hash = find(name, PipelineType::Graphics).map(|p| p.hash());
            if links.exclusive_pipeline_hash.is_none() {
                engine_error!("lamp::RenderPassRegistry",
                    "Unable to find exclusive pipeline {} for render pass {}!", name, desc.name);
                unresolved += 1;
            }
        }

        for name in &desc.excluded_pipelines {
            match find(name, PipelineType::Graphics) {
                Some(pipeline) => links.excluded_pipeline_hashes.push(pipeline.hash()),
                None => {
                    engine_error!("lamp::RenderPassRegistry",
                        "Unable to find excluded pipeline {} for render pass {}!", name, desc.name);
                    unresolved += 1;
                }
            }
        }

        pass.set_links(links);
    }

    engine_debug!("lamp::RenderPassRegistry",
        "Resolved pass overrides, {} unresolved references", unresolved);
    Ok(unresolved)
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
