//! Render resources
//!
//! Render passes and render pipelines, the descriptors they are built
//! from, the manifest that lists them, and their name registries.

mod manifest;
mod render_pass;
mod render_pipeline;

pub use manifest::RenderManifest;
pub use render_pass::{
    RenderPass, RenderPassDesc, RenderPassRegistry,
    DrawType, PassLinks,
    setup_pass_overrides,
};
pub use render_pipeline::{
    RenderPipeline, RenderPipelineDesc, RenderPipelineRegistry,
    PipelineType, Topology, CullMode, FillMode, DepthMode,
};
