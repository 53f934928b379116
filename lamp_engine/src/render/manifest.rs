//! Render manifest
//!
//! Lists every render pipeline and render pass the engine registers at
//! startup. Stored as RON (`.ron`) or TOML (`.toml`).
//!
//! ```ron
//! (
//!     pipelines: [
//!         (name: "Deferred", shader: "deferred.hlsl"),
//!         (name: "Bloom", pipeline_type: Compute, shader: "bloom.hlsl"),
//!     ],
//!     passes: [
//!         (name: "Lighting", draw_type: FullscreenQuad, override_pipeline: Some("Deferred")),
//!     ],
//! )
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::{engine_bail, engine_err};
use super::{RenderPassDesc, RenderPipelineDesc};

/// Every pass and pipeline to load at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderManifest {
    #[serde(default)]
    pub pipelines: Vec<RenderPipelineDesc>,

    #[serde(default)]
    pub passes: Vec<RenderPassDesc>,
}

impl RenderManifest {
    /// Parse a RON document
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source)
            .map_err(|e| engine_err!("lamp::RenderManifest", ManifestError, "RON parse error: {}", e))
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| engine_err!("lamp::RenderManifest", ManifestError, "TOML parse error: {}", e))
    }

    /// Load a manifest file, picking the format from its extension
    ///
    /// # Errors
    ///
    /// `ManifestError` if the file cannot be read, has an unsupported
    /// extension or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("ron") => Self::from_ron_str,
            Some("toml") => Self::from_toml_str,
            _ => engine_bail!("lamp::RenderManifest", ManifestError,
                "Unsupported manifest format: {}", path.display()),
        };

        let contents = std::fs::read_to_string(path)
            .map_err(|e| engine_err!("lamp::RenderManifest", ManifestError,
                "Unable to read {}: {}", path.display(), e))?;

        parse(&contents)
    }

    /// Serialize as pretty RON (editor save)
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| engine_err!("lamp::RenderManifest", ManifestError, "RON write error: {}", e))
    }

    /// `(name, descriptor)` pairs for [`NameRegistry::load_all`](crate::registry::NameRegistry::load_all)
    pub fn pipeline_entries(&self) -> impl Iterator<Item = (String, RenderPipelineDesc)> + '_ {
        self.pipelines.iter().map(|desc| (desc.name.clone(), desc.clone()))
    }

    /// `(name, descriptor)` pairs for [`NameRegistry::load_all`](crate::registry::NameRegistry::load_all)
    pub fn pass_entries(&self) -> impl Iterator<Item = (String, RenderPassDesc)> + '_ {
        self.passes.iter().map(|desc| (desc.name.clone(), desc.clone()))
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
