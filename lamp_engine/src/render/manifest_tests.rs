/// Tests for RenderManifest parsing and loading

use super::*;
use crate::error::Error;
use crate::render::{CullMode, DrawType, PipelineType};
use std::path::PathBuf;

const RON_MANIFEST: &str = r#"
(
    pipelines: [
        (name: "Deferred", shader: "deferred.hlsl"),
        (name: "Bloom", pipeline_type: Compute, shader: "bloom.hlsl"),
        (name: "Wire", shader: "wire.hlsl", cull_mode: FrontAndBack, fill_mode: Wireframe),
    ],
    passes: [
        (name: "GBuffer", priority: -1),
        (
            name: "Lighting",
            draw_type: FullscreenQuad,
            resizeable: false,
            override_pipeline: Some("Deferred"),
            compute_pipeline: Some("Bloom"),
        ),
        (name: "Forward", excluded_pipelines: ["Wire"]),
    ],
)
"#;

const TOML_MANIFEST: &str = r#"
[[pipelines]]
name = "Deferred"
shader = "deferred.hlsl"

[[pipelines]]
name = "Bloom"
pipeline_type = "Compute"
shader = "bloom.hlsl"

[[passes]]
name = "Lighting"
draw_type = "FullscreenQuad"
override_pipeline = "Deferred"
"#;

/// Scratch directory for one test, removed on drop
struct TempDir(PathBuf);

impl TempDir {
    fn new(test_name: &str) -> Self {
        let dir = std::env::temp_dir()
            .join(format!("lamp_manifest_tests_{}_{}", std::process::id(), test_name));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.0.join(file_name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// Tests: RON
// ============================================================================

#[test]
fn test_parse_ron_manifest() {
    let manifest = RenderManifest::from_ron_str(RON_MANIFEST).unwrap();

    assert_eq!(manifest.pipelines.len(), 3);
    assert_eq!(manifest.passes.len(), 3);

    assert_eq!(manifest.pipelines[1].pipeline_type, PipelineType::Compute);
    assert_eq!(manifest.pipelines[2].cull_mode, CullMode::FrontAndBack);

    let gbuffer = &manifest.passes[0];
    assert_eq!(gbuffer.priority, -1);
    assert!(gbuffer.resizeable);
    assert_eq!(gbuffer.draw_type, DrawType::Opaque);

    let lighting = &manifest.passes[1];
    assert_eq!(lighting.draw_type, DrawType::FullscreenQuad);
    assert!(!lighting.resizeable);
    assert_eq!(lighting.override_pipeline.as_deref(), Some("Deferred"));
    assert_eq!(lighting.compute_pipeline.as_deref(), Some("Bloom"));

    assert_eq!(manifest.passes[2].excluded_pipelines, vec!["Wire".to_string()]);
}

#[test]
fn test_parse_empty_ron_manifest() {
    let manifest = RenderManifest::from_ron_str("()").unwrap();
    assert_eq!(manifest, RenderManifest::default());
}

#[test]
fn test_parse_invalid_ron() {
    let result = RenderManifest::from_ron_str("(pipelines: [(shader: \"x.hlsl\")])");
    assert!(matches!(result, Err(Error::ManifestError(_))));
}

#[test]
fn test_ron_round_trip_preserves_manifest() {
    let manifest = RenderManifest::from_ron_str(RON_MANIFEST).unwrap();
    let written = manifest.to_ron_string().unwrap();
    assert_eq!(RenderManifest::from_ron_str(&written).unwrap(), manifest);
}

// ============================================================================
// Tests: TOML
// ============================================================================

#[test]
fn test_parse_toml_manifest() {
    let manifest = RenderManifest::from_toml_str(TOML_MANIFEST).unwrap();

    assert_eq!(manifest.pipelines.len(), 2);
    assert_eq!(manifest.pipelines[1].pipeline_type, PipelineType::Compute);
    assert_eq!(manifest.passes[0].override_pipeline.as_deref(), Some("Deferred"));
    assert_eq!(manifest.passes[0].draw_type, DrawType::FullscreenQuad);
}

#[test]
fn test_parse_invalid_toml() {
    let result = RenderManifest::from_toml_str("[[pipelines]]\nname = 3\n");
    assert!(matches!(result, Err(Error::ManifestError(_))));
}

// ============================================================================
// Tests: Entries
// ============================================================================

#[test]
fn test_entries_are_name_descriptor_pairs() {
    let manifest = RenderManifest::from_ron_str(RON_MANIFEST).unwrap();

    let pipelines: Vec<String> = manifest.pipeline_entries().map(|(name, _)| name).collect();
    assert_eq!(pipelines, vec!["Deferred", "Bloom", "Wire"]);

    for (name, desc) in manifest.pass_entries() {
        assert_eq!(name, desc.name);
    }
}

// ============================================================================
// Tests: load()
// ============================================================================

#[test]
fn test_load_ron_file() {
    let dir = TempDir::new("load_ron");
    let path = dir.path("render.ron");
    std::fs::write(&path, RON_MANIFEST).unwrap();

    let manifest = RenderManifest::load(&path).unwrap();
    assert_eq!(manifest.passes.len(), 3);
}

#[test]
fn test_load_toml_file_uppercase_extension() {
    let dir = TempDir::new("load_toml");
    let path = dir.path("render.TOML");
    std::fs::write(&path, TOML_MANIFEST).unwrap();

    let manifest = RenderManifest::load(&path).unwrap();
    assert_eq!(manifest.pipelines.len(), 2);
}

#[test]
fn test_load_unsupported_extension() {
    let result = RenderManifest::load("render.yaml");
    assert!(matches!(result, Err(Error::ManifestError(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new("load_missing");
    let path = dir.path("does_not_exist.ron");
    let result = RenderManifest::load(&path);
    assert!(matches!(result, Err(Error::ManifestError(_))));
}

#[test]
fn test_temp_dir_is_removed_after_use() {
    let dir = TempDir::new("cleanup");
    let root = dir.0.clone();
    std::fs::write(dir.path("render.ron"), RON_MANIFEST).unwrap();
    assert!(root.exists());

    drop(dir);
    assert!(!root.exists());
}
