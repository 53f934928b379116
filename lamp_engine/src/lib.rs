/*!
# Lamp Engine

Resource registries and editor undo support for the Lamp rendering engine.

The crate is backend-agnostic: GPU objects are created through the
[`GraphicsDevice`](graphics_device::GraphicsDevice) trait, which a Vulkan
(or any other) backend implements. The core only keeps track of *which*
named resource is current and lets editor tools reverse their actions.

## Architecture

- **NameRegistry**: name-keyed store of shared resource handles with an
  explicit initialize/shutdown lifecycle
- **RenderPass / RenderPipeline**: the resources the engine registers by name
- **RenderManifest**: RON/TOML description of every pass and pipeline, used
  for the bulk load at startup
- **CommandStack**: LIFO stack of reversible editor commands
- **Engine**: process-wide owner of the render registries and of the logger
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod registry;
pub mod render;
pub mod editor;

// Main lamp namespace module
pub mod lamp {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics device collaborator
    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    // Registry sub-module
    pub mod registry {
        pub use crate::registry::*;
    }

    // Render resources
    pub mod render {
        pub use crate::render::*;
    }

    // Editor undo support
    pub mod editor {
        pub use crate::editor::*;
    }
}
