/*!
# Prism GPU

Texture-resource lifecycle for a hardware-accelerated renderer.

This crate is backend agnostic: native graphics APIs plug in through the
[`Backend`](prism::backend::Backend) trait (see `prism_gpu_vulkan`).

## Architecture

- **TextureInfo**: backend-polymorphic texture descriptor (Dawn, Metal, Vulkan, Mock)
- **DescriptorPool / DescriptorSet**: reference-counted descriptor sets that
  keep their pool alive
- **Promise images**: textures supplied lazily by client callbacks at
  recording insertion, released after GPU completion
- **Image**: user-facing images built from client textures, promises, YUVA
  planes, or CPU pixmaps
- **Context / Recorder / Recording**: the record → insert → submit pipeline
  that drives the callbacks
*/

// Internal modules
mod error;
mod global;
pub mod log;
pub mod backend;
pub mod caps;
pub mod config;
pub mod texture;
pub mod descriptor;
pub mod promise;
pub mod image;
pub mod recording;
pub mod utils;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logger entry point
    pub use crate::global::Prism;

    // Configuration
    pub use crate::config::ContextOptions;
    pub use crate::caps::Caps;

    // Logging sub-module (types only; the prism_* macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod backend {
        pub use crate::backend::*;
    }

    pub mod texture {
        pub use crate::texture::*;
    }

    pub mod descriptor {
        pub use crate::descriptor::*;
    }

    pub mod promise {
        pub use crate::promise::*;
    }

    pub mod image {
        pub use crate::image::*;
    }

    pub mod recording {
        pub use crate::recording::*;
    }

    pub use crate::utils::{ContextId, ImageId, PoolId, RecorderId, RecordingId, RegistrationId};
}

// Re-export math library at crate root
pub use glam;
