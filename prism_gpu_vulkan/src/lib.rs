/*!
# Prism GPU - Vulkan Backend

Vulkan implementation of the Prism [`Backend`](prism_gpu::prism::backend::Backend).

This crate creates a headless device using the Ash library for Vulkan
bindings and gpu-allocator for memory management. It provides texture
creation, pixel transfers, fence-based submission tracking and descriptor
pools with individually freed sets.

Validation layer support is compiled in with the `vulkan-validation` feature.

```ignore
use std::sync::Arc;
use prism_gpu::prism::{recording::Context, ContextOptions};
use prism_gpu_vulkan::prism::{VulkanBackend, VulkanConfig};

let backend = Arc::new(VulkanBackend::new(VulkanConfig::default())?);
let context = Context::new(backend, ContextOptions::default())?;
```
*/

mod vulkan_config;
mod vulkan_format;
mod vulkan_context;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_descriptor_pool;
mod vulkan_backend;
#[cfg(feature = "vulkan-validation")]
mod debug;

// Main prism namespace module
pub mod prism {
    pub use crate::vulkan_backend::VulkanBackend;
    pub use crate::vulkan_config::{DebugMessageFilter, DebugSeverity, ValidationStats, VulkanConfig};

    // Debug utilities
    #[cfg(feature = "vulkan-validation")]
    pub use crate::debug::{get_validation_stats, print_validation_stats_report};
}
