pub mod format;
pub mod dawn;
pub mod mtl;
pub mod vulkan;
pub mod mock;
pub mod texture_info;
pub mod backend_texture;
pub mod texture;

pub use format::TextureFormat;
pub use dawn::{DawnTextureAspect, DawnTextureFormat, DawnTextureSpec, DawnTextureUsage};
pub use mtl::{MtlPixelFormat, MtlStorageMode, MtlTextureSpec, MtlTextureUsage};
pub use vulkan::{
    VkFormat, VkImageAspectFlags, VkImageCreateFlags, VkImageTiling, VkImageUsageFlags,
    VkSharingMode, VulkanTextureSpec,
};
pub use mock::MockTextureSpec;
pub use texture_info::{
    BackendTextureInfo, BackendTextureSpec, DawnTextureInfo, MockTextureInfo, MtlTextureInfo,
    TextureInfo, VulkanTextureInfo,
};
pub use backend_texture::{BackendTexture, NativeTextureHandle};
pub use texture::{Texture, TextureReleaseProc};
