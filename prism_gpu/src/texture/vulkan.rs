/// Vulkan texture description
///
/// Values are stored with their raw Vulkan encodings (same layout as `ash::vk`)
/// so the core crate stays free of any Vulkan dependency while the Vulkan
/// backend converts them with `from_raw` at no cost.

use bitflags::bitflags;
use crate::texture::format::TextureFormat;

/// Raw `VkFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VkFormat(pub i32);

impl VkFormat {
    pub const UNDEFINED: Self = Self(0);
    pub const R8_UNORM: Self = Self(9);
    pub const R8G8_UNORM: Self = Self(16);
    pub const R8G8B8A8_UNORM: Self = Self(37);
    pub const R8G8B8A8_SRGB: Self = Self(43);
    pub const B8G8R8A8_UNORM: Self = Self(44);
    pub const R16G16B16A16_SFLOAT: Self = Self(97);
    pub const D32_SFLOAT: Self = Self(126);
    pub const D24_UNORM_S8_UINT: Self = Self(129);
}

/// Raw `VkImageTiling`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VkImageTiling(pub i32);

impl VkImageTiling {
    pub const OPTIMAL: Self = Self(0);
    pub const LINEAR: Self = Self(1);
}

/// Raw `VkSharingMode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VkSharingMode(pub i32);

impl VkSharingMode {
    pub const EXCLUSIVE: Self = Self(0);
    pub const CONCURRENT: Self = Self(1);
}

bitflags! {
    /// `VkImageUsageFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VkImageUsageFlags: u32 {
        const TRANSFER_SRC = 0x0001;
        const TRANSFER_DST = 0x0002;
        const SAMPLED = 0x0004;
        const STORAGE = 0x0008;
        const COLOR_ATTACHMENT = 0x0010;
        const DEPTH_STENCIL_ATTACHMENT = 0x0020;
        const TRANSIENT_ATTACHMENT = 0x0040;
        const INPUT_ATTACHMENT = 0x0080;
    }
}

bitflags! {
    /// `VkImageCreateFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VkImageCreateFlags: u32 {
        const MUTABLE_FORMAT = 0x0008;
        const PROTECTED = 0x0800;
    }
}

bitflags! {
    /// `VkImageAspectFlags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VkImageAspectFlags: u32 {
        const COLOR = 0x0001;
        const DEPTH = 0x0002;
        const STENCIL = 0x0004;
    }
}

/// Vulkan arm of a [`TextureInfo`](crate::texture::TextureInfo)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VulkanTextureSpec {
    pub flags: VkImageCreateFlags,
    pub format: VkFormat,
    pub image_tiling: VkImageTiling,
    pub image_usage_flags: VkImageUsageFlags,
    pub sharing_mode: VkSharingMode,
    pub aspect_mask: VkImageAspectFlags,
}

impl VulkanTextureSpec {
    /// Optimal-tiling, exclusive, sampled + transfer texture of `format`
    pub fn sampled(format: TextureFormat) -> Self {
        let (vk_format, aspect_mask) = match format {
            TextureFormat::R8Unorm => (VkFormat::R8_UNORM, VkImageAspectFlags::COLOR),
            TextureFormat::RG8Unorm => (VkFormat::R8G8_UNORM, VkImageAspectFlags::COLOR),
            TextureFormat::RGBA8Unorm => (VkFormat::R8G8B8A8_UNORM, VkImageAspectFlags::COLOR),
            TextureFormat::RGBA8UnormSrgb => (VkFormat::R8G8B8A8_SRGB, VkImageAspectFlags::COLOR),
            TextureFormat::BGRA8Unorm => (VkFormat::B8G8R8A8_UNORM, VkImageAspectFlags::COLOR),
            TextureFormat::RGBA16Float => (VkFormat::R16G16B16A16_SFLOAT, VkImageAspectFlags::COLOR),
            TextureFormat::Depth32Float => (VkFormat::D32_SFLOAT, VkImageAspectFlags::DEPTH),
            TextureFormat::Depth24Stencil8 => (
                VkFormat::D24_UNORM_S8_UINT,
                VkImageAspectFlags::DEPTH | VkImageAspectFlags::STENCIL,
            ),
        };
        Self {
            flags: VkImageCreateFlags::empty(),
            format: vk_format,
            image_tiling: VkImageTiling::OPTIMAL,
            image_usage_flags: VkImageUsageFlags::SAMPLED
                | VkImageUsageFlags::TRANSFER_SRC
                | VkImageUsageFlags::TRANSFER_DST,
            sharing_mode: VkSharingMode::EXCLUSIVE,
            aspect_mask,
        }
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        match self.format {
            VkFormat::R8_UNORM => Some(TextureFormat::R8Unorm),
            VkFormat::R8G8_UNORM => Some(TextureFormat::RG8Unorm),
            VkFormat::R8G8B8A8_UNORM => Some(TextureFormat::RGBA8Unorm),
            VkFormat::R8G8B8A8_SRGB => Some(TextureFormat::RGBA8UnormSrgb),
            VkFormat::B8G8R8A8_UNORM => Some(TextureFormat::BGRA8Unorm),
            VkFormat::R16G16B16A16_SFLOAT => Some(TextureFormat::RGBA16Float),
            VkFormat::D32_SFLOAT => Some(TextureFormat::Depth32Float),
            VkFormat::D24_UNORM_S8_UINT => Some(TextureFormat::Depth24Stencil8),
            _ => None,
        }
    }

    /// Whether the image can be bound for sampling
    pub fn is_sampleable(&self) -> bool {
        self.image_usage_flags.contains(VkImageUsageFlags::SAMPLED)
    }
}
