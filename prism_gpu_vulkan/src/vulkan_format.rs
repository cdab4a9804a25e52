/// Conversions between Prism descriptions and `ash::vk` types
///
/// The Vulkan arm of `TextureInfo` stores raw Vulkan encodings, so most of
/// these are `from_raw` wrappers. The rest map backend-neutral enums.

use ash::vk;
use glam::UVec2;
use prism_gpu::prism::descriptor::{DescriptorType, ShaderStageFlags};
use prism_gpu::prism::texture::{
    TextureFormat, VkFormat, VkImageAspectFlags, VkImageCreateFlags, VkImageTiling,
    VkImageUsageFlags, VkSharingMode,
};

/// Color formats probed when building the caps
pub(crate) const SAMPLED_FORMATS: [TextureFormat; 6] = [
    TextureFormat::R8Unorm,
    TextureFormat::RG8Unorm,
    TextureFormat::RGBA8Unorm,
    TextureFormat::RGBA8UnormSrgb,
    TextureFormat::BGRA8Unorm,
    TextureFormat::RGBA16Float,
];

pub(crate) fn texture_format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8Unorm => vk::Format::R8_UNORM,
        TextureFormat::RG8Unorm => vk::Format::R8G8_UNORM,
        TextureFormat::RGBA8Unorm => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::RGBA8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::BGRA8Unorm => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::RGBA16Float => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::Depth32Float => vk::Format::D32_SFLOAT,
        TextureFormat::Depth24Stencil8 => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub(crate) fn format_to_vk(format: VkFormat) -> vk::Format {
    vk::Format::from_raw(format.0)
}

pub(crate) fn tiling_to_vk(tiling: VkImageTiling) -> vk::ImageTiling {
    vk::ImageTiling::from_raw(tiling.0)
}

pub(crate) fn sharing_mode_to_vk(mode: VkSharingMode) -> vk::SharingMode {
    vk::SharingMode::from_raw(mode.0)
}

pub(crate) fn image_usage_to_vk(usage: VkImageUsageFlags) -> vk::ImageUsageFlags {
    vk::ImageUsageFlags::from_raw(usage.bits())
}

pub(crate) fn image_create_flags_to_vk(flags: VkImageCreateFlags) -> vk::ImageCreateFlags {
    vk::ImageCreateFlags::from_raw(flags.bits())
}

pub(crate) fn aspect_mask_to_vk(aspect: VkImageAspectFlags) -> vk::ImageAspectFlags {
    vk::ImageAspectFlags::from_raw(aspect.bits())
}

/// `None` for counts Vulkan has no flag for
pub(crate) fn sample_count_to_vk(count: u32) -> Option<vk::SampleCountFlags> {
    match count {
        1 => Some(vk::SampleCountFlags::TYPE_1),
        2 => Some(vk::SampleCountFlags::TYPE_2),
        4 => Some(vk::SampleCountFlags::TYPE_4),
        8 => Some(vk::SampleCountFlags::TYPE_8),
        16 => Some(vk::SampleCountFlags::TYPE_16),
        32 => Some(vk::SampleCountFlags::TYPE_32),
        64 => Some(vk::SampleCountFlags::TYPE_64),
        _ => None,
    }
}

pub(crate) fn descriptor_type_to_vk(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::TextureSampler => vk::DescriptorType::SAMPLER,
        DescriptorType::Texture => vk::DescriptorType::SAMPLED_IMAGE,
        DescriptorType::CombinedTextureSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        DescriptorType::InputAttachment => vk::DescriptorType::INPUT_ATTACHMENT,
    }
}

pub(crate) fn stage_flags_to_vk(flags: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(ShaderStageFlags::VERTEX) { vk_flags |= vk::ShaderStageFlags::VERTEX; }
    if flags.contains(ShaderStageFlags::FRAGMENT) { vk_flags |= vk::ShaderStageFlags::FRAGMENT; }
    if flags.contains(ShaderStageFlags::COMPUTE) { vk_flags |= vk::ShaderStageFlags::COMPUTE; }
    vk_flags
}

/// Full mip chain length down to 1x1
pub(crate) fn mip_levels(dimensions: UVec2) -> u32 {
    let largest = dimensions.x.max(dimensions.y).max(1);
    u32::BITS - largest.leading_zeros()
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
