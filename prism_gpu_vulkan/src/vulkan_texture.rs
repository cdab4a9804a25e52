/// VulkanTexture - image created by the backend, plus the state transfers need

use ash::vk;
use glam::UVec2;
use gpu_allocator::vulkan::Allocation;

use crate::vulkan_context::GpuContext;

pub(crate) struct VulkanTexture {
    pub(crate) image: vk::Image,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    pub(crate) dimensions: UVec2,
    pub(crate) aspect_mask: vk::ImageAspectFlags,
    pub(crate) mip_levels: u32,
    /// Layout left behind by the last transfer
    pub(crate) layout: vk::ImageLayout,
}

impl VulkanTexture {
    pub(crate) fn subresource_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect_mask,
            base_mip_level: 0,
            level_count: self.mip_levels,
            base_array_layer: 0,
            layer_count: 1,
        }
    }

    /// Barrier moving every mip level from the current layout to `new_layout`
    pub(crate) fn barrier(
        &self,
        new_layout: vk::ImageLayout,
        src_access: vk::AccessFlags,
        dst_access: vk::AccessFlags,
    ) -> vk::ImageMemoryBarrier<'static> {
        vk::ImageMemoryBarrier::default()
            .old_layout(self.layout)
            .new_layout(new_layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(self.image)
            .subresource_range(self.subresource_range())
            .src_access_mask(src_access)
            .dst_access_mask(dst_access)
    }

    /// Free the memory and destroy the image; the GPU must be done with it
    pub(crate) fn destroy(mut self, gpu: &GpuContext) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the image
                if let Ok(mut allocator) = gpu.allocator() {
                    allocator.free(allocation).ok();
                }
            }
            gpu.device.destroy_image(self.image, None);
        }
    }
}
