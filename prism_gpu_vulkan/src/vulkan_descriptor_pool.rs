/// VulkanDescriptorPool - native pool behind `prism::descriptor::DescriptorPool`
///
/// Created with `FREE_DESCRIPTOR_SET` so individual sets go back to the pool
/// when their last holder drops them.

use ash::vk;
use ash::vk::Handle;
use prism_gpu::prism::descriptor::{
    DescriptorPoolDesc, DescriptorSetLayoutDesc, NativeDescriptorPool, NativeDescriptorSet,
};
use prism_gpu::prism::{Error, Result};
use prism_gpu::{prism_err, prism_trace, prism_warn};
use std::sync::{Arc, Mutex};

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::descriptor_type_to_vk;

pub(crate) struct VulkanDescriptorPool {
    gpu: Arc<GpuContext>,
    /// Allocation and freeing must be externally synchronized
    pool: Mutex<vk::DescriptorPool>,
}

impl VulkanDescriptorPool {
    pub(crate) fn new(gpu: Arc<GpuContext>, desc: &DescriptorPoolDesc) -> Result<Self> {
        let pool_sizes: Vec<vk::DescriptorPoolSize> = desc
            .pool_sizes
            .iter()
            .map(|size| vk::DescriptorPoolSize {
                ty: descriptor_type_to_vk(size.descriptor_type),
                descriptor_count: size.count,
            })
            .collect();
        let info = vk::DescriptorPoolCreateInfo::default()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .pool_sizes(&pool_sizes)
            .max_sets(desc.max_sets);

        let pool = unsafe {
            gpu.device.create_descriptor_pool(&info, None)
                .map_err(|e| prism_err!("prism::vulkan", AllocationFailure,
                    "Failed to create descriptor pool: {:?}", e))?
        };
        Ok(Self { gpu, pool: Mutex::new(pool) })
    }
}

impl NativeDescriptorPool for VulkanDescriptorPool {
    fn allocate_set(&self, layout: &DescriptorSetLayoutDesc) -> Result<NativeDescriptorSet> {
        let set_layout = self.gpu.descriptor_set_layout(layout)?;
        let pool = self
            .pool
            .lock()
            .map_err(|_| prism_err!("prism::vulkan", BackendError, "descriptor pool mutex poisoned"))?;

        let layouts = [set_layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(*pool)
            .set_layouts(&layouts);

        let sets = unsafe { self.gpu.device.allocate_descriptor_sets(&allocate_info) };
        match sets {
            Ok(sets) => {
                let set = sets[0];
                prism_trace!("prism::vulkan", "Allocated descriptor set {:#x}", set.as_raw());
                Ok(NativeDescriptorSet(set.as_raw()))
            }
            // Exhaustion is routine: the caller moves on to a fresh pool
            Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY) | Err(vk::Result::ERROR_FRAGMENTED_POOL) => {
                Err(Error::AllocationFailure("descriptor pool exhausted".to_string()))
            }
            Err(e) => Err(prism_err!("prism::vulkan", AllocationFailure,
                "Failed to allocate descriptor set: {:?}", e)),
        }
    }

    fn release_set(&self, set: NativeDescriptorSet) {
        let pool = match self.pool.lock() {
            Ok(pool) => pool,
            Err(_) => {
                prism_warn!("prism::vulkan", "Descriptor set {:#x} leaked: pool mutex poisoned", set.0);
                return;
            }
        };
        unsafe {
            if let Err(e) = self.gpu.device.free_descriptor_sets(*pool, &[vk::DescriptorSet::from_raw(set.0)]) {
                prism_warn!("prism::vulkan", "Failed to free descriptor set {:#x}: {:?}", set.0, e);
            }
        }
    }

    fn destroy(&mut self) {
        let pool = self.pool.get_mut().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *pool != vk::DescriptorPool::null() {
            unsafe {
                self.gpu.device.destroy_descriptor_pool(*pool, None);
            }
            *pool = vk::DescriptorPool::null();
        }
    }
}
