/// StagingBuffer - host-visible buffer for pixel uploads and readbacks

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use prism_gpu::prism::{Error, Result};
use prism_gpu::{prism_err, prism_error};

use crate::vulkan_context::GpuContext;

pub(crate) struct StagingBuffer<'a> {
    gpu: &'a GpuContext,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: usize,
}

impl<'a> StagingBuffer<'a> {
    /// `CpuToGpu` buffer for uploads, `GpuToCpu` for readbacks
    pub(crate) fn new(gpu: &'a GpuContext, size: usize, location: MemoryLocation) -> Result<Self> {
        let (usage, name) = match location {
            MemoryLocation::GpuToCpu => (vk::BufferUsageFlags::TRANSFER_DST, "readback_staging_buffer"),
            _ => (vk::BufferUsageFlags::TRANSFER_SRC, "upload_staging_buffer"),
        };

        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(size as u64)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = gpu.device.create_buffer(&create_info, None)
                .map_err(|e| prism_err!("prism::vulkan", BackendError, "Failed to create {}: {:?}", name, e))?;

            // From here on Drop cleans up
            let mut staging = Self { gpu, buffer, allocation: None, size };

            let requirements = gpu.device.get_buffer_memory_requirements(buffer);
            let allocation = gpu.allocator()?
                .allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    prism_error!("prism::vulkan", "Out of GPU memory for {} ({:.2} MB)", name, size_mb);
                    Error::OutOfMemory
                })?;

            let (memory, offset) = (allocation.memory(), allocation.offset());
            staging.allocation = Some(allocation);

            gpu.device.bind_buffer_memory(buffer, memory, offset)
                .map_err(|e| prism_err!("prism::vulkan", BackendError, "Failed to bind {} memory: {:?}", name, e))?;
            Ok(staging)
        }
    }

    fn mapped_ptr(&self) -> Result<*mut u8> {
        self.allocation
            .as_ref()
            .and_then(Allocation::mapped_ptr)
            .map(|ptr| ptr.as_ptr() as *mut u8)
            .ok_or_else(|| prism_err!("prism::vulkan", BackendError, "Staging buffer is not mapped"))
    }

    pub(crate) fn write(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.size {
            return Err(prism_err!("prism::vulkan", InvalidArgument,
                "{} bytes do not fit a {} byte staging buffer", data.len(), self.size));
        }
        let mapped_ptr = self.mapped_ptr()?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr, data.len());
        }
        Ok(())
    }

    pub(crate) fn read(&self) -> Result<Vec<u8>> {
        let mapped_ptr = self.mapped_ptr()?;
        let mut data = vec![0u8; self.size];
        unsafe {
            std::ptr::copy_nonoverlapping(mapped_ptr as *const u8, data.as_mut_ptr(), self.size);
        }
        Ok(data)
    }
}

impl Drop for StagingBuffer<'_> {
    fn drop(&mut self) {
        unsafe {
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.gpu.allocator() {
                    allocator.free(allocation).ok();
                }
            }
            self.gpu.device.destroy_buffer(self.buffer, None);
        }
    }
}
