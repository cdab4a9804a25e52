/// GpuContext - Shared GPU state for the backend and its descriptor pools
///
/// Contains everything needed for GPU operations:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for command submission
/// - Command pool for one-shot transfer operations
/// - Descriptor set layouts, created once per layout description
///
/// Descriptor pools keep an `Arc<GpuContext>` and may outlive the backend, so
/// the context owns the device and instance and destroys them last.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use prism_gpu::prism::descriptor::DescriptorSetLayoutDesc;
use prism_gpu::prism::Result;
use prism_gpu::{prism_debug, prism_err};
use rustc_hash::FxHashMap;
use std::mem::ManuallyDrop;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::vulkan_format::{descriptor_type_to_vk, stage_flags_to_vk};

pub(crate) struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop to ensure it's dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue (submissions to a queue must be externally synchronized)
    pub queue: Mutex<vk::Queue>,

    pub queue_family: u32,

    /// Command pool for one-shot transfers
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    set_layouts: Mutex<FxHashMap<DescriptorSetLayoutDesc, vk::DescriptorSetLayout>>,

    instance: ash::Instance,

    /// Loaded Vulkan library, must outlive the instance
    _entry: ash::Entry,

    /// Debug utils loader (for validation layers)
    debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        device: ash::Device,
        allocator: Allocator,
        queue: vk::Queue,
        queue_family: u32,
        upload_command_pool: vk::CommandPool,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            queue: Mutex::new(queue),
            queue_family,
            upload_command_pool: Mutex::new(upload_command_pool),
            set_layouts: Mutex::new(FxHashMap::default()),
            instance,
            _entry: entry,
            debug_utils_loader,
            debug_messenger,
        }
    }

    pub fn allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| prism_err!("prism::vulkan", BackendError, "GPU allocator mutex poisoned"))
    }

    pub fn queue(&self) -> Result<MutexGuard<'_, vk::Queue>> {
        self.queue
            .lock()
            .map_err(|_| prism_err!("prism::vulkan", BackendError, "queue mutex poisoned"))
    }

    /// Layout for `desc`, created on first use
    pub fn descriptor_set_layout(&self, desc: &DescriptorSetLayoutDesc) -> Result<vk::DescriptorSetLayout> {
        let mut layouts = self
            .set_layouts
            .lock()
            .map_err(|_| prism_err!("prism::vulkan", BackendError, "descriptor set layout cache poisoned"))?;
        if let Some(&layout) = layouts.get(desc) {
            return Ok(layout);
        }

        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(binding.binding)
                    .descriptor_type(descriptor_type_to_vk(binding.descriptor_type))
                    .descriptor_count(binding.count)
                    .stage_flags(stage_flags_to_vk(binding.stages))
            })
            .collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

        let layout = unsafe {
            self.device
                .create_descriptor_set_layout(&create_info, None)
                .map_err(|e| prism_err!("prism::vulkan", AllocationFailure,
                    "Failed to create descriptor set layout: {:?}", e))?
        };
        prism_debug!("prism::vulkan", "Created descriptor set layout with {} binding(s)", bindings.len());
        layouts.insert(desc.clone(), layout);
        Ok(layout)
    }

    /// Record commands into a one-shot command buffer, submit it and wait for
    /// completion
    pub fn one_shot<F>(&self, label: &str, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self
            .upload_command_pool
            .lock()
            .map_err(|_| prism_err!("prism::vulkan", BackendError, "upload command pool mutex poisoned"))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| prism_err!("prism::vulkan", BackendError,
                    "{}: failed to allocate command buffer: {:?}", label, e))?[0];

            let result = self.record_and_submit(label, command_buffer, record);
            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    unsafe fn record_and_submit<F>(&self, label: &str, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        self.device.begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| prism_err!("prism::vulkan", BackendError,
                "{}: failed to begin command buffer: {:?}", label, e))?;

        record(&self.device, command_buffer);

        self.device.end_command_buffer(command_buffer)
            .map_err(|e| prism_err!("prism::vulkan", BackendError,
                "{}: failed to end command buffer: {:?}", label, e))?;

        let fence = self.device.create_fence(&vk::FenceCreateInfo::default(), None)
            .map_err(|e| prism_err!("prism::vulkan", BackendError,
                "{}: failed to create fence: {:?}", label, e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        let submitted = self.queue().and_then(|queue| {
            self.device.queue_submit(*queue, &[submit_info], fence)
                .map_err(|e| prism_err!("prism::vulkan", BackendError,
                    "{}: failed to submit transfer: {:?}", label, e))
        });
        let result = submitted.and_then(|()| {
            self.device.wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| prism_err!("prism::vulkan", BackendError,
                    "{}: failed to wait for transfer: {:?}", label, e))
        });
        self.device.destroy_fence(fence, None);
        result
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.device.device_wait_idle().ok();

            // 1. Destroy cached layouts and the upload command pool
            let layouts = self.set_layouts.get_mut().unwrap_or_else(PoisonError::into_inner);
            for (_, layout) in layouts.drain() {
                self.device.destroy_descriptor_set_layout(layout, None);
            }
            let pool = self.upload_command_pool.get_mut().unwrap_or_else(PoisonError::into_inner);
            if *pool != vk::CommandPool::null() {
                self.device.destroy_command_pool(*pool, None);
                *pool = vk::CommandPool::null();
            }

            // 2. Drop allocator: free VkDeviceMemory pages BEFORE destroying device
            ManuallyDrop::drop(&mut self.allocator);

            // 3. Cleanup debug config to prevent callbacks during destruction
            #[cfg(feature = "vulkan-validation")]
            crate::debug::cleanup_debug_config();

            // 4. Destroy debug messenger BEFORE device and instance
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger) {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            // 5. Destroy device and instance
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
