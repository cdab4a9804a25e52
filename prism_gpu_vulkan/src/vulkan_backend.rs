/// VulkanBackend - Vulkan implementation of the `Backend` trait
///
/// Headless: a single graphics queue, no surface. Textures created here are
/// tracked by raw `VkImage` so pixel transfers know their layout and memory.
/// Submissions are marked with a fence each; tokens are retired (and their
/// fence recycled) once the fence signals.

use ash::vk;
use ash::vk::Handle;
use glam::UVec2;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use prism_gpu::prism::backend::{Backend, BackendApi, SubmissionToken};
use prism_gpu::prism::descriptor::{DescriptorPoolDesc, NativeDescriptorPool};
use prism_gpu::prism::image::{ColorInfo, IRect, Pixmap};
use prism_gpu::prism::texture::{BackendTexture, NativeTextureHandle, TextureInfo, VkImageTiling};
use prism_gpu::prism::{Caps, Error, Result};
use prism_gpu::{prism_bail, prism_debug, prism_err, prism_error, prism_info, prism_warn};
use rustc_hash::FxHashMap;
use std::ffi::CString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::vulkan_buffer::StagingBuffer;
use crate::vulkan_config::VulkanConfig;
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_pool::VulkanDescriptorPool;
use crate::vulkan_format::{
    aspect_mask_to_vk, format_to_vk, image_create_flags_to_vk, image_usage_to_vk, mip_levels,
    sample_count_to_vk, sharing_mode_to_vk, texture_format_to_vk, tiling_to_vk, SAMPLED_FORMATS,
};
use crate::vulkan_texture::VulkanTexture;

/// In-flight submissions and the fences marking them
#[derive(Default)]
struct Submissions {
    last_token: u64,
    in_flight: FxHashMap<u64, vk::Fence>,
    free_fences: Vec<vk::Fence>,
}

pub struct VulkanBackend {
    physical_device: vk::PhysicalDevice,
    caps: Caps,
    textures: Mutex<FxHashMap<u64, VulkanTexture>>,
    submissions: Mutex<Submissions>,
    /// Shared with every descriptor pool; owns device and instance destruction
    gpu: Arc<GpuContext>,
}

impl VulkanBackend {
    /// Create a headless Vulkan backend on the first GPU with a graphics queue
    pub fn new(config: VulkanConfig) -> Result<Self> {
        unsafe {
            // Create Vulkan Entry
            let entry = ash::Entry::load()
                .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                    "Failed to load Vulkan library: {:?}", e))?;

            let app_name = CString::new(config.app_name.as_str())
                .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                    "Invalid application name: {}", e))?;

            // Application Info
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Prism")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            let validation = Self::validation_enabled(&config);

            let mut extension_names = Vec::new();
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            // Validation layers
            let layer_names = if validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                    "Failed to create Vulkan instance: {:?}", e))?;

            let (debug_utils_loader, debug_messenger) = match Self::create_debug_messenger(&entry, &instance, &config) {
                Ok(debug) => debug,
                Err(e) => {
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            // Everything created so far is released by GpuContext::drop once the
            // device exists; until then failures clean up by hand
            let device_setup = Self::create_device(&instance);
            let (physical_device, device, queue_family) = match device_setup {
                Ok(setup) => setup,
                Err(e) => {
                    if let (Some(debug_utils), Some(messenger)) = (&debug_utils_loader, debug_messenger) {
                        debug_utils.destroy_debug_utils_messenger(messenger, None);
                    }
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            let queue = device.get_device_queue(queue_family, 0);

            let allocator = match Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            }) {
                Ok(allocator) => allocator,
                Err(e) => {
                    device.destroy_device(None);
                    if let (Some(debug_utils), Some(messenger)) = (&debug_utils_loader, debug_messenger) {
                        debug_utils.destroy_debug_utils_messenger(messenger, None);
                    }
                    instance.destroy_instance(None);
                    return Err(prism_err!("prism::vulkan", InitializationFailed,
                        "Failed to create GPU allocator: {:?}", e));
                }
            };

            // Upload command pool (TRANSIENT + RESET for reusable one-shot transfers)
            let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let upload_command_pool = device.create_command_pool(&upload_pool_create_info, None);

            let caps = Self::build_caps(&instance, physical_device);

            let gpu = Arc::new(GpuContext::new(
                entry,
                instance,
                device,
                allocator,
                queue,
                queue_family,
                upload_command_pool.unwrap_or_default(),
                debug_utils_loader,
                debug_messenger,
            ));
            if let Err(e) = upload_command_pool {
                // Dropping the context tears down what was built
                drop(gpu);
                prism_bail!("prism::vulkan", InitializationFailed, "Failed to create upload command pool: {:?}", e);
            }

            prism_info!("prism::vulkan", "Vulkan backend created (queue family {}, max texture size {})",
                queue_family, caps.max_texture_size());

            Ok(Self {
                physical_device,
                caps,
                textures: Mutex::new(FxHashMap::default()),
                submissions: Mutex::new(Submissions::default()),
                gpu,
            })
        }
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Number of textures created by this backend and not yet deleted
    pub fn live_texture_count(&self) -> usize {
        self.lock_textures().len()
    }

    fn validation_enabled(config: &VulkanConfig) -> bool {
        if config.enable_validation && !cfg!(feature = "vulkan-validation") {
            prism_warn!("prism::vulkan",
                "Validation requested but the `vulkan-validation` feature is disabled");
        }
        config.enable_validation && cfg!(feature = "vulkan-validation")
    }

    #[cfg(feature = "vulkan-validation")]
    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &VulkanConfig,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        if !config.enable_validation {
            return Ok((None, None));
        }
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

        crate::debug::init_debug_config(crate::debug::Config {
            severity: config.debug_severity,
            message_filter: config.debug_message_filter,
            panic_on_error: config.panic_on_error,
            enable_stats: config.enable_validation_stats,
        });

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(crate::debug::severity_flags(config.debug_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = debug_utils
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                "Failed to create debug messenger: {:?}", e))?;

        Ok((Some(debug_utils), Some(messenger)))
    }

    #[cfg(not(feature = "vulkan-validation"))]
    unsafe fn create_debug_messenger(
        _entry: &ash::Entry,
        _instance: &ash::Instance,
        _config: &VulkanConfig,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        Ok((None, None))
    }

    unsafe fn create_device(instance: &ash::Instance) -> Result<(vk::PhysicalDevice, ash::Device, u32)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                "Failed to enumerate physical devices: {:?}", e))?;

        let (physical_device, queue_family) = physical_devices
            .into_iter()
            .find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (physical_device, index as u32))
            })
            .ok_or_else(|| prism_err!("prism::vulkan", InitializationFailed,
                "No Vulkan-capable GPU with a graphics queue found"))?;

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| prism_err!("prism::vulkan", InitializationFailed,
                "Failed to create logical device: {:?}", e))?;

        Ok((physical_device, device, queue_family))
    }

    /// Caps from device limits and the optimal-tiling features of each color format
    unsafe fn build_caps(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Caps {
        let properties = instance.get_physical_device_properties(physical_device);
        let required = vk::FormatFeatureFlags::SAMPLED_IMAGE
            | vk::FormatFeatureFlags::TRANSFER_SRC
            | vk::FormatFeatureFlags::TRANSFER_DST;

        let texturable: Vec<_> = SAMPLED_FORMATS
            .into_iter()
            .filter(|&format| {
                instance
                    .get_physical_device_format_properties(physical_device, texture_format_to_vk(format))
                    .optimal_tiling_features
                    .contains(required)
            })
            .collect();
        prism_debug!("prism::vulkan", "Texturable formats: {:?}", texturable);

        Caps::new(BackendApi::Vulkan, properties.limits.max_image_dimension2_d)
            .with_texturable_formats(texturable)
    }

    fn lock_textures(&self) -> MutexGuard<'_, FxHashMap<u64, VulkanTexture>> {
        self.textures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_submissions(&self) -> MutexGuard<'_, Submissions> {
        self.submissions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn image_key(texture: &BackendTexture) -> Option<u64> {
        match texture.handle() {
            Some(NativeTextureHandle::Vulkan { image, .. }) => Some(image),
            _ => None,
        }
    }

    /// Run `transfer` on a texture created by this backend and record the
    /// layout it leaves the image in
    fn with_texture<T, F>(&self, texture: &BackendTexture, transfer: F) -> Result<T>
    where
        F: FnOnce(&VulkanTexture) -> Result<(T, vk::ImageLayout)>,
    {
        let key = Self::image_key(texture)
            .ok_or_else(|| prism_err!("prism::vulkan", BackendError, "Not a Vulkan texture: {:?}", texture.handle()))?;

        // Held for the whole transfer: the recorded layout must match the image
        let mut textures = self.lock_textures();
        let entry = textures
            .get_mut(&key)
            .ok_or_else(|| prism_err!("prism::vulkan", BackendError,
                "Texture {:#x} was not created by this backend", key))?;
        let (value, layout) = transfer(entry)?;
        entry.layout = layout;
        Ok(value)
    }

    /// Retire a completed submission and recycle its fence
    fn retire(&self, submissions: &mut Submissions, token: u64) {
        if let Some(fence) = submissions.in_flight.remove(&token) {
            match unsafe { self.gpu.device.reset_fences(&[fence]) } {
                Ok(()) => submissions.free_fences.push(fence),
                Err(_) => unsafe { self.gpu.device.destroy_fence(fence, None) },
            }
        }
    }
}

impl Backend for VulkanBackend {
    fn api(&self) -> BackendApi {
        BackendApi::Vulkan
    }

    fn caps(&self) -> &Caps {
        &self.caps
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn NativeDescriptorPool>> {
        let pool = VulkanDescriptorPool::new(Arc::clone(&self.gpu), desc)?;
        prism_debug!("prism::vulkan", "Created descriptor pool (max_sets = {})", desc.max_sets);
        Ok(Box::new(pool))
    }

    fn create_texture(&self, dimensions: UVec2, info: &TextureInfo) -> Result<BackendTexture> {
        let vk_info = info.vulkan_texture_info().ok_or_else(|| prism_err!("prism::vulkan",
            UnsupportedCombination, "Not a valid Vulkan texture info: {:?}", info))?;
        if !self.caps.are_dimensions_supported(dimensions) {
            prism_bail!("prism::vulkan", InvalidArgument,
                "Texture size {}x{} not supported (max {})",
                dimensions.x, dimensions.y, self.caps.max_texture_size());
        }
        if vk_info.protected && !self.caps.protected_support() {
            prism_bail!("prism::vulkan", UnsupportedCombination, "Protected textures are not supported");
        }
        let samples = sample_count_to_vk(vk_info.sample_count).ok_or_else(|| prism_err!("prism::vulkan",
            UnsupportedCombination, "Unsupported sample count {}", vk_info.sample_count))?;

        let spec = &vk_info.spec;
        let mip_levels = if vk_info.mipmapped { mip_levels(dimensions) } else { 1 };
        let usage = image_usage_to_vk(spec.image_usage_flags)
            | vk::ImageUsageFlags::TRANSFER_SRC
            | vk::ImageUsageFlags::TRANSFER_DST;

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .flags(image_create_flags_to_vk(spec.flags))
                .image_type(vk::ImageType::TYPE_2D)
                .format(format_to_vk(spec.format))
                .extent(vk::Extent3D {
                    width: dimensions.x,
                    height: dimensions.y,
                    depth: 1,
                })
                .mip_levels(mip_levels)
                .array_layers(1)
                .samples(samples)
                .tiling(tiling_to_vk(spec.image_tiling))
                .usage(usage)
                .sharing_mode(sharing_mode_to_vk(spec.sharing_mode))
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = self.gpu.device.create_image(&image_create_info, None)
                .map_err(|e| prism_err!("prism::vulkan", AllocationFailure, "Failed to create texture image: {:?}", e))?;

            // From here on `destroy` cleans up
            let mut texture = VulkanTexture {
                image,
                allocation: None,
                dimensions,
                aspect_mask: aspect_mask_to_vk(spec.aspect_mask),
                mip_levels,
                layout: vk::ImageLayout::UNDEFINED,
            };

            let requirements = self.gpu.device.get_image_memory_requirements(image);
            let allocation = self.gpu.allocator().and_then(|mut allocator| {
                allocator
                    .allocate(&AllocationCreateDesc {
                        name: "texture",
                        requirements,
                        location: MemoryLocation::GpuOnly,
                        linear: spec.image_tiling == VkImageTiling::LINEAR,
                        allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                    })
                    .map_err(|_e| {
                        let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                        prism_error!("prism::vulkan", "Out of GPU memory for texture (size: {}x{}, {:.2} MB)",
                            dimensions.x, dimensions.y, size_mb);
                        Error::OutOfMemory
                    })
            });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    texture.destroy(&self.gpu);
                    return Err(e);
                }
            };
            let (memory, offset) = (allocation.memory(), allocation.offset());
            texture.allocation = Some(allocation);

            if let Err(e) = self.gpu.device.bind_image_memory(image, memory, offset) {
                texture.destroy(&self.gpu);
                prism_bail!("prism::vulkan", AllocationFailure, "Failed to bind texture image memory: {:?}", e);
            }

            self.lock_textures().insert(image.as_raw(), texture);
            prism_debug!("prism::vulkan", "Created texture {:#x} ({}x{}, {} mip level(s))",
                image.as_raw(), dimensions.x, dimensions.y, mip_levels);

            Ok(BackendTexture::new(dimensions, info.clone(), NativeTextureHandle::Vulkan {
                image: image.as_raw(),
                image_layout: vk::ImageLayout::UNDEFINED.as_raw(),
                queue_family_index: self.gpu.queue_family,
            }))
        }
    }

    fn delete_texture(&self, texture: &BackendTexture) {
        let Some(key) = Self::image_key(texture) else {
            return;
        };
        // Client-owned images are not in the registry and stay untouched
        let removed = self.lock_textures().remove(&key);
        if let Some(texture) = removed {
            texture.destroy(&self.gpu);
            prism_debug!("prism::vulkan", "Deleted texture {:#x}", key);
        }
    }

    fn write_pixels(&self, texture: &BackendTexture, pixmap: &Pixmap) -> Result<()> {
        let format = texture.info().texture_format().ok_or_else(|| prism_err!("prism::vulkan",
            UnsupportedCombination, "Texture format of {:?} cannot be uploaded", texture.info()))?;
        if format.bytes_per_pixel() != pixmap.color_info().bytes_per_pixel() {
            prism_bail!("prism::vulkan", UnsupportedCombination,
                "{:?} pixels cannot be uploaded to a {:?} texture", pixmap.color_info().color_type, format);
        }

        let gpu = &self.gpu;
        self.with_texture(texture, |target| {
            if pixmap.dimensions() != target.dimensions {
                prism_bail!("prism::vulkan", InvalidArgument,
                    "Pixmap {}x{} does not cover texture {}x{}",
                    pixmap.dimensions().x, pixmap.dimensions().y, target.dimensions.x, target.dimensions.y);
            }

            let staging = StagingBuffer::new(gpu, pixmap.pixels().len(), MemoryLocation::CpuToGpu)?;
            staging.write(pixmap.pixels())?;

            gpu.one_shot("write_pixels", |device, command_buffer| unsafe {
                let to_transfer = target.barrier(
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::AccessFlags::SHADER_READ,
                    vk::AccessFlags::TRANSFER_WRITE,
                );
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::ALL_COMMANDS,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[to_transfer],
                );

                let region = vk::BufferImageCopy::default()
                    .buffer_offset(0)
                    .buffer_row_length(0)
                    .buffer_image_height(0)
                    .image_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: target.aspect_mask,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                    .image_extent(vk::Extent3D {
                        width: target.dimensions.x,
                        height: target.dimensions.y,
                        depth: 1,
                    });
                device.cmd_copy_buffer_to_image(
                    command_buffer,
                    staging.buffer,
                    target.image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &[region],
                );

                let to_shader = vk::ImageMemoryBarrier::default()
                    .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                    .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(target.image)
                    .subresource_range(target.subresource_range())
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::SHADER_READ);
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::FRAGMENT_SHADER,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[to_shader],
                );
            })?;
            Ok(((), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL))
        })
    }

    fn read_pixels(&self, texture: &BackendTexture, rect: IRect, color_info: ColorInfo) -> Result<Pixmap> {
        let format = texture.info().texture_format().ok_or_else(|| prism_err!("prism::vulkan",
            ReadbackFailed, "Texture format of {:?} cannot be read back", texture.info()))?;
        if format.bytes_per_pixel() != color_info.bytes_per_pixel() {
            prism_bail!("prism::vulkan", ReadbackFailed,
                "{:?} texture cannot be read back as {:?}", format, color_info.color_type);
        }

        let gpu = &self.gpu;
        self.with_texture(texture, |source| {
            if !IRect::from_size(source.dimensions).contains(&rect) {
                prism_bail!("prism::vulkan", ReadbackFailed,
                    "Rect {:?} is outside texture {}x{}", rect, source.dimensions.x, source.dimensions.y);
            }
            let size = rect.size();
            let byte_size = size.x as usize * size.y as usize * color_info.bytes_per_pixel();
            let staging = StagingBuffer::new(gpu, byte_size, MemoryLocation::GpuToCpu)?;

            gpu.one_shot("read_pixels", |device, command_buffer| unsafe {
                let to_transfer = source.barrier(
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    vk::AccessFlags::SHADER_READ | vk::AccessFlags::TRANSFER_WRITE,
                    vk::AccessFlags::TRANSFER_READ,
                );
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::ALL_COMMANDS,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[to_transfer],
                );

                let region = vk::BufferImageCopy::default()
                    .buffer_offset(0)
                    .buffer_row_length(0)
                    .buffer_image_height(0)
                    .image_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: source.aspect_mask,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .image_offset(vk::Offset3D { x: rect.left, y: rect.top, z: 0 })
                    .image_extent(vk::Extent3D { width: size.x, height: size.y, depth: 1 });
                device.cmd_copy_image_to_buffer(
                    command_buffer,
                    source.image,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    staging.buffer,
                    &[region],
                );

                // Make the copy visible to the host and hand the image back to shaders
                let host_visible = vk::MemoryBarrier::default()
                    .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                    .dst_access_mask(vk::AccessFlags::HOST_READ);
                let to_shader = vk::ImageMemoryBarrier::default()
                    .old_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL)
                    .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(source.image)
                    .subresource_range(source.subresource_range())
                    .src_access_mask(vk::AccessFlags::TRANSFER_READ)
                    .dst_access_mask(vk::AccessFlags::SHADER_READ);
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::HOST | vk::PipelineStageFlags::FRAGMENT_SHADER,
                    vk::DependencyFlags::empty(),
                    &[host_visible],
                    &[],
                    &[to_shader],
                );
            })?;

            let pixels = staging.read()?;
            Ok((Pixmap::new(size, color_info, pixels)?, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL))
        })
    }

    fn submit(&self) -> Result<SubmissionToken> {
        let mut submissions = self.lock_submissions();
        let fence = match submissions.free_fences.pop() {
            Some(fence) => fence,
            None => unsafe {
                self.gpu.device.create_fence(&vk::FenceCreateInfo::default(), None)
                    .map_err(|e| prism_err!("prism::vulkan", BackendError, "submit: failed to create fence: {:?}", e))?
            },
        };

        // An empty batch signals the fence once all earlier queue work is done
        let submitted = self.gpu.queue().and_then(|queue| unsafe {
            self.gpu.device.queue_submit(*queue, &[], fence)
                .map_err(|e| prism_err!("prism::vulkan", BackendError, "submit: failed to submit queue: {:?}", e))
        });
        if let Err(e) = submitted {
            submissions.free_fences.push(fence);
            return Err(e);
        }

        submissions.last_token += 1;
        let token = submissions.last_token;
        submissions.in_flight.insert(token, fence);
        Ok(SubmissionToken(token))
    }

    fn is_finished(&self, token: SubmissionToken) -> bool {
        let mut submissions = self.lock_submissions();
        let Some(&fence) = submissions.in_flight.get(&token.0) else {
            return true;
        };
        match unsafe { self.gpu.device.get_fence_status(fence) } {
            Ok(true) => {
                self.retire(&mut submissions, token.0);
                true
            }
            Ok(false) => false,
            Err(e) => {
                // A lost device never signals; let the owners release their resources
                prism_error!("prism::vulkan", "Fence of submission {} unusable: {:?}", token.0, e);
                if let Some(fence) = submissions.in_flight.remove(&token.0) {
                    unsafe { self.gpu.device.destroy_fence(fence, None) };
                }
                true
            }
        }
    }

    fn wait(&self, token: SubmissionToken) -> Result<()> {
        let fence = match self.lock_submissions().in_flight.get(&token.0) {
            Some(&fence) => fence,
            None => return Ok(()),
        };
        unsafe {
            self.gpu.device.wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| prism_err!("prism::vulkan", BackendError,
                    "Failed to wait for submission {}: {:?}", token.0, e))?;
        }
        let mut submissions = self.lock_submissions();
        self.retire(&mut submissions, token.0);
        Ok(())
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.gpu.device.device_wait_idle().ok();

            // 1. Textures the core never deleted
            let textures: Vec<VulkanTexture> = self
                .textures
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .drain()
                .map(|(_, texture)| texture)
                .collect();
            if !textures.is_empty() {
                prism_warn!("prism::vulkan", "{} texture(s) still alive at backend destruction", textures.len());
            }
            for texture in textures {
                texture.destroy(&self.gpu);
            }

            // 2. Submission fences
            let submissions = self.submissions.get_mut().unwrap_or_else(PoisonError::into_inner);
            for (_, fence) in submissions.in_flight.drain() {
                self.gpu.device.destroy_fence(fence, None);
            }
            for fence in submissions.free_fences.drain(..) {
                self.gpu.device.destroy_fence(fence, None);
            }
        }
        // Device and instance go with the last Arc<GpuContext>
        prism_info!("prism::vulkan", "Vulkan backend destroyed");
    }
}
