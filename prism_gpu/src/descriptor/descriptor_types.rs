/// Descriptor layout and pool descriptions shared by every backend

use bitflags::bitflags;

/// Kind of resource bound at a descriptor binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    /// Standalone sampler
    TextureSampler,
    /// Sampled image without a sampler
    Texture,
    CombinedTextureSampler,
    StorageBuffer,
    InputAttachment,
}

bitflags! {
    /// Shader stages a binding is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x1;
        const FRAGMENT = 0x2;
        const COMPUTE = 0x4;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    /// Array size of the binding (1 for non-arrays)
    pub count: u32,
    pub stages: ShaderStageFlags,
}

/// Layout a descriptor set is allocated against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayoutDesc {
    pub bindings: Vec<DescriptorBinding>,
}

impl DescriptorSetLayoutDesc {
    pub fn new(bindings: Vec<DescriptorBinding>) -> Self {
        Self { bindings }
    }

    /// Binding 0: one combined image sampler visible to the fragment stage
    pub fn sampled_texture() -> Self {
        Self::new(vec![DescriptorBinding {
            binding: 0,
            descriptor_type: DescriptorType::CombinedTextureSampler,
            count: 1,
            stages: ShaderStageFlags::FRAGMENT,
        }])
    }

    /// Layout sampling `planes` textures, one combined image sampler per binding
    pub fn sampled_planes(planes: u32) -> Self {
        Self::new(
            (0..planes)
                .map(|binding| DescriptorBinding {
                    binding,
                    descriptor_type: DescriptorType::CombinedTextureSampler,
                    count: 1,
                    stages: ShaderStageFlags::FRAGMENT,
                })
                .collect(),
        )
    }

    /// Non-empty, unique binding numbers, no zero-sized binding
    pub fn is_valid(&self) -> bool {
        if self.bindings.is_empty() {
            return false;
        }
        let mut seen: Vec<u32> = self.bindings.iter().map(|b| b.binding).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len() == self.bindings.len() && self.bindings.iter().all(|b| b.count > 0)
    }
}

/// Number of descriptors of one type a pool can hand out in total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorPoolSize {
    pub descriptor_type: DescriptorType,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorPoolDesc {
    pub max_sets: u32,
    pub pool_sizes: Vec<DescriptorPoolSize>,
}

impl DescriptorPoolDesc {
    pub fn is_valid(&self) -> bool {
        self.max_sets > 0
            && !self.pool_sizes.is_empty()
            && self.pool_sizes.iter().all(|size| size.count > 0)
    }
}

impl Default for DescriptorPoolDesc {
    fn default() -> Self {
        Self {
            max_sets: 1024,
            pool_sizes: vec![
                DescriptorPoolSize { descriptor_type: DescriptorType::UniformBuffer, count: 1024 },
                DescriptorPoolSize { descriptor_type: DescriptorType::CombinedTextureSampler, count: 2048 },
                DescriptorPoolSize { descriptor_type: DescriptorType::Texture, count: 1024 },
                DescriptorPoolSize { descriptor_type: DescriptorType::TextureSampler, count: 1024 },
                DescriptorPoolSize { descriptor_type: DescriptorType::StorageBuffer, count: 1024 },
            ],
        }
    }
}

/// Raw native descriptor set (`VkDescriptorSet`, bind group id, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeDescriptorSet(pub u64);
