pub mod descriptor_types;
pub mod descriptor_pool;
pub mod descriptor_set;

pub use descriptor_types::{
    DescriptorBinding, DescriptorPoolDesc, DescriptorPoolSize, DescriptorSetLayoutDesc,
    DescriptorType, NativeDescriptorSet, ShaderStageFlags,
};
pub use descriptor_pool::{DescriptorPool, NativeDescriptorPool};
pub use descriptor_set::DescriptorSet;
