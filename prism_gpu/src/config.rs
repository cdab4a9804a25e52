/// Context configuration

use crate::descriptor::{DescriptorPoolDesc, DescriptorPoolSize};
use crate::error::Result;
use crate::prism_bail;

/// Options a [`Context`](crate::recording::Context) is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Sets per descriptor pool created by the resource provider
    pub descriptor_pool_max_sets: u32,

    /// Descriptor counts per type for each pool
    pub descriptor_pool_sizes: Vec<DescriptorPoolSize>,

    /// Fresh pools tried after the current one reports exhaustion
    pub descriptor_pool_retry_limit: u32,

    /// Name used in log messages
    pub label: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        let pool = DescriptorPoolDesc::default();
        Self {
            descriptor_pool_max_sets: pool.max_sets,
            descriptor_pool_sizes: pool.pool_sizes,
            descriptor_pool_retry_limit: 1,
            label: "prism".to_string(),
        }
    }
}

impl ContextOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.descriptor_pool_desc().is_valid() {
            prism_bail!("prism::ContextOptions", InitializationFailed,
                "invalid descriptor pool configuration: max_sets = {}, {} pool sizes",
                self.descriptor_pool_max_sets, self.descriptor_pool_sizes.len());
        }
        Ok(())
    }

    pub fn descriptor_pool_desc(&self) -> DescriptorPoolDesc {
        DescriptorPoolDesc {
            max_sets: self.descriptor_pool_max_sets,
            pool_sizes: self.descriptor_pool_sizes.clone(),
        }
    }
}
