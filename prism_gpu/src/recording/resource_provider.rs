/// Descriptor pool owner of a context
///
/// Sets come from the current pool. When the pool reports exhaustion the
/// provider starts a fresh pool and retries, up to the configured retry limit.
/// Replaced pools are not destroyed here: they live on until their last set
/// is released.

use std::sync::Arc;
use crate::backend::Backend;
use crate::config::ContextOptions;
use crate::descriptor::{DescriptorPool, DescriptorPoolDesc, DescriptorSet, DescriptorSetLayoutDesc};
use crate::error::{Error, Result};
use crate::{prism_bail, prism_debug};

pub struct ResourceProvider {
    backend: Arc<dyn Backend>,
    pool_desc: DescriptorPoolDesc,
    retry_limit: u32,
    current_pool: Option<Arc<DescriptorPool>>,
    pools_created: usize,
}

impl ResourceProvider {
    pub(crate) fn new(backend: Arc<dyn Backend>, options: &ContextOptions) -> Self {
        Self {
            backend,
            pool_desc: options.descriptor_pool_desc(),
            retry_limit: options.descriptor_pool_retry_limit,
            current_pool: None,
            pools_created: 0,
        }
    }

    /// Pools created over the provider's lifetime
    pub fn pools_created(&self) -> usize {
        self.pools_created
    }

    pub fn current_pool(&self) -> Option<&Arc<DescriptorPool>> {
        self.current_pool.as_ref()
    }

    pub fn find_or_create_descriptor_set(&mut self, layout: &DescriptorSetLayoutDesc) -> Result<Arc<DescriptorSet>> {
        let pool = match self.current_pool.clone() {
            Some(pool) => pool,
            None => self.create_pool()?,
        };
        match pool.allocate(layout) {
            Ok(set) => return Ok(set),
            Err(Error::AllocationFailure(reason)) => {
                prism_debug!("prism::ResourceProvider", "{} exhausted ({}), starting a new pool", pool.id(), reason);
            }
            Err(other) => return Err(other),
        }

        for _ in 0..self.retry_limit {
            let pool = self.create_pool()?;
            match pool.allocate(layout) {
                Ok(set) => return Ok(set),
                Err(Error::AllocationFailure(reason)) => {
                    prism_debug!("prism::ResourceProvider", "fresh {} failed too ({})", pool.id(), reason);
                }
                Err(other) => return Err(other),
            }
        }
        prism_bail!("prism::ResourceProvider", AllocationFailure,
            "no descriptor set after {} new pool(s)", self.retry_limit);
    }

    fn create_pool(&mut self) -> Result<Arc<DescriptorPool>> {
        let pool = DescriptorPool::make(self.backend.as_ref(), &self.pool_desc)?;
        self.current_pool = Some(Arc::clone(&pool));
        self.pools_created += 1;
        Ok(pool)
    }
}
