/// Descriptor pool
///
/// A pool hands out reference-counted [`DescriptorSet`]s. Each set keeps the
/// pool alive through an `Arc` back-reference while the pool never holds a
/// strong reference to its sets, so the pool's native object is destroyed
/// exactly once, when the last set and the last owner have let go of it.
///
/// Allocation never retries. Growing into a fresh pool on exhaustion is the
/// caller's policy (see `ResourceProvider`).

use std::fmt;
use std::sync::Arc;
use crate::backend::Backend;
use crate::descriptor::descriptor_set::DescriptorSet;
use crate::descriptor::descriptor_types::{DescriptorPoolDesc, DescriptorSetLayoutDesc, NativeDescriptorSet};
use crate::error::{Error, Result};
use crate::utils::PoolId;
use crate::{prism_bail, prism_debug, prism_trace};

/// Backend side of a descriptor pool
pub trait NativeDescriptorPool: Send + Sync {
    /// Allocate one native set; exhaustion must be reported as an error
    fn allocate_set(&self, layout: &DescriptorSetLayoutDesc) -> Result<NativeDescriptorSet>;

    /// Return a set previously handed out by `allocate_set`
    fn release_set(&self, set: NativeDescriptorSet);

    /// Destroy the native pool; called exactly once, after every set is released
    fn destroy(&mut self);
}

pub struct DescriptorPool {
    id: PoolId,
    desc: DescriptorPoolDesc,
    native: Box<dyn NativeDescriptorPool>,
}

impl DescriptorPool {
    /// Create a pool through `backend`
    pub fn make(backend: &dyn Backend, desc: &DescriptorPoolDesc) -> Result<Arc<Self>> {
        if !desc.is_valid() {
            prism_bail!("prism::DescriptorPool", InvalidArgument,
                "invalid pool description: max_sets = {}, {} pool sizes",
                desc.max_sets, desc.pool_sizes.len());
        }
        let native = backend.create_descriptor_pool(desc)?;
        Ok(Self::from_native(desc.clone(), native))
    }

    /// Adopt an already created native pool
    pub fn from_native(desc: DescriptorPoolDesc, native: Box<dyn NativeDescriptorPool>) -> Arc<Self> {
        let id = PoolId::next();
        prism_debug!("prism::DescriptorPool", "{} created (max_sets = {})", id, desc.max_sets);
        Arc::new(Self { id, desc, native })
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn desc(&self) -> &DescriptorPoolDesc {
        &self.desc
    }

    /// Allocate a set for `layout`
    ///
    /// On failure nothing changes: no set exists and the pool's reference
    /// count is untouched.
    pub fn allocate(self: &Arc<Self>, layout: &DescriptorSetLayoutDesc) -> Result<Arc<DescriptorSet>> {
        if !layout.is_valid() {
            prism_bail!("prism::DescriptorPool", InvalidArgument,
                "invalid descriptor set layout ({} bindings)", layout.bindings.len());
        }
        let handle = match self.native.allocate_set(layout) {
            Ok(handle) => handle,
            Err(Error::AllocationFailure(msg)) => return Err(Error::AllocationFailure(msg)),
            Err(other) => return Err(Error::AllocationFailure(other.to_string())),
        };
        prism_trace!("prism::DescriptorPool", "{} allocated set {:?}", self.id, handle);
        Ok(Arc::new(DescriptorSet::new(handle, layout.clone(), Arc::clone(self))))
    }

    pub(crate) fn release_native_set(&self, set: NativeDescriptorSet) {
        prism_trace!("prism::DescriptorPool", "{} released set {:?}", self.id, set);
        self.native.release_set(set);
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("id", &self.id)
            .field("max_sets", &self.desc.max_sets)
            .finish()
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        self.native.destroy();
        prism_debug!("prism::DescriptorPool", "{} destroyed", self.id);
    }
}

#[cfg(test)]
#[path = "descriptor_pool_tests.rs"]
mod tests;
