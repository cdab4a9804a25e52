/// Reference-counted descriptor set
///
/// Shared as `Arc<DescriptorSet>`. When the last reference goes away the
/// native set is returned to its pool first, then the pool back-reference is
/// dropped, which may in turn destroy the pool.

use std::fmt;
use std::sync::Arc;
use crate::descriptor::descriptor_pool::DescriptorPool;
use crate::descriptor::descriptor_types::{DescriptorSetLayoutDesc, NativeDescriptorSet};

pub struct DescriptorSet {
    handle: NativeDescriptorSet,
    layout: DescriptorSetLayoutDesc,
    // Declared last: dropped after `Drop::drop` has released the native set
    pool: Arc<DescriptorPool>,
}

impl DescriptorSet {
    pub(crate) fn new(handle: NativeDescriptorSet, layout: DescriptorSetLayoutDesc, pool: Arc<DescriptorPool>) -> Self {
        Self { handle, layout, pool }
    }

    pub fn handle(&self) -> NativeDescriptorSet {
        self.handle
    }

    pub fn layout(&self) -> &DescriptorSetLayoutDesc {
        &self.layout
    }

    pub fn pool(&self) -> &Arc<DescriptorPool> {
        &self.pool
    }
}

impl fmt::Debug for DescriptorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorSet")
            .field("handle", &self.handle)
            .field("pool", &self.pool.id())
            .finish()
    }
}

impl Drop for DescriptorSet {
    fn drop(&mut self) {
        self.pool.release_native_set(self.handle);
    }
}
