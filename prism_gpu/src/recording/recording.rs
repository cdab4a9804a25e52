/// Immutable result of `Recorder::snap`
///
/// A recording owns the images it draws, and through them the promise
/// registrations it samples. It can be inserted into its context any number of
/// times.

use std::fmt;
use std::sync::Arc;
use crate::descriptor::DescriptorSetLayoutDesc;
use crate::image::Image;
use crate::promise::PromiseImageRegistration;
use crate::utils::{ContextId, RecorderId, RecordingId};

/// One draw sampling `image` through a set of `layout`
#[derive(Debug, Clone)]
pub(crate) struct DrawTask {
    pub(crate) image: Image,
    pub(crate) layout: DescriptorSetLayoutDesc,
}

pub struct Recording {
    id: RecordingId,
    context_id: ContextId,
    recorder_id: RecorderId,
    draws: Vec<DrawTask>,
    /// Deduplicated, in first-use order
    promises: Vec<Arc<PromiseImageRegistration>>,
}

impl Recording {
    pub(crate) fn new(
        context_id: ContextId,
        recorder_id: RecorderId,
        draws: Vec<DrawTask>,
        promises: Vec<Arc<PromiseImageRegistration>>,
    ) -> Self {
        Self { id: RecordingId::next(), context_id, recorder_id, draws, promises }
    }

    pub fn id(&self) -> RecordingId {
        self.id
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn recorder_id(&self) -> RecorderId {
        self.recorder_id
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    pub fn promise_image_count(&self) -> usize {
        self.promises.len()
    }

    pub(crate) fn draws(&self) -> &[DrawTask] {
        &self.draws
    }

    pub(crate) fn promises(&self) -> &[Arc<PromiseImageRegistration>] {
        &self.promises
    }
}

impl fmt::Debug for Recording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recording")
            .field("id", &self.id)
            .field("context", &self.context_id)
            .field("draws", &self.draws.len())
            .field("promises", &self.promises.len())
            .finish()
    }
}
