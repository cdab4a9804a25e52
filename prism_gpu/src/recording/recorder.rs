/// Composes draws that sample images
///
/// A recorder is created by a [`Context`](crate::recording::Context) and only
/// accepts texture-backed images that belong to that context. Promise images
/// are accepted by any context of their backend; raster images are uploaded
/// when drawn.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use crate::backend::{Backend, BackendApi};
use crate::caps::Caps;
use crate::descriptor::DescriptorSetLayoutDesc;
use crate::error::Result;
use crate::image::{Image, ImageSource, RequiredProperties};
use crate::recording::recording::{DrawTask, Recording};
use crate::utils::{ContextId, RecorderId};
use crate::{prism_bail, prism_trace};

pub struct Recorder {
    id: RecorderId,
    context_id: ContextId,
    backend: Arc<dyn Backend>,
    draws: Vec<DrawTask>,
}

impl Recorder {
    pub(crate) fn new(context_id: ContextId, backend: Arc<dyn Backend>) -> Self {
        Self { id: RecorderId::next(), context_id, backend, draws: Vec::new() }
    }

    pub fn id(&self) -> RecorderId {
        self.id
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn backend_api(&self) -> BackendApi {
        self.backend.api()
    }

    pub fn caps(&self) -> &Caps {
        self.backend.caps()
    }

    /// Draws recorded since the last `snap`
    pub fn pending_draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Record a draw sampling `image` with the default layout
    pub fn draw_image(&mut self, image: &Image) -> Result<()> {
        let layout = match image.yuva_info() {
            Some(info) => DescriptorSetLayoutDesc::sampled_planes(info.num_planes() as u32),
            None => DescriptorSetLayoutDesc::sampled_texture(),
        };
        self.draw_image_with_layout(image, layout)
    }

    pub fn draw_image_with_layout(&mut self, image: &Image, layout: DescriptorSetLayoutDesc) -> Result<()> {
        if !layout.is_valid() {
            prism_bail!("prism::Recorder", InvalidArgument, "invalid descriptor set layout for {:?}", image.id());
        }
        let image = match image.source() {
            ImageSource::Raster(_) => Image::texture_from_image(self, image, RequiredProperties::default())?,
            _ => {
                image.check_usable_by(self)?;
                image.clone()
            }
        };
        prism_trace!("prism::Recorder", "{} draw {}", self.id, image.id());
        self.draws.push(DrawTask { image, layout });
        Ok(())
    }

    /// Package the recorded draws; the recorder starts over empty
    pub fn snap(&mut self) -> Recording {
        let draws = std::mem::take(&mut self.draws);
        let mut seen = FxHashSet::default();
        let promises: Vec<_> = draws
            .iter()
            .filter_map(|draw| draw.image.promise_registration())
            .filter(|registration| seen.insert(registration.id()))
            .cloned()
            .collect();
        Recording::new(self.context_id, self.id, draws, promises)
    }
}
