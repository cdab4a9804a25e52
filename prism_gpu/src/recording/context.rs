/// GPU context: insertion and submission of recordings
///
/// Inserting a recording instantiates its promise images and allocates the
/// descriptor sets its draws need. The resulting work is batched until
/// `submit`, then tracked until the backend reports the submission finished.
/// Everything a submission references (textures, descriptor sets) is kept
/// alive until then, which is what defers `release_texture` callbacks and pool
/// destruction past GPU completion.
///
/// If an insertion fails nothing is batched: textures fulfilled for volatile
/// images during that insertion are released right away, non-volatile ones
/// stay attached to their registration for the next attempt.

use std::sync::{Arc, Weak};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::backend::{Backend, BackendApi, SubmissionToken};
use crate::config::ContextOptions;
use crate::descriptor::DescriptorSet;
use crate::error::Result;
use crate::image::ImageSource;
use crate::promise::{PromiseImageRegistration, Volatile};
use crate::recording::recorder::Recorder;
use crate::recording::recording::Recording;
use crate::recording::resource_provider::ResourceProvider;
use crate::texture::texture::Texture;
use crate::utils::{ContextId, RegistrationId};
use crate::{prism_bail, prism_debug, prism_info, prism_warn};

/// Whether `submit` blocks until the GPU has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncToCpu {
    No,
    Yes,
}

new_key_type! {
    struct SubmissionKey;
}

/// Resources one or more insertions hand to the GPU
#[derive(Default)]
struct GpuWork {
    textures: Vec<Arc<Texture>>,
    descriptor_sets: Vec<Arc<DescriptorSet>>,
}

impl GpuWork {
    fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.descriptor_sets.is_empty()
    }

    fn append(&mut self, mut other: GpuWork) {
        self.textures.append(&mut other.textures);
        self.descriptor_sets.append(&mut other.descriptor_sets);
    }
}

struct InFlightSubmission {
    token: SubmissionToken,
    // Held until the submission completes
    _work: GpuWork,
}

pub struct Context {
    id: ContextId,
    backend: Arc<dyn Backend>,
    options: ContextOptions,
    resource_provider: ResourceProvider,
    pending: GpuWork,
    in_flight: SlotMap<SubmissionKey, InFlightSubmission>,
    /// Non-volatile registrations holding a texture for this context
    promise_registrations: FxHashMap<RegistrationId, Weak<PromiseImageRegistration>>,
}

impl Context {
    pub fn new(backend: Arc<dyn Backend>, options: ContextOptions) -> Result<Self> {
        options.validate()?;
        let id = ContextId::next();
        let resource_provider = ResourceProvider::new(Arc::clone(&backend), &options);
        prism_info!("prism::Context", "{} '{}' created on {}", id, options.label, backend.api());
        Ok(Self {
            id,
            backend,
            options,
            resource_provider,
            pending: GpuWork::default(),
            in_flight: SlotMap::with_key(),
            promise_registrations: FxHashMap::default(),
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn backend_api(&self) -> BackendApi {
        self.backend.api()
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn resource_provider(&self) -> &ResourceProvider {
        &self.resource_provider
    }

    pub fn make_recorder(&self) -> Recorder {
        Recorder::new(self.id, Arc::clone(&self.backend))
    }

    /// Submissions the GPU has not finished yet
    pub fn in_flight_submission_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_unfinished_gpu_work(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Whether inserted work is waiting for `submit`
    pub fn has_pending_work(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn insert_recording(&mut self, recording: &Recording) -> Result<()> {
        if recording.context_id() != self.id {
            prism_bail!("prism::Context", ContextMismatch,
                "{:?} was recorded for {}, not {}", recording.id(), recording.context_id(), self.id);
        }

        let caps = self.backend.caps();
        let mut promise_textures: FxHashMap<RegistrationId, Arc<Texture>> = FxHashMap::default();
        for registration in recording.promises() {
            match registration.instantiate(self.id, caps) {
                Ok(texture) => {
                    if registration.volatile() == Volatile::No {
                        self.promise_registrations
                            .entry(registration.id())
                            .or_insert_with(|| Arc::downgrade(registration));
                    }
                    promise_textures.insert(registration.id(), texture);
                }
                Err(err) => {
                    prism_warn!("prism::Context", "{} insertion of {:?} abandoned", self.id, recording.id());
                    return Err(err);
                }
            }
        }

        let mut work = GpuWork::default();
        for draw in recording.draws() {
            let set = self.resource_provider.find_or_create_descriptor_set(&draw.layout)?;
            work.descriptor_sets.push(set);
            match draw.image.source() {
                ImageSource::Texture(texture) => work.textures.push(Arc::clone(texture)),
                ImageSource::Yuva { planes, .. } => work.textures.extend(planes.iter().cloned()),
                ImageSource::Promise(registration) => {
                    if let Some(texture) = promise_textures.get(&registration.id()) {
                        work.textures.push(Arc::clone(texture));
                    }
                }
                // Uploaded by the recorder before being recorded
                ImageSource::Raster(_) => {}
            }
        }

        prism_debug!("prism::Context", "{} inserted {:?} ({} draws, {} promise images)",
            self.id, recording.id(), recording.draw_count(), recording.promise_image_count());
        self.pending.append(work);
        Ok(())
    }

    /// Hand pending work to the GPU
    pub fn submit(&mut self, sync: SyncToCpu) -> Result<()> {
        if !self.pending.is_empty() {
            let work = std::mem::take(&mut self.pending);
            let token = self.backend.submit()?;
            prism_debug!("prism::Context", "{} submitted {:?}", self.id, token);
            self.in_flight.insert(InFlightSubmission { token, _work: work });
        }
        if sync == SyncToCpu::Yes {
            self.wait_for_in_flight()?;
        }
        self.check_async_work_completion();
        Ok(())
    }

    /// Release everything held by submissions the GPU has finished
    pub fn check_async_work_completion(&mut self) {
        let backend = &self.backend;
        self.in_flight.retain(|_, submission| !backend.is_finished(submission.token));
        self.promise_registrations.retain(|_, registration| registration.strong_count() > 0);
    }

    /// Submit pending work and block until the GPU is idle
    pub fn finish(&mut self) -> Result<()> {
        self.submit(SyncToCpu::Yes)
    }

    fn wait_for_in_flight(&self) -> Result<()> {
        for (_, submission) in self.in_flight.iter() {
            self.backend.wait(submission.token)?;
        }
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(err) = self.wait_for_in_flight() {
            prism_warn!("prism::Context", "{} dropped with unfinished GPU work: {}", self.id, err);
        }
        self.in_flight.clear();
        self.pending = GpuWork::default();
        for registration in self.promise_registrations.values().filter_map(Weak::upgrade) {
            registration.forget_context(self.id);
        }
        prism_info!("prism::Context", "{} destroyed", self.id);
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
