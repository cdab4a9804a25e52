/// Promise image registration
///
/// The registration is shared (`Arc`) by the promise [`Image`](crate::image::Image)
/// and by every [`Recording`](crate::recording::Recording) that samples it.
/// Dropping the last of those holders invokes `release_image`; contexts only
/// keep weak references, so they can never delay it or fulfill afterwards.
///
/// Non-volatile registrations keep the texture produced for each context and
/// hand it back on later insertions into that context. Volatile
/// registrations never keep textures.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use glam::UVec2;
use rustc_hash::FxHashMap;
use crate::caps::Caps;
use crate::error::Result;
use crate::image::color::ColorInfo;
use crate::promise::promise_callbacks::{ErasedPromiseCallbacks, PromiseImageCallbacks, Volatile};
use crate::texture::backend_texture::BackendTexture;
use crate::texture::texture::Texture;
use crate::texture::texture_info::TextureInfo;
use crate::utils::{ContextId, RegistrationId};
use crate::{prism_bail, prism_trace};

/// Observable progress of a registration's most recent fulfill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Never fulfilled
    Registered,
    /// `fulfill` is running
    FulfillPending,
    /// The last `fulfill` produced no usable texture
    FulfillFailed,
    /// The last `fulfill` produced a texture
    FulfillSucceeded,
}

struct RegistrationState {
    phase: PromiseState,
    fulfill_count: u32,
    /// Non-volatile only: texture fulfilled for each context
    textures: FxHashMap<ContextId, Arc<Texture>>,
}

pub struct PromiseImageRegistration {
    id: RegistrationId,
    dimensions: UVec2,
    texture_info: TextureInfo,
    color_info: ColorInfo,
    volatile: Volatile,
    /// Locked apart from `state` so callbacks may query the registration
    callbacks: Mutex<Option<Box<dyn ErasedPromiseCallbacks>>>,
    state: Mutex<RegistrationState>,
}

impl PromiseImageRegistration {
    pub(crate) fn new<C: PromiseImageCallbacks>(
        dimensions: UVec2,
        texture_info: TextureInfo,
        color_info: ColorInfo,
        volatile: Volatile,
        callbacks: C,
    ) -> Arc<Self> {
        let id = RegistrationId::next();
        prism_trace!("prism::PromiseImage", "{} registered ({}x{}, {:?})",
            id, dimensions.x, dimensions.y, volatile);
        Arc::new(Self {
            id,
            dimensions,
            texture_info,
            color_info,
            volatile,
            callbacks: Mutex::new(Some(Box::new(callbacks))),
            state: Mutex::new(RegistrationState {
                phase: PromiseState::Registered,
                fulfill_count: 0,
                textures: FxHashMap::default(),
            }),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistrationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn texture_info(&self) -> &TextureInfo {
        &self.texture_info
    }

    pub fn color_info(&self) -> ColorInfo {
        self.color_info
    }

    pub fn volatile(&self) -> Volatile {
        self.volatile
    }

    pub fn state(&self) -> PromiseState {
        self.lock_state().phase
    }

    /// Number of times `fulfill` has been invoked
    pub fn fulfill_count(&self) -> u32 {
        self.lock_state().fulfill_count
    }

    /// Whether a texture is currently attached for `context`
    pub fn is_instantiated_for(&self, context: ContextId) -> bool {
        self.lock_state().textures.contains_key(&context)
    }

    /// Texture to sample for an insertion into `context`
    ///
    /// Reuses the texture attached for `context` when non-volatile, otherwise
    /// runs `fulfill`. A failed fulfill affects only this call; the next
    /// insertion tries again. A valid texture that does not match the promise
    /// is released right away.
    pub(crate) fn instantiate(&self, context: ContextId, caps: &Caps) -> Result<Arc<Texture>> {
        let fulfill_count = {
            let mut state = self.lock_state();
            if self.volatile == Volatile::No {
                if let Some(texture) = state.textures.get(&context) {
                    return Ok(Arc::clone(texture));
                }
            }
            state.phase = PromiseState::FulfillPending;
            state.fulfill_count += 1;
            state.fulfill_count
        };
        prism_trace!("prism::PromiseImage", "{} fulfill #{} for {}", self.id, fulfill_count, context);

        // `state` stays unlocked while client code runs
        let fulfilled = {
            let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
            callbacks.as_mut().map(|callbacks| callbacks.fulfill())
        };
        let (backend_texture, release) = match fulfilled {
            Some(Some(fulfilled)) => fulfilled,
            Some(None) => {
                self.lock_state().phase = PromiseState::FulfillFailed;
                prism_bail!("prism::PromiseImage", FulfillFailure, "{} fulfill returned no texture", self.id);
            }
            None => {
                self.lock_state().phase = PromiseState::FulfillFailed;
                prism_bail!("prism::PromiseImage", FulfillFailure, "{} already released", self.id);
            }
        };

        if !backend_texture.is_valid() {
            self.lock_state().phase = PromiseState::FulfillFailed;
            // No texture was handed over, so release_texture never runs
            drop(release);
            prism_bail!("prism::PromiseImage", FulfillFailure, "{} fulfilled with an invalid backend texture", self.id);
        }
        if let Err(reason) = self.check_fulfilled(&backend_texture, caps) {
            self.lock_state().phase = PromiseState::FulfillFailed;
            // The client did hand over a texture; nothing will sample it
            release();
            prism_bail!("prism::PromiseImage", FulfillFailure, "{} fulfilled with {}", self.id, reason);
        }

        let texture = Arc::new(Texture::wrapped(backend_texture, Some(release)));
        let mut state = self.lock_state();
        state.phase = PromiseState::FulfillSucceeded;
        if self.volatile == Volatile::No {
            let attached = state.textures.entry(context).or_insert_with(|| Arc::clone(&texture));
            return Ok(Arc::clone(attached));
        }
        Ok(texture)
    }

    fn check_fulfilled(&self, texture: &BackendTexture, caps: &Caps) -> std::result::Result<(), String> {
        if texture.dimensions() != self.dimensions {
            return Err(format!(
                "dimensions {}x{}, promised {}x{}",
                texture.dimensions().x, texture.dimensions().y, self.dimensions.x, self.dimensions.y
            ));
        }
        let info = texture.info();
        if !info.is_compatible(&self.texture_info) || (self.texture_info.mipmapped() && !info.mipmapped()) {
            return Err(format!("{:?}, promised {:?}", info, self.texture_info));
        }
        if !caps.is_texturable(info) {
            return Err("a texture that cannot be sampled".to_string());
        }
        Ok(())
    }

    /// Detach the texture kept for a context that is going away
    pub(crate) fn forget_context(&self, context: ContextId) {
        let texture = self.lock_state().textures.remove(&context);
        drop(texture);
    }
}

impl fmt::Debug for PromiseImageRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseImageRegistration")
            .field("id", &self.id)
            .field("dimensions", &self.dimensions)
            .field("volatile", &self.volatile)
            .finish()
    }
}

impl Drop for PromiseImageRegistration {
    fn drop(&mut self) {
        let callbacks = self.callbacks.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        let textures = std::mem::take(&mut self.state.get_mut().unwrap_or_else(PoisonError::into_inner).textures);
        if let Some(callbacks) = callbacks {
            prism_trace!("prism::PromiseImage", "{} release_image", self.id);
            callbacks.release_image();
        }
        drop(textures);
    }
}

#[cfg(test)]
#[path = "promise_image_tests.rs"]
mod tests;
