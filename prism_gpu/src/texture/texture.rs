/// Live texture referenced by images and in-flight GPU work
///
/// A texture either belongs to Prism (created through the backend, deleted
/// through it on drop) or wraps a client texture, in which case dropping it
/// runs the client's release proc instead.

use std::fmt;
use std::sync::{Arc, Mutex};
use glam::UVec2;
use crate::backend::Backend;
use crate::texture::backend_texture::BackendTexture;
use crate::texture::texture_info::TextureInfo;

/// Client callback run once the wrapped texture is no longer used
pub type TextureReleaseProc = Box<dyn FnOnce() + Send>;

enum Ownership {
    Owned(Arc<dyn Backend>),
    Wrapped(Mutex<Option<TextureReleaseProc>>),
}

pub struct Texture {
    backend_texture: BackendTexture,
    ownership: Ownership,
}

impl Texture {
    /// Texture created by `backend`, deleted through it on drop
    pub(crate) fn owned(backend_texture: BackendTexture, backend: Arc<dyn Backend>) -> Self {
        Self { backend_texture, ownership: Ownership::Owned(backend) }
    }

    /// Client texture; `release` runs on drop
    pub(crate) fn wrapped(backend_texture: BackendTexture, release: Option<TextureReleaseProc>) -> Self {
        Self { backend_texture, ownership: Ownership::Wrapped(Mutex::new(release)) }
    }

    pub fn backend_texture(&self) -> &BackendTexture {
        &self.backend_texture
    }

    pub fn dimensions(&self) -> UVec2 {
        self.backend_texture.dimensions()
    }

    pub fn texture_info(&self) -> &TextureInfo {
        self.backend_texture.info()
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.ownership, Ownership::Owned(_))
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("backend_texture", &self.backend_texture)
            .field("owned", &self.is_owned())
            .finish()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        match &mut self.ownership {
            Ownership::Owned(backend) => backend.delete_texture(&self.backend_texture),
            Ownership::Wrapped(release) => {
                let release = match release.get_mut() {
                    Ok(release) => release.take(),
                    Err(poisoned) => poisoned.into_inner().take(),
                };
                if let Some(release) = release {
                    release();
                }
            }
        }
    }
}
