/// Handle to a native texture plus its description

use glam::UVec2;
use crate::backend::BackendApi;
use crate::texture::texture_info::TextureInfo;

/// Raw native texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeTextureHandle {
    /// `WGPUTexture` pointer
    Dawn(u64),
    /// `id<MTLTexture>` pointer
    Metal(u64),
    /// `VkImage` with the layout and queue family it currently lives in
    Vulkan {
        image: u64,
        image_layout: i32,
        queue_family_index: u32,
    },
    Mock(u64),
}

impl NativeTextureHandle {
    pub fn backend(&self) -> BackendApi {
        match self {
            NativeTextureHandle::Dawn(_) => BackendApi::Dawn,
            NativeTextureHandle::Metal(_) => BackendApi::Metal,
            NativeTextureHandle::Vulkan { .. } => BackendApi::Vulkan,
            NativeTextureHandle::Mock(_) => BackendApi::Mock,
        }
    }

    pub fn is_null(&self) -> bool {
        match *self {
            NativeTextureHandle::Dawn(raw)
            | NativeTextureHandle::Metal(raw)
            | NativeTextureHandle::Mock(raw) => raw == 0,
            NativeTextureHandle::Vulkan { image, .. } => image == 0,
        }
    }
}

/// Texture created outside of Prism (or handed out by a backend) that can be
/// wrapped into an image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendTexture {
    dimensions: UVec2,
    info: TextureInfo,
    handle: Option<NativeTextureHandle>,
}

impl BackendTexture {
    pub fn new(dimensions: UVec2, info: TextureInfo, handle: NativeTextureHandle) -> Self {
        Self { dimensions, info, handle: Some(handle) }
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn info(&self) -> &TextureInfo {
        &self.info
    }

    pub fn handle(&self) -> Option<NativeTextureHandle> {
        self.handle
    }

    pub fn backend(&self) -> BackendApi {
        self.info.backend()
    }

    /// Valid descriptor, non-empty dimensions, and a non-null handle of the
    /// descriptor's backend
    pub fn is_valid(&self) -> bool {
        self.info.is_valid()
            && self.dimensions.x > 0
            && self.dimensions.y > 0
            && self
                .handle
                .is_some_and(|h| !h.is_null() && h.backend() == self.info.backend())
    }
}
