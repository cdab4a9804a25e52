/// Native context interface
///
/// A `Backend` is everything the texture lifecycle needs from a graphics API:
/// capabilities, descriptor pools, texture creation and deletion, pixel
/// transfer, and submission fences. Backends are plugged in as
/// `Arc<dyn Backend>` (see the `prism_gpu_vulkan` crate).

use std::fmt;
use glam::UVec2;
use crate::caps::Caps;
use crate::descriptor::{DescriptorPoolDesc, NativeDescriptorPool};
use crate::error::Result;
use crate::image::color::ColorInfo;
use crate::image::geometry::IRect;
use crate::image::pixmap::Pixmap;
use crate::texture::backend_texture::BackendTexture;
use crate::texture::texture_info::TextureInfo;

#[cfg(test)]
pub(crate) mod mock_backend;

/// Native graphics API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendApi {
    Dawn,
    Metal,
    Vulkan,
    Mock,
}

impl fmt::Display for BackendApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendApi::Dawn => "Dawn",
            BackendApi::Metal => "Metal",
            BackendApi::Vulkan => "Vulkan",
            BackendApi::Mock => "Mock",
        };
        f.write_str(name)
    }
}

/// Fence-like marker of one GPU submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionToken(pub u64);

pub trait Backend: Send + Sync {
    fn api(&self) -> BackendApi;

    fn caps(&self) -> &Caps;

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn NativeDescriptorPool>>;

    /// Create an uninitialized texture described by `info`
    fn create_texture(&self, dimensions: UVec2, info: &TextureInfo) -> Result<BackendTexture>;

    /// Destroy a texture returned by `create_texture`
    fn delete_texture(&self, texture: &BackendTexture);

    /// Upload `pixmap` to the whole texture
    fn write_pixels(&self, texture: &BackendTexture, pixmap: &Pixmap) -> Result<()>;

    /// Read `rect` of the texture back into a new pixmap
    fn read_pixels(&self, texture: &BackendTexture, rect: IRect, color_info: ColorInfo) -> Result<Pixmap>;

    /// Flush recorded work to the GPU
    fn submit(&self) -> Result<SubmissionToken>;

    /// Non-blocking completion check
    fn is_finished(&self, token: SubmissionToken) -> bool;

    /// Block until the submission has completed
    fn wait(&self, token: SubmissionToken) -> Result<()>;
}
