/// Backend capabilities
///
/// Answers the questions the image factories ask before touching the backend:
/// can this descriptor be sampled, does it hold pixels of this color type, and
/// what descriptor should an upload of a given color type use.

use glam::UVec2;
use rustc_hash::FxHashSet;
use crate::backend::BackendApi;
use crate::image::color::ColorType;
use crate::texture::format::TextureFormat;
use crate::texture::texture_info::{BackendTextureSpec, TextureInfo};

#[derive(Debug, Clone)]
pub struct Caps {
    backend: BackendApi,
    max_texture_size: u32,
    protected_support: bool,
    texturable_formats: FxHashSet<TextureFormat>,
}

impl Caps {
    /// Caps with every color format texturable and no protected content
    pub fn new(backend: BackendApi, max_texture_size: u32) -> Self {
        let texturable_formats = [
            TextureFormat::R8Unorm,
            TextureFormat::RG8Unorm,
            TextureFormat::RGBA8Unorm,
            TextureFormat::RGBA8UnormSrgb,
            TextureFormat::BGRA8Unorm,
            TextureFormat::RGBA16Float,
        ]
        .into_iter()
        .collect();
        Self { backend, max_texture_size, protected_support: false, texturable_formats }
    }

    pub fn with_protected_support(mut self, supported: bool) -> Self {
        self.protected_support = supported;
        self
    }

    /// Replace the set of formats that can be sampled
    pub fn with_texturable_formats(mut self, formats: impl IntoIterator<Item = TextureFormat>) -> Self {
        self.texturable_formats = formats.into_iter().collect();
        self
    }

    pub fn backend(&self) -> BackendApi {
        self.backend
    }

    pub fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    pub fn protected_support(&self) -> bool {
        self.protected_support
    }

    /// Non-empty and within the maximum texture size
    pub fn are_dimensions_supported(&self, dimensions: UVec2) -> bool {
        dimensions.x > 0
            && dimensions.y > 0
            && dimensions.x <= self.max_texture_size
            && dimensions.y <= self.max_texture_size
    }

    /// Whether a texture described by `info` can be bound for sampling
    pub fn is_texturable(&self, info: &TextureInfo) -> bool {
        if !info.is_valid() || info.backend() != self.backend || info.sample_count() != 1 {
            return false;
        }
        if info.is_protected() && !self.protected_support {
            return false;
        }
        if let Some(spec) = info.vulkan_spec() {
            if !spec.is_sampleable() {
                return false;
            }
        }
        info.texture_format()
            .is_some_and(|format| !format.is_depth_or_stencil() && self.texturable_formats.contains(&format))
    }

    pub fn are_color_type_and_texture_info_compatible(&self, color_type: ColorType, info: &TextureInfo) -> bool {
        info.texture_format()
            .is_some_and(|format| format.is_compatible_with(color_type))
    }

    /// Descriptor used when Prism itself creates a sampled texture
    pub fn default_sampled_texture_info(
        &self,
        color_type: ColorType,
        mipmapped: bool,
        protected: bool,
    ) -> Option<TextureInfo> {
        if protected && !self.protected_support {
            return None;
        }
        let format = TextureFormat::for_color_type(color_type)?;
        if !self.texturable_formats.contains(&format) {
            return None;
        }
        Some(TextureInfo::new(1, mipmapped, protected, BackendTextureSpec::sampled(self.backend, format)))
    }
}
