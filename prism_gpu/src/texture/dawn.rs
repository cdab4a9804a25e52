/// Dawn (WebGPU) texture description

use bitflags::bitflags;
use crate::texture::format::TextureFormat;

/// Subset of `wgpu::TextureFormat` the texture lifecycle deals with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DawnTextureFormat {
    R8Unorm,
    RG8Unorm,
    RGBA8Unorm,
    RGBA8UnormSrgb,
    BGRA8Unorm,
    RGBA16Float,
    Depth32Float,
    Depth24PlusStencil8,
    /// Multi-planar external texture, only viewable through a per-plane aspect
    R8BG8Biplanar420Unorm,
}

bitflags! {
    /// `wgpu::TextureUsage` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DawnTextureUsage: u32 {
        const COPY_SRC = 0x01;
        const COPY_DST = 0x02;
        const TEXTURE_BINDING = 0x04;
        const STORAGE_BINDING = 0x08;
        const RENDER_ATTACHMENT = 0x10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DawnTextureAspect {
    All,
    Plane0Only,
    Plane1Only,
    Plane2Only,
}

/// Dawn arm of a [`TextureInfo`](crate::texture::TextureInfo)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DawnTextureSpec {
    pub format: DawnTextureFormat,
    /// Format of the view created on the texture, if it differs from `format`
    pub view_format: Option<DawnTextureFormat>,
    pub usage: DawnTextureUsage,
    pub aspect: DawnTextureAspect,
    pub slice: u32,
}

impl DawnTextureSpec {
    /// Sampled, copyable texture of `format`
    pub fn sampled(format: TextureFormat) -> Self {
        let format = match format {
            TextureFormat::R8Unorm => DawnTextureFormat::R8Unorm,
            TextureFormat::RG8Unorm => DawnTextureFormat::RG8Unorm,
            TextureFormat::RGBA8Unorm => DawnTextureFormat::RGBA8Unorm,
            TextureFormat::RGBA8UnormSrgb => DawnTextureFormat::RGBA8UnormSrgb,
            TextureFormat::BGRA8Unorm => DawnTextureFormat::BGRA8Unorm,
            TextureFormat::RGBA16Float => DawnTextureFormat::RGBA16Float,
            TextureFormat::Depth32Float => DawnTextureFormat::Depth32Float,
            TextureFormat::Depth24Stencil8 => DawnTextureFormat::Depth24PlusStencil8,
        };
        Self {
            format,
            view_format: None,
            usage: DawnTextureUsage::TEXTURE_BINDING | DawnTextureUsage::COPY_SRC | DawnTextureUsage::COPY_DST,
            aspect: DawnTextureAspect::All,
            slice: 0,
        }
    }

    /// Neutral format of the view that will be sampled
    pub fn texture_format(&self) -> Option<TextureFormat> {
        match (self.view_format.unwrap_or(self.format), self.aspect) {
            (DawnTextureFormat::R8BG8Biplanar420Unorm, DawnTextureAspect::Plane0Only) => Some(TextureFormat::R8Unorm),
            (DawnTextureFormat::R8BG8Biplanar420Unorm, DawnTextureAspect::Plane1Only) => Some(TextureFormat::RG8Unorm),
            (DawnTextureFormat::R8BG8Biplanar420Unorm, _) => None,
            (DawnTextureFormat::R8Unorm, _) => Some(TextureFormat::R8Unorm),
            (DawnTextureFormat::RG8Unorm, _) => Some(TextureFormat::RG8Unorm),
            (DawnTextureFormat::RGBA8Unorm, _) => Some(TextureFormat::RGBA8Unorm),
            (DawnTextureFormat::RGBA8UnormSrgb, _) => Some(TextureFormat::RGBA8UnormSrgb),
            (DawnTextureFormat::BGRA8Unorm, _) => Some(TextureFormat::BGRA8Unorm),
            (DawnTextureFormat::RGBA16Float, _) => Some(TextureFormat::RGBA16Float),
            (DawnTextureFormat::Depth32Float, _) => Some(TextureFormat::Depth32Float),
            (DawnTextureFormat::Depth24PlusStencil8, _) => Some(TextureFormat::Depth24Stencil8),
        }
    }
}
