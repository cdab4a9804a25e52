/// Metal texture description
///
/// Pixel formats are carried as raw `MTLPixelFormat` values so that any
/// format the driver hands back survives a round trip through [`TextureInfo`](crate::texture::TextureInfo).

use bitflags::bitflags;
use crate::texture::format::TextureFormat;

/// Raw `MTLPixelFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MtlPixelFormat(pub u64);

impl MtlPixelFormat {
    pub const INVALID: Self = Self(0);
    pub const R8_UNORM: Self = Self(10);
    pub const RG8_UNORM: Self = Self(30);
    pub const RGBA8_UNORM: Self = Self(70);
    pub const RGBA8_UNORM_SRGB: Self = Self(71);
    pub const BGRA8_UNORM: Self = Self(80);
    pub const RGBA16_FLOAT: Self = Self(115);
    pub const DEPTH32_FLOAT: Self = Self(252);
    pub const DEPTH32_FLOAT_STENCIL8: Self = Self(260);
}

bitflags! {
    /// `MTLTextureUsage` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MtlTextureUsage: u64 {
        const SHADER_READ = 0x0001;
        const SHADER_WRITE = 0x0002;
        const RENDER_TARGET = 0x0004;
        const PIXEL_FORMAT_VIEW = 0x0010;
    }
}

/// `MTLStorageMode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MtlStorageMode {
    Shared,
    Managed,
    Private,
    Memoryless,
}

/// Metal arm of a [`TextureInfo`](crate::texture::TextureInfo)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MtlTextureSpec {
    pub format: MtlPixelFormat,
    pub usage: MtlTextureUsage,
    pub storage_mode: MtlStorageMode,
    pub framebuffer_only: bool,
}

impl MtlTextureSpec {
    pub fn sampled(format: TextureFormat) -> Self {
        let format = match format {
            TextureFormat::R8Unorm => MtlPixelFormat::R8_UNORM,
            TextureFormat::RG8Unorm => MtlPixelFormat::RG8_UNORM,
            TextureFormat::RGBA8Unorm => MtlPixelFormat::RGBA8_UNORM,
            TextureFormat::RGBA8UnormSrgb => MtlPixelFormat::RGBA8_UNORM_SRGB,
            TextureFormat::BGRA8Unorm => MtlPixelFormat::BGRA8_UNORM,
            TextureFormat::RGBA16Float => MtlPixelFormat::RGBA16_FLOAT,
            TextureFormat::Depth32Float => MtlPixelFormat::DEPTH32_FLOAT,
            TextureFormat::Depth24Stencil8 => MtlPixelFormat::DEPTH32_FLOAT_STENCIL8,
        };
        Self {
            format,
            usage: MtlTextureUsage::SHADER_READ,
            storage_mode: MtlStorageMode::Private,
            framebuffer_only: false,
        }
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        match self.format {
            MtlPixelFormat::R8_UNORM => Some(TextureFormat::R8Unorm),
            MtlPixelFormat::RG8_UNORM => Some(TextureFormat::RG8Unorm),
            MtlPixelFormat::RGBA8_UNORM => Some(TextureFormat::RGBA8Unorm),
            MtlPixelFormat::RGBA8_UNORM_SRGB => Some(TextureFormat::RGBA8UnormSrgb),
            MtlPixelFormat::BGRA8_UNORM => Some(TextureFormat::BGRA8Unorm),
            MtlPixelFormat::RGBA16_FLOAT => Some(TextureFormat::RGBA16Float),
            MtlPixelFormat::DEPTH32_FLOAT => Some(TextureFormat::Depth32Float),
            MtlPixelFormat::DEPTH32_FLOAT_STENCIL8 => Some(TextureFormat::Depth24Stencil8),
            _ => None,
        }
    }
}
