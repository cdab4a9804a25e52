/// Backend-neutral texture formats
///
/// Every native format the backends understand maps onto one of these so that
/// caps checks and uploads can be written once.

use crate::image::color::ColorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8Unorm,
    RG8Unorm,
    RGBA8Unorm,
    RGBA8UnormSrgb,
    BGRA8Unorm,
    RGBA16Float,
    Depth32Float,
    Depth24Stencil8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::RG8Unorm => 2,
            TextureFormat::RGBA8Unorm
            | TextureFormat::RGBA8UnormSrgb
            | TextureFormat::BGRA8Unorm
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::RGBA16Float => 8,
        }
    }

    pub fn is_depth_or_stencil(self) -> bool {
        matches!(self, TextureFormat::Depth32Float | TextureFormat::Depth24Stencil8)
    }

    /// Format used when uploading pixels of `color_type`
    pub fn for_color_type(color_type: ColorType) -> Option<TextureFormat> {
        match color_type {
            ColorType::Unknown => None,
            ColorType::Alpha8 | ColorType::Gray8 => Some(TextureFormat::R8Unorm),
            ColorType::Rg88 => Some(TextureFormat::RG8Unorm),
            ColorType::Rgba8888 => Some(TextureFormat::RGBA8Unorm),
            ColorType::Srgba8888 => Some(TextureFormat::RGBA8UnormSrgb),
            ColorType::Bgra8888 => Some(TextureFormat::BGRA8Unorm),
            ColorType::RgbaF16 => Some(TextureFormat::RGBA16Float),
        }
    }

    /// Whether texels of this format can be interpreted as `color_type`
    pub fn is_compatible_with(self, color_type: ColorType) -> bool {
        TextureFormat::for_color_type(color_type) == Some(self)
    }
}
