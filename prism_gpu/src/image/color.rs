/// Color type, alpha type, and color space descriptions of image contents

/// Pixel memory layout of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Unknown,
    Alpha8,
    Gray8,
    Rg88,
    Rgba8888,
    Srgba8888,
    Bgra8888,
    RgbaF16,
}

impl ColorType {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Unknown => 0,
            ColorType::Alpha8 | ColorType::Gray8 => 1,
            ColorType::Rg88 => 2,
            ColorType::Rgba8888 | ColorType::Srgba8888 | ColorType::Bgra8888 => 4,
            ColorType::RgbaF16 => 8,
        }
    }

    /// Color types without an alpha channel
    pub fn is_always_opaque(self) -> bool {
        matches!(self, ColorType::Gray8 | ColorType::Rg88)
    }

    pub fn is_alpha_only(self) -> bool {
        self == ColorType::Alpha8
    }
}

/// How the alpha channel is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaType {
    Unknown,
    Opaque,
    Premul,
    Unpremul,
}

/// Color space tag carried alongside the pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
}

/// Complete description of how to interpret an image's pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorInfo {
    pub color_type: ColorType,
    pub alpha_type: AlphaType,
    pub color_space: Option<ColorSpace>,
}

impl ColorInfo {
    pub fn new(color_type: ColorType, alpha_type: AlphaType, color_space: Option<ColorSpace>) -> Self {
        Self { color_type, alpha_type, color_space }
    }

    /// Normalize the alpha type for the color type
    ///
    /// Returns `None` when either is `Unknown`. Alpha-only data is never
    /// unpremultiplied and always-opaque color types are forced to `Opaque`.
    pub fn validated(
        color_type: ColorType,
        alpha_type: AlphaType,
        color_space: Option<ColorSpace>,
    ) -> Option<Self> {
        if color_type == ColorType::Unknown || alpha_type == AlphaType::Unknown {
            return None;
        }
        let alpha_type = if color_type.is_always_opaque() {
            AlphaType::Opaque
        } else if color_type.is_alpha_only() && alpha_type == AlphaType::Unpremul {
            AlphaType::Premul
        } else {
            alpha_type
        };
        Some(Self::new(color_type, alpha_type, color_space))
    }

    pub fn is_valid(&self) -> bool {
        self.color_type != ColorType::Unknown && self.alpha_type != AlphaType::Unknown
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.color_type.bytes_per_pixel()
    }

    /// Same description with another color space
    pub fn with_color_space(self, color_space: Option<ColorSpace>) -> Self {
        Self { color_space, ..self }
    }
}
