/// Mock texture description, used by backends that only need the neutral format

use crate::texture::format::TextureFormat;

/// Mock arm of a [`TextureInfo`](crate::texture::TextureInfo)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockTextureSpec {
    pub format: TextureFormat,
}

impl MockTextureSpec {
    pub fn sampled(format: TextureFormat) -> Self {
        Self { format }
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        Some(self.format)
    }
}
