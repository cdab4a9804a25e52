/// User-facing image
///
/// An `Image` is a cheap, clonable handle. Texture-backed images are bound to
/// the context whose recorder created them. Promise images are bound to a
/// backend only; raster images live on the CPU and are uploaded when first
/// drawn or retextured. The constructors live in
/// `image_factories.rs`.

use std::fmt;
use std::sync::Arc;
use glam::UVec2;
use crate::image::color::{AlphaType, ColorInfo, ColorSpace, ColorType};
use crate::image::geometry::IRect;
use crate::image::pixmap::Pixmap;
use crate::image::yuva::YuvaInfo;
use crate::promise::PromiseImageRegistration;
use crate::texture::texture::Texture;
use crate::texture::texture_info::TextureInfo;
use crate::utils::{ContextId, ImageId};

/// Properties a retextured image must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequiredProperties {
    pub mipmapped: bool,
}

pub(crate) enum ImageSource {
    Texture(Arc<Texture>),
    Promise(Arc<PromiseImageRegistration>),
    Yuva {
        info: YuvaInfo,
        planes: Vec<Arc<Texture>>,
    },
    Raster(Pixmap),
}

struct ImageInner {
    id: ImageId,
    dimensions: UVec2,
    color_info: ColorInfo,
    context: Option<ContextId>,
    source: ImageSource,
}

#[derive(Clone)]
pub struct Image {
    inner: Arc<ImageInner>,
}

impl Image {
    pub(crate) fn from_source(
        dimensions: UVec2,
        color_info: ColorInfo,
        context: Option<ContextId>,
        source: ImageSource,
    ) -> Self {
        Self {
            inner: Arc::new(ImageInner {
                id: ImageId::next(),
                dimensions,
                color_info,
                context,
                source,
            }),
        }
    }

    pub(crate) fn source(&self) -> &ImageSource {
        &self.inner.source
    }

    pub fn id(&self) -> ImageId {
        self.inner.id
    }

    pub fn dimensions(&self) -> UVec2 {
        self.inner.dimensions
    }

    pub fn bounds(&self) -> IRect {
        IRect::from_size(self.inner.dimensions)
    }

    pub fn color_info(&self) -> ColorInfo {
        self.inner.color_info
    }

    pub fn color_type(&self) -> ColorType {
        self.inner.color_info.color_type
    }

    pub fn alpha_type(&self) -> AlphaType {
        self.inner.color_info.alpha_type
    }

    pub fn color_space(&self) -> Option<ColorSpace> {
        self.inner.color_info.color_space
    }

    /// Context the image's textures belong to, `None` for raster and promise images
    pub fn context_id(&self) -> Option<ContextId> {
        self.inner.context
    }

    pub fn is_texture_backed(&self) -> bool {
        !matches!(self.inner.source, ImageSource::Raster(_))
    }

    pub fn is_promise(&self) -> bool {
        matches!(self.inner.source, ImageSource::Promise(_))
    }

    pub fn is_yuva(&self) -> bool {
        matches!(self.inner.source, ImageSource::Yuva { .. })
    }

    /// Backing texture of a single-texture image
    pub fn texture(&self) -> Option<&Arc<Texture>> {
        match &self.inner.source {
            ImageSource::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn promise_registration(&self) -> Option<&Arc<PromiseImageRegistration>> {
        match &self.inner.source {
            ImageSource::Promise(registration) => Some(registration),
            _ => None,
        }
    }

    pub fn yuva_info(&self) -> Option<&YuvaInfo> {
        match &self.inner.source {
            ImageSource::Yuva { info, .. } => Some(info),
            _ => None,
        }
    }

    pub fn yuva_planes(&self) -> Option<&[Arc<Texture>]> {
        match &self.inner.source {
            ImageSource::Yuva { planes, .. } => Some(planes),
            _ => None,
        }
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        match &self.inner.source {
            ImageSource::Raster(pixmap) => Some(pixmap),
            _ => None,
        }
    }

    /// Descriptor of the (eventual) backing texture
    pub fn texture_info(&self) -> Option<&TextureInfo> {
        match &self.inner.source {
            ImageSource::Texture(texture) => Some(texture.texture_info()),
            ImageSource::Promise(registration) => Some(registration.texture_info()),
            ImageSource::Yuva { .. } | ImageSource::Raster(_) => None,
        }
    }

    /// Whether every backing texture carries a full mip chain
    pub fn is_mipmapped(&self) -> bool {
        match &self.inner.source {
            ImageSource::Texture(texture) => texture.texture_info().mipmapped(),
            ImageSource::Promise(registration) => registration.texture_info().mipmapped(),
            ImageSource::Yuva { planes, .. } => planes.iter().all(|p| p.texture_info().mipmapped()),
            ImageSource::Raster(_) => false,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.inner.source {
            ImageSource::Texture(_) => "texture",
            ImageSource::Promise(_) => "promise",
            ImageSource::Yuva { .. } => "yuva",
            ImageSource::Raster(_) => "raster",
        };
        f.debug_struct("Image")
            .field("id", &self.inner.id)
            .field("kind", &kind)
            .field("dimensions", &self.inner.dimensions)
            .field("context", &self.inner.context)
            .finish()
    }
}
