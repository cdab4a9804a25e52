/// Planar YUVA descriptions
///
/// A YUVA image is stored as 2 to 4 planes: luma, chroma (separate or
/// interleaved), and an optional alpha plane. Chroma planes may be subsampled.

use glam::UVec2;
use crate::error::Result;
use crate::image::color::ColorType;
use crate::image::pixmap::Pixmap;
use crate::prism_bail;
use crate::texture::backend_texture::BackendTexture;
use crate::texture::format::TextureFormat;

/// How the Y, U, V and A channels are split across planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvaPlaneConfig {
    /// Y, U, V in three single-channel planes
    Planar,
    /// Y plane plus one interleaved UV plane
    SemiPlanar,
    /// Y, U, V, A in four single-channel planes
    PlanarAlpha,
    /// Y plane, interleaved UV plane, A plane
    SemiPlanarAlpha,
}

/// Chroma subsampling factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvaSubsampling {
    /// Full resolution chroma
    S444,
    /// Half horizontal resolution
    S422,
    /// Half horizontal and vertical resolution
    S420,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YuvColorSpace {
    Jpeg,
    Rec601,
    Rec709,
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YuvaInfo {
    dimensions: UVec2,
    plane_config: YuvaPlaneConfig,
    subsampling: YuvaSubsampling,
    yuv_color_space: YuvColorSpace,
}

impl YuvaInfo {
    pub fn new(
        dimensions: UVec2,
        plane_config: YuvaPlaneConfig,
        subsampling: YuvaSubsampling,
        yuv_color_space: YuvColorSpace,
    ) -> Result<Self> {
        if dimensions.x == 0 || dimensions.y == 0 {
            prism_bail!("prism::YuvaInfo", InvalidArgument, "empty YUVA dimensions {}x{}", dimensions.x, dimensions.y);
        }
        Ok(Self { dimensions, plane_config, subsampling, yuv_color_space })
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn plane_config(&self) -> YuvaPlaneConfig {
        self.plane_config
    }

    pub fn subsampling(&self) -> YuvaSubsampling {
        self.subsampling
    }

    pub fn yuv_color_space(&self) -> YuvColorSpace {
        self.yuv_color_space
    }

    pub fn num_planes(&self) -> usize {
        match self.plane_config {
            YuvaPlaneConfig::SemiPlanar => 2,
            YuvaPlaneConfig::Planar | YuvaPlaneConfig::SemiPlanarAlpha => 3,
            YuvaPlaneConfig::PlanarAlpha => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.plane_config, YuvaPlaneConfig::PlanarAlpha | YuvaPlaneConfig::SemiPlanarAlpha)
    }

    fn is_chroma_plane(&self, plane: usize) -> bool {
        match self.plane_config {
            YuvaPlaneConfig::Planar | YuvaPlaneConfig::PlanarAlpha => plane == 1 || plane == 2,
            YuvaPlaneConfig::SemiPlanar | YuvaPlaneConfig::SemiPlanarAlpha => plane == 1,
        }
    }

    /// Channels stored in `plane` (1, or 2 for interleaved UV)
    pub fn plane_channel_count(&self, plane: usize) -> usize {
        let interleaved = matches!(
            self.plane_config,
            YuvaPlaneConfig::SemiPlanar | YuvaPlaneConfig::SemiPlanarAlpha
        );
        if interleaved && plane == 1 { 2 } else { 1 }
    }

    /// Expected size of `plane`; chroma planes are rounded up when subsampled
    pub fn plane_dimensions(&self, plane: usize) -> UVec2 {
        if !self.is_chroma_plane(plane) {
            return self.dimensions;
        }
        match self.subsampling {
            YuvaSubsampling::S444 => self.dimensions,
            YuvaSubsampling::S422 => UVec2::new(self.dimensions.x.div_ceil(2), self.dimensions.y),
            YuvaSubsampling::S420 => UVec2::new(self.dimensions.x.div_ceil(2), self.dimensions.y.div_ceil(2)),
        }
    }

    fn plane_format(&self, plane: usize) -> TextureFormat {
        if self.plane_channel_count(plane) == 2 {
            TextureFormat::RG8Unorm
        } else {
            TextureFormat::R8Unorm
        }
    }
}

/// One client texture per plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YuvaBackendTextures {
    info: YuvaInfo,
    planes: Vec<BackendTexture>,
}

impl YuvaBackendTextures {
    pub fn new(info: YuvaInfo, planes: Vec<BackendTexture>) -> Result<Self> {
        if planes.len() != info.num_planes() {
            prism_bail!("prism::YuvaBackendTextures", InvalidArgument,
                "{:?} needs {} planes, got {}", info.plane_config(), info.num_planes(), planes.len());
        }
        let backend = planes[0].backend();
        for (index, plane) in planes.iter().enumerate() {
            if !plane.is_valid() {
                prism_bail!("prism::YuvaBackendTextures", InvalidArgument, "plane {} is not a valid texture", index);
            }
            if plane.backend() != backend {
                prism_bail!("prism::YuvaBackendTextures", InvalidArgument,
                    "plane {} is a {} texture, plane 0 is {}", index, plane.backend(), backend);
            }
            if plane.dimensions() != info.plane_dimensions(index) {
                prism_bail!("prism::YuvaBackendTextures", InvalidArgument,
                    "plane {} is {}x{}, expected {}x{}", index,
                    plane.dimensions().x, plane.dimensions().y,
                    info.plane_dimensions(index).x, info.plane_dimensions(index).y);
            }
            if plane.info().texture_format() != Some(info.plane_format(index)) {
                prism_bail!("prism::YuvaBackendTextures", InvalidArgument,
                    "plane {} format {:?} does not hold {} channel(s)",
                    index, plane.info().texture_format(), info.plane_channel_count(index));
            }
        }
        Ok(Self { info, planes })
    }

    pub fn info(&self) -> &YuvaInfo {
        &self.info
    }

    pub fn planes(&self) -> &[BackendTexture] {
        &self.planes
    }
}

/// One CPU pixmap per plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YuvaPixmaps {
    info: YuvaInfo,
    planes: Vec<Pixmap>,
}

impl YuvaPixmaps {
    pub fn new(info: YuvaInfo, planes: Vec<Pixmap>) -> Result<Self> {
        if planes.len() != info.num_planes() {
            prism_bail!("prism::YuvaPixmaps", InvalidArgument,
                "{:?} needs {} planes, got {}", info.plane_config(), info.num_planes(), planes.len());
        }
        for (index, plane) in planes.iter().enumerate() {
            if plane.dimensions() != info.plane_dimensions(index) {
                prism_bail!("prism::YuvaPixmaps", InvalidArgument,
                    "plane {} is {}x{}, expected {}x{}", index,
                    plane.dimensions().x, plane.dimensions().y,
                    info.plane_dimensions(index).x, info.plane_dimensions(index).y);
            }
            let color_type = plane.color_info().color_type;
            let channels_ok = match info.plane_channel_count(index) {
                2 => color_type == ColorType::Rg88,
                _ => matches!(color_type, ColorType::Alpha8 | ColorType::Gray8),
            };
            if !channels_ok {
                prism_bail!("prism::YuvaPixmaps", InvalidArgument,
                    "plane {} color type {:?} does not hold {} channel(s)",
                    index, color_type, info.plane_channel_count(index));
            }
        }
        Ok(Self { info, planes })
    }

    pub fn info(&self) -> &YuvaInfo {
        &self.info
    }

    pub fn planes(&self) -> &[Pixmap] {
        &self.planes
    }
}
