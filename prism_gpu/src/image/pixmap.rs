/// CPU-side pixel storage
///
/// A `Pixmap` is the upload source for raster images and YUVA planes, and the
/// destination of texture readbacks. Rows are tightly packed.

use glam::UVec2;
use crate::error::Result;
use crate::image::color::ColorInfo;
use crate::image::geometry::IRect;
use crate::prism_bail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    dimensions: UVec2,
    color_info: ColorInfo,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Wrap `pixels` (tightly packed rows) as a pixmap
    pub fn new(dimensions: UVec2, color_info: ColorInfo, pixels: Vec<u8>) -> Result<Self> {
        if dimensions.x == 0 || dimensions.y == 0 {
            prism_bail!("prism::Pixmap", InvalidArgument, "empty pixmap dimensions {}x{}", dimensions.x, dimensions.y);
        }
        if !color_info.is_valid() {
            prism_bail!("prism::Pixmap", InvalidArgument, "invalid color info {:?}", color_info);
        }
        let expected = Self::byte_size(dimensions, &color_info);
        if pixels.len() != expected {
            prism_bail!("prism::Pixmap", InvalidArgument,
                "pixel buffer holds {} bytes, {}x{} {:?} needs {}",
                pixels.len(), dimensions.x, dimensions.y, color_info.color_type, expected);
        }
        Ok(Self { dimensions, color_info, pixels })
    }

    /// Zero-initialized pixmap
    pub fn alloc(dimensions: UVec2, color_info: ColorInfo) -> Result<Self> {
        let size = Self::byte_size(dimensions, &color_info);
        Self::new(dimensions, color_info, vec![0; size])
    }

    fn byte_size(dimensions: UVec2, color_info: &ColorInfo) -> usize {
        dimensions.x as usize * dimensions.y as usize * color_info.bytes_per_pixel()
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn color_info(&self) -> ColorInfo {
        self.color_info
    }

    pub fn row_bytes(&self) -> usize {
        self.dimensions.x as usize * self.color_info.bytes_per_pixel()
    }

    pub fn bounds(&self) -> IRect {
        IRect::from_size(self.dimensions)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.row_bytes();
        &self.pixels[start..start + self.row_bytes()]
    }

    /// Copy of the pixels inside `subset`, or `None` if `subset` is empty or
    /// not contained in the pixmap bounds
    pub fn extract_subset(&self, subset: IRect) -> Option<Pixmap> {
        if !self.bounds().contains(&subset) {
            return None;
        }
        let bpp = self.color_info.bytes_per_pixel();
        let size = subset.size();
        let mut pixels = Vec::with_capacity(size.x as usize * size.y as usize * bpp);
        for y in subset.top..subset.bottom {
            let row = self.row(y as u32);
            pixels.extend_from_slice(&row[subset.left as usize * bpp..subset.right as usize * bpp]);
        }
        Some(Pixmap { dimensions: size, color_info: self.color_info, pixels })
    }

    /// Nearest-neighbor resample to `dimensions`
    pub fn scale_nearest(&self, dimensions: UVec2) -> Result<Pixmap> {
        let mut scaled = Pixmap::alloc(dimensions, self.color_info)?;
        let bpp = self.color_info.bytes_per_pixel();
        let dst_row_bytes = scaled.row_bytes();
        for y in 0..dimensions.y {
            let src_y = (y as u64 * self.dimensions.y as u64 / dimensions.y as u64) as u32;
            let src_row = self.row(src_y);
            for x in 0..dimensions.x {
                let src_x = (x as u64 * self.dimensions.x as u64 / dimensions.x as u64) as usize;
                let dst = y as usize * dst_row_bytes + x as usize * bpp;
                scaled.pixels[dst..dst + bpp].copy_from_slice(&src_row[src_x * bpp..(src_x + 1) * bpp]);
            }
        }
        Ok(scaled)
    }
}

#[cfg(test)]
#[path = "pixmap_tests.rs"]
mod tests;
