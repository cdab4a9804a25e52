/// Image constructors
///
/// Every factory validates its inputs against the backend caps
/// before creating anything. On failure no texture is left behind and no
/// registration exists; callbacks handed over by the client are given back
/// through their release path (`release_proc` runs, `release_image` runs).

use std::sync::{Arc, Mutex};
use glam::UVec2;
use crate::caps::Caps;
use crate::error::Result;
use crate::image::color::{AlphaType, ColorInfo, ColorSpace, ColorType};
use crate::image::geometry::IRect;
use crate::image::image::{Image, ImageSource, RequiredProperties};
use crate::image::pixmap::Pixmap;
use crate::image::yuva::{YuvaBackendTextures, YuvaPixmaps};
use crate::promise::{PromiseImageCallbacks, PromiseImageRegistration, Volatile};
use crate::recording::Recorder;
use crate::texture::backend_texture::BackendTexture;
use crate::texture::texture::{Texture, TextureReleaseProc};
use crate::texture::texture_info::TextureInfo;
use crate::{prism_bail, prism_debug, prism_err};

const SOURCE: &str = "prism::Image";

/// Runs the client release proc when the last plane referencing it drops
struct SharedRelease(Mutex<Option<TextureReleaseProc>>);

impl Drop for SharedRelease {
    fn drop(&mut self) {
        let release = match self.0.get_mut() {
            Ok(release) => release.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(release) = release {
            release();
        }
    }
}

/// Shared checks for a texture the client hands over (adopted or promised)
fn check_client_texture_info(
    caps: &Caps,
    info: &TextureInfo,
    dimensions: UVec2,
    color_type: ColorType,
) -> Result<()> {
    if !info.is_valid() {
        prism_bail!(SOURCE, UnsupportedCombination, "texture descriptor is invalid");
    }
    if info.backend() != caps.backend() {
        prism_bail!(SOURCE, UnsupportedCombination,
            "{} texture used with a {} backend", info.backend(), caps.backend());
    }
    if !caps.are_dimensions_supported(dimensions) {
        prism_bail!(SOURCE, UnsupportedCombination,
            "dimensions {}x{} unsupported (max {})", dimensions.x, dimensions.y, caps.max_texture_size());
    }
    if !caps.is_texturable(info) {
        prism_bail!(SOURCE, UnsupportedCombination, "{:?} cannot be sampled", info.texture_format());
    }
    if !caps.are_color_type_and_texture_info_compatible(color_type, info) {
        prism_bail!(SOURCE, UnsupportedCombination,
            "color type {:?} incompatible with {:?}", color_type, info.texture_format());
    }
    Ok(())
}

/// Create a texture owned by Prism and fill it with `pixmap`
fn upload_pixmap(recorder: &Recorder, pixmap: &Pixmap, mipmapped: bool) -> Result<Arc<Texture>> {
    let backend = recorder.backend();
    let caps = backend.caps();
    if !caps.are_dimensions_supported(pixmap.dimensions()) {
        prism_bail!(SOURCE, UnsupportedCombination,
            "upload of {}x{} exceeds max texture size {}",
            pixmap.dimensions().x, pixmap.dimensions().y, caps.max_texture_size());
    }
    let color_type = pixmap.color_info().color_type;
    let Some(info) = caps.default_sampled_texture_info(color_type, mipmapped, false) else {
        prism_bail!(SOURCE, UnsupportedCombination, "no texture format for {:?}", color_type);
    };
    let backend_texture = backend.create_texture(pixmap.dimensions(), &info)?;
    if let Err(err) = backend.write_pixels(&backend_texture, pixmap) {
        backend.delete_texture(&backend_texture);
        return Err(err);
    }
    Ok(Arc::new(Texture::owned(backend_texture, Arc::clone(backend))))
}

impl Image {
    /// Fails unless `recorder` may sample this image
    ///
    /// Raster images are usable anywhere, promise images on any context of
    /// their backend, and everything else only on the context that made it.
    pub(crate) fn check_usable_by(&self, recorder: &Recorder) -> Result<()> {
        match self.source() {
            ImageSource::Raster(_) => Ok(()),
            ImageSource::Promise(registration) => {
                if registration.texture_info().backend() != recorder.backend_api() {
                    prism_bail!(SOURCE, UnsupportedCombination,
                        "{} promise image used with a {} recorder",
                        registration.texture_info().backend(), recorder.backend_api());
                }
                Ok(())
            }
            _ => {
                if self.context_id() != Some(recorder.context_id()) {
                    prism_bail!(SOURCE, ContextMismatch,
                        "{} belongs to {:?}, not {}", self.id(), self.context_id(), recorder.context_id());
                }
                Ok(())
            }
        }
    }

    /// Wrap a client texture
    ///
    /// `release_proc` runs once the image and every submission that sampled
    /// the texture are gone, or right away if the texture is rejected.
    pub fn adopt_texture_from(
        recorder: &Recorder,
        backend_texture: &BackendTexture,
        color_type: ColorType,
        alpha_type: AlphaType,
        color_space: Option<ColorSpace>,
        release_proc: Option<TextureReleaseProc>,
    ) -> Result<Image> {
        let checked = Self::check_adopted(recorder, backend_texture, color_type, alpha_type, color_space);
        let color_info = match checked {
            Ok(color_info) => color_info,
            Err(err) => {
                if let Some(release) = release_proc {
                    release();
                }
                return Err(err);
            }
        };
        let texture = Arc::new(Texture::wrapped(backend_texture.clone(), release_proc));
        Ok(Image::from_source(
            backend_texture.dimensions(),
            color_info,
            Some(recorder.context_id()),
            ImageSource::Texture(texture),
        ))
    }

    fn check_adopted(
        recorder: &Recorder,
        backend_texture: &BackendTexture,
        color_type: ColorType,
        alpha_type: AlphaType,
        color_space: Option<ColorSpace>,
    ) -> Result<ColorInfo> {
        check_client_texture_info(recorder.caps(), backend_texture.info(), backend_texture.dimensions(), color_type)?;
        if !backend_texture.is_valid() {
            prism_bail!(SOURCE, InvalidArgument, "backend texture has no usable native handle");
        }
        ColorInfo::validated(color_type, alpha_type, color_space).ok_or_else(|| {
            prism_err!(SOURCE, UnsupportedCombination, "invalid color/alpha type {:?}/{:?}", color_type, alpha_type)
        })
    }

    /// Declare an image whose texture is supplied later by `callbacks`
    ///
    /// The image is not tied to a context: any context of the same backend
    /// may draw it and fulfills once for itself. No callback runs here unless
    /// the declaration is rejected, in which case `release_image` runs before
    /// the error is returned.
    pub fn promise_texture_from<C: PromiseImageCallbacks>(
        caps: &Caps,
        dimensions: UVec2,
        texture_info: &TextureInfo,
        color_info: ColorInfo,
        volatile: Volatile,
        callbacks: C,
    ) -> Result<Image> {
        let checked = check_client_texture_info(caps, texture_info, dimensions, color_info.color_type)
            .and_then(|()| {
                ColorInfo::validated(color_info.color_type, color_info.alpha_type, color_info.color_space)
                    .ok_or_else(|| prism_err!(SOURCE, UnsupportedCombination, "invalid color info {:?}", color_info))
            });
        let color_info = match checked {
            Ok(color_info) => color_info,
            Err(err) => {
                callbacks.release_image();
                return Err(err);
            }
        };
        let registration = PromiseImageRegistration::new(dimensions, texture_info.clone(), color_info, volatile, callbacks);
        Ok(Image::from_source(dimensions, color_info, None, ImageSource::Promise(registration)))
    }

    /// Wrap one client texture per YUVA plane
    ///
    /// `release_proc` runs once, after every plane is released.
    pub fn texture_from_yuva_textures(
        recorder: &Recorder,
        textures: &YuvaBackendTextures,
        color_space: Option<ColorSpace>,
        release_proc: Option<TextureReleaseProc>,
    ) -> Result<Image> {
        let checked = textures.planes().iter().enumerate().try_for_each(|(index, plane)| {
            let color_type = if textures.info().plane_channel_count(index) == 2 {
                ColorType::Rg88
            } else {
                ColorType::Gray8
            };
            check_client_texture_info(recorder.caps(), plane.info(), plane.dimensions(), color_type)
        });
        if let Err(err) = checked {
            if let Some(release) = release_proc {
                release();
            }
            return Err(err);
        }

        let shared = Arc::new(SharedRelease(Mutex::new(release_proc)));
        let planes = textures
            .planes()
            .iter()
            .map(|plane| {
                let shared = Arc::clone(&shared);
                let release: TextureReleaseProc = Box::new(move || drop(shared));
                Arc::new(Texture::wrapped(plane.clone(), Some(release)))
            })
            .collect();
        let alpha_type = if textures.info().has_alpha() { AlphaType::Premul } else { AlphaType::Opaque };
        Ok(Image::from_source(
            textures.info().dimensions(),
            ColorInfo::new(ColorType::Rgba8888, alpha_type, color_space),
            Some(recorder.context_id()),
            ImageSource::Yuva { info: *textures.info(), planes },
        ))
    }

    /// Upload each YUVA plane into a new texture
    ///
    /// With `limit_to_max_texture_size`, planes larger than the backend allows
    /// are downscaled (nearest neighbor, aspect preserved) before upload.
    pub fn texture_from_yuva_pixmaps(
        recorder: &Recorder,
        pixmaps: &YuvaPixmaps,
        props: RequiredProperties,
        limit_to_max_texture_size: bool,
        color_space: Option<ColorSpace>,
    ) -> Result<Image> {
        let max = recorder.caps().max_texture_size();
        let info = pixmaps.info();
        let needs_scale = info.dimensions().x > max || info.dimensions().y > max;
        if needs_scale && !limit_to_max_texture_size {
            prism_bail!(SOURCE, UnsupportedCombination,
                "YUVA image {}x{} exceeds max texture size {}", info.dimensions().x, info.dimensions().y, max);
        }

        // Planes uploaded so far are deleted again if a later plane fails
        let mut planes = Vec::with_capacity(pixmaps.planes().len());
        for plane in pixmaps.planes() {
            let texture = if needs_scale {
                let scale = max as f64 / info.dimensions().x.max(info.dimensions().y) as f64;
                let scaled = UVec2::new(
                    ((plane.dimensions().x as f64 * scale).floor() as u32).max(1),
                    ((plane.dimensions().y as f64 * scale).floor() as u32).max(1),
                );
                upload_pixmap(recorder, &plane.scale_nearest(scaled)?, props.mipmapped)?
            } else {
                upload_pixmap(recorder, plane, props.mipmapped)?
            };
            planes.push(texture);
        }

        let dimensions = planes.first().map_or(info.dimensions(), |luma| luma.dimensions());
        let alpha_type = if info.has_alpha() { AlphaType::Premul } else { AlphaType::Opaque };
        prism_debug!(SOURCE, "uploaded {} YUVA planes ({}x{})", planes.len(), dimensions.x, dimensions.y);
        Ok(Image::from_source(
            dimensions,
            ColorInfo::new(ColorType::Rgba8888, alpha_type, color_space),
            Some(recorder.context_id()),
            ImageSource::Yuva { info: *info, planes },
        ))
    }

    /// Texture-backed version of `image` for `recorder`'s context
    ///
    /// Images the recorder can already sample are returned as is when they
    /// meet `props`; raster images are uploaded.
    pub fn texture_from_image(recorder: &Recorder, image: &Image, props: RequiredProperties) -> Result<Image> {
        match image.source() {
            ImageSource::Raster(pixmap) => {
                let texture = upload_pixmap(recorder, pixmap, props.mipmapped)?;
                Ok(Image::from_source(
                    image.dimensions(),
                    image.color_info(),
                    Some(recorder.context_id()),
                    ImageSource::Texture(texture),
                ))
            }
            _ => {
                image.check_usable_by(recorder)?;
                if props.mipmapped && !image.is_mipmapped() {
                    prism_bail!(SOURCE, UnsupportedCombination, "{} has no mip levels", image.id());
                }
                Ok(image.clone())
            }
        }
    }

    /// New texture-backed image holding the `subset` of `image`
    pub fn subset_texture_from(
        recorder: &Recorder,
        image: &Image,
        subset: IRect,
        props: RequiredProperties,
    ) -> Result<Image> {
        if subset.is_empty() {
            prism_bail!(SOURCE, InvalidArgument, "empty subset {:?}", subset);
        }
        if !image.bounds().contains(&subset) {
            prism_bail!(SOURCE, InvalidArgument, "subset {:?} outside {:?}", subset, image.bounds());
        }
        image.check_usable_by(recorder)?;
        if subset == image.bounds() {
            return Self::texture_from_image(recorder, image, props);
        }

        let pixels = match image.source() {
            ImageSource::Raster(pixmap) => pixmap.extract_subset(subset).ok_or_else(|| {
                prism_err!(SOURCE, ReadbackFailed, "could not extract {:?}", subset)
            })?,
            ImageSource::Texture(texture) => recorder
                .backend()
                .read_pixels(texture.backend_texture(), subset, image.color_info())
                .map_err(|err| prism_err!(SOURCE, ReadbackFailed, "{}", err))?,
            ImageSource::Promise(_) => {
                prism_bail!(SOURCE, ReadbackFailed, "promise image {} has no texture to read", image.id());
            }
            ImageSource::Yuva { .. } => {
                prism_bail!(SOURCE, ReadbackFailed, "planar image {} cannot be read back", image.id());
            }
        };
        let texture = upload_pixmap(recorder, &pixels, props.mipmapped)?;
        Ok(Image::from_source(
            subset.size(),
            image.color_info(),
            Some(recorder.context_id()),
            ImageSource::Texture(texture),
        ))
    }

    /// CPU image, uploaded when retextured or drawn
    pub fn raster_from_pixmap(pixmap: Pixmap) -> Result<Image> {
        let Some(color_info) = ColorInfo::validated(
            pixmap.color_info().color_type,
            pixmap.color_info().alpha_type,
            pixmap.color_info().color_space,
        ) else {
            prism_bail!(SOURCE, InvalidArgument, "pixmap has invalid color info");
        };
        Ok(Image::from_source(pixmap.dimensions(), color_info, None, ImageSource::Raster(pixmap)))
    }
}

#[cfg(test)]
#[path = "image_factories_tests.rs"]
mod tests;
