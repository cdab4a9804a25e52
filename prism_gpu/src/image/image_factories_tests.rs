//! Unit tests for image_factories.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use glam::UVec2;
use crate::backend::mock_backend::{mock_rgba_info, mock_rgba_texture, MockBackend, MockPromiseCallbacks, MockStats};
use crate::backend::{Backend, BackendApi};
use crate::caps::Caps;
use crate::config::ContextOptions;
use crate::error::Error;
use crate::image::color::{AlphaType, ColorInfo, ColorType};
use crate::image::geometry::IRect;
use crate::image::pixmap::Pixmap;
use crate::image::yuva::{YuvColorSpace, YuvaBackendTextures, YuvaInfo, YuvaPixmaps, YuvaPlaneConfig, YuvaSubsampling};
use crate::image::{Image, RequiredProperties};
use crate::promise::Volatile;
use crate::recording::Context;
use crate::texture::backend_texture::BackendTexture;
use crate::texture::format::TextureFormat;
use crate::texture::mock::MockTextureSpec;
use crate::texture::texture::TextureReleaseProc;
use crate::texture::texture_info::{MockTextureInfo, TextureInfo, VulkanTextureInfo};
use crate::texture::vulkan::VulkanTextureSpec;

fn dims() -> UVec2 {
    UVec2::new(16, 16)
}

fn rgba() -> ColorInfo {
    ColorInfo::new(ColorType::Rgba8888, AlphaType::Premul, None)
}

fn setup() -> (Arc<MockBackend>, Context) {
    let backend = Arc::new(MockBackend::new());
    let context = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    (backend, context)
}

/// Release proc that counts its invocations
fn counted_release() -> (TextureReleaseProc, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let release: TextureReleaseProc = Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (release, count)
}

/// 4x4 RGBA pixmap whose bytes count up from 0
fn gradient() -> Pixmap {
    Pixmap::new(UVec2::new(4, 4), rgba(), (0..64).collect()).unwrap()
}

fn plane_texture(backend: &MockBackend, dimensions: UVec2, format: TextureFormat) -> BackendTexture {
    let info = TextureInfo::from_mock(MockTextureInfo::new(MockTextureSpec::sampled(format)));
    BackendTexture::new(dimensions, info, backend.external_handle())
}

fn nv12_info() -> YuvaInfo {
    YuvaInfo::new(dims(), YuvaPlaneConfig::SemiPlanar, YuvaSubsampling::S420, YuvColorSpace::Rec709).unwrap()
}

fn nv12_pixmaps(luma: UVec2, chroma: UVec2) -> Vec<Pixmap> {
    vec![
        Pixmap::alloc(luma, ColorInfo::new(ColorType::Gray8, AlphaType::Opaque, None)).unwrap(),
        Pixmap::alloc(chroma, ColorInfo::new(ColorType::Rg88, AlphaType::Opaque, None)).unwrap(),
    ]
}

// ============================================================================
// ADOPT TESTS
// ============================================================================

#[test]
fn test_adopt_texture() {
    let (backend, context) = setup();
    let recorder = context.make_recorder();
    let (release, released) = counted_release();

    let image = Image::adopt_texture_from(
        &recorder, &mock_rgba_texture(&backend, dims()), ColorType::Rgba8888, AlphaType::Premul, None, Some(release),
    )
    .unwrap();
    assert_eq!(image.dimensions(), dims());
    assert_eq!(image.context_id(), Some(context.id()));
    assert!(image.is_texture_backed());
    assert!(!image.texture().unwrap().is_owned());

    let copy = image.clone();
    drop(image);
    assert_eq!(released.load(Ordering::SeqCst), 0);
    drop(copy);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_adopt_normalizes_alpha_type() {
    let (backend, context) = setup();
    let texture = plane_texture(&backend, dims(), TextureFormat::R8Unorm);
    let image = Image::adopt_texture_from(
        &context.make_recorder(), &texture, ColorType::Gray8, AlphaType::Premul, None, None,
    )
    .unwrap();
    assert_eq!(image.alpha_type(), AlphaType::Opaque);
}

#[test]
fn test_adopt_invalid_descriptor_runs_release() {
    let (backend, context) = setup();
    let (release, released) = counted_release();
    let texture = BackendTexture::new(dims(), TextureInfo::invalid(BackendApi::Mock), backend.external_handle());

    let result = Image::adopt_texture_from(
        &context.make_recorder(), &texture, ColorType::Rgba8888, AlphaType::Premul, None, Some(release),
    );
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_adopt_rejects_incompatible_color_type() {
    let (backend, context) = setup();
    let result = Image::adopt_texture_from(
        &context.make_recorder(), &mock_rgba_texture(&backend, dims()), ColorType::Bgra8888, AlphaType::Premul, None, None,
    );
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
}

#[test]
fn test_adopt_rejects_other_backend() {
    let (_backend, context) = setup();
    let info = TextureInfo::from_vulkan(VulkanTextureInfo::new(VulkanTextureSpec::sampled(TextureFormat::RGBA8Unorm)));
    let texture = BackendTexture::new(
        dims(),
        info,
        crate::texture::backend_texture::NativeTextureHandle::Vulkan { image: 7, image_layout: 0, queue_family_index: 0 },
    );
    let result = Image::adopt_texture_from(
        &context.make_recorder(), &texture, ColorType::Rgba8888, AlphaType::Premul, None, None,
    );
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
}

#[test]
fn test_adopt_rejects_oversized_texture() {
    let backend = Arc::new(MockBackend::with_caps(Caps::new(BackendApi::Mock, 8)));
    let context = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    let result = Image::adopt_texture_from(
        &context.make_recorder(), &mock_rgba_texture(&backend, dims()), ColorType::Rgba8888, AlphaType::Premul, None, None,
    );
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
}

// ============================================================================
// PROMISE TESTS
// ============================================================================

#[test]
fn test_promise_runs_no_callback() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(mock_rgba_texture(&backend, dims())));
    let image = Image::promise_texture_from(backend.caps(), dims(), &mock_rgba_info(), rgba(), Volatile::No, callbacks)
        .unwrap();

    assert!(image.is_promise());
    assert_eq!(image.context_id(), None);
    assert_eq!(image.texture_info(), Some(&mock_rgba_info()));
    assert_eq!(counters.fulfills(), 0);
    assert_eq!(counters.image_releases(), 0);

    drop(image);
    assert_eq!(counters.image_releases(), 1);
}

#[test]
fn test_rejected_promise_releases_image() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(None);
    let zero = UVec2::new(0, 16);

    let result = Image::promise_texture_from(backend.caps(), zero, &mock_rgba_info(), rgba(), Volatile::No, callbacks);
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
    assert_eq!(counters.image_releases(), 1);
    assert_eq!(counters.fulfills(), 0);
}

#[test]
fn test_promise_with_unknown_color_type_rejected() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(None);
    let color_info = ColorInfo::new(ColorType::Unknown, AlphaType::Premul, None);

    let result = Image::promise_texture_from(backend.caps(), dims(), &mock_rgba_info(), color_info, Volatile::Yes, callbacks);
    assert!(result.is_err());
    assert_eq!(counters.image_releases(), 1);
}

#[test]
fn test_promise_usable_by_any_context() {
    let (backend, first) = setup();
    let second = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    let (callbacks, _counters, _) = MockPromiseCallbacks::new(None);
    let image = Image::promise_texture_from(backend.caps(), dims(), &mock_rgba_info(), rgba(), Volatile::No, callbacks)
        .unwrap();

    for context in [&first, &second] {
        let same = Image::texture_from_image(&context.make_recorder(), &image, RequiredProperties::default()).unwrap();
        assert_eq!(same.id(), image.id());
    }
}

// ============================================================================
// YUVA TESTS
// ============================================================================

#[test]
fn test_yuva_textures_release_once_after_all_planes() {
    let (backend, context) = setup();
    let (release, released) = counted_release();
    let textures = YuvaBackendTextures::new(nv12_info(), vec![
        plane_texture(&backend, dims(), TextureFormat::R8Unorm),
        plane_texture(&backend, UVec2::new(8, 8), TextureFormat::RG8Unorm),
    ])
    .unwrap();

    let image = Image::texture_from_yuva_textures(&context.make_recorder(), &textures, None, Some(release)).unwrap();
    assert!(image.is_yuva());
    assert_eq!(image.yuva_planes().unwrap().len(), 2);
    assert_eq!(image.alpha_type(), AlphaType::Opaque);

    let luma = Arc::clone(&image.yuva_planes().unwrap()[0]);
    drop(image);
    assert_eq!(released.load(Ordering::SeqCst), 0);
    drop(luma);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_yuva_textures_failure_runs_release() {
    let backend = Arc::new(MockBackend::with_caps(
        Caps::new(BackendApi::Mock, 4096).with_texturable_formats([TextureFormat::R8Unorm]),
    ));
    let context = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    let (release, released) = counted_release();
    let textures = YuvaBackendTextures::new(nv12_info(), vec![
        plane_texture(&backend, dims(), TextureFormat::R8Unorm),
        plane_texture(&backend, UVec2::new(8, 8), TextureFormat::RG8Unorm),
    ])
    .unwrap();

    let result = Image::texture_from_yuva_textures(&context.make_recorder(), &textures, None, Some(release));
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_yuva_pixmaps_upload_each_plane() {
    let (backend, context) = setup();
    let pixmaps = YuvaPixmaps::new(nv12_info(), nv12_pixmaps(dims(), UVec2::new(8, 8))).unwrap();

    let image = Image::texture_from_yuva_pixmaps(
        &context.make_recorder(), &pixmaps, RequiredProperties::default(), false, None,
    )
    .unwrap();
    assert_eq!(image.dimensions(), dims());
    assert_eq!(MockStats::get(&backend.stats.textures_created), 2);
    let planes = image.yuva_planes().unwrap();
    assert!(planes.iter().all(|plane| plane.is_owned()));
    assert_eq!(planes[1].dimensions(), UVec2::new(8, 8));

    drop(image);
    assert_eq!(backend.live_textures(), 0);
}

#[test]
fn test_yuva_pixmaps_downscale_to_max_texture_size() {
    let backend = Arc::new(MockBackend::with_caps(Caps::new(BackendApi::Mock, 8)));
    let context = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    let pixmaps = YuvaPixmaps::new(nv12_info(), nv12_pixmaps(dims(), UVec2::new(8, 8))).unwrap();
    let recorder = context.make_recorder();

    let refused = Image::texture_from_yuva_pixmaps(&recorder, &pixmaps, RequiredProperties::default(), false, None);
    assert!(matches!(refused, Err(Error::UnsupportedCombination(_))));
    assert_eq!(MockStats::get(&backend.stats.textures_created), 0);

    let image = Image::texture_from_yuva_pixmaps(&recorder, &pixmaps, RequiredProperties::default(), true, None)
        .unwrap();
    assert_eq!(image.dimensions(), UVec2::new(8, 8));
    assert_eq!(image.yuva_planes().unwrap()[1].dimensions(), UVec2::new(4, 4));
}

#[test]
fn test_yuva_pixmaps_failed_upload_leaves_nothing() {
    let (backend, context) = setup();
    backend.fail_write.store(true, Ordering::SeqCst);
    let pixmaps = YuvaPixmaps::new(nv12_info(), nv12_pixmaps(dims(), UVec2::new(8, 8))).unwrap();

    let result = Image::texture_from_yuva_pixmaps(
        &context.make_recorder(), &pixmaps, RequiredProperties::default(), false, None,
    );
    assert!(result.is_err());
    assert_eq!(backend.live_textures(), 0);
}

// ============================================================================
// RETEXTURE TESTS
// ============================================================================

#[test]
fn test_raster_image() {
    let image = Image::raster_from_pixmap(gradient()).unwrap();
    assert!(!image.is_texture_backed());
    assert_eq!(image.context_id(), None);
    assert_eq!(image.pixmap().unwrap().pixels()[5], 5);
}

#[test]
fn test_texture_from_raster_uploads() {
    let (backend, context) = setup();
    let raster = Image::raster_from_pixmap(gradient()).unwrap();

    let image = Image::texture_from_image(&context.make_recorder(), &raster, RequiredProperties::default()).unwrap();
    assert_eq!(image.context_id(), Some(context.id()));
    let texture = image.texture().unwrap();
    assert!(texture.is_owned());

    let read = backend.read_pixels(texture.backend_texture(), IRect::from_size(UVec2::new(4, 4)), rgba()).unwrap();
    assert_eq!(read.pixels(), gradient().pixels());

    drop(image);
    assert_eq!(MockStats::get(&backend.stats.textures_deleted), 1);
}

#[test]
fn test_texture_from_image_other_context() {
    let (backend, first) = setup();
    let second = Context::new(backend.clone(), ContextOptions::default()).unwrap();
    let image = Image::adopt_texture_from(
        &first.make_recorder(), &mock_rgba_texture(&backend, dims()), ColorType::Rgba8888, AlphaType::Premul, None, None,
    )
    .unwrap();

    let same = Image::texture_from_image(&first.make_recorder(), &image, RequiredProperties::default()).unwrap();
    assert_eq!(same.id(), image.id());

    let result = Image::texture_from_image(&second.make_recorder(), &image, RequiredProperties::default());
    assert!(matches!(result, Err(Error::ContextMismatch(_))));
}

#[test]
fn test_texture_from_image_requires_mipmaps() {
    let (backend, context) = setup();
    let image = Image::adopt_texture_from(
        &context.make_recorder(), &mock_rgba_texture(&backend, dims()), ColorType::Rgba8888, AlphaType::Premul, None, None,
    )
    .unwrap();

    let props = RequiredProperties { mipmapped: true };
    let result = Image::texture_from_image(&context.make_recorder(), &image, props);
    assert!(matches!(result, Err(Error::UnsupportedCombination(_))));
}

// ============================================================================
// SUBSET TESTS
// ============================================================================

#[test]
fn test_subset_rejects_degenerate_rects() {
    let (_backend, context) = setup();
    let recorder = context.make_recorder();
    let raster = Image::raster_from_pixmap(gradient()).unwrap();
    let props = RequiredProperties::default();

    let empty = Image::subset_texture_from(&recorder, &raster, IRect::from_xywh(1, 1, 0, 2), props);
    assert!(matches!(empty, Err(Error::InvalidArgument(_))));
    let outside = Image::subset_texture_from(&recorder, &raster, IRect::from_xywh(2, 2, 4, 4), props);
    assert!(matches!(outside, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_subset_of_raster() {
    let (_backend, context) = setup();
    let raster = Image::raster_from_pixmap(gradient()).unwrap();

    let subset = Image::subset_texture_from(
        &context.make_recorder(), &raster, IRect::from_xywh(1, 1, 2, 2), RequiredProperties::default(),
    )
    .unwrap();
    assert_eq!(subset.dimensions(), UVec2::new(2, 2));
    assert!(subset.texture().is_some());
}

#[test]
fn test_subset_of_texture_reads_back() {
    let (backend, context) = setup();
    let recorder = context.make_recorder();
    let raster = Image::raster_from_pixmap(gradient()).unwrap();
    let image = Image::texture_from_image(&recorder, &raster, RequiredProperties::default()).unwrap();

    let subset = Image::subset_texture_from(&recorder, &image, IRect::from_xywh(2, 0, 2, 1), RequiredProperties::default())
        .unwrap();
    let texture = subset.texture().unwrap();
    let read = backend.read_pixels(texture.backend_texture(), IRect::from_size(UVec2::new(2, 1)), rgba()).unwrap();
    assert_eq!(read.pixels(), (8..16).collect::<Vec<u8>>().as_slice());
}

#[test]
fn test_subset_readback_failure() {
    let (backend, context) = setup();
    let recorder = context.make_recorder();
    let raster = Image::raster_from_pixmap(gradient()).unwrap();
    let image = Image::texture_from_image(&recorder, &raster, RequiredProperties::default()).unwrap();
    let created = MockStats::get(&backend.stats.textures_created);

    backend.fail_readback.store(true, Ordering::SeqCst);
    let result = Image::subset_texture_from(&recorder, &image, IRect::from_xywh(0, 0, 2, 2), RequiredProperties::default());
    assert!(matches!(result, Err(Error::ReadbackFailed(_))));
    assert_eq!(MockStats::get(&backend.stats.textures_created), created);
}

#[test]
fn test_subset_of_promise_fails() {
    let (backend, context) = setup();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(None);
    let image = Image::promise_texture_from(backend.caps(), dims(), &mock_rgba_info(), rgba(), Volatile::No, callbacks)
        .unwrap();

    let result = Image::subset_texture_from(
        &context.make_recorder(), &image, IRect::from_xywh(0, 0, 4, 4), RequiredProperties::default(),
    );
    assert!(matches!(result, Err(Error::ReadbackFailed(_))));
    assert_eq!(counters.fulfills(), 0);
}

#[test]
fn test_full_subset_is_retexture() {
    let (backend, context) = setup();
    let image = Image::adopt_texture_from(
        &context.make_recorder(), &mock_rgba_texture(&backend, dims()), ColorType::Rgba8888, AlphaType::Premul, None, None,
    )
    .unwrap();

    let subset = Image::subset_texture_from(&context.make_recorder(), &image, image.bounds(), RequiredProperties::default())
        .unwrap();
    assert_eq!(subset.id(), image.id());
}
