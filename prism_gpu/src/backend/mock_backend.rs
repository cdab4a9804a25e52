/// Mock backend for unit tests
///
/// Keeps texture contents in memory, counts every native call, and lets tests
/// decide when submissions complete.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use glam::UVec2;
use rustc_hash::FxHashMap;
use crate::backend::{Backend, BackendApi, SubmissionToken};
use crate::caps::Caps;
use crate::descriptor::{DescriptorPoolDesc, DescriptorSetLayoutDesc, NativeDescriptorPool, NativeDescriptorSet};
use crate::error::Result;
use crate::image::color::ColorInfo;
use crate::image::geometry::IRect;
use crate::image::pixmap::Pixmap;
use crate::prism_bail;
use crate::promise::PromiseImageCallbacks;
use crate::texture::backend_texture::{BackendTexture, NativeTextureHandle};
use crate::texture::texture_info::TextureInfo;

// ============================================================================
// Mock statistics
// ============================================================================

#[derive(Debug, Default)]
pub struct MockStats {
    pub pools_created: AtomicUsize,
    pub pools_destroyed: AtomicUsize,
    pub sets_allocated: AtomicUsize,
    pub sets_released: AtomicUsize,
    pub textures_created: AtomicUsize,
    pub textures_deleted: AtomicUsize,
    pub submits: AtomicUsize,
}

impl MockStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock descriptor pool
// ============================================================================

pub struct MockDescriptorPool {
    capacity: u32,
    in_use: AtomicU32,
    next_handle: AtomicU64,
    destroyed: AtomicBool,
    stats: Arc<MockStats>,
}

impl MockDescriptorPool {
    pub fn new(capacity: u32, stats: Arc<MockStats>) -> Self {
        stats.pools_created.fetch_add(1, Ordering::SeqCst);
        Self {
            capacity,
            in_use: AtomicU32::new(0),
            next_handle: AtomicU64::new(1),
            destroyed: AtomicBool::new(false),
            stats,
        }
    }
}

impl NativeDescriptorPool for MockDescriptorPool {
    fn allocate_set(&self, _layout: &DescriptorSetLayoutDesc) -> Result<NativeDescriptorSet> {
        let claimed = self.in_use.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            (n < self.capacity).then_some(n + 1)
        });
        if claimed.is_err() {
            prism_bail!("prism::mock", AllocationFailure, "mock pool exhausted ({} sets)", self.capacity);
        }
        self.stats.sets_allocated.fetch_add(1, Ordering::SeqCst);
        Ok(NativeDescriptorSet(self.next_handle.fetch_add(1, Ordering::SeqCst)))
    }

    fn release_set(&self, _set: NativeDescriptorSet) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
        self.stats.sets_released.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        assert!(!self.destroyed.swap(true, Ordering::SeqCst), "mock pool destroyed twice");
        assert_eq!(self.in_use.load(Ordering::SeqCst), 0, "mock pool destroyed with live sets");
        self.stats.pools_destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock backend
// ============================================================================

pub struct MockBackend {
    caps: Caps,
    pub stats: Arc<MockStats>,
    /// Overrides `DescriptorPoolDesc::max_sets` for every pool created
    pub pool_capacity: Mutex<Option<u32>>,
    pub fail_pool_creation: AtomicBool,
    pub fail_readback: AtomicBool,
    pub fail_write: AtomicBool,
    pub fail_submit: AtomicBool,
    /// Complete every submission as soon as it is made
    pub auto_complete: AtomicBool,
    textures: Mutex<FxHashMap<u64, Pixmap>>,
    next_texture: AtomicU64,
    last_submitted: AtomicU64,
    last_completed: AtomicU64,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_caps(Caps::new(BackendApi::Mock, 4096))
    }

    pub fn with_caps(caps: Caps) -> Self {
        Self {
            caps,
            stats: Arc::new(MockStats::default()),
            pool_capacity: Mutex::new(None),
            fail_pool_creation: AtomicBool::new(false),
            fail_readback: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            fail_submit: AtomicBool::new(false),
            auto_complete: AtomicBool::new(false),
            textures: Mutex::new(FxHashMap::default()),
            next_texture: AtomicU64::new(1),
            last_submitted: AtomicU64::new(0),
            last_completed: AtomicU64::new(0),
        }
    }

    pub fn set_pool_capacity(&self, capacity: u32) {
        *self.pool_capacity.lock().unwrap() = Some(capacity);
    }

    /// Mark every submission made so far as finished on the "GPU"
    pub fn complete_all(&self) {
        self.last_completed.store(self.last_submitted.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    pub fn live_textures(&self) -> usize {
        self.textures.lock().unwrap().len()
    }

    /// Handle value for a texture not created by this backend
    pub fn external_handle(&self) -> NativeTextureHandle {
        NativeTextureHandle::Mock(1_000_000 + self.next_texture.fetch_add(1, Ordering::SeqCst))
    }

    fn handle_key(texture: &BackendTexture) -> Option<u64> {
        match texture.handle() {
            Some(NativeTextureHandle::Mock(raw)) => Some(raw),
            _ => None,
        }
    }
}

impl Backend for MockBackend {
    fn api(&self) -> BackendApi {
        BackendApi::Mock
    }

    fn caps(&self) -> &Caps {
        &self.caps
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn NativeDescriptorPool>> {
        if self.fail_pool_creation.load(Ordering::SeqCst) {
            prism_bail!("prism::mock", AllocationFailure, "pool creation disabled");
        }
        let capacity = self.pool_capacity.lock().unwrap().unwrap_or(desc.max_sets);
        Ok(Box::new(MockDescriptorPool::new(capacity, self.stats.clone())))
    }

    fn create_texture(&self, dimensions: UVec2, info: &TextureInfo) -> Result<BackendTexture> {
        let Some(format) = info.texture_format() else {
            prism_bail!("prism::mock", UnsupportedCombination, "no format for {:?}", info);
        };
        let color_type = match format.bytes_per_pixel() {
            1 => crate::image::color::ColorType::Gray8,
            2 => crate::image::color::ColorType::Rg88,
            8 => crate::image::color::ColorType::RgbaF16,
            _ => crate::image::color::ColorType::Rgba8888,
        };
        let storage = Pixmap::alloc(
            dimensions,
            ColorInfo::new(color_type, crate::image::color::AlphaType::Premul, None),
        )?;
        let raw = self.next_texture.fetch_add(1, Ordering::SeqCst);
        self.textures.lock().unwrap().insert(raw, storage);
        self.stats.textures_created.fetch_add(1, Ordering::SeqCst);
        Ok(BackendTexture::new(dimensions, info.clone(), NativeTextureHandle::Mock(raw)))
    }

    fn delete_texture(&self, texture: &BackendTexture) {
        if let Some(key) = Self::handle_key(texture) {
            if self.textures.lock().unwrap().remove(&key).is_some() {
                self.stats.textures_deleted.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn write_pixels(&self, texture: &BackendTexture, pixmap: &Pixmap) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            prism_bail!("prism::mock", BackendError, "write disabled");
        }
        let key = Self::handle_key(texture);
        let mut textures = self.textures.lock().unwrap();
        match key.and_then(|k| textures.get_mut(&k)) {
            Some(storage) => {
                *storage = pixmap.clone();
                Ok(())
            }
            None => prism_bail!("prism::mock", BackendError, "unknown texture {:?}", texture.handle()),
        }
    }

    fn read_pixels(&self, texture: &BackendTexture, rect: IRect, color_info: ColorInfo) -> Result<Pixmap> {
        if self.fail_readback.load(Ordering::SeqCst) {
            prism_bail!("prism::mock", ReadbackFailed, "readback disabled");
        }
        let key = Self::handle_key(texture);
        let textures = self.textures.lock().unwrap();
        let Some(storage) = key.and_then(|k| textures.get(&k)) else {
            prism_bail!("prism::mock", ReadbackFailed, "unknown texture {:?}", texture.handle());
        };
        let Some(subset) = storage.extract_subset(rect) else {
            prism_bail!("prism::mock", ReadbackFailed, "rect {:?} outside texture", rect);
        };
        Pixmap::new(subset.dimensions(), color_info, subset.pixels().to_vec())
    }

    fn submit(&self) -> Result<SubmissionToken> {
        if self.fail_submit.load(Ordering::SeqCst) {
            prism_bail!("prism::mock", BackendError, "submit disabled");
        }
        self.stats.submits.fetch_add(1, Ordering::SeqCst);
        let token = self.last_submitted.fetch_add(1, Ordering::SeqCst) + 1;
        if self.auto_complete.load(Ordering::SeqCst) {
            self.last_completed.fetch_max(token, Ordering::SeqCst);
        }
        Ok(SubmissionToken(token))
    }

    fn is_finished(&self, token: SubmissionToken) -> bool {
        token.0 <= self.last_completed.load(Ordering::SeqCst)
    }

    fn wait(&self, token: SubmissionToken) -> Result<()> {
        self.last_completed.fetch_max(token.0, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Mock promise callbacks
// ============================================================================

/// Counts every promise callback invocation
#[derive(Debug, Default)]
pub struct PromiseCounters {
    pub fulfills: AtomicUsize,
    pub image_releases: AtomicUsize,
    pub texture_releases: AtomicUsize,
}

impl PromiseCounters {
    pub fn fulfills(&self) -> usize {
        self.fulfills.load(Ordering::SeqCst)
    }

    pub fn image_releases(&self) -> usize {
        self.image_releases.load(Ordering::SeqCst)
    }

    pub fn texture_releases(&self) -> usize {
        self.texture_releases.load(Ordering::SeqCst)
    }
}

/// Fulfills with `texture`, or fails while `texture` is `None`
pub struct MockPromiseCallbacks {
    pub counters: Arc<PromiseCounters>,
    pub texture: Arc<Mutex<Option<BackendTexture>>>,
}

impl MockPromiseCallbacks {
    pub fn new(texture: Option<BackendTexture>) -> (Self, Arc<PromiseCounters>, Arc<Mutex<Option<BackendTexture>>>) {
        let counters = Arc::new(PromiseCounters::default());
        let texture = Arc::new(Mutex::new(texture));
        (Self { counters: counters.clone(), texture: texture.clone() }, counters, texture)
    }
}

impl PromiseImageCallbacks for MockPromiseCallbacks {
    type TextureReleaseContext = Arc<PromiseCounters>;

    fn fulfill(&mut self) -> Option<(BackendTexture, Arc<PromiseCounters>)> {
        self.counters.fulfills.fetch_add(1, Ordering::SeqCst);
        let texture = self.texture.lock().unwrap().clone()?;
        Some((texture, self.counters.clone()))
    }

    fn release_image(self) {
        self.counters.image_releases.fetch_add(1, Ordering::SeqCst);
    }

    fn release_texture(context: Arc<PromiseCounters>) {
        context.texture_releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Valid mock backend texture of `dimensions` sampling as RGBA8
pub fn mock_rgba_texture(backend: &MockBackend, dimensions: UVec2) -> BackendTexture {
    BackendTexture::new(dimensions, mock_rgba_info(), backend.external_handle())
}

pub fn mock_rgba_info() -> TextureInfo {
    use crate::texture::format::TextureFormat;
    use crate::texture::mock::MockTextureSpec;
    use crate::texture::texture_info::MockTextureInfo;
    TextureInfo::from_mock(MockTextureInfo::new(MockTextureSpec::sampled(TextureFormat::RGBA8Unorm)))
}
