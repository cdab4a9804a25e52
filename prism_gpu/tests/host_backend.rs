#![allow(dead_code)]
//! Host-memory backend shared by the integration tests
//!
//! Implements `Backend` and `NativeDescriptorPool` through the public API
//! only. Textures live in host memory and submissions complete when the test
//! calls `complete_all` (or when a context waits on them).

use prism_gpu::glam::UVec2;
use prism_gpu::prism::backend::{Backend, BackendApi, SubmissionToken};
use prism_gpu::prism::descriptor::{DescriptorPoolDesc, DescriptorSetLayoutDesc, NativeDescriptorPool, NativeDescriptorSet};
use prism_gpu::prism::image::{AlphaType, ColorInfo, ColorType, IRect, Pixmap};
use prism_gpu::prism::texture::{BackendTexture, NativeTextureHandle, TextureInfo};
use prism_gpu::prism::{Caps, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Counters of native calls
#[derive(Debug, Default)]
pub struct HostStats {
    pub pools_destroyed: AtomicUsize,
    pub sets_live: AtomicUsize,
    pub textures_live: AtomicUsize,
}

impl HostStats {
    pub fn pools_destroyed(&self) -> usize {
        self.pools_destroyed.load(Ordering::SeqCst)
    }

    pub fn sets_live(&self) -> usize {
        self.sets_live.load(Ordering::SeqCst)
    }

    pub fn textures_live(&self) -> usize {
        self.textures_live.load(Ordering::SeqCst)
    }
}

// ============================================================================
// DESCRIPTOR POOL
// ============================================================================

pub struct HostDescriptorPool {
    capacity: usize,
    next_set: AtomicU64,
    stats: Arc<HostStats>,
    live: AtomicUsize,
}

impl NativeDescriptorPool for HostDescriptorPool {
    fn allocate_set(&self, _layout: &DescriptorSetLayoutDesc) -> Result<NativeDescriptorSet> {
        if self.live.load(Ordering::SeqCst) >= self.capacity {
            return Err(Error::AllocationFailure("host pool exhausted".to_string()));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        self.stats.sets_live.fetch_add(1, Ordering::SeqCst);
        Ok(NativeDescriptorSet(self.next_set.fetch_add(1, Ordering::SeqCst)))
    }

    fn release_set(&self, _set: NativeDescriptorSet) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.stats.sets_live.fetch_sub(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        assert_eq!(self.live.load(Ordering::SeqCst), 0);
        self.stats.pools_destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// BACKEND
// ============================================================================

pub struct HostBackend {
    caps: Caps,
    pub stats: Arc<HostStats>,
    textures: Mutex<HashMap<u64, Pixmap>>,
    next_texture: AtomicU64,
    submitted: AtomicU64,
    completed: AtomicU64,
}

impl HostBackend {
    pub fn new() -> Self {
        Self {
            caps: Caps::new(BackendApi::Mock, 2048),
            stats: Arc::new(HostStats::default()),
            textures: Mutex::new(HashMap::new()),
            next_texture: AtomicU64::new(1),
            submitted: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Let the "GPU" catch up with every submission
    pub fn complete_all(&self) {
        self.completed.store(self.submitted.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    /// Handle for a texture owned by the client, not by this backend
    pub fn client_texture(&self, dimensions: UVec2, info: TextureInfo) -> BackendTexture {
        let raw = 1 << 32 | self.next_texture.fetch_add(1, Ordering::SeqCst);
        BackendTexture::new(dimensions, info, NativeTextureHandle::Mock(raw))
    }

    fn key(texture: &BackendTexture) -> Result<u64> {
        match texture.handle() {
            Some(NativeTextureHandle::Mock(raw)) => Ok(raw),
            other => Err(Error::BackendError(format!("foreign handle {:?}", other))),
        }
    }
}

impl Backend for HostBackend {
    fn api(&self) -> BackendApi {
        BackendApi::Mock
    }

    fn caps(&self) -> &Caps {
        &self.caps
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn NativeDescriptorPool>> {
        Ok(Box::new(HostDescriptorPool {
            capacity: desc.max_sets as usize,
            next_set: AtomicU64::new(1),
            stats: self.stats.clone(),
            live: AtomicUsize::new(0),
        }))
    }

    fn create_texture(&self, dimensions: UVec2, info: &TextureInfo) -> Result<BackendTexture> {
        let color_type = match info.texture_format().map(|format| format.bytes_per_pixel()) {
            Some(1) => ColorType::Gray8,
            Some(2) => ColorType::Rg88,
            Some(4) => ColorType::Rgba8888,
            _ => return Err(Error::UnsupportedCombination(format!("{:?}", info))),
        };
        let storage = Pixmap::alloc(dimensions, ColorInfo::new(color_type, AlphaType::Premul, None))?;
        let raw = self.next_texture.fetch_add(1, Ordering::SeqCst);
        self.textures.lock().unwrap().insert(raw, storage);
        self.stats.textures_live.fetch_add(1, Ordering::SeqCst);
        Ok(BackendTexture::new(dimensions, info.clone(), NativeTextureHandle::Mock(raw)))
    }

    fn delete_texture(&self, texture: &BackendTexture) {
        if let Ok(key) = Self::key(texture) {
            if self.textures.lock().unwrap().remove(&key).is_some() {
                self.stats.textures_live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    fn write_pixels(&self, texture: &BackendTexture, pixmap: &Pixmap) -> Result<()> {
        let key = Self::key(texture)?;
        match self.textures.lock().unwrap().get_mut(&key) {
            Some(storage) => {
                *storage = pixmap.clone();
                Ok(())
            }
            None => Err(Error::BackendError("unknown texture".to_string())),
        }
    }

    fn read_pixels(&self, texture: &BackendTexture, rect: IRect, color_info: ColorInfo) -> Result<Pixmap> {
        let key = Self::key(texture)?;
        let textures = self.textures.lock().unwrap();
        let subset = textures
            .get(&key)
            .and_then(|storage| storage.extract_subset(rect))
            .ok_or_else(|| Error::ReadbackFailed(format!("{:?}", rect)))?;
        Pixmap::new(subset.dimensions(), color_info, subset.pixels().to_vec())
    }

    fn submit(&self) -> Result<SubmissionToken> {
        Ok(SubmissionToken(self.submitted.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn is_finished(&self, token: SubmissionToken) -> bool {
        token.0 <= self.completed.load(Ordering::SeqCst)
    }

    fn wait(&self, token: SubmissionToken) -> Result<()> {
        self.completed.fetch_max(token.0, Ordering::SeqCst);
        Ok(())
    }
}
