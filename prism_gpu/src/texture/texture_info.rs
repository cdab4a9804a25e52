/// Backend-polymorphic texture descriptor
///
/// A `TextureInfo` names the backend it describes and, when valid, carries the
/// shared structural properties (sample count, mipmapping, protection) and
/// exactly one backend spec. The spec arm is always derived from the spec
/// value itself, so a payload can never disagree with the backend tag.
///
/// Invalid descriptors carry no payload. All invalid descriptors compare equal,
/// whatever backend they were tagged with.

use crate::backend::BackendApi;
use crate::texture::dawn::DawnTextureSpec;
use crate::texture::format::TextureFormat;
use crate::texture::mock::MockTextureSpec;
use crate::texture::mtl::MtlTextureSpec;
use crate::texture::vulkan::VulkanTextureSpec;

/// Shared structural properties plus one backend's spec
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendTextureInfo<S> {
    pub sample_count: u32,
    pub mipmapped: bool,
    pub protected: bool,
    pub spec: S,
}

pub type DawnTextureInfo = BackendTextureInfo<DawnTextureSpec>;
pub type MtlTextureInfo = BackendTextureInfo<MtlTextureSpec>;
pub type VulkanTextureInfo = BackendTextureInfo<VulkanTextureSpec>;
pub type MockTextureInfo = BackendTextureInfo<MockTextureSpec>;

impl<S> BackendTextureInfo<S> {
    /// Single-sampled, non-mipmapped, unprotected
    pub fn new(spec: S) -> Self {
        Self { sample_count: 1, mipmapped: false, protected: false, spec }
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_mipmapped(mut self, mipmapped: bool) -> Self {
        self.mipmapped = mipmapped;
        self
    }

    pub fn with_protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }
}

/// One arm per backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendTextureSpec {
    Dawn(DawnTextureSpec),
    Metal(MtlTextureSpec),
    Vulkan(VulkanTextureSpec),
    Mock(MockTextureSpec),
}

impl BackendTextureSpec {
    pub fn backend(&self) -> BackendApi {
        match self {
            BackendTextureSpec::Dawn(_) => BackendApi::Dawn,
            BackendTextureSpec::Metal(_) => BackendApi::Metal,
            BackendTextureSpec::Vulkan(_) => BackendApi::Vulkan,
            BackendTextureSpec::Mock(_) => BackendApi::Mock,
        }
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        match self {
            BackendTextureSpec::Dawn(spec) => spec.texture_format(),
            BackendTextureSpec::Metal(spec) => spec.texture_format(),
            BackendTextureSpec::Vulkan(spec) => spec.texture_format(),
            BackendTextureSpec::Mock(spec) => spec.texture_format(),
        }
    }

    /// Default sampled-texture spec of `format` for `backend`
    pub fn sampled(backend: BackendApi, format: TextureFormat) -> Self {
        match backend {
            BackendApi::Dawn => BackendTextureSpec::Dawn(DawnTextureSpec::sampled(format)),
            BackendApi::Metal => BackendTextureSpec::Metal(MtlTextureSpec::sampled(format)),
            BackendApi::Vulkan => BackendTextureSpec::Vulkan(VulkanTextureSpec::sampled(format)),
            BackendApi::Mock => BackendTextureSpec::Mock(MockTextureSpec::sampled(format)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Payload {
    sample_count: u32,
    mipmapped: bool,
    protected: bool,
    spec: BackendTextureSpec,
}

/// Backend texture descriptor
#[derive(Debug)]
pub struct TextureInfo {
    backend: BackendApi,
    payload: Option<Payload>,
}

impl TextureInfo {
    /// Invalid descriptor tagged with `backend`
    pub fn invalid(backend: BackendApi) -> Self {
        Self { backend, payload: None }
    }

    /// Build from shared properties and a spec; a sample count of 0 yields an
    /// invalid descriptor
    pub fn new(sample_count: u32, mipmapped: bool, protected: bool, spec: BackendTextureSpec) -> Self {
        let backend = spec.backend();
        if sample_count == 0 {
            return Self::invalid(backend);
        }
        Self {
            backend,
            payload: Some(Payload { sample_count, mipmapped, protected, spec }),
        }
    }

    pub fn from_dawn(info: DawnTextureInfo) -> Self {
        Self::new(info.sample_count, info.mipmapped, info.protected, BackendTextureSpec::Dawn(info.spec))
    }

    pub fn from_metal(info: MtlTextureInfo) -> Self {
        Self::new(info.sample_count, info.mipmapped, info.protected, BackendTextureSpec::Metal(info.spec))
    }

    pub fn from_vulkan(info: VulkanTextureInfo) -> Self {
        Self::new(info.sample_count, info.mipmapped, info.protected, BackendTextureSpec::Vulkan(info.spec))
    }

    pub fn from_mock(info: MockTextureInfo) -> Self {
        Self::new(info.sample_count, info.mipmapped, info.protected, BackendTextureSpec::Mock(info.spec))
    }

    pub fn backend(&self) -> BackendApi {
        self.backend
    }

    pub fn is_valid(&self) -> bool {
        self.payload.is_some()
    }

    /// Sample count, 1 for invalid descriptors
    pub fn sample_count(&self) -> u32 {
        self.payload.as_ref().map_or(1, |p| p.sample_count)
    }

    pub fn mipmapped(&self) -> bool {
        self.payload.as_ref().is_some_and(|p| p.mipmapped)
    }

    pub fn is_protected(&self) -> bool {
        self.payload.as_ref().is_some_and(|p| p.protected)
    }

    pub fn spec(&self) -> Option<&BackendTextureSpec> {
        self.payload.as_ref().map(|p| &p.spec)
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        self.spec().and_then(BackendTextureSpec::texture_format)
    }

    /// Same descriptor with mipmapping toggled (invalid stays invalid)
    pub fn with_mipmapped(&self, mipmapped: bool) -> Self {
        let mut info = self.clone();
        if let Some(payload) = info.payload.as_mut() {
            payload.mipmapped = mipmapped;
        }
        info
    }

    /// Both valid and describing the same texture apart from mipmapping
    pub fn is_compatible(&self, other: &TextureInfo) -> bool {
        match (&self.payload, &other.payload) {
            (Some(a), Some(b)) => {
                self.backend == other.backend
                    && a.sample_count == b.sample_count
                    && a.protected == b.protected
                    && a.spec == b.spec
            }
            _ => false,
        }
    }

    pub fn dawn_spec(&self) -> Option<&DawnTextureSpec> {
        match self.spec() {
            Some(BackendTextureSpec::Dawn(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn mtl_spec(&self) -> Option<&MtlTextureSpec> {
        match self.spec() {
            Some(BackendTextureSpec::Metal(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn vulkan_spec(&self) -> Option<&VulkanTextureSpec> {
        match self.spec() {
            Some(BackendTextureSpec::Vulkan(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn mock_spec(&self) -> Option<&MockTextureSpec> {
        match self.spec() {
            Some(BackendTextureSpec::Mock(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Full Dawn description, `None` unless valid and tagged Dawn
    pub fn dawn_texture_info(&self) -> Option<DawnTextureInfo> {
        self.dawn_spec().map(|spec| self.expand(spec.clone()))
    }

    pub fn mtl_texture_info(&self) -> Option<MtlTextureInfo> {
        self.mtl_spec().map(|spec| self.expand(spec.clone()))
    }

    pub fn vulkan_texture_info(&self) -> Option<VulkanTextureInfo> {
        self.vulkan_spec().map(|spec| self.expand(spec.clone()))
    }

    pub fn mock_texture_info(&self) -> Option<MockTextureInfo> {
        self.mock_spec().map(|spec| self.expand(spec.clone()))
    }

    fn expand<S>(&self, spec: S) -> BackendTextureInfo<S> {
        BackendTextureInfo {
            sample_count: self.sample_count(),
            mipmapped: self.mipmapped(),
            protected: self.is_protected(),
            spec,
        }
    }
}

impl Default for TextureInfo {
    fn default() -> Self {
        Self::invalid(BackendApi::Mock)
    }
}

impl Clone for TextureInfo {
    fn clone(&self) -> Self {
        Self { backend: self.backend, payload: self.payload.clone() }
    }

    /// Assignment: an invalid source leaves the target invalid without
    /// copying the tag or any payload
    fn clone_from(&mut self, source: &Self) {
        if !source.is_valid() {
            self.payload = None;
            return;
        }
        self.backend = source.backend;
        self.payload.clone_from(&source.payload);
    }
}

impl PartialEq for TextureInfo {
    fn eq(&self, other: &Self) -> bool {
        match (&self.payload, &other.payload) {
            (None, None) => true,
            (Some(a), Some(b)) => self.backend == other.backend && a == b,
            _ => false,
        }
    }
}

impl Eq for TextureInfo {}

impl From<DawnTextureInfo> for TextureInfo {
    fn from(info: DawnTextureInfo) -> Self {
        Self::from_dawn(info)
    }
}

impl From<MtlTextureInfo> for TextureInfo {
    fn from(info: MtlTextureInfo) -> Self {
        Self::from_metal(info)
    }
}

impl From<VulkanTextureInfo> for TextureInfo {
    fn from(info: VulkanTextureInfo) -> Self {
        Self::from_vulkan(info)
    }
}

impl From<MockTextureInfo> for TextureInfo {
    fn from(info: MockTextureInfo) -> Self {
        Self::from_mock(info)
    }
}

#[cfg(test)]
#[path = "texture_info_tests.rs"]
mod tests;
