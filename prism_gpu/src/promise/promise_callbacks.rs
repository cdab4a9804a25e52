/// Client side of the promise image protocol
///
/// A promise image is declared before its texture exists. Prism calls back
/// into the client at well defined points:
///
/// - `fulfill` when a recording that samples the image is inserted into a
///   context (once per context for non-volatile images, on every insertion
///   for volatile ones),
/// - `release_texture` once per successful `fulfill`, after the last GPU
///   submission that used the texture has finished,
/// - `release_image` exactly once, when no image or recording refers to the
///   registration any more. No `fulfill` can follow it.

use crate::texture::backend_texture::BackendTexture;
use crate::texture::texture::TextureReleaseProc;

/// Whether the promised content may change between insertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Volatile {
    /// Fulfilled once per context and reused
    No,
    /// Fulfilled on every insertion
    Yes,
}

pub trait PromiseImageCallbacks: Send + 'static {
    /// Per-fulfill context handed back to `release_texture`
    type TextureReleaseContext: Send + 'static;

    /// Produce the backing texture, or `None` if it is not available
    ///
    /// Runs without the registration's state locked, so it may query the
    /// registration. It must not insert recordings that sample the image.
    fn fulfill(&mut self) -> Option<(BackendTexture, Self::TextureReleaseContext)>;

    /// Last callback of the registration
    fn release_image(self);

    /// The texture produced alongside `context` is no longer used by the GPU
    fn release_texture(context: Self::TextureReleaseContext);
}

/// Object-safe form stored by the registration
pub(crate) trait ErasedPromiseCallbacks: Send {
    fn fulfill(&mut self) -> Option<(BackendTexture, TextureReleaseProc)>;

    fn release_image(self: Box<Self>);
}

impl<C: PromiseImageCallbacks> ErasedPromiseCallbacks for C {
    fn fulfill(&mut self) -> Option<(BackendTexture, TextureReleaseProc)> {
        PromiseImageCallbacks::fulfill(self).map(|(texture, context)| {
            let release: TextureReleaseProc = Box::new(move || C::release_texture(context));
            (texture, release)
        })
    }

    fn release_image(self: Box<Self>) {
        PromiseImageCallbacks::release_image(*self)
    }
}
