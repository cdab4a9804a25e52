//! Unit tests for promise_image.rs
//!
//! Drives registrations directly (without a Context) to check callback
//! cardinalities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use glam::UVec2;
use crate::backend::mock_backend::{mock_rgba_info, mock_rgba_texture, MockBackend, MockPromiseCallbacks};
use crate::backend::Backend;
use crate::error::Error;
use crate::image::color::{AlphaType, ColorInfo, ColorType};
use crate::promise::{PromiseImageCallbacks, PromiseImageRegistration, PromiseState, Volatile};
use crate::texture::backend_texture::BackendTexture;
use crate::utils::ContextId;

fn rgba() -> ColorInfo {
    ColorInfo::new(ColorType::Rgba8888, AlphaType::Premul, None)
}

fn dims() -> UVec2 {
    UVec2::new(16, 16)
}

// ============================================================================
// LIFETIME TESTS
// ============================================================================

#[test]
fn test_never_used_registration_only_releases_image() {
    let (callbacks, counters, _) = MockPromiseCallbacks::new(None);
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    assert_eq!(registration.state(), PromiseState::Registered);

    drop(registration);
    assert_eq!(counters.fulfills(), 0);
    assert_eq!(counters.texture_releases(), 0);
    assert_eq!(counters.image_releases(), 1);
}

#[test]
fn test_image_release_waits_for_last_holder() {
    let (callbacks, counters, _) = MockPromiseCallbacks::new(None);
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    let holder = Arc::clone(&registration);

    drop(registration);
    assert_eq!(counters.image_releases(), 0);
    drop(holder);
    assert_eq!(counters.image_releases(), 1);
}

// ============================================================================
// FULFILL TESTS
// ============================================================================

#[test]
fn test_non_volatile_fulfills_once_per_context() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(mock_rgba_texture(&backend, dims())));
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    let (ctx_a, ctx_b) = (ContextId::next(), ContextId::next());

    let first = registration.instantiate(ctx_a, backend.caps()).unwrap();
    let again = registration.instantiate(ctx_a, backend.caps()).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(counters.fulfills(), 1);

    let other = registration.instantiate(ctx_b, backend.caps()).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(counters.fulfills(), 2);
    assert_eq!(registration.fulfill_count(), 2);
    assert_eq!(registration.state(), PromiseState::FulfillSucceeded);

    drop((first, again, other));
    assert_eq!(counters.texture_releases(), 0);
    drop(registration);
    assert_eq!(counters.texture_releases(), 2);
    assert_eq!(counters.image_releases(), 1);
}

#[test]
fn test_volatile_fulfills_every_time() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(mock_rgba_texture(&backend, dims())));
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::Yes, callbacks);
    let ctx = ContextId::next();

    let first = registration.instantiate(ctx, backend.caps()).unwrap();
    let second = registration.instantiate(ctx, backend.caps()).unwrap();
    assert_eq!(counters.fulfills(), 2);
    assert!(!registration.is_instantiated_for(ctx));

    drop(first);
    assert_eq!(counters.texture_releases(), 1);
    drop(second);
    assert_eq!(counters.texture_releases(), 2);
}

#[test]
fn test_failed_fulfill_never_releases_texture_and_retries() {
    let backend = MockBackend::new();
    let (callbacks, counters, slot) = MockPromiseCallbacks::new(None);
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    let ctx = ContextId::next();

    let result = registration.instantiate(ctx, backend.caps());
    assert!(matches!(result, Err(Error::FulfillFailure(_))));
    assert_eq!(registration.state(), PromiseState::FulfillFailed);
    assert!(!registration.is_instantiated_for(ctx));

    *slot.lock().unwrap() = Some(mock_rgba_texture(&backend, dims()));
    assert!(registration.instantiate(ctx, backend.caps()).is_ok());
    assert_eq!(counters.fulfills(), 2);

    drop(registration);
    assert_eq!(counters.texture_releases(), 1);
}

#[test]
fn test_invalid_fulfilled_texture_is_a_failure() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(BackendTexture::default()));
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::Yes, callbacks);

    let result = registration.instantiate(ContextId::next(), backend.caps());
    assert!(matches!(result, Err(Error::FulfillFailure(_))));
    drop(registration);
    assert_eq!(counters.fulfills(), 1);
    assert_eq!(counters.texture_releases(), 0);
}

#[test]
fn test_wrong_dimensions_are_a_failure() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(mock_rgba_texture(&backend, UVec2::new(8, 8))));
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    let ctx = ContextId::next();

    let result = registration.instantiate(ctx, backend.caps());
    assert!(matches!(result, Err(Error::FulfillFailure(_))));
    assert_eq!(registration.state(), PromiseState::FulfillFailed);
    assert!(!registration.is_instantiated_for(ctx));
    // A valid texture was handed over: it goes back to the client at once
    assert_eq!(counters.texture_releases(), 1);

    drop(registration);
    assert_eq!(counters.fulfills(), 1);
    assert_eq!(counters.texture_releases(), 1);
    assert_eq!(counters.image_releases(), 1);
}

#[test]
fn test_forget_context_releases_attached_texture() {
    let backend = MockBackend::new();
    let (callbacks, counters, _) = MockPromiseCallbacks::new(Some(mock_rgba_texture(&backend, dims())));
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::No, callbacks);
    let ctx = ContextId::next();

    drop(registration.instantiate(ctx, backend.caps()).unwrap());
    assert!(registration.is_instantiated_for(ctx));

    registration.forget_context(ctx);
    assert!(!registration.is_instantiated_for(ctx));
    assert_eq!(counters.texture_releases(), 1);
    assert_eq!(counters.image_releases(), 0);
}

// ============================================================================
// REENTRANCY TESTS
// ============================================================================

/// Callbacks that look at their own registration from inside `fulfill`
struct SelfObservingCallbacks {
    texture: BackendTexture,
    registration: Arc<OnceLock<Weak<PromiseImageRegistration>>>,
    seen: Arc<Mutex<Option<PromiseState>>>,
    released: Arc<AtomicUsize>,
}

impl PromiseImageCallbacks for SelfObservingCallbacks {
    type TextureReleaseContext = Arc<AtomicUsize>;

    fn fulfill(&mut self) -> Option<(BackendTexture, Arc<AtomicUsize>)> {
        let registration = self.registration.get().and_then(Weak::upgrade)?;
        *self.seen.lock().unwrap() = Some(registration.state());
        Some((self.texture.clone(), Arc::clone(&self.released)))
    }

    fn release_image(self) {}

    fn release_texture(released: Arc<AtomicUsize>) {
        released.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_fulfill_may_query_its_registration() {
    let backend = MockBackend::new();
    let slot = Arc::new(OnceLock::new());
    let seen = Arc::new(Mutex::new(None));
    let released = Arc::new(AtomicUsize::new(0));
    let callbacks = SelfObservingCallbacks {
        texture: mock_rgba_texture(&backend, dims()),
        registration: Arc::clone(&slot),
        seen: Arc::clone(&seen),
        released: Arc::clone(&released),
    };
    let registration = PromiseImageRegistration::new(dims(), mock_rgba_info(), rgba(), Volatile::Yes, callbacks);
    slot.set(Arc::downgrade(&registration)).unwrap();

    let texture = registration.instantiate(ContextId::next(), backend.caps()).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(PromiseState::FulfillPending));
    assert_eq!(registration.fulfill_count(), 1);

    drop(texture);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
