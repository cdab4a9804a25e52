pub mod promise_callbacks;
pub mod promise_image;

pub use promise_callbacks::{PromiseImageCallbacks, Volatile};
pub use promise_image::{PromiseImageRegistration, PromiseState};
