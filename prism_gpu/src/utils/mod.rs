pub mod unique_id;

pub use unique_id::{ContextId, RecorderId, RecordingId, ImageId, RegistrationId, PoolId};
