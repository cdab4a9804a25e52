pub mod recorder;
pub mod recording;
pub mod context;
pub mod resource_provider;

pub use recorder::Recorder;
pub use recording::Recording;
pub use context::{Context, SyncToCpu};
pub use resource_provider::ResourceProvider;
