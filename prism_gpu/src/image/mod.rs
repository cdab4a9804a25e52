pub mod color;
pub mod geometry;
pub mod pixmap;
pub mod yuva;
pub mod image;
mod image_factories;

pub use color::{AlphaType, ColorInfo, ColorSpace, ColorType};
pub use geometry::IRect;
pub use pixmap::Pixmap;
pub use yuva::{YuvColorSpace, YuvaBackendTextures, YuvaInfo, YuvaPixmaps, YuvaPlaneConfig, YuvaSubsampling};
pub use image::{Image, RequiredProperties};
pub(crate) use image::ImageSource;
