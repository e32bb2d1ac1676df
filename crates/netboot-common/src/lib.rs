pub mod error;
pub mod hwaddr;
pub mod image;
pub mod location;

pub use error::{Error, Result};
pub use hwaddr::HardwareAddr;
pub use image::BootImage;
pub use location::BootLocation;
