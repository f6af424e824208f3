//! MCTL Core - Fundamental types shared by every protocol generation

mod error;
mod types;
mod model;
mod texture;

pub use error::*;
pub use types::*;
pub use model::*;
pub use texture::*;
