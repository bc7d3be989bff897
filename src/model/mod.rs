// Canonical model shared by every grammar adapter

mod entity;
mod repository;
mod source;

pub use entity::*;
pub use repository::*;
pub use source::*;
