pub mod chip;
pub mod draft;
pub mod image;
pub mod standard;
pub mod tag;
