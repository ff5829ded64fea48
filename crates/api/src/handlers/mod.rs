pub mod media;
pub mod toolkit;
