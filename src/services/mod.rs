//! Business logic services.

pub mod cleanup;
pub mod image_cache;
pub mod storage;
pub mod upload;

pub use cleanup::start_cleanup_task;
pub use image_cache::ImageCache;
pub use storage::{ObjectStore, Storage};
pub use upload::ImageUploader;
