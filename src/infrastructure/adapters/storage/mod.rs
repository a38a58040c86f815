//! Storage Adapter - 文件系统存储实现

mod artifact_store;
mod sample_library;

pub use artifact_store::FileArtifactStore;
pub use sample_library::FileSampleLibrary;
