//! Memory Layer - 内存配置存储
//!
//! 实现 VoiceStorePort，用于测试与不落盘的运行方式

mod voice_store;

pub use voice_store::InMemoryVoiceStore;
