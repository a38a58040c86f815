//! Vocalis - 语音合成与音色克隆服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色身份与克隆注册
//! - Synthesis Context: 合成请求与降级阶梯
//! - Payload Context: 服务商响应解码
//!
//! 应用层 (application/):
//! - Ports: TtsProvider, ArtifactStore, SampleLibrary, VoiceStore
//! - Commands / Queries: CQRS 处理器
//! - Retry: 有界重试与指数退避
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 静态文件
//! - Adapters: MiniMax 客户端、本地文件存储
//! - Persistence: SQLite 音色存储
//! - Memory: 内存音色存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
