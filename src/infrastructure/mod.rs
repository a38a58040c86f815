//! Infrastructure Layer - 基础设施层
//!
//! - adapters: 外部服务与本地文件适配器
//! - http: Axum HTTP 服务
//! - memory: 内存实现
//! - persistence: SQLite 持久化

pub mod adapters;
pub mod http;
pub mod memory;
pub mod persistence;
