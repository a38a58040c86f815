//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod voice_store;

pub use database::*;
pub use voice_store::*;
