//! Provider Queries

/// 当前服务商配置查询（API Key 脱敏）
#[derive(Debug, Clone)]
pub struct GetProviderConfig;
