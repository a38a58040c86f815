//! Voice Queries

/// 列出所有音色查询
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 当前语音配置查询
#[derive(Debug, Clone)]
pub struct GetVoiceConfig;
