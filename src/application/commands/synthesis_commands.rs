//! Synthesis Commands

use crate::application::ports::StoreMode;

/// 合成语音命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    /// 未指定时使用当前默认音色
    pub voice_id: Option<String>,
    pub mode: StoreMode,
    /// 为 false 时只尝试服务商的两个层级，都失败则返回 Failed
    pub allow_offline_fallback: bool,
}
