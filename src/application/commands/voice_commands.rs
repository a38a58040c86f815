//! Voice Commands

use crate::domain::voice::AudioSample;

/// 注册克隆音色命令
#[derive(Debug, Clone)]
pub struct RegisterVoiceClone {
    pub samples: Vec<AudioSample>,
    pub display_name: Option<String>,
    /// 注册完成后设为默认音色
    pub make_default: bool,
}

/// 设置默认音色命令
#[derive(Debug, Clone)]
pub struct SetDefaultVoice {
    pub voice_id: String,
}

/// 删除克隆音色命令
#[derive(Debug, Clone)]
pub struct DeleteVoiceClone {
    pub voice_id: String,
}
