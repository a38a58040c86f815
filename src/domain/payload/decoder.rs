//! Audio Payload Decoder
//!
//! 把服务商响应（二进制音频 / JSON 内嵌 base64 或 hex / 文件引用）统一为音频字节。
//! 服务商不同端点、不同模型版本的响应结构并不稳定，因此这里按优先级机会主义地查找，
//! 而不是按固定 schema 反序列化。

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::encoding::{decode_encoded, EncodingDetector, HexPrefixDetector};

/// 音频最小字节数，小于等于该值的"音频"几乎都是错误 JSON
pub const MIN_AUDIO_BYTES: usize = 1000;

/// 具名字段中被视为编码音频的最小字符数
pub const MIN_ENCODED_CHARS: usize = 100;

/// 通用扫描中被视为候选音频的最小字符数
pub const GENERIC_SCAN_MIN_CHARS: usize = 10_000;

/// 可能直接携带音频（URL 或编码数据）的字段路径，按优先级排列
const AUDIO_FIELD_PATHS: &[&[&str]] = &[
    &["data", "audio"],
    &["audio"],
    &["data", "audio_file"],
    &["data", "file_url"],
    &["data", "audio_path"],
    &["data", "file_path"],
];

/// 文件引用字段路径
const FILE_REF_PATHS: &[&[&str]] = &[&["data", "file_id"], &["file_id"]];

/// 解码错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Audio payload too small: {len} bytes (minimum {min})")]
    TooSmall { len: usize, min: usize },

    #[error("Provider returned status {code}: {message}")]
    ProviderStatus { code: i64, message: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("No audio found in provider response")]
    NoAudio,

    #[error("Follow-up response referenced another file: {0}")]
    UnexpectedFollowUp(String),
}

/// 解码结果
#[derive(Clone, PartialEq, Eq)]
pub enum DecodedPayload {
    /// 原始音频字节
    Bytes(Vec<u8>),
    /// 服务商给出的音频 URL，原样返回
    Url(String),
    /// 需要通过文件内容接口二次获取
    NeedsFollowUp(String),
}

impl std::fmt::Debug for DecodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedPayload::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            DecodedPayload::Url(url) => write!(f, "Url({})", url),
            DecodedPayload::NeedsFollowUp(file_ref) => write!(f, "NeedsFollowUp({})", file_ref),
        }
    }
}

/// 解码阈值
#[derive(Debug, Clone, Copy)]
pub struct DecoderSettings {
    pub min_audio_bytes: usize,
    pub min_encoded_chars: usize,
    pub generic_scan_min_chars: usize,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            min_audio_bytes: MIN_AUDIO_BYTES,
            min_encoded_chars: MIN_ENCODED_CHARS,
            generic_scan_min_chars: GENERIC_SCAN_MIN_CHARS,
        }
    }
}

/// 音频载荷解码器
#[derive(Clone)]
pub struct AudioPayloadDecoder {
    settings: DecoderSettings,
    detector: Arc<dyn EncodingDetector>,
}

impl Default for AudioPayloadDecoder {
    fn default() -> Self {
        Self::new(DecoderSettings::default())
    }
}

impl AudioPayloadDecoder {
    pub fn new(settings: DecoderSettings) -> Self {
        Self {
            settings,
            detector: Arc::new(HexPrefixDetector::default()),
        }
    }

    /// 替换编码识别策略
    pub fn with_detector(mut self, detector: Arc<dyn EncodingDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    /// 解码一次服务商响应
    pub fn decode(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<DecodedPayload, DecodeError> {
        if !is_json(content_type, body) {
            return self.accept_bytes(body.to_vec()).map(DecodedPayload::Bytes);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
        self.decode_json(&value)
    }

    /// 解码文件内容接口的响应，不允许再次出现文件引用
    pub fn decode_follow_up(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<DecodedPayload, DecodeError> {
        match self.decode(content_type, body)? {
            DecodedPayload::NeedsFollowUp(file_ref) => {
                Err(DecodeError::UnexpectedFollowUp(file_ref))
            }
            other => Ok(other),
        }
    }

    fn decode_json(&self, value: &Value) -> Result<DecodedPayload, DecodeError> {
        if let Some((code, message)) = provider_status(value) {
            return Err(DecodeError::ProviderStatus { code, message });
        }

        let named: Vec<&str> = AUDIO_FIELD_PATHS
            .iter()
            .filter_map(|path| lookup_path(value, path).and_then(Value::as_str))
            .collect();

        // (a) 直接 URL
        if let Some(url) = named.iter().find(|s| is_http_url(s)) {
            tracing::debug!(url = %url, "Provider returned audio URL");
            return Ok(DecodedPayload::Url(url.to_string()));
        }

        // (b) 具名字段中的编码音频
        for encoded in named
            .iter()
            .filter(|s| s.len() > self.settings.min_encoded_chars)
        {
            match decode_encoded(encoded, self.detector.as_ref()) {
                Ok((bytes, encoding)) if bytes.len() > self.settings.min_audio_bytes => {
                    tracing::debug!(
                        encoding = ?encoding,
                        size = bytes.len(),
                        "Decoded embedded audio field"
                    );
                    return Ok(DecodedPayload::Bytes(bytes));
                }
                Ok((bytes, _)) => {
                    tracing::debug!(size = bytes.len(), "Embedded audio field below threshold");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Embedded audio field could not be decoded");
                }
            }
        }

        // (c) 文件引用
        if let Some(file_ref) = FILE_REF_PATHS
            .iter()
            .find_map(|path| lookup_path(value, path).and_then(value_as_ref))
        {
            return Ok(DecodedPayload::NeedsFollowUp(file_ref));
        }

        if declares_success(value) {
            if let Some(bytes) = self.generic_scan(value) {
                return Ok(DecodedPayload::Bytes(bytes));
            }
        }

        Err(DecodeError::NoAudio)
    }

    /// 递归扫描所有长字符串，优先选择带音频容器文件头的候选
    fn generic_scan(&self, value: &Value) -> Option<Vec<u8>> {
        let mut candidates = Vec::new();
        collect_long_strings(value, self.settings.generic_scan_min_chars, &mut candidates);

        let mut first_plausible: Option<Vec<u8>> = None;
        for candidate in candidates {
            let Ok((bytes, encoding)) = decode_encoded(candidate, self.detector.as_ref()) else {
                continue;
            };
            if bytes.len() <= self.settings.min_audio_bytes {
                continue;
            }
            if let Some(container) = sniff_audio_container(&bytes) {
                tracing::debug!(
                    container,
                    encoding = ?encoding,
                    size = bytes.len(),
                    "Generic scan found audio"
                );
                return Some(bytes);
            }
            if first_plausible.is_none() {
                first_plausible = Some(bytes);
            }
        }

        if let Some(bytes) = &first_plausible {
            tracing::debug!(
                size = bytes.len(),
                "Generic scan accepted candidate without recognizable header"
            );
        }
        first_plausible
    }

    fn accept_bytes(&self, bytes: Vec<u8>) -> Result<Vec<u8>, DecodeError> {
        if bytes.len() > self.settings.min_audio_bytes {
            Ok(bytes)
        } else {
            Err(DecodeError::TooSmall {
                len: bytes.len(),
                min: self.settings.min_audio_bytes,
            })
        }
    }
}

fn is_json(content_type: Option<&str>, body: &[u8]) -> bool {
    match content_type {
        Some(ct) if !ct.trim().is_empty() => ct.to_ascii_lowercase().contains("json"),
        _ => body
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(false, |b| *b == b'{'),
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn value_as_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collect_long_strings<'a>(value: &'a Value, min_chars: usize, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) if s.len() > min_chars => out.push(s),
        Value::Array(items) => {
            for item in items {
                collect_long_strings(item, min_chars, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_long_strings(item, min_chars, out);
            }
        }
        _ => {}
    }
}

/// 按路径查找 JSON 字段
pub fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// 读取第一个存在的引用字段（字符串或数字）
pub fn first_ref(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup_path(value, path).and_then(value_as_ref))
}

/// 服务商错误状态：`base_resp.status_code` 存在且非 0
pub fn provider_status(value: &Value) -> Option<(i64, String)> {
    let code = lookup_path(value, &["base_resp", "status_code"]).and_then(Value::as_i64)?;
    if code == 0 {
        return None;
    }
    let message = lookup_path(value, &["base_resp", "status_msg"])
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Some((code, message))
}

/// 响应明确声明成功
pub fn declares_success(value: &Value) -> bool {
    lookup_path(value, &["base_resp", "status_code"]).and_then(Value::as_i64) == Some(0)
}

/// 识别常见音频容器文件头
pub fn sniff_audio_container(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"ID3") {
        return Some("mp3");
    }
    if bytes.len() >= 2 && bytes[0] == 0xFF && (bytes[1] & 0xE0) == 0xE0 {
        return Some("mp3");
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE" {
        return Some("wav");
    }
    if bytes.starts_with(b"OggS") {
        return Some("ogg");
    }
    if bytes.starts_with(b"fLaC") {
        return Some("flac");
    }
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return Some("mp4");
    }
    None
}
