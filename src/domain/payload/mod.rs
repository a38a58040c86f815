//! Payload Context - 服务商响应解码
//!
//! 纯逻辑，不做任何 I/O：输入响应头与响应体，输出音频字节 / URL / 文件引用

mod decoder;
pub mod encoding;

pub use decoder::{
    declares_success, first_ref, lookup_path, provider_status, sniff_audio_container,
    AudioPayloadDecoder, DecodeError, DecodedPayload, DecoderSettings, GENERIC_SCAN_MIN_CHARS,
    MIN_AUDIO_BYTES, MIN_ENCODED_CHARS,
};
pub use encoding::{EncodingDetector, HexPrefixDetector, PayloadEncoding, HEX_PREFIX_CHARS};
