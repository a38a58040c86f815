//! 音频字符串编码识别
//!
//! 服务商在 JSON 中嵌入的音频可能是十六进制也可能是 base64，
//! 且响应里没有任何字段说明是哪一种，只能启发式判断

use base64::Engine;

/// 参与十六进制判断的前缀字符数
pub const HEX_PREFIX_CHARS: usize = 100;

/// 嵌入音频的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Hex,
    Base64,
}

impl PayloadEncoding {
    fn other(self) -> Self {
        match self {
            PayloadEncoding::Hex => PayloadEncoding::Base64,
            PayloadEncoding::Base64 => PayloadEncoding::Hex,
        }
    }
}

/// 编码识别策略
pub trait EncodingDetector: Send + Sync {
    fn detect(&self, sample: &str) -> PayloadEncoding;
}

/// 前缀全部为十六进制字符即判定为 Hex
///
/// 对短字符串天然有歧义：一个恰好只由 0-9a-f 组成的 base64 字符串会被判为 Hex，
/// 因此解码失败时由 `decode_encoded` 再尝试另一种编码
#[derive(Debug, Clone, Copy)]
pub struct HexPrefixDetector {
    prefix_chars: usize,
}

impl HexPrefixDetector {
    pub fn new(prefix_chars: usize) -> Self {
        Self {
            prefix_chars: prefix_chars.max(1),
        }
    }
}

impl Default for HexPrefixDetector {
    fn default() -> Self {
        Self::new(HEX_PREFIX_CHARS)
    }
}

impl EncodingDetector for HexPrefixDetector {
    fn detect(&self, sample: &str) -> PayloadEncoding {
        let mut prefix = sample.chars().take(self.prefix_chars).peekable();
        if prefix.peek().is_none() {
            return PayloadEncoding::Base64;
        }
        if prefix.all(|c| c.is_ascii_hexdigit()) {
            PayloadEncoding::Hex
        } else {
            PayloadEncoding::Base64
        }
    }
}

/// 按指定编码解码
pub fn decode_as(encoding: PayloadEncoding, encoded: &str) -> Result<Vec<u8>, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match encoding {
        PayloadEncoding::Hex => hex::decode(&compact).map_err(|e| format!("hex: {}", e)),
        PayloadEncoding::Base64 => base64::engine::general_purpose::STANDARD
            .decode(&compact)
            .map_err(|e| format!("base64: {}", e)),
    }
}

/// 先按识别结果解码，失败后尝试另一种编码
pub fn decode_encoded(
    encoded: &str,
    detector: &dyn EncodingDetector,
) -> Result<(Vec<u8>, PayloadEncoding), String> {
    let primary = detector.detect(encoded);
    match decode_as(primary, encoded) {
        Ok(bytes) => Ok((bytes, primary)),
        Err(primary_err) => {
            let alternate = primary.other();
            decode_as(alternate, encoded)
                .map(|bytes| (bytes, alternate))
                .map_err(|alternate_err| format!("{}; {}", primary_err, alternate_err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_hex_prefix() {
        let detector = HexPrefixDetector::default();
        assert_eq!(detector.detect("fffb9064000f"), PayloadEncoding::Hex);
        assert_eq!(detector.detect("SUQzBAAAAAAA"), PayloadEncoding::Base64);
        assert_eq!(detector.detect(""), PayloadEncoding::Base64);
    }

    #[test]
    fn test_prefix_length_is_respected() {
        let detector = HexPrefixDetector::new(4);
        // 前 4 个字符是十六进制，之后的字符不参与判断
        assert_eq!(detector.detect("abcdXYZ"), PayloadEncoding::Hex);
    }

    #[test]
    fn test_hex_prefixed_base64_falls_back_to_base64() {
        // 前 112 个字符全是十六进制字符，但整体是合法的 base64
        let encoded = format!("{}ghijklmn", "0123456789abcdef".repeat(7));
        assert_eq!(encoded.len() % 4, 0);
        let detector = HexPrefixDetector::default();
        assert_eq!(detector.detect(&encoded), PayloadEncoding::Hex);

        let (bytes, used) = decode_encoded(&encoded, &detector).unwrap();
        let expected = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .unwrap();
        assert_eq!(used, PayloadEncoding::Base64);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_fully_hex_string_is_treated_as_hex() {
        // 完全由十六进制字符组成且长度为偶数时无法区分，按 Hex 处理
        let encoded = "0123456789abcdef".repeat(8);
        let (bytes, used) = decode_encoded(&encoded, &HexPrefixDetector::default()).unwrap();
        assert_eq!(used, PayloadEncoding::Hex);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let (bytes, _) = decode_encoded("SGVs\nbG8=", &HexPrefixDetector::default()).unwrap();
        assert_eq!(bytes, b"Hello");
    }

    #[test]
    fn test_garbage_reports_both_errors() {
        let err = decode_encoded("@@@@", &HexPrefixDetector::default()).unwrap_err();
        assert!(err.contains("hex"));
        assert!(err.contains("base64"));
    }
}
