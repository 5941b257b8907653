use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, Result};

static DECL_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("xml declaration pattern")
});

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    // BOM UTF-8 (EF BB BF)
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let name = encoding.name().to_lowercase();
        return EncodingDetectionResult {
            best: name.clone(),
            confidence: 0.99,
            candidates: vec![EncodingCandidate {
                name,
                confidence: 0.99,
            }],
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // Legacy code pages that decoders often report under a sibling name
    let siblings: &[&str] = match best.as_str() {
        "euc-kr" => &["cp949", "uhc"],
        "shift_jis" => &["windows-31j", "cp932"],
        "gbk" => &["gb18030"],
        "utf-8" => &["utf-8-sig"],
        _ => &[],
    };
    for (i, name) in siblings.iter().enumerate() {
        let penalty = if best == "utf-8" { 0.20 } else { 0.03 * (i as f32 + 1.0) };
        candidates.push(EncodingCandidate {
            name: (*name).to_string(),
            confidence: (confidence - penalty).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

/// Text decoded from raw catalog bytes, with the encoding that was used.
#[derive(Debug)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// Decodes catalog bytes: BOM first, then the XML declaration, then UTF-8,
/// then a statistical guess.
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_len..]);
    }

    if let Some(encoding) = declared_encoding(bytes) {
        return decode_with(encoding, bytes);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Decoded {
            text: text.to_string(),
            encoding: UTF_8.name(),
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    tracing::debug!(encoding = guess.name(), "catalog is not utf-8, using detected encoding");
    decode_with(guess, bytes)
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let label = DECL_ENCODING_RE.captures(&head)?.get(1)?.as_str().to_string();
    let encoding = Encoding::for_label(label.as_bytes());
    if encoding.is_none() {
        tracing::warn!(label = %label, "unknown encoding in xml declaration");
    }
    encoding
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<Decoded> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(CoreError::Encoding(format!(
            "content is not valid {}",
            encoding.name()
        )));
    }
    Ok(Decoded {
        text: text.into_owned(),
        encoding: encoding.name(),
    })
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_with_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<TS language=\"ko\"/>".as_bytes());
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.text, "<TS language=\"ko\"/>");
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(detect(&bytes).best, "utf-8-sig");
    }

    #[test]
    fn decodes_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<TS>고도</TS>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.text, "<TS>고도</TS>");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn honours_declared_encoding() {
        let (body, _, _) = encoding_rs::EUC_KR.encode("<TS><name>고도</name></TS>");
        let mut bytes = b"<?xml version=\"1.0\" encoding=\"euc-kr\"?>".to_vec();
        bytes.extend_from_slice(&body);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.text.ends_with("<TS><name>고도</name></TS>"));
        assert_eq!(decoded.encoding, "EUC-KR");
    }

    #[test]
    fn plain_utf8_passes_through() {
        let decoded = decode("<TS language=\"ko\">고도</TS>".as_bytes()).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn invalid_declared_content_is_an_error() {
        let mut bytes = b"<?xml version=\"1.0\" encoding=\"utf-8\"?><TS>".to_vec();
        bytes.extend_from_slice(&[0xC3, 0x28]);
        assert!(matches!(decode(&bytes), Err(CoreError::Encoding(_))));
    }
}
