//! Total text decoding for scanned records.
//!
//! Japanese-market QR scanners emit Shift_JIS by default, but plenty of
//! payloads are plain ASCII or UTF-8. [`decode_scan`] tries an ordered
//! fallback chain so the pipeline never stalls on a malformed record:
//!
//! 1. strict Shift_JIS — preserves mixed-script payloads that a UTF-8-first
//!    strategy would mis-split (most single high bytes are valid half-width
//!    katakana in Shift_JIS, so genuine Shift_JIS rarely fails here);
//! 2. strict UTF-8;
//! 3. lossy Shift_JIS, substituting U+FFFD for every invalid sequence.
//!
//! Whichever branch wins, the result is trimmed of leading and trailing
//! whitespace and control characters — that is where CR/LF terminators left
//! in the frame by the framer are dropped.

use encoding_rs::SHIFT_JIS;
use tracing::warn;

/// Decodes one scanned frame into text. Never fails; empty input
/// short-circuits to an empty string.
pub fn decode_scan(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if let Some(text) = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes) {
        return trim_record(&text);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        warn!("record is not valid Shift_JIS, decoded as UTF-8");
        return trim_record(text);
    }

    warn!("record is neither Shift_JIS nor UTF-8, decoding lossily");
    let (text, _, _) = SHIFT_JIS.decode(bytes);
    trim_record(&text)
}

fn trim_record(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_decodes_unchanged() {
        assert_eq!(decode_scan(b"hello world"), "hello world");
    }

    #[test]
    fn test_empty_input_yields_empty_string() {
        assert_eq!(decode_scan(b""), "");
    }

    #[test]
    fn test_shift_jis_round_trip() {
        // Arrange: encode a Japanese string under Shift_JIS
        let original = "\u{65e5}\u{672c}\u{8a9e}\u{30c6}\u{30b9}\u{30c8}"; // 日本語テスト
        let (encoded, _, unmappable) = SHIFT_JIS.encode(original);
        assert!(!unmappable, "fixture must be representable in Shift_JIS");

        // Act / Assert
        assert_eq!(decode_scan(&encoded), original);
    }

    #[test]
    fn test_utf8_fallback_when_shift_jis_rejects() {
        // Hangul code points sit in unmapped Shift_JIS double-byte rows, so
        // their UTF-8 encoding fails the strict Shift_JIS attempt.
        let original = "\u{c548}\u{b155}"; // 안녕
        let bytes = original.as_bytes();
        assert!(
            SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .is_none(),
            "fixture must be invalid Shift_JIS for this test to mean anything"
        );

        assert_eq!(decode_scan(bytes), original);
    }

    #[test]
    fn test_arbitrary_garbage_decodes_with_replacement_marker() {
        // Invalid under both strict decoders — must take the lossy branch
        // and still return without error.
        let decoded = decode_scan(&[0xFF, 0xFE, 0xFD, 0xFC]);
        assert!(
            decoded.contains('\u{FFFD}'),
            "lossy decode must substitute the replacement marker, got {decoded:?}"
        );
    }

    #[test]
    fn test_terminators_and_whitespace_are_trimmed() {
        assert_eq!(decode_scan(b"  test\r\n"), "test");
        assert_eq!(decode_scan(b"\ttest data\r"), "test data");
    }

    #[test]
    fn test_interior_whitespace_is_preserved() {
        assert_eq!(decode_scan(b"a b\tc\r"), "a b\tc");
    }

    #[test]
    fn test_frame_of_only_terminators_decodes_to_empty() {
        assert_eq!(decode_scan(b"\r\n"), "");
    }

    #[test]
    fn test_half_width_katakana_single_bytes() {
        // 0xB1 0xB2 are half-width katakana ｱｲ in Shift_JIS.
        assert_eq!(decode_scan(&[0xB1, 0xB2]), "\u{ff71}\u{ff72}");
    }
}
