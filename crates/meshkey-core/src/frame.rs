//! Decrypted-frame heuristics
//!
//! A correctly decrypted packet opens with the data frame's first
//! protobuf field:
//!
//! ```text
//! [0x08][port][... 0x12][len][payload:len][...]
//! ```
//!
//! - **0x08**: varint tag, field 1: the port number
//! - **port**: which application the payload belongs to (see [`crate::ports`])
//! - **0x12**: length-delimited tag, field 2: the payload bytes
//!
//! There is no full protobuf decoder here and none is wanted. Recognizing
//! the leading tag plus one length-delimited run is enough to tell a
//! plausible key from keystream garbage, at the cost of a small
//! false-positive rate.

use crate::ports;
use serde::Serialize;

/// Varint tag for field 1 (wire type 0): the port number
const PORT_TAG: u8 = 0x08;
/// Length-delimited tag for field 2 (wire type 2): the payload
const PAYLOAD_TAG: u8 = 0x12;
/// Printable fraction above which tag-less bytes still count as a hit
const TEXT_RATIO: f64 = 0.8;

/// How trustworthy a structural match is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    /// Leading tag plus a port on the known-application list
    High,
    /// Leading tag with an unlisted port, or mostly-printable bytes
    Medium,
    /// No structure recognized
    Low,
}

/// Verdict on one decryption attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub confidence: Confidence,
    pub port: Option<u8>,
}

impl Validation {
    fn invalid() -> Self {
        Self {
            valid: false,
            confidence: Confidence::Low,
            port: None,
        }
    }
}

/// Judge whether decrypted bytes look like a real frame.
///
/// This is a heuristic, not proof: a wrong key has roughly a 1-in-256
/// chance of opening with the right tag byte. Acceptable in exchange for
/// not needing the full schema.
pub fn validate(plain: &[u8]) -> Validation {
    if plain.len() < 2 {
        return Validation::invalid();
    }

    if plain[0] == PORT_TAG && plain[1] != 0 {
        let port = plain[1];
        let confidence = if ports::is_known(port) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        return Validation {
            valid: true,
            confidence,
            port: Some(port),
        };
    }

    // No tag, but a run of readable text is still worth surfacing
    if printable_ratio(plain) > TEXT_RATIO {
        return Validation {
            valid: true,
            confidence: Confidence::Medium,
            port: None,
        };
    }

    Validation::invalid()
}

fn printable_ratio(bytes: &[u8]) -> f64 {
    let printable = bytes
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == b'\n' || b == b'\r')
        .count();
    printable as f64 / bytes.len() as f64
}

/// Extracted payload: text for chat messages, raw bytes for everything else
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Payload {
    Text(String),
    Raw(Vec<u8>),
}

/// What [`extract`] could pull out of a validated frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub port: Option<u8>,
    pub payload: Option<Payload>,
}

/// Pull the first length-delimited payload field out of a tagged frame.
///
/// Scans from offset 2 for the first `0x12` tag and takes the byte after
/// it as the payload length. Only that first candidate run is considered;
/// an implausible length just leaves the payload empty. Trailing and
/// unrelated bytes are tolerated. For [`ports::TEXT_MESSAGE`] the payload
/// is decoded as UTF-8, falling back to raw bytes when it is not valid.
pub fn extract(plain: &[u8]) -> Extracted {
    if plain.len() < 2 || plain[0] != PORT_TAG {
        return Extracted::default();
    }

    let port = plain[1];
    let mut found = Extracted {
        port: Some(port),
        payload: None,
    };

    let mut i = 2;
    while i + 1 < plain.len() {
        if plain[i] == PAYLOAD_TAG {
            let len = plain[i + 1] as usize;
            let start = i + 2;
            if len > 0 && start + len <= plain.len() {
                found.payload = Some(decode_payload(port, plain[start..start + len].to_vec()));
            }
            break;
        }
        i += 1;
    }

    found
}

fn decode_payload(port: u8, raw: Vec<u8>) -> Payload {
    if port == ports::TEXT_MESSAGE {
        match String::from_utf8(raw) {
            Ok(text) => Payload::Text(text),
            Err(err) => Payload::Raw(err.into_bytes()),
        }
    } else {
        Payload::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_known_port_is_high_confidence() {
        let verdict = validate(&[0x08, 0x01]);
        assert!(verdict.valid);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(verdict.port, Some(1));
    }

    #[test]
    fn test_tagged_unknown_port_is_medium_confidence() {
        let verdict = validate(&[0x08, 0xFF]);
        assert!(verdict.valid);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert_eq!(verdict.port, Some(0xFF));
    }

    #[test]
    fn test_too_short_is_invalid() {
        let verdict = validate(&[0x01]);
        assert!(!verdict.valid);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert!(!validate(&[]).valid);
    }

    #[test]
    fn test_zero_port_is_not_a_tag_match() {
        // 0x08 0x00 fails the tag rule and the two bytes are not printable
        let verdict = validate(&[0x08, 0x00]);
        assert!(!verdict.valid);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[test]
    fn test_plain_text_is_medium_confidence() {
        let verdict = validate(b"meshtastic rules ok\r\n");
        assert!(verdict.valid);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert_eq!(verdict.port, None);
    }

    #[test]
    fn test_binary_noise_is_invalid() {
        let verdict = validate(&[0x00, 0x9F, 0xE2, 0x03, 0xD0, 0xFF]);
        assert!(!verdict.valid);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[test]
    fn test_printable_ratio_must_exceed_threshold() {
        // 4 printable of 5 is exactly 0.8, not over the bar
        assert!(!validate(&[b'a', b'b', b'c', b'd', 0x00]).valid);
        // 5 of 6 is over
        assert!(validate(&[b'a', b'b', b'c', b'd', b'e', 0x00]).valid);
    }

    #[test]
    fn test_extract_text_payload() {
        let found = extract(&[0x08, 0x01, 0x12, 0x03, 0x41, 0x42, 0x43]);
        assert_eq!(found.port, Some(1));
        assert_eq!(found.payload, Some(Payload::Text("ABC".into())));
    }

    #[test]
    fn test_extract_non_text_port_keeps_raw_bytes() {
        let found = extract(&[0x08, 0x03, 0x12, 0x02, 0xDE, 0xAD]);
        assert_eq!(found.port, Some(3));
        assert_eq!(found.payload, Some(Payload::Raw(vec![0xDE, 0xAD])));
    }

    #[test]
    fn test_extract_invalid_utf8_falls_back_to_raw() {
        let found = extract(&[0x08, 0x01, 0x12, 0x02, 0xFF, 0xFE]);
        assert_eq!(found.port, Some(1));
        assert_eq!(found.payload, Some(Payload::Raw(vec![0xFF, 0xFE])));
    }

    #[test]
    fn test_extract_without_payload_field() {
        let found = extract(&[0x08, 0x05, 0x20, 0x01]);
        assert_eq!(found.port, Some(5));
        assert_eq!(found.payload, None);
    }

    #[test]
    fn test_extract_zero_length_run() {
        let found = extract(&[0x08, 0x01, 0x12, 0x00]);
        assert_eq!(found.port, Some(1));
        assert_eq!(found.payload, None);
    }

    #[test]
    fn test_extract_truncated_run() {
        // claims 9 payload bytes, only 2 present
        let found = extract(&[0x08, 0x01, 0x12, 0x09, b'h', b'i']);
        assert_eq!(found.port, Some(1));
        assert_eq!(found.payload, None);
    }

    #[test]
    fn test_extract_tag_as_final_byte() {
        let found = extract(&[0x08, 0x01, 0x12]);
        assert_eq!(found.port, Some(1));
        assert_eq!(found.payload, None);
    }

    #[test]
    fn test_extract_requires_leading_tag() {
        let found = extract(&[0x12, 0x03, 0x41, 0x42, 0x43]);
        assert_eq!(found, Extracted::default());
    }

    #[test]
    fn test_extract_tolerates_trailing_bytes() {
        let found = extract(&[0x08, 0x01, 0x12, 0x02, b'o', b'k', 0xFF, 0x00, 0x99]);
        assert_eq!(found.payload, Some(Payload::Text("ok".into())));
    }
}
