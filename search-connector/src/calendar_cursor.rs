//! # Calendar-style cursor codec
//!
//! No calendar connector ships in this crate (out of scope per
//! non-goals), but the wire format its cursor would use is specified
//! byte-exactly enough to be worth implementing and testing on its own:
//! JSON `{v, sync_tokens}`, base64url-encoded, so it composes cleanly with
//! the opaque `cursor: String` every other connector already returns.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current cursor format version this codec emits and accepts.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCursor {
    pub v: u32,
    pub sync_tokens: HashMap<String, String>,
}

impl CalendarCursor {
    pub fn new(sync_tokens: HashMap<String, String>) -> Self {
        Self {
            v: CURRENT_VERSION,
            sync_tokens,
        }
    }
}

#[derive(Error, Debug)]
pub enum CalendarCursorError {
    #[error("cursor is not valid base64url: {0}")]
    InvalidEncoding(String),

    #[error("cursor is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("cursor format version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub fn encode(cursor: &CalendarCursor) -> String {
    let json = serde_json::to_vec(cursor).expect("CalendarCursor always serialises");
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(raw: &str) -> Result<CalendarCursor, CalendarCursorError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|e| CalendarCursorError::InvalidEncoding(e.to_string()))?;
    let cursor: CalendarCursor =
        serde_json::from_slice(&bytes).map_err(|e| CalendarCursorError::InvalidJson(e.to_string()))?;
    if cursor.v > CURRENT_VERSION {
        return Err(CalendarCursorError::UnsupportedVersion {
            found: cursor.v,
            supported: CURRENT_VERSION,
        });
    }
    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CalendarCursor {
        let mut sync_tokens = HashMap::new();
        sync_tokens.insert("primary".to_string(), "tok-1".to_string());
        sync_tokens.insert("work@example.com".to_string(), "tok-2".to_string());
        CalendarCursor::new(sync_tokens)
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let cursor = sample();
        let encoded = encode(&cursor);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn encoding_is_base64url_without_padding() {
        let encoded = encode(&sample());
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn future_version_is_rejected() {
        let mut sync_tokens = HashMap::new();
        sync_tokens.insert("primary".to_string(), "tok".to_string());
        let future = CalendarCursor {
            v: CURRENT_VERSION + 1,
            sync_tokens,
        };
        let encoded = encode(&future);
        let err = decode(&encoded).unwrap_err();
        assert!(matches!(err, CalendarCursorError::UnsupportedVersion { .. }));
    }

    #[test]
    fn garbage_input_is_invalid_encoding() {
        let err = decode("not valid base64url!!").unwrap_err();
        assert!(matches!(err, CalendarCursorError::InvalidEncoding(_)));
    }

    #[test]
    fn empty_sync_tokens_round_trips() {
        let cursor = CalendarCursor::new(HashMap::new());
        let encoded = encode(&cursor);
        assert_eq!(decode(&encoded).unwrap(), cursor);
    }
}
