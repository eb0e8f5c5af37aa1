//! Key encodings.
//!
//! Integers are big-endian so byte order equals numeric order. Text keys are
//! case-folded and, when followed by more components, terminated by `0x00`.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};

/// Case-folded natural key.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

pub fn u64_key(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn decode_u64(bytes: &[u8]) -> StoreResult<u64> {
    let buf: [u8; 8] = bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| StoreError::Other(format!("invalid id key length {}", bytes.len())))?;
    Ok(u64::from_be_bytes(buf))
}

/// Folded text as a whole key.
pub fn text_key(text: &str) -> Vec<u8> {
    fold(text).into_bytes()
}

/// Folded text as the leading component of a composite key.
pub fn text_prefix(text: &str) -> Vec<u8> {
    let mut key = fold(text).into_bytes();
    key.push(0);
    key
}

/// Timestamp component that sorts chronologically, including before 1970.
pub fn timestamp_key(ts: &DateTime<Utc>) -> [u8; 8] {
    let micros = ts.timestamp_micros() as u64 ^ (1 << 63);
    micros.to_be_bytes()
}

pub fn join(parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn folding() {
        assert_eq!(text_key("AliCe"), b"alice".to_vec());
        assert_eq!(text_prefix("Rust"), b"rust\0".to_vec());
    }

    #[test]
    fn id_round_trip_and_order() {
        assert_eq!(decode_u64(&u64_key(300)).unwrap(), 300);
        assert!(u64_key(255) < u64_key(256));
        assert!(decode_u64(&[1, 2]).is_err());
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let before_epoch = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(timestamp_key(&before_epoch) < timestamp_key(&epoch));
        assert!(timestamp_key(&epoch) < timestamp_key(&later));
    }
}
