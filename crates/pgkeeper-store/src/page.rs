//! Fixed-size page encoding (§4.1).
//!
//! All record types share one page size, so growing a record in a future
//! schema version never changes the on-disk footprint of older ones.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// On-disk page size shared by every record type in this store.
pub const PAGE_SIZE: usize = 512;

fn bincode_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Encodes `value` and zero-pads it to [`PAGE_SIZE`].
pub fn encode_page<T: Serialize>(value: &T) -> Result<[u8; PAGE_SIZE], StoreError> {
    let bytes = bincode::serde::encode_to_vec(value, bincode_config())
        .map_err(|source| StoreError::Encode(source.to_string()))?;

    if bytes.len() > PAGE_SIZE {
        return Err(StoreError::RecordTooLarge { size: bytes.len() });
    }

    let mut page = [0u8; PAGE_SIZE];
    page[..bytes.len()].copy_from_slice(&bytes);
    Ok(page)
}

/// Decodes a value from a page, ignoring trailing zero padding.
pub fn decode_page<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    if bytes.len() < PAGE_SIZE {
        return Err(StoreError::Corrupt {
            reason: format!("expected at least {PAGE_SIZE} bytes, found {}", bytes.len()),
        });
    }

    let (value, _consumed) = bincode::serde::decode_from_slice(bytes, bincode_config())
        .map_err(|source| StoreError::Corrupt {
            reason: source.to_string(),
        })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Sample {
        schema_version: u32,
        value: u64,
    }

    #[test]
    fn encode_then_decode_roundtrips() {
        let sample = Sample {
            schema_version: 1,
            value: 42,
        };
        let page = encode_page(&sample).unwrap();
        assert_eq!(page.len(), PAGE_SIZE);

        let decoded: Sample = decode_page(&page).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn page_is_zero_padded_after_payload() {
        let sample = Sample {
            schema_version: 1,
            value: 7,
        };
        let page = encode_page(&sample).unwrap();
        assert_eq!(page[PAGE_SIZE - 1], 0);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let err = decode_page::<Sample>(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
