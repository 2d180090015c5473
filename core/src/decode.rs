//! Payload decoding plus the semantic emptiness checks layered on top of a
//! successful status code.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{ItemEnvelope, ListEnvelope};

/// Decode a list envelope. Absent or empty `data` is `NoContent`.
pub fn decode_list<T: DeserializeOwned>(bytes: &[u8]) -> Result<ListEnvelope<T>, ApiError> {
    let envelope: ListEnvelope<T> = from_slice(bytes)?;
    match envelope.data.as_deref() {
        Some(items) if !items.is_empty() => Ok(envelope),
        _ => Err(ApiError::NoContent),
    }
}

/// Decode an item envelope. Absent `data` is `NoContent`.
pub fn decode_item<T: DeserializeOwned>(bytes: &[u8]) -> Result<ItemEnvelope<T>, ApiError> {
    let envelope: ItemEnvelope<T> = from_slice(bytes)?;
    if envelope.data.is_none() {
        return Err(ApiError::NoContent);
    }
    Ok(envelope)
}

fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        log::debug!("response body did not decode: {e}");
        ApiError::Decoding(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Todo;

    #[test]
    fn list_with_items_decodes() {
        let body = br#"{"data":[{"id":1,"title":"a","is_done":false}],"meta":{"current_page":1,"last_page":3,"per_page":10,"total":25},"message":"ok"}"#;
        let env = decode_list::<Todo>(body).unwrap();
        assert_eq!(env.data.unwrap()[0].id, Some(1));
        let meta = env.meta.unwrap();
        assert_eq!(meta.last_page, Some(3));
        assert_eq!(meta.total, Some(25));
    }

    #[test]
    fn empty_or_missing_list_is_no_content() {
        assert_eq!(decode_list::<Todo>(br#"{"data":[]}"#), Err(ApiError::NoContent));
        assert_eq!(decode_list::<Todo>(br#"{"data":null}"#), Err(ApiError::NoContent));
        assert_eq!(decode_list::<Todo>(br#"{"message":"x"}"#), Err(ApiError::NoContent));
    }

    #[test]
    fn missing_item_is_no_content() {
        assert_eq!(decode_item::<Todo>(br#"{"data":null}"#), Err(ApiError::NoContent));
    }

    #[test]
    fn malformed_json_is_decoding_error() {
        assert!(matches!(decode_list::<Todo>(b"not json"), Err(ApiError::Decoding(_))));
        assert!(matches!(decode_item::<Todo>(b""), Err(ApiError::Decoding(_))));
    }

    #[test]
    fn schema_mismatch_is_decoding_error() {
        let body = br#"{"data":{"id":"seven"}}"#;
        assert!(matches!(decode_item::<Todo>(body), Err(ApiError::Decoding(_))));
        assert!(matches!(decode_list::<Todo>(body), Err(ApiError::Decoding(_))));
    }
}
