//! Payload codec for remote calls.
//!
//! Tasks and their outputs travel as serde_json bodies. An empty body is
//! reserved for padding calls and never produced by `encode`.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DecodeError, EncodeError};

const LARGE_PAYLOAD_BYTES: usize = 100_000;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, EncodeError> {
    let json = serde_json::to_vec(value).map_err(EncodeError)?;
    let json_len = json.len();
    tracing::trace!(json_size_bytes = json_len, "Encoding payload");
    if json_len > LARGE_PAYLOAD_BYTES {
        tracing::info!(
            json_size_bytes = json_len,
            json_size_kb = json_len / 1024,
            "Large payload being encoded"
        );
    }
    Ok(Bytes::from(json))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    tracing::trace!(json_size_bytes = bytes.len(), "Decoding payload");
    serde_json::from_slice(bytes).map_err(DecodeError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    enum Job {
        Sleep { millis: u64 },
        Echo { text: String },
    }

    #[test]
    fn roundtrip_reencodes_identically() {
        let job = Job::Echo {
            text: "hello".to_string(),
        };
        let first = encode(&job).unwrap();
        let decoded: Job = decode(&first).unwrap();
        let second = encode(&decoded).unwrap();

        assert_eq!(decoded, job);
        assert_eq!(first, second);
    }

    #[test]
    fn encoded_tagged_enum_shape() {
        let bytes = encode(&Job::Sleep { millis: 250 }).unwrap();
        assert_eq!(&bytes[..], br#"{"kind":"sleep","millis":250}"#);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let err = decode::<Job>(b"{not json").unwrap_err();
        assert!(format!("{}", err).starts_with("failed to decode payload"));
    }

    #[test]
    fn decode_rejects_type_mismatch() {
        let bytes = encode(&42u32).unwrap();
        assert!(decode::<Job>(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_empty_body() {
        assert!(decode::<Job>(b"").is_err());
    }

    #[test]
    fn encode_reports_unserializable_values() {
        struct Opaque;
        impl Serialize for Opaque {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("opaque handle"))
            }
        }

        let err = encode(&Opaque).unwrap_err();
        assert!(format!("{}", err).contains("opaque handle"));
    }
}
