//! Tagged payload envelope for cached values.
//!
//! Every stored payload is one tag byte followed by the encoded value, so
//! `get` dispatches to the matching decoder without runtime type inspection.
//! JSON is preferred; values JSON cannot represent (e.g. maps with non-string
//! keys) fall back to an opaque bincode encoding.
//!
//! An unknown tag or a decoder failure is a [`CacheError::Decode`], which the
//! read path treats exactly like a miss.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CacheError;

const TAG_JSON: u8 = 0x01;
const TAG_BINARY: u8 = 0x02;

/// The wire encoding of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Structured JSON encoding.
    Json,
    /// Opaque bincode encoding, for values not representable as JSON.
    Binary,
}

impl Encoding {
    fn tag(self) -> u8 {
        match self {
            Self::Json => TAG_JSON,
            Self::Binary => TAG_BINARY,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_JSON => Some(Self::Json),
            TAG_BINARY => Some(Self::Binary),
            _ => None,
        }
    }
}

/// Encodes a value into a tagged envelope.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, CacheError> {
    match serde_json::to_vec(value) {
        Ok(body) => Ok(frame(Encoding::Json, body)),
        Err(json_err) => {
            // JSON cannot represent the value; fall back to bincode.
            let body = bincode::serialize(value).map_err(|bin_err| {
                CacheError::encode(format!("json: {json_err}; bincode: {bin_err}"))
            })?;
            Ok(frame(Encoding::Binary, body))
        }
    }
}

/// Decodes a tagged envelope back into a value.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    let (&tag, body) = bytes
        .split_first()
        .ok_or_else(|| CacheError::decode("empty payload"))?;
    match Encoding::from_tag(tag) {
        Some(Encoding::Json) => serde_json::from_slice(body)
            .map_err(|e| CacheError::decode(format!("json: {e}"))),
        Some(Encoding::Binary) => bincode::deserialize(body)
            .map_err(|e| CacheError::decode(format!("bincode: {e}"))),
        None => Err(CacheError::decode(format!("unknown encoding tag {tag:#04x}"))),
    }
}

fn frame(encoding: Encoding, body: Vec<u8>) -> Vec<u8> {
    let mut framed = Vec::with_capacity(body.len() + 1);
    framed.push(encoding.tag());
    framed.extend_from_slice(&body);
    framed
}
