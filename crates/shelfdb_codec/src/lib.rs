//! # shelfdb Codec
//!
//! Serde/CBOR encoding and decoding for shelfdb.
//!
//! One codec serves every serialization concern in the store:
//! - structured document payloads (`set_value` / `get_value`)
//! - the persisted collection registry
//! - the store metadata file
//!
//! All functions are generic over serde types. The buffered forms
//! ([`encode`]/[`decode`]) work on byte vectors; the streaming forms
//! ([`to_writer`]/[`from_reader`]) encode and decode directly against
//! file handles without an intermediate buffer.
//!
//! ## Usage
//!
//! ```
//! use shelfdb_codec::{encode, decode};
//!
//! let bytes = encode(&vec![1u32, 2, 3]).unwrap();
//! let back: Vec<u32> = decode(&bytes).unwrap();
//! assert_eq!(back, vec![1, 2, 3]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

/// Encodes a value to CBOR bytes.
pub fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf)?;
    Ok(buf)
}

/// Decodes a value from CBOR bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    Ok(ciborium::de::from_reader(bytes)?)
}

/// Encodes a value directly into a writer.
pub fn to_writer<T: Serialize, W: Write>(value: &T, writer: W) -> CodecResult<()> {
    ciborium::ser::into_writer(value, writer)?;
    Ok(())
}

/// Decodes a value directly from a reader.
pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> CodecResult<T> {
    Ok(ciborium::de::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::fs::File;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u64,
        tags: Vec<String>,
    }

    fn sample() -> Sample {
        Sample {
            name: "users".to_string(),
            count: 42,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn roundtrip_struct() {
        let value = sample();
        let bytes = encode(&value).unwrap();
        let decoded: Sample = decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn roundtrip_map() {
        let mut map = HashMap::new();
        map.insert("users".to_string(), 1u32);
        map.insert("posts".to_string(), 2u32);

        let bytes = encode(&map).unwrap();
        let decoded: HashMap<String, u32> = decode(&bytes).unwrap();
        assert_eq!(decoded, map);
    }

    #[test]
    fn roundtrip_bytes() {
        let value: Vec<u8> = vec![0, 1, 2, 255];
        let bytes = encode(&value).unwrap();
        let decoded: Vec<u8> = decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.cbor");

        let value = sample();
        to_writer(&value, File::create(&path).unwrap()).unwrap();
        let decoded: Sample = from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_garbage_fails() {
        let result: CodecResult<Sample> = decode(b"\xff\xff\xff");
        let err = result.unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn decode_wrong_shape_fails() {
        let bytes = encode(&vec![1u32, 2, 3]).unwrap();
        let result: CodecResult<Sample> = decode(&bytes);
        assert!(result.is_err());
    }
}
