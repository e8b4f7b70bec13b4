// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::InvokeError;

/// Converts typed values to and from the opaque payloads carried by the broker.
pub trait Codec: Send + Sync {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, InvokeError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, InvokeError>;
}

/// JSON codec backed by `serde_json`. This is what [`Invoker::new`] uses.
///
/// [`Invoker::new`]: crate::client::Invoker::new
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, InvokeError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, InvokeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Greeting {
        name: String,
        times: u32,
    }

    #[test]
    fn test_encode_compact() {
        let codec = JsonCodec::new();
        let bytes = codec
            .encode(&Greeting {
                name: "bob".to_string(),
                times: 2,
            })
            .unwrap();
        assert_eq!(bytes, br#"{"name":"bob","times":2}"#);
    }

    #[test]
    fn test_encode_pretty() {
        let codec = JsonCodec::pretty();
        let bytes = codec.encode(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_decode() {
        let codec = JsonCodec::new();
        let greeting: Greeting = codec.decode(br#"{"name":"alice","times":3}"#).unwrap();
        assert_eq!(greeting.name, "alice");
        assert_eq!(greeting.times, 3);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let codec = JsonCodec::new();
        let err = codec.decode::<Greeting>(br#"{"name":"alice"}"#).unwrap_err();
        assert!(matches!(err, InvokeError::Codec(_)));
    }

    #[test]
    fn test_encode_str() {
        let codec = JsonCodec::new();
        assert_eq!(codec.encode("hi").unwrap(), br#""hi""#);
    }
}
