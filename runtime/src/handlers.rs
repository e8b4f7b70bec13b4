// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use anyhow::{Result, anyhow};
use data_encoding::BASE64;
use invoke_harness::models::{
    TransitBatchInput, TransitEncryptBatchResult, TransitEncryptData, TransitEncryptRequest,
    ciphertext_envelope,
};

use crate::constants::TRANSIT_KEY_VERSION;

/// A function handler hosted by the runtime loop.
///
/// Returning an error resolves the request as a failure; the loop keeps going.
pub trait Handler: Send + 'static {
    fn handle(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

impl<F> Handler for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>> + Send + 'static,
{
    fn handle(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self(payload)
    }
}

/// Built-in handlers selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HandlerKind {
    #[default]
    Echo,
    Uppercase,
    Transit,
}

impl HandlerKind {
    pub fn handler(self) -> fn(&[u8]) -> Result<Vec<u8>> {
        match self {
            HandlerKind::Echo => echo,
            HandlerKind::Uppercase => uppercase,
            HandlerKind::Transit => transit_encrypt,
        }
    }
}

// Byte Functions

pub fn echo(payload: &[u8]) -> Result<Vec<u8>> {
    Ok(payload.to_vec())
}

pub fn uppercase(payload: &[u8]) -> Result<Vec<u8>> {
    Ok(payload.to_ascii_uppercase())
}

// Transit Functions

/// Answers a transit `encrypt` request with `vault:v<n>:` envelopes.
///
/// This is a stand-in for the secrets engine used to exercise the harness:
/// the envelope body is the normalized base64 plaintext, not a ciphertext.
pub fn transit_encrypt(payload: &[u8]) -> Result<Vec<u8>> {
    let request: TransitEncryptRequest = serde_json::from_slice(payload)
        .map_err(|err| anyhow!("failed to deserialize transit request: {err:?}"))?;

    let key_version = request.key_version.unwrap_or(TRANSIT_KEY_VERSION);

    let data = match &request.batch_input {
        Some(items) => TransitEncryptData {
            ciphertext: None,
            error: None,
            batch_results: Some(
                items
                    .iter()
                    .map(|item| encrypt_batch_item(item, key_version))
                    .collect(),
            ),
        },
        None if request.plaintext.is_empty() => TransitEncryptData::error("missing plaintext"),
        None => match seal(&request.plaintext, key_version) {
            Ok(ciphertext) => TransitEncryptData {
                ciphertext: Some(ciphertext),
                error: None,
                batch_results: None,
            },
            Err(err) => TransitEncryptData::error(err.to_string()),
        },
    };

    Ok(serde_json::to_vec(&data)?)
}

fn encrypt_batch_item(item: &TransitBatchInput, key_version: u32) -> TransitEncryptBatchResult {
    match seal(&item.plaintext, key_version) {
        Ok(ciphertext) => TransitEncryptBatchResult {
            ciphertext: Some(ciphertext),
            key_version: Some(key_version),
            reference: item.reference.clone(),
            error: None,
        },
        Err(err) => TransitEncryptBatchResult {
            ciphertext: None,
            key_version: None,
            reference: item.reference.clone(),
            error: Some(err.to_string()),
        },
    }
}

fn seal(plaintext: &str, key_version: u32) -> Result<String> {
    let bytes = BASE64
        .decode(plaintext.as_bytes())
        .map_err(|err| anyhow!("invalid base64 plaintext: {err}"))?;
    Ok(ciphertext_envelope(key_version, &BASE64.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn transit(request: Value) -> TransitEncryptData {
        let bytes = transit_encrypt(&serde_json::to_vec(&request).unwrap()).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_echo() {
        assert_eq!(echo(b"same").unwrap(), b"same");
    }

    #[test]
    fn test_uppercase_is_ascii_only() {
        assert_eq!(uppercase("abc-é".as_bytes()).unwrap(), "ABC-é".as_bytes());
    }

    #[test]
    fn test_handler_kind_dispatch() {
        assert_eq!(HandlerKind::Echo.handler()(b"x").unwrap(), b"x");
        assert_eq!(HandlerKind::Uppercase.handler()(b"x").unwrap(), b"X");
        assert!(HandlerKind::Transit.handler()(b"not json").is_err());
    }

    #[test]
    fn test_closure_is_a_handler() {
        let prefix = b"> ".to_vec();
        let handler = move |payload: &[u8]| -> Result<Vec<u8>> {
            Ok([prefix.as_slice(), payload].concat())
        };
        assert_eq!(handler.handle(b"hi").unwrap(), b"> hi");
    }

    #[test]
    fn test_transit_single() {
        let data = transit(json!({"plaintext": "aGVsbG8="}));
        assert_eq!(data.ciphertext.as_deref(), Some("vault:v1:aGVsbG8="));
        assert!(data.errors().is_empty());
    }

    #[test]
    fn test_transit_key_version() {
        let data = transit(json!({"plaintext": "aGVsbG8=", "key_version": 4}));
        assert_eq!(data.ciphertext.as_deref(), Some("vault:v4:aGVsbG8="));
    }

    #[test]
    fn test_transit_missing_plaintext() {
        let data = transit(json!({}));
        assert_eq!(data.error.as_deref(), Some("missing plaintext"));
        assert!(data.ciphertext.is_none());
    }

    #[test]
    fn test_transit_invalid_plaintext() {
        let data = transit(json!({"plaintext": "%%%"}));
        assert!(data.error.unwrap().starts_with("invalid base64 plaintext"));
    }

    #[test]
    fn test_transit_batch_reports_per_item_errors() {
        let data = transit(json!({
            "batch_input": [
                {"plaintext": "b25l", "reference": "first"},
                {"plaintext": "***", "reference": "second"}
            ]
        }));

        let results = data.batch_results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ciphertext.as_deref(), Some("vault:v1:b25l"));
        assert_eq!(results[0].reference.as_deref(), Some("first"));
        assert!(results[1].ciphertext.is_none());
        assert_eq!(results[1].reference.as_deref(), Some("second"));
        assert!(results[1].error.is_some());
    }

    #[test]
    fn test_transit_rejects_malformed_request() {
        let err = transit_encrypt(b"{").unwrap_err();
        assert!(err.to_string().contains("failed to deserialize transit request"));
    }
}
