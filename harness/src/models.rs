// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Request and response bodies of the secrets engine transit `encrypt` call.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::constants::TRANSIT_CIPHERTEXT_PREFIX;

/// Body of a transit `encrypt` request.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct TransitEncryptRequest {
    /// Base64 encoded plaintext.
    #[serde(default)]
    pub plaintext: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub context: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub key_version: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub batch_input: Option<Vec<TransitBatchInput>>,
}

// Custom Debug implementation to prevent accidental logging of sensitive data
impl fmt::Debug for TransitEncryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitEncryptRequest")
            .field("plaintext", &"[REDACTED]")
            .field("context", &self.context)
            .field("key_version", &self.key_version)
            .field("batch_input", &self.batch_input)
            .finish()
    }
}

impl TransitEncryptRequest {
    pub fn single(plaintext: impl Into<String>) -> Self {
        Self {
            plaintext: plaintext.into(),
            context: None,
            key_version: None,
            batch_input: None,
        }
    }

    pub fn batch(items: Vec<TransitBatchInput>) -> Self {
        Self {
            plaintext: String::new(),
            context: None,
            key_version: None,
            batch_input: Some(items),
        }
    }
}

/// One item of a batched transit `encrypt` request.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct TransitBatchInput {
    pub plaintext: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub context: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub reference: Option<String>,
}

impl TransitBatchInput {
    pub fn new(plaintext: impl Into<String>, reference: Option<String>) -> Self {
        Self {
            plaintext: plaintext.into(),
            context: None,
            reference,
        }
    }
}

impl fmt::Debug for TransitBatchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitBatchInput")
            .field("plaintext", &"[REDACTED]")
            .field("context", &self.context)
            .field("reference", &self.reference)
            .finish()
    }
}

/// `data` section of a transit `encrypt` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitEncryptData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciphertext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(
        rename = "batch_results",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub batch_results: Option<Vec<TransitEncryptBatchResult>>,
}

impl TransitEncryptData {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Errors reported by the top level or by any batch item.
    pub fn errors(&self) -> Vec<&str> {
        let batch = self
            .batch_results
            .iter()
            .flatten()
            .filter_map(|result| result.error.as_deref());
        self.error.as_deref().into_iter().chain(batch).collect()
    }
}

/// One entry of `batch_results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitEncryptBatchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciphertext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Builds a `vault:v<version>:<body>` ciphertext envelope.
pub fn ciphertext_envelope(key_version: u32, body: &str) -> String {
    format!("{TRANSIT_CIPHERTEXT_PREFIX}{key_version}:{body}")
}

/// Splits a `vault:v<version>:<body>` envelope into its version and body.
pub fn parse_ciphertext_envelope(envelope: &str) -> Option<(u32, &str)> {
    let rest = envelope.strip_prefix(TRANSIT_CIPHERTEXT_PREFIX)?;
    let (version, body) = rest.split_once(':')?;
    Some((version.parse().ok()?, body))
}
