// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

/// Prefix of every rendered request identifier, e.g. `aws-request-1`.
pub const REQUEST_ID_PREFIX: &str = "aws-request-";

/// First identifier handed out by a fresh broker.
pub const FIRST_REQUEST_ID: u64 = 1;

/// Initial capacity of the pending-response table.
pub const PENDING_TABLE_CAPACITY: usize = 64;

/// Initial capacity of the buffer used to drain a raw input stream.
pub const RAW_INPUT_BUFFER_CAPACITY: usize = 8 * 1024; // 8 KiB

// Transit engine envelope, `vault:v<version>:<base64>`
pub const TRANSIT_CIPHERTEXT_PREFIX: &str = "vault:v";
pub const TRANSIT_DEFAULT_KEY_VERSION: u32 = 1;
