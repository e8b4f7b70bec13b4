// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

/// Name given to the consumer thread.
pub const RUNTIME_THREAD_NAME: &str = "function-runtime";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Key version stamped on envelopes when the request does not pick one.
pub const TRANSIT_KEY_VERSION: u32 = invoke_harness::constants::TRANSIT_DEFAULT_KEY_VERSION;
