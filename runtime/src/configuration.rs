// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use clap::Parser;

use crate::handlers::HandlerKind;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct RuntimeOptions {
    #[arg(long, value_enum, default_value = "echo", env("FUNCTION_RUNTIME_HANDLER"))]
    pub handler: HandlerKind,
    /// Give up on an invocation after this many milliseconds. Waits forever if unset.
    #[arg(long, env("FUNCTION_RUNTIME_TIMEOUT_MS"))]
    pub timeout_ms: Option<u64>,
}

impl RuntimeOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            handler: HandlerKind::Echo,
            timeout_ms: None,
        }
    }
}
