// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use invoke_harness::errors::InvokeError;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("handler failed to start: {0:#}")]
    Startup(anyhow::Error),
    #[error("failed to spawn runtime thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("runtime thread panicked")]
    Panicked,
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
