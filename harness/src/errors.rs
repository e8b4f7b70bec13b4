// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use crate::broker::RequestId;

/// Errors surfaced to a caller blocked in [`Broker::submit`](crate::broker::Broker::submit)
/// or any of the [`Invoker`](crate::client::Invoker) entry points.
#[derive(thiserror::Error, Debug)]
pub enum InvokeError {
    /// The broker was poisoned before the call; nothing was enqueued.
    #[error("harness unavailable: {0}")]
    HarnessUnavailable(String),
    /// The function resolved the request with a failure. The original cause
    /// is forwarded unchanged so its chain stays intact.
    #[error(transparent)]
    Upstream(anyhow::Error),
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
    #[error("codec failure: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("request {id} timed out after {after:?}")]
    TimedOut { id: RequestId, after: Duration },
    #[error("invocation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl InvokeError {
    /// Returns the upstream cause when the function itself failed.
    pub fn upstream(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Upstream(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::HarnessUnavailable(_))
    }
}

impl From<serde_json::Error> for InvokeError {
    fn from(source: serde_json::Error) -> Self {
        InvokeError::Codec(Box::new(source))
    }
}
