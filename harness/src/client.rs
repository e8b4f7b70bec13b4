// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Call-style entry points for test code.
//!
//! The [`Invoker`] wraps a shared [`Broker`] and a [`Codec`]. It offers four
//! ways to invoke the function under test:
//!
//! | Method | Input | Output |
//! |--------|-------|--------|
//! | [`invoke_raw`](Invoker::invoke_raw) | byte stream | byte stream |
//! | [`invoke`](Invoker::invoke) | typed value | typed value |
//! | [`invoke_json`](Invoker::invoke_json) | JSON string | typed value |
//! | [`invoke_async`](Invoker::invoke_async) | typed value | typed value, awaited |
//!
//! Every entry point blocks (or awaits) until the function completes the
//! request, unless a timeout was configured with
//! [`with_timeout`](Invoker::with_timeout).

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::broker::Broker;
use crate::codec::{Codec, JsonCodec};
use crate::constants::RAW_INPUT_BUFFER_CAPACITY;
use crate::errors::InvokeError;

#[derive(Debug, Clone)]
pub struct Invoker<C = JsonCodec> {
    broker: Arc<Broker>,
    codec: C,
    timeout: Option<Duration>,
}

impl Invoker<JsonCodec> {
    /// Creates an invoker with the default JSON codec and no timeout.
    pub fn new(broker: Arc<Broker>) -> Self {
        Self::with_codec(broker, JsonCodec::default())
    }
}

impl<C: Codec> Invoker<C> {
    pub fn with_codec(broker: Arc<Broker>, codec: C) -> Self {
        Self {
            broker,
            codec,
            timeout: None,
        }
    }

    /// Bounds every call made through this invoker. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Submits raw bytes and returns the raw reply.
    pub fn invoke_bytes(&self, payload: Vec<u8>) -> Result<Vec<u8>, InvokeError> {
        match self.timeout {
            Some(timeout) => self.broker.submit_timeout(payload, timeout),
            None => self.broker.submit(payload),
        }
    }

    /// Reads `input` to the end, submits it and writes the reply to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Transport`] if reading the input or writing the
    /// output fails, in addition to the errors of [`Broker::submit`].
    #[tracing::instrument(skip(self, input, output))]
    pub fn invoke_raw<R: Read, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), InvokeError> {
        if let Some(problem) = self.broker.problem() {
            return Err(InvokeError::HarnessUnavailable(problem.to_string()));
        }

        let mut payload = Vec::with_capacity(RAW_INPUT_BUFFER_CAPACITY);
        input.read_to_end(&mut payload)?;

        let response = self.invoke_bytes(payload)?;

        output.write_all(&response)?;
        output.flush()?;

        tracing::trace!("[invoker] wrote response ({} bytes)", response.len());

        Ok(())
    }

    /// Encodes `input` with the codec, submits it and decodes the reply as `R`.
    #[tracing::instrument(skip(self, input))]
    pub fn invoke<T, R>(&self, input: &T) -> Result<R, InvokeError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if let Some(problem) = self.broker.problem() {
            return Err(InvokeError::HarnessUnavailable(problem.to_string()));
        }

        let payload = self.codec.encode(input)?;
        let response = self.invoke_bytes(payload)?;
        self.codec.decode(&response)
    }

    /// Submits an already serialized JSON document and decodes the reply as `R`.
    ///
    /// The document is passed through untouched.
    #[tracing::instrument(skip(self, json))]
    pub fn invoke_json<R: DeserializeOwned>(&self, json: &str) -> Result<R, InvokeError> {
        let response = self.invoke_bytes(json.as_bytes().to_vec())?;
        self.codec.decode(&response)
    }
}

impl<C> Invoker<C>
where
    C: Codec + Clone + 'static,
{
    /// Async form of [`invoke`](Self::invoke).
    ///
    /// The blocking wait runs on tokio's blocking pool so the calling task's
    /// worker thread stays free.
    pub async fn invoke_async<T, R>(&self, input: &T) -> Result<R, InvokeError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        let payload = self.codec.encode(input)?;
        let invoker = self.clone();

        let response =
            tokio::task::spawn_blocking(move || invoker.invoke_bytes(payload)).await??;

        self.codec.decode(&response)
    }
}
