// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! The emulated function runtime: the single consumer of a [`Broker`].
//!
//! [`Runtime::start`] builds the handler, then spawns one thread that drains
//! the broker in FIFO order and completes each request with the handler's
//! result. If the handler cannot be built the broker is poisoned, so every
//! later call from test code fails fast instead of blocking forever.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::anyhow;
use crossbeam_channel::{Receiver, Sender, bounded};
use invoke_harness::broker::{Broker, Invocation, Outcome};
use invoke_harness::client::Invoker;

use crate::constants::RUNTIME_THREAD_NAME;
use crate::errors::RuntimeError;
use crate::handlers::Handler;

pub struct Runtime;

impl Runtime {
    /// Builds the handler with `factory` and starts the consumer thread.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::Startup`] if `factory` fails; the broker is poisoned
    /// - [`RuntimeError::Spawn`] if the thread cannot be created; the broker
    ///   is poisoned
    #[tracing::instrument(skip(broker, factory))]
    pub fn start<H, F>(broker: Arc<Broker>, factory: F) -> Result<RuntimeHandle, RuntimeError>
    where
        H: Handler,
        F: FnOnce() -> anyhow::Result<H>,
    {
        let handler = match factory() {
            Ok(handler) => handler,
            Err(err) => {
                tracing::error!("[runtime] handler failed to start: {:#}", err);
                broker.poison(format!("{err:#}"));
                return Err(RuntimeError::Startup(err));
            }
        };

        let (stop_tx, stop_rx) = bounded(1);
        let consumer = broker.clone();
        let thread = thread::Builder::new()
            .name(RUNTIME_THREAD_NAME.to_string())
            .spawn(move || run(&consumer, &handler, &stop_rx))
            .map_err(|err| {
                broker.poison(format!("failed to spawn runtime thread: {err}"));
                RuntimeError::Spawn(err)
            })?;

        tracing::debug!("[runtime] started");

        Ok(RuntimeHandle {
            broker,
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Owns the consumer thread. Dropping the handle stops it.
///
/// Requests still queued when the runtime stops are left untouched; their
/// callers keep waiting unless they set a timeout.
pub struct RuntimeHandle {
    broker: Arc<Broker>,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RuntimeHandle {
    /// An [`Invoker`] over this runtime's broker with the JSON codec.
    pub fn invoker(&self) -> Invoker {
        Invoker::new(self.broker.clone())
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the consumer loop and waits for the thread to exit.
    pub fn shutdown(mut self) -> Result<(), RuntimeError> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<(), RuntimeError> {
        // Disconnecting the stop channel wakes the loop.
        self.stop.take();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| RuntimeError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for RuntimeHandle {
    fn drop(&mut self) {
        if let Err(err) = self.stop_and_join() {
            tracing::error!("[runtime] {}", err);
        }
    }
}

/// Drains `broker` until `stop` fires or disconnects.
#[tracing::instrument(skip_all)]
pub fn run<H: Handler>(broker: &Broker, handler: &H, stop: &Receiver<()>) {
    tracing::debug!("[runtime] waiting for invocations");

    while let Some(invocation) = broker.take_until(stop) {
        let id = invocation.id;
        let outcome = handle_invocation(handler, &invocation);
        if !broker.complete(id, outcome) {
            tracing::debug!("[runtime] {} was no longer pending", id);
        }
    }

    tracing::debug!("[runtime] finished");
}

/// Runs the handler, turning a panic into a failure outcome.
pub fn handle_invocation<H: Handler>(handler: &H, invocation: &Invocation) -> Outcome {
    tracing::trace!(
        "[runtime] handling {} ({} bytes)",
        invocation.id,
        invocation.payload.len()
    );

    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&invocation.payload))) {
        Ok(result) => Outcome::from(result),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("[runtime] handler panicked on {}: {}", invocation.id, message);
            Outcome::Failure(anyhow!("handler panicked: {message}"))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
