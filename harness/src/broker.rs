// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Request/response correlation between test callers and a function runtime.
//!
//! This module provides the [`Broker`], which gives test code a synchronous,
//! call-style interface over a single asynchronous processing loop.
//!
//! # Request Lifecycle
//!
//! 1. **Submit**: a producer calls [`submit`](Broker::submit). A fresh
//!    [`RequestId`] is generated, an unset [`Slot`] is registered under it and
//!    the [`Invocation`] is appended to the FIFO queue
//! 2. **Take**: the single consumer removes the head of the queue with
//!    [`take`](Broker::take)
//! 3. **Complete**: the consumer resolves the slot with
//!    [`complete`](Broker::complete), waking the blocked producer
//!
//! Per identifier: `CREATED -> ENQUEUED -> (COMPLETED | FAILED)`.
//!
//! # Correlation
//!
//! Replies are matched by identifier, never by position, so the consumer may
//! complete requests in any order. Completing an unknown or already completed
//! identifier is a silent no-op.
//!
//! # Poisoning
//!
//! [`poison`](Broker::poison) records a start-up failure once. From then on
//! every [`submit`](Broker::submit) fails with
//! [`InvokeError::HarnessUnavailable`] before anything is enqueued.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, unbounded};
use dashmap::DashMap;

use crate::constants::{FIRST_REQUEST_ID, PENDING_TABLE_CAPACITY, REQUEST_ID_PREFIX};
use crate::errors::InvokeError;
use crate::slot::Slot;

/// Identifier of one submission, unique within its broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", REQUEST_ID_PREFIX, self.0)
    }
}

/// A request as seen by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub id: RequestId,
    pub payload: Vec<u8>,
}

/// How the consumer resolved a request.
#[derive(Debug)]
pub enum Outcome {
    Success(Vec<u8>),
    Failure(anyhow::Error),
}

impl From<anyhow::Result<Vec<u8>>> for Outcome {
    fn from(result: anyhow::Result<Vec<u8>>) -> Self {
        match result {
            Ok(bytes) => Outcome::Success(bytes),
            Err(err) => Outcome::Failure(err),
        }
    }
}

/// Correlates blocking submissions with completions from a single consumer.
///
/// Share one instance between producers and the consumer through an [`Arc`].
pub struct Broker {
    next_id: AtomicU64,
    /// In-flight slots, removed when completed or withdrawn.
    pending: DashMap<RequestId, Arc<Slot>>,
    queue_tx: Sender<Invocation>,
    queue_rx: Receiver<Invocation>,
    problem: OnceLock<String>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("pending", &self.pending.len())
            .field("queued", &self.queue_rx.len())
            .field("problem", &self.problem.get())
            .finish()
    }
}

impl Broker {
    /// Creates a broker with an empty queue and no pending requests.
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = unbounded();
        Self {
            next_id: AtomicU64::new(FIRST_REQUEST_ID),
            pending: DashMap::with_capacity(PENDING_TABLE_CAPACITY),
            queue_tx,
            queue_rx,
            problem: OnceLock::new(),
        }
    }

    /// Submits `payload` and blocks until the consumer completes it.
    ///
    /// There is no timeout: the call waits for as long as the consumer takes.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::HarnessUnavailable`] if the broker is poisoned
    /// - [`InvokeError::Upstream`] if the consumer completed with a failure
    pub fn submit(&self, payload: Vec<u8>) -> Result<Vec<u8>, InvokeError> {
        let (id, slot) = self.enqueue(payload)?;
        let outcome = slot.wait();
        resolve(id, outcome)
    }

    /// Like [`submit`](Self::submit) but gives up after `timeout`.
    ///
    /// On timeout the slot is withdrawn, so a later completion for the same
    /// identifier is ignored.
    ///
    /// # Errors
    ///
    /// As [`submit`](Self::submit), plus [`InvokeError::TimedOut`].
    pub fn submit_timeout(
        &self,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, InvokeError> {
        let (id, slot) = self.enqueue(payload)?;
        match slot.wait_timeout(timeout) {
            Some(outcome) => resolve(id, Some(outcome)),
            None => self.withdraw(id, &slot, timeout),
        }
    }

    /// Gives up on `id` after its deadline passed.
    ///
    /// A consumer that already removed the entry may still be about to write
    /// the slot. Closing the slot decides the race: if the consumer wrote
    /// first, its outcome is returned instead of [`InvokeError::TimedOut`].
    fn withdraw(
        &self,
        id: RequestId,
        slot: &Slot,
        timeout: Duration,
    ) -> Result<Vec<u8>, InvokeError> {
        self.pending.remove(&id);
        if slot.fulfill(Outcome::Failure(anyhow::anyhow!("withdrawn"))) {
            tracing::debug!("[broker] {} timed out after {:?}", id, timeout);
            Err(InvokeError::TimedOut { id, after: timeout })
        } else {
            tracing::debug!("[broker] {} completed while timing out", id);
            resolve(id, slot.wait())
        }
    }

    fn enqueue(&self, payload: Vec<u8>) -> Result<(RequestId, Arc<Slot>), InvokeError> {
        if let Some(problem) = self.problem.get() {
            return Err(InvokeError::HarnessUnavailable(problem.clone()));
        }

        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let slot = Arc::new(Slot::new());
        self.pending.insert(id, slot.clone());

        tracing::trace!("[broker] enqueueing {} ({} bytes)", id, payload.len());

        // Both channel ends live in `self`, so the send cannot fail.
        let _ = self.queue_tx.send(Invocation { id, payload });

        Ok((id, slot))
    }

    /// Removes the oldest request from the queue, blocking while it is empty.
    pub fn take(&self) -> Invocation {
        loop {
            if let Ok(invocation) = self.queue_rx.recv() {
                tracing::trace!("[broker] took {}", invocation.id);
                return invocation;
            }
        }
    }

    /// Like [`take`](Self::take) but returns `None` once `stop` receives a
    /// message or is disconnected.
    pub fn take_until(&self, stop: &Receiver<()>) -> Option<Invocation> {
        select! {
            recv(self.queue_rx) -> invocation => invocation
                .ok()
                .inspect(|invocation| tracing::trace!("[broker] took {}", invocation.id)),
            recv(stop) -> _ => None,
        }
    }

    /// Removes the oldest request without blocking.
    pub fn try_take(&self) -> Option<Invocation> {
        self.queue_rx.try_recv().ok()
    }

    /// Resolves the slot registered for `id`.
    ///
    /// Returns `true` if this call resolved it. Unknown identifiers and
    /// identifiers that were already completed are ignored.
    pub fn complete(&self, id: RequestId, outcome: Outcome) -> bool {
        match self.pending.remove(&id) {
            Some((_, slot)) => {
                let resolved = slot.fulfill(outcome);
                tracing::trace!("[broker] completed {} (resolved: {})", id, resolved);
                resolved
            }
            None => {
                tracing::debug!("[broker] ignoring completion for unknown {}", id);
                false
            }
        }
    }

    /// Marks the broker unusable. Only the first cause is kept.
    ///
    /// Returns `true` if this call set the flag.
    pub fn poison(&self, cause: impl fmt::Display) -> bool {
        let set = self.problem.set(cause.to_string()).is_ok();
        if set {
            tracing::warn!("[broker] poisoned: {}", self.problem().unwrap_or_default());
        }
        set
    }

    pub fn is_poisoned(&self) -> bool {
        self.problem.get().is_some()
    }

    /// The cause recorded by [`poison`](Self::poison), if any.
    pub fn problem(&self) -> Option<&str> {
        self.problem.get().map(String::as_str)
    }

    /// Number of submissions still waiting for a completion.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of submissions not yet taken by the consumer.
    pub fn queued(&self) -> usize {
        self.queue_rx.len()
    }
}

fn resolve(id: RequestId, outcome: Option<Outcome>) -> Result<Vec<u8>, InvokeError> {
    match outcome {
        Some(Outcome::Success(bytes)) => Ok(bytes),
        Some(Outcome::Failure(cause)) => Err(InvokeError::Upstream(cause)),
        None => Err(InvokeError::Upstream(anyhow::anyhow!(
            "response for {} was already consumed",
            id
        ))),
    }
}
