// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Single-assignment result cell shared between one producer and the consumer.
//!
//! A [`Slot`] starts unset. The first call to [`Slot::fulfill`] stores the
//! outcome and wakes the waiting producer; every later call is rejected. The
//! producer consumes the stored outcome exactly once through [`Slot::wait`] or
//! [`Slot::wait_timeout`].

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::broker::Outcome;

enum SlotState {
    Unset,
    Fulfilled(Outcome),
    Taken,
}

pub struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}

impl Slot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Unset),
            ready: Condvar::new(),
        }
    }

    /// Stores `outcome` if the slot is still unset.
    ///
    /// Returns `false` when the slot was already written; the earlier outcome
    /// is left untouched.
    pub fn fulfill(&self, outcome: Outcome) -> bool {
        let mut state = self.state.lock();
        if !matches!(*state, SlotState::Unset) {
            return false;
        }
        *state = SlotState::Fulfilled(outcome);
        drop(state);
        self.ready.notify_all();
        true
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(*self.state.lock(), SlotState::Unset)
    }

    /// Blocks until the slot is fulfilled and takes the outcome.
    ///
    /// Returns `None` only if the outcome was already taken by an earlier wait.
    pub fn wait(&self) -> Option<Outcome> {
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Unset) {
            self.ready.wait(&mut state);
        }
        take_outcome(&mut state)
    }

    /// Like [`wait`](Self::wait) but gives up once `timeout` has elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while matches!(*state, SlotState::Unset) {
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        take_outcome(&mut state)
    }
}

fn take_outcome(state: &mut SlotState) -> Option<Outcome> {
    match std::mem::replace(state, SlotState::Taken) {
        SlotState::Fulfilled(outcome) => Some(outcome),
        SlotState::Unset => {
            *state = SlotState::Unset;
            None
        }
        SlotState::Taken => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::thread;

    fn success(bytes: &[u8]) -> Outcome {
        Outcome::Success(bytes.to_vec())
    }

    #[test]
    fn test_new_slot_is_unset() {
        let slot = Slot::new();
        assert!(!slot.is_resolved());
    }

    #[test]
    fn test_fulfill_then_wait() {
        let slot = Slot::new();
        assert!(slot.fulfill(success(b"pong")));
        assert!(slot.is_resolved());

        match slot.wait() {
            Some(Outcome::Success(bytes)) => assert_eq!(bytes, b"pong"),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_second_fulfill_is_rejected() {
        let slot = Slot::new();
        assert!(slot.fulfill(success(b"first")));
        assert!(!slot.fulfill(success(b"second")));
        assert!(!slot.fulfill(Outcome::Failure(anyhow!("late failure"))));

        match slot.wait() {
            Some(Outcome::Success(bytes)) => assert_eq!(bytes, b"first"),
            _ => panic!("expected the first outcome"),
        }
    }

    #[test]
    fn test_outcome_is_consumed_once() {
        let slot = Slot::new();
        slot.fulfill(success(b"once"));
        assert!(slot.wait().is_some());
        assert!(slot.wait().is_none());
        // a taken slot still counts as written
        assert!(!slot.fulfill(success(b"again")));
    }

    #[test]
    fn test_wait_blocks_until_fulfilled_from_other_thread() {
        let slot = Arc::new(Slot::new());
        let writer = slot.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.fulfill(success(b"late"))
        });

        match slot.wait() {
            Some(Outcome::Success(bytes)) => assert_eq!(bytes, b"late"),
            _ => panic!("expected success"),
        }
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wait_timeout_expires_and_leaves_slot_unset() {
        let slot = Slot::new();
        assert!(slot.wait_timeout(Duration::from_millis(10)).is_none());
        assert!(!slot.is_resolved());
        assert!(slot.fulfill(success(b"after")));
    }

    #[test]
    fn test_wait_timeout_returns_failure() {
        let slot = Slot::new();
        slot.fulfill(Outcome::Failure(anyhow!("boom")));
        match slot.wait_timeout(Duration::from_secs(1)) {
            Some(Outcome::Failure(err)) => assert_eq!(err.to_string(), "boom"),
            _ => panic!("expected failure"),
        }
    }
}
