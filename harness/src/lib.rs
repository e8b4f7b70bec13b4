// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # Invoke Harness
//!
//! In-process invocation of a serverless function handler from test code.
//!
//! A test thread submits a request and blocks; the function runtime's event
//! loop takes requests one at a time, runs the handler and completes the
//! matching request by its identifier.
//!
//! ## Architecture
//!
//! ```text
//! Test threads -> Invoker -> Broker (FIFO queue) -> Runtime loop -> Handler
//!      ^                        |                        |
//!      +---- Slot (by id) <-----+------- complete -------+
//! ```
//!
//! ## Modules
//!
//! - [`broker`]: identifier-indexed pending table, FIFO handoff, poison flag
//! - [`client`]: raw stream, typed, JSON and async invocation entry points
//! - [`codec`]: payload codec trait with the default JSON implementation
//! - [`constants`]: fixed values used across the crate
//! - [`errors`]: the [`InvokeError`](errors::InvokeError) taxonomy
//! - [`models`]: transit encrypt request/response bodies
//! - [`slot`]: single-assignment result cell
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use invoke_harness::broker::{Broker, Outcome};
//! use invoke_harness::client::Invoker;
//!
//! let broker = Arc::new(Broker::new());
//!
//! let consumer = broker.clone();
//! std::thread::spawn(move || {
//!     let invocation = consumer.take();
//!     consumer.complete(invocation.id, Outcome::Success(invocation.payload));
//! });
//!
//! let invoker = Invoker::new(broker);
//! let reply: String = invoker.invoke("ping").unwrap();
//! assert_eq!(reply, "ping");
//! ```

pub mod broker;
pub mod client;
pub mod codec;
pub mod constants;
pub mod errors;
pub mod models;
pub mod slot;
