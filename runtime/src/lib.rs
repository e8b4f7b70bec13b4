// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # Function Runtime
//!
//! The consumer side of the invoke harness: hosts a function handler and
//! answers requests submitted through an [`invoke_harness::broker::Broker`].
//!
//! ## Modules
//!
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: configuration constants for the runtime
//! - [`errors`]: runtime error types
//! - [`handlers`]: the [`Handler`](handlers::Handler) trait and built-in handlers
//! - [`runtime`]: the consumer loop and its lifecycle
//! - [`serve`]: one reply line per request line, used by the binary

pub mod configuration;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod runtime;
pub mod serve;
