// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;

use clap::Parser;
use function_runtime::configuration::RuntimeOptions;
use function_runtime::constants::DEFAULT_LOG_FILTER;
use function_runtime::errors::RuntimeError;
use function_runtime::runtime::Runtime;
use function_runtime::serve::serve;
use invoke_harness::broker::Broker;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RuntimeError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        // stdout carries the responses
        .with_writer(std::io::stderr)
        .with_current_span(false)
        .with_ansi(false)
        .with_target(false)
        .init();

    let options = RuntimeOptions::parse();

    tracing::info!("[runtime] {:?}", &options);

    let broker = Arc::new(Broker::new());
    let handler = options.handler.handler();
    let runtime = Runtime::start(broker, move || Ok(handler))?;
    let invoker = runtime.invoker().with_timeout(options.timeout());

    let answered = serve(&invoker, std::io::stdin().lock(), std::io::stdout().lock())?;

    tracing::info!("[runtime] input closed after {} requests, shutting down", answered);

    runtime.shutdown()
}
