// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Line-oriented front end used by the `function-runtime` binary.
//!
//! Every input line is one invocation and produces exactly one output line:
//! the raw response on success, or `{"error":"..."}` on failure. Output line
//! `n` always answers input line `n`.

use std::io::{BufRead, Write};

use invoke_harness::client::Invoker;
use invoke_harness::codec::Codec;
use invoke_harness::errors::InvokeError;
use serde_json::json;

use crate::errors::RuntimeError;

/// Answers each line of `input` on `output` until `input` is exhausted.
///
/// Returns the number of lines answered.
///
/// # Errors
///
/// - [`RuntimeError::Io`] if reading a line or writing a reply fails
/// - [`RuntimeError::Invoke`] if the broker is poisoned; the error reply for
///   the current line is written first, since no later line can succeed
#[tracing::instrument(skip_all)]
pub fn serve<C, R, W>(
    invoker: &Invoker<C>,
    input: R,
    mut output: W,
) -> Result<usize, RuntimeError>
where
    C: Codec,
    R: BufRead,
    W: Write,
{
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        let result = invoker.invoke_bytes(line.into_bytes());

        match &result {
            Ok(response) => output.write_all(response)?,
            Err(err) => {
                tracing::error!("[runtime] invocation failed: {:#}", err);
                output.write_all(&error_line(err))?;
            }
        }
        output.write_all(b"\n")?;
        output.flush()?;
        answered += 1;

        match result {
            Err(err) if err.is_unavailable() => return Err(RuntimeError::Invoke(err)),
            _ => {}
        }
    }

    Ok(answered)
}

fn error_line(err: &InvokeError) -> Vec<u8> {
    json!({ "error": format!("{err:#}") }).to_string().into_bytes()
}
