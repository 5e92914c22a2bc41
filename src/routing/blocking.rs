//! Bridge from the suspend-capable routing flow to blocking callers.
//!
//! Web handlers and plain `fn main` callers cannot await, and may or may not
//! already sit inside a Tokio runtime. This module keeps that adaptation in
//! one place so the routing logic stays execution-model-agnostic.

use std::future::Future;

use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tracing::debug;

use crate::base::types::Res;

/// Drive a future to completion from a blocking context.
///
/// Three situations are handled:
/// - No runtime on this thread: build a single-use current-thread runtime,
///   run the future, and tear it down.
/// - Inside a multi-thread runtime: the runtime cannot be re-entered with a
///   plain `block_on`, so hand this worker to `block_in_place` and block on
///   the runtime handle.
/// - Inside a current-thread runtime: `block_in_place` is unavailable, so
///   drive the future on a fresh runtime owned by a scoped thread.
pub fn run_blocking<F>(future: F) -> Res<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Ok(handle) if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) => {
            debug!("Blocking inside the active multi-thread runtime.");
            Ok(tokio::task::block_in_place(move || handle.block_on(future)))
        }
        Ok(_) => {
            debug!("Active runtime cannot be re-entered; using a nested single-use runtime.");
            std::thread::scope(|scope| {
                scope
                    .spawn(move || {
                        let runtime = Builder::new_current_thread().enable_all().build()?;
                        Ok(runtime.block_on(future))
                    })
                    .join()
                    .map_err(|_| anyhow::anyhow!("nested runtime thread panicked"))?
            })
        }
        Err(_) => {
            debug!("No active runtime; creating a single-use runtime.");
            let runtime = Builder::new_current_thread().enable_all().build()?;
            Ok(runtime.block_on(future))
        }
    }
}
