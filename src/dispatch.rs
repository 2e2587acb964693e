//! Blocking and callback entry points over one async core
//!
//! Every operation is implemented once as an `async fn` returning a
//! [`Response`]. [`block_on`] drives such a future to completion for
//! synchronous callers; [`spawn_with`] runs it on the ambient tokio runtime
//! and hands the envelope to a completion closure.

use crate::error::{Error, Result};
use crate::response::Response;
use std::future::Future;
use tokio::runtime::{Builder, Handle, RuntimeFlavor};
use tokio::task::JoinHandle;

/// Run a future to completion on the calling thread
///
/// Outside a runtime a private current-thread runtime is used. Inside a
/// multi-thread runtime the worker is handed off with `block_in_place`.
/// A current-thread runtime cannot be blocked without deadlocking, so that
/// case is reported as an error.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::CurrentThread => Err(Error::config(
                "blocking call from inside a current-thread runtime; use the async API",
            )),
            _ => Ok(tokio::task::block_in_place(|| handle.block_on(future))),
        },
        Err(_) => {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| Error::config(format!("failed to start runtime: {e}")))?;
            Ok(runtime.block_on(future))
        }
    }
}

/// [`block_on`] for envelope-producing futures: errors land in the envelope
pub fn block_on_response<F>(future: F) -> Response
where
    F: Future<Output = Response>,
{
    block_on(future).unwrap_or_else(Response::failure)
}

/// Spawn a future on the current runtime and pass its envelope to `completion`
///
/// Returns immediately. The completion runs on whichever worker finishes the
/// future. Fails when called outside a tokio runtime, in which case the
/// completion is never invoked.
pub fn spawn_with<F, C>(future: F, completion: C) -> Result<JoinHandle<()>>
where
    F: Future<Output = Response> + Send + 'static,
    C: FnOnce(Response) + Send + 'static,
{
    let handle = Handle::try_current()
        .map_err(|e| Error::config(format!("no async runtime for callback dispatch: {e}")))?;

    Ok(handle.spawn(async move {
        let response = future.await;
        completion(response);
    }))
}
