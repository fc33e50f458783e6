//! # Race Coordinator
//!
//! Runs a background operation alongside a watcher whose only job is to
//! notice a cancel request. Both share one fresh `CancellationToken`:
//!
//! ```text
//!   op(token) ───────────────┐
//!                            ├─ first to finish ─▶ token.cancel() ─▶ await the other
//!   watcher(token) ──────────┘
//! ```
//!
//! The coordinator never returns before both sides have finished. An op that
//! ignores its token after the watcher fires will keep the coordinator
//! waiting; that is a broken op, not something handled here.

use std::future::Future;

use log::debug;
use tokio_util::sync::CancellationToken;

/// Races `op` against `watcher` and returns `op`'s result.
///
/// When the watcher resolves first, `op` is asked to stop through the token
/// and is expected to return promptly with whatever it has (an empty value,
/// `None`, `Err(Cancelled)`). When `op` resolves first, the watcher is asked to
/// stop the same way. A tie goes to `op`.
pub async fn run_until_cancelled<T, Op, OpFut, Watch, WatchFut>(op: Op, watcher: Watch) -> T
where
    Op: FnOnce(CancellationToken) -> OpFut,
    OpFut: Future<Output = T>,
    Watch: FnOnce(CancellationToken) -> WatchFut,
    WatchFut: Future<Output = ()>,
{
    let token = CancellationToken::new();
    let op = op(token.clone());
    let watcher = watcher(token.clone());
    tokio::pin!(op);
    tokio::pin!(watcher);

    tokio::select! {
        biased;
        result = &mut op => {
            token.cancel();
            watcher.await;
            result
        }
        _ = &mut watcher => {
            debug!("Cancel requested, waiting for background operation to stop");
            token.cancel();
            op.await
        }
    }
}
