//! Running a blocking turn so it can be interrupted.

use std::future::Future;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Run `work` on the blocking pool until it finishes or `interrupt` fires.
///
/// On interrupt the token is cancelled and the work is still awaited, so
/// callers always get its result (usually a cancellation error).
pub async fn run_cancellable<T, F, I>(
    cancel: CancellationToken,
    interrupt: I,
    work: F,
) -> Result<T, JoinError>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> T + Send + 'static,
    I: Future<Output = ()>,
{
    let worker_cancel = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || work(worker_cancel));

    tokio::select! {
        joined = &mut handle => joined,
        _ = interrupt => {
            cancel.cancel();
            handle.await
        }
    }
}
