//! Callback-to-future adaptation.
//!
//! Driver primitives follow the trailing-callback convention: the operation
//! takes its positional arguments plus a completion handle, and reports its
//! outcome by resolving or rejecting that handle. [`once`] turns such an
//! operation into an ordinary awaitable, built on a single-shot result
//! channel.
//!
//! Exactly one of success or failure is produced per invocation. Move
//! semantics on [`Completion`] make double resolution impossible, and a
//! handle dropped without being resolved surfaces as a synthesized
//! [`DriverError`] rather than a hang.

use crate::error::DriverError;
use tokio::sync::oneshot;

/// Single-shot completion handle passed to a callback-style operation.
///
/// The handle is consumed by [`resolve`](Completion::resolve),
/// [`reject`](Completion::reject), or [`complete`](Completion::complete);
/// an operation can therefore report its outcome at most once.
#[derive(Debug)]
pub struct Completion<T> {
    tx: oneshot::Sender<Result<T, DriverError>>,
}

impl<T> Completion<T> {
    /// Report success with `value`.
    pub fn resolve(self, value: T) {
        // The awaiting side may have been dropped; nothing to do then.
        let _ = self.tx.send(Ok(value));
    }

    /// Report failure with `error`.
    pub fn reject(self, error: DriverError) {
        let _ = self.tx.send(Err(error));
    }

    /// Report an outcome already expressed as a `Result`.
    pub fn complete(self, result: Result<T, DriverError>) {
        let _ = self.tx.send(result);
    }
}

/// Run a callback-style operation and await its single outcome.
///
/// `start` receives the completion handle and kicks off the operation; the
/// operation's positional arguments travel inside the closure, so their
/// count never needs to be declared separately. The returned future resolves
/// when the handle is resolved or rejected, or fails with a synthesized
/// error if the operation drops the handle without reporting anything.
///
/// ```ignore
/// let conn = adapter::once(|done| pool.get_connection(done)).await?;
/// ```
pub async fn once<T, F>(start: F) -> Result<T, DriverError>
where
    F: FnOnce(Completion<T>),
{
    let (tx, rx) = oneshot::channel();
    start(Completion { tx });
    match rx.await {
        Ok(result) => result,
        Err(_) => Err(DriverError::new(
            "driver dropped the completion handle without reporting a result",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_with_value() {
        let result = once(|done: Completion<u32>| done.resolve(7)).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_rejects_with_error() {
        let result =
            once(|done: Completion<u32>| done.reject(DriverError::new("wire fault"))).await;
        assert_eq!(result.unwrap_err().message(), "wire fault");
    }

    #[tokio::test]
    async fn test_dropped_handle_is_an_error() {
        let result = once(|done: Completion<u32>| drop(done)).await;
        let err = result.unwrap_err();
        assert!(err.message().contains("without reporting a result"));
    }

    #[tokio::test]
    async fn test_resolution_from_spawned_task() {
        let result = once(|done: Completion<&'static str>| {
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                done.resolve("late");
            });
        })
        .await;
        assert_eq!(result.unwrap(), "late");
    }

    #[tokio::test]
    async fn test_complete_passes_result_through() {
        let ok = once(|done: Completion<u32>| done.complete(Ok(1))).await;
        assert_eq!(ok.unwrap(), 1);
        let err =
            once(|done: Completion<u32>| done.complete(Err(DriverError::new("nope")))).await;
        assert!(err.is_err());
    }
}
