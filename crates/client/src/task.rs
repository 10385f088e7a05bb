//! Detached background work whose outcome nobody awaits.

use std::fmt::Display;
use std::future::Future;

use tokio::task::JoinHandle;

/// Run `future` in the background, logging its failure.
pub fn fire_and_forget<F, T, E>(name: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    fire_and_forget_with(name, future, |_| {})
}

/// Like [`fire_and_forget`], additionally passing the error to `on_error`.
pub fn fire_and_forget_with<F, T, E, H>(name: &'static str, future: F, on_error: H) -> JoinHandle<()>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    H: FnOnce(&E) + Send + 'static,
{
    tokio::spawn(async move {
        match future.await {
            Ok(_) => tracing::debug!(task = name, "Background task finished"),
            Err(e) => {
                tracing::warn!(task = name, error = %e, "Background task failed");
                on_error(&e);
            }
        }
    })
}
