//! Strictly serial execution of deferred extension operations.

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::Result;

/// A deferred operation. Nothing runs until the sequencer calls it.
pub type Task<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a>;

/// Wrap an async closure as a [`Task`].
pub fn task<'a, F, Fut>(f: F) -> Task<'a>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: std::future::Future<Output = Result<()>> + Send + 'a,
{
    Box::new(move || Box::pin(f()) as BoxFuture<'a, Result<()>>)
}

/// Run `tasks` one at a time in order.
///
/// A task is only created once its predecessor has settled. The first
/// failure is returned and the remaining tasks are dropped without running.
pub async fn run_sequence(tasks: Vec<Task<'_>>) -> Result<()> {
    let total = tasks.len();
    for (index, task) in tasks.into_iter().enumerate() {
        debug!("Running task {}/{}", index + 1, total);
        if let Err(e) = task().await {
            debug!(
                "Task {}/{} failed, skipping {} remaining",
                index + 1,
                total,
                total - index - 1
            );
            return Err(e);
        }
    }
    Ok(())
}
