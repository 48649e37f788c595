//! Model service abstraction.
//!
//! The model service owns the live model and the engine that applies
//! scripts to it. It reports the outcome of each script through a
//! completion callback that may fire on any thread.

use hublink_common::error::{HublinkError, Result};
use hublink_model::snapshot::VersionedModel;
use tokio::sync::oneshot;

/// Completion callback for a submitted script: `true` if it was applied.
pub type ApplyCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Owner of the live model and its apply engine.
///
/// Implementors must invoke the callback exactly once per submission.
pub trait ModelService: Send + Sync {
    /// Returns the currently published model.
    fn current_model(&self) -> VersionedModel;

    /// Hands a script to the apply engine.
    ///
    /// Returns immediately; `on_complete` reports the outcome later.
    fn submit_script(&self, script: String, on_complete: ApplyCallback);
}

/// Submits a script and waits for the apply engine's verdict.
///
/// Makes exactly one attempt.
///
/// # Errors
///
/// Returns [`HublinkError::ApplyAbandoned`] if the service drops the
/// callback without invoking it.
pub async fn submit(
    service: &dyn ModelService,
    script: String,
    operation: &'static str,
) -> Result<bool> {
    let (tx, rx) = oneshot::channel();
    service.submit_script(
        script,
        Box::new(move |applied| {
            // The receiver only goes away if the caller stopped waiting.
            let _ = tx.send(applied);
        }),
    );
    rx.await
        .map_err(|_| HublinkError::ApplyAbandoned { operation })
}
