//! Handle for background polling tasks

use tokio::task::JoinHandle;

/// Owns a spawned polling loop. The loop is aborted when the handle is
/// stopped or dropped, so no further iteration fires after teardown.
#[derive(Debug)]
pub struct PollingHandle {
    handle: Option<JoinHandle<()>>,
}

impl PollingHandle {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Abort the loop and wait until it has fully unwound
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
