use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation flag shared by every task in a pipeline run.
///
/// Clones are cheap and all observe the same flag. Cancelling is idempotent:
/// the first call flips the flag, later calls are no-ops. Waiters registered
/// before or after the flip all resolve.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<watch::Sender<bool>>,
    watch: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (flag, watch) = watch::channel(false);
        CancellationToken {
            flag: Arc::new(flag),
            watch,
        }
    }

    /// Requests cancellation. Callable from any task, any number of times.
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.watch.borrow()
    }

    /// Resolves once cancellation has been requested, immediately if the
    /// flag is already set.
    pub async fn cancelled(&self) {
        let mut watch = self.watch.clone();
        // Every token clone holds the sender half, so the channel cannot
        // close while `self` is borrowed here.
        let _ = watch.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        CancellationToken::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_visible_to_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_for_late_waiters() {
        let token = CancellationToken::new();
        token.cancel();
        // Must resolve immediately even though the flip happened first.
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_resolves_for_early_waiters() {
        let token = CancellationToken::new();
        let clone = token.clone();
        let waiter = tokio::spawn(async move { clone.cancelled().await });
        tokio::task::yield_now().await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
