// Worker Shutdown Token

use tokio::sync::watch;

/// Shutdown signal for graceful termination
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    ///
    /// Resolves immediately if shutdown was already requested, or once the
    /// sender is gone.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to all workers
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_after_shutdown_is_immediate() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());

        tx.shutdown();
        assert!(token.is_shutdown());

        // Repeated waits never hang once shutdown was requested
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clones_observe_shutdown() {
        let (tx, token) = shutdown_channel();
        let mut clones: Vec<_> = (0..3).map(|_| token.clone()).collect();

        let waiter = tokio::spawn(async move {
            for clone in clones.iter_mut() {
                clone.wait().await;
            }
        });

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
