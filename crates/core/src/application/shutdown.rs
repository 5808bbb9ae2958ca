// Stop signal for batch runs and the daemon

use tokio::sync::watch;

/// Receiving side of a stop signal
#[derive(Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    /// Check if a stop was requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the stop signal
    pub async fn wait(&mut self) {
        // Err means the sender is gone; treat that as "never stopping"
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sending side of a stop signal
pub struct StopSender {
    tx: watch::Sender<bool>,
}

impl StopSender {
    /// Signal stop to every token holder
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a stop channel
pub fn stop_channel() -> (StopSender, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopSender { tx }, StopToken { rx })
}
