//! Fire-and-forget click tracking
//!
//! A single actor task owns the resolver and the storage handle. Request
//! handlers enqueue with `try_send` and never wait on the outcome; resolution
//! and write failures are logged here and go no further.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::analytics::models::ClickContext;
use crate::analytics::resolver::ClickResolver;
use crate::storage::Storage;

enum TrackerMessage {
    Track(ClickContext),
    /// Drain queued clicks, then acknowledge
    Shutdown(oneshot::Sender<()>),
}

struct TrackerWorker {
    receiver: mpsc::Receiver<TrackerMessage>,
    storage: Arc<dyn Storage>,
    resolver: ClickResolver,
}

impl TrackerWorker {
    async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            match message {
                TrackerMessage::Track(context) => self.record(context).await,
                TrackerMessage::Shutdown(ack) => {
                    info!("Click tracker received shutdown signal, draining queue...");
                    self.drain().await;
                    let _ = ack.send(());
                    return;
                }
            }
        }
        debug!("Click tracker channel closed");
    }

    async fn drain(&mut self) {
        self.receiver.close();
        let mut drained = 0usize;
        while let Some(message) = self.receiver.recv().await {
            match message {
                TrackerMessage::Track(context) => {
                    self.record(context).await;
                    drained += 1;
                }
                TrackerMessage::Shutdown(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        info!(drained, "Click tracker drained");
    }

    async fn record(&self, context: ClickContext) {
        let event = self.resolver.resolve(&context);
        match self.storage.record_click(&event).await {
            Ok(()) => debug!(link_id = event.link_id, "recorded click"),
            Err(e) => error!(link_id = event.link_id, error = %e, "failed to record click"),
        }
    }
}

/// Handle to the click tracking task
#[derive(Clone)]
pub struct ClickTracker {
    sender: mpsc::Sender<TrackerMessage>,
}

impl ClickTracker {
    /// Spawn the tracker task on the current tokio runtime
    pub fn spawn(storage: Arc<dyn Storage>, resolver: ClickResolver, buffer_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));

        let worker = TrackerWorker {
            receiver,
            storage,
            resolver,
        };
        tokio::spawn(worker.run());

        Self { sender }
    }

    /// Queue a click without waiting. Returns whether it was accepted.
    pub fn track(&self, context: ClickContext) -> bool {
        let link_id = context.link_id;
        match self.sender.try_send(TrackerMessage::Track(context)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(link_id, "Click tracker buffer full, dropping click");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(link_id, "Click tracker is shut down, dropping click");
                false
            }
        }
    }

    /// Stop accepting clicks and wait until queued ones are written
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .sender
            .send(TrackerMessage::Shutdown(ack_tx))
            .await
            .is_err()
        {
            return;
        }
        let _ = ack_rx.await;
    }
}
