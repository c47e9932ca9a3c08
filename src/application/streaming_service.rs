// Streaming service - Live dashboard feed of state changes and notifications
use crate::application::refresh_loop::{DashboardState, Notification};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

const STREAM_BUFFER: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum StreamMessage {
    State(DashboardState),
    Notification(Notification),
    /// The client fell behind and this many notifications were dropped
    Lagged { missed: u64 },
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    state_rx: tokio::sync::watch::Receiver<DashboardState>,
    notify_tx: broadcast::Sender<Notification>,
}

impl StreamingDashboardService {
    pub fn new(
        state_rx: tokio::sync::watch::Receiver<DashboardState>,
        notify_tx: broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            state_rx,
            notify_tx,
        }
    }

    pub fn latest(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }

    /// The current state is queued first, then every later change and
    /// notification until the client goes away or the refresh loop stops.
    pub fn stream_dashboard(&self) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let mut state_rx = self.state_rx.clone();
        let mut notify_rx = self.notify_tx.subscribe();

        let current = state_rx.borrow_and_update().clone();
        // Fresh channel with spare capacity
        let _ = tx.try_send(StreamMessage::State(current));

        tokio::spawn(async move {
            let mut notify_open = true;

            loop {
                let msg = tokio::select! {
                    biased;
                    changed = state_rx.changed() => match changed {
                        Ok(()) => StreamMessage::State(state_rx.borrow_and_update().clone()),
                        // Refresh loop stopped
                        Err(_) => break,
                    },
                    received = notify_rx.recv(), if notify_open => match received {
                        Ok(notification) => StreamMessage::Notification(notification),
                        Err(RecvError::Lagged(missed)) => StreamMessage::Lagged { missed },
                        Err(RecvError::Closed) => {
                            notify_open = false;
                            continue;
                        }
                    },
                    _ = tx.closed() => break,
                };

                if tx.send(msg).await.is_err() {
                    break;
                }
            }

            tracing::debug!("Dashboard stream closed");
        });

        rx
    }
}
