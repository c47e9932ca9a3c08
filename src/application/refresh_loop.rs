// Refresh loop - samples the simulated link on a fixed cadence and publishes snapshots
use crate::application::telemetry_source::SnapshotSource;
use crate::domain::telemetry::{DashboardSnapshot, SurvivorAlert};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const NOTIFICATION_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshConfig {
    pub interval: Duration,
    pub connect_probability: f64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            connect_probability: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Latest snapshot together with the link state it was last seen under
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub snapshot: Arc<DashboardSnapshot>,
    pub connection: ConnectionState,
    /// Bumped once per published snapshot
    pub sequence: u64,
    pub last_tick: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn survivor_detected(alert: &SurvivorAlert) -> Self {
        Self {
            title: "Survivor Detected".to_string(),
            description: format!(
                "{} detection with {} confidence",
                alert.kind, alert.confidence
            ),
            severity: Severity::Destructive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published { sequence: u64, notified: bool },
    Skipped,
}

pub struct RefreshLoop<S: SnapshotSource> {
    source: S,
    rng: StdRng,
    config: RefreshConfig,
    state_tx: watch::Sender<DashboardState>,
    notify_tx: broadcast::Sender<Notification>,
}

impl<S: SnapshotSource> RefreshLoop<S> {
    /// Starts connected with a survivor-free snapshot
    pub fn new(mut source: S, rng: StdRng, config: RefreshConfig) -> Self {
        let initial = DashboardState {
            snapshot: Arc::new(source.generate(false)),
            connection: ConnectionState::Connected,
            sequence: 0,
            last_tick: Utc::now(),
        };
        let (state_tx, _) = watch::channel(initial);
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Self {
            source,
            rng,
            config,
            state_tx,
            notify_tx,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    pub fn notification_sender(&self) -> broadcast::Sender<Notification> {
        self.notify_tx.clone()
    }

    pub fn current(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    pub fn tick(&mut self) -> TickOutcome {
        let connected = self.rng.gen_bool(self.config.connect_probability);

        if !connected {
            tracing::warn!("Rover link lost, keeping previous snapshot");
            self.state_tx.send_if_modified(|state| {
                let changed = state.connection != ConnectionState::Disconnected;
                state.connection = ConnectionState::Disconnected;
                changed
            });
            return TickOutcome::Skipped;
        }

        let snapshot = self.source.generate(true);
        let notification = snapshot.latest_alert().map(Notification::survivor_detected);
        let alert_count = snapshot.survivors.len();

        let sequence = self.state_tx.borrow().sequence + 1;
        self.state_tx.send_replace(DashboardState {
            snapshot: Arc::new(snapshot),
            connection: ConnectionState::Connected,
            sequence,
            last_tick: Utc::now(),
        });

        tracing::debug!("Published snapshot {} with {} survivor alerts", sequence, alert_count);

        let notified = match notification {
            Some(notification) => {
                tracing::info!("{}: {}", notification.title, notification.description);
                // No subscribers is not an error
                let _ = self.notify_tx.send(notification);
                true
            }
            None => false,
        };

        TickOutcome::Published { sequence, notified }
    }
}

impl<S: SnapshotSource + 'static> RefreshLoop<S> {
    /// Move the loop onto its own task. The first tick fires one full period
    /// after spawning so the initial snapshot is shown for a whole interval.
    pub fn spawn(mut self) -> RefreshHandle {
        let state_rx = self.state_tx.subscribe();
        let notify_tx = self.notify_tx.clone();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = self.config.interval;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!("Refresh loop started ({:?} cadence)", period);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        self.tick();
                    }
                }
            }

            tracing::info!("Refresh loop stopped");
        });

        RefreshHandle {
            state_rx,
            notify_tx,
            shutdown_tx,
            task,
        }
    }
}

/// Owner of a running refresh loop
pub struct RefreshHandle {
    state_rx: watch::Receiver<DashboardState>,
    notify_tx: broadcast::Sender<Notification>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn subscribe_state(&self) -> watch::Receiver<DashboardState> {
        self.state_rx.clone()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    pub fn notification_sender(&self) -> broadcast::Sender<Notification> {
        self.notify_tx.clone()
    }

    pub fn latest(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }

    /// Stop ticking. Once this returns no further snapshot or notification is published.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Refresh loop task failed: {}", e);
        }
    }
}
