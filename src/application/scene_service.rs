// Scene service - owns the SLAM scene and drives it from snapshots, frames and resizes
use crate::application::refresh_loop::DashboardState;
use crate::application::render_surface::{RenderSurface, SurfaceSize};
use crate::domain::scene::{Scene, SceneSummary};
use crate::domain::telemetry::DashboardSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const RESIZE_QUEUE: usize = 16;

/// Which slices of the scene a snapshot rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceChanges {
    pub point_cloud: bool,
    pub trajectory: bool,
    pub rover: bool,
    pub survivors: bool,
}

pub struct SceneService<S: RenderSurface> {
    scene: Scene,
    surface: Option<S>,
    frame_interval: Duration,
    applied: Option<Arc<DashboardSnapshot>>,
    frames: u64,
}

impl<S: RenderSurface> SceneService<S> {
    /// Mount the scene on `surface`. Without a surface (or if its context
    /// cannot be acquired) the scene is still kept up to date but frames are skipped.
    pub fn mount(surface: Option<S>, frame_interval: Duration) -> Self {
        let surface = surface.and_then(|mut surface| match surface.acquire_context() {
            Ok(()) => Some(surface),
            Err(e) => {
                tracing::error!("Scene surface unavailable: {}", e);
                None
            }
        });
        let size = surface
            .as_ref()
            .map(RenderSurface::size)
            .unwrap_or(SurfaceSize { width: 1, height: 1 });

        Self {
            scene: Scene::mount(size.width, size.height),
            surface,
            frame_interval,
            applied: None,
            frames: 0,
        }
    }

    /// Rebuild only the slices that differ from the last applied snapshot
    pub fn apply_state(&mut self, state: &DashboardState) -> SliceChanges {
        let next = &state.snapshot;
        let previous = self.applied.as_deref();

        if previous.is_some_and(|prev| std::ptr::eq(prev, next.as_ref())) {
            return SliceChanges::default();
        }

        let changes = SliceChanges {
            point_cloud: previous.is_none_or(|prev| prev.slam.points != next.slam.points),
            trajectory: previous.is_none_or(|prev| prev.dr.trajectory != next.dr.trajectory),
            rover: previous.is_none_or(|prev| {
                prev.rover.position != next.rover.position
                    || prev.rover.orientation != next.rover.orientation
            }),
            survivors: previous.is_none_or(|prev| prev.survivors != next.survivors),
        };

        if changes.point_cloud {
            self.scene.update_point_cloud(&next.slam.points);
        }
        if changes.trajectory {
            self.scene.update_trajectory(&next.dr.trajectory);
        }
        if changes.rover {
            self.scene.update_rover(next.rover.position, next.rover.orientation);
        }
        if changes.survivors {
            self.scene.update_survivors(&next.survivors);
        }

        self.applied = Some(next.clone());
        changes
    }

    /// Animate pulses and draw one frame; a missing surface is a no-op
    pub fn render_frame(&mut self, elapsed: Duration) {
        self.scene.animate(elapsed);

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.present(&self.scene) {
            Ok(()) => self.frames += 1,
            Err(e) => tracing::warn!("Frame skipped: {}", e),
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(size);
        }
        self.scene.resize(size.width, size.height);
        tracing::debug!("Scene resized to {}x{}", size.width, size.height);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn summary(&self) -> SceneSummary {
        self.scene.summary(self.frames)
    }

    /// Dispose the scene and hand back the surface with its context released
    pub fn teardown(&mut self) -> Option<S> {
        self.scene.dispose();
        let mut surface = self.surface.take();
        if let Some(surface) = surface.as_mut() {
            surface.release_context();
        }
        surface
    }
}

impl<S: RenderSurface + 'static> SceneService<S> {
    pub fn spawn(mut self, mut state_rx: watch::Receiver<DashboardState>) -> SceneHandle<S> {
        let (resize_tx, mut resize_rx) = mpsc::channel(RESIZE_QUEUE);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let initial = state_rx.borrow_and_update().clone();
        self.apply_state(&initial);
        let (summary_tx, summary_rx) = watch::channel(self.summary());

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut frames = tokio::time::interval(self.frame_interval);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    Ok(()) = state_rx.changed() => {
                        let state = state_rx.borrow_and_update().clone();
                        let changes = self.apply_state(&state);
                        tracing::debug!(
                            "Scene updated for snapshot {}: {:?}",
                            state.sequence,
                            changes
                        );
                    }
                    Some(size) = resize_rx.recv() => self.resize(size),
                    _ = frames.tick() => self.render_frame(started.elapsed()),
                }
                summary_tx.send_replace(self.summary());
            }

            let surface = self.teardown();
            summary_tx.send_replace(self.summary());
            tracing::info!("Scene torn down");
            surface
        });

        SceneHandle {
            summary_rx,
            resize_tx,
            shutdown_tx,
            task,
        }
    }
}

pub struct SceneHandle<S> {
    summary_rx: watch::Receiver<SceneSummary>,
    resize_tx: mpsc::Sender<SurfaceSize>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<Option<S>>,
}

impl<S> SceneHandle<S> {
    pub fn summary(&self) -> SceneSummary {
        self.summary_rx.borrow().clone()
    }

    pub fn subscribe_summary(&self) -> watch::Receiver<SceneSummary> {
        self.summary_rx.clone()
    }

    pub fn resize_sender(&self) -> mpsc::Sender<SurfaceSize> {
        self.resize_tx.clone()
    }

    /// Stop the render loop and return the surface with its context released
    pub async fn stop(self) -> Option<S> {
        let _ = self.shutdown_tx.send(true);
        match self.task.await {
            Ok(surface) => surface,
            Err(e) => {
                tracing::error!("Scene task failed: {}", e);
                None
            }
        }
    }
}
