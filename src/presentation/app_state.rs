// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::render_surface::SurfaceSize;
use crate::application::streaming_service::StreamingDashboardService;
use crate::domain::dashboard::ControlState;
use crate::domain::scene::SceneSummary;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};

pub struct AppState {
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub controls: Mutex<ControlState>,
    pub scene_summary: watch::Receiver<SceneSummary>,
    pub resize_tx: mpsc::Sender<SurfaceSize>,
}

impl AppState {
    pub fn new(
        streaming_service: StreamingDashboardService,
        scene_summary: watch::Receiver<SceneSummary>,
        resize_tx: mpsc::Sender<SurfaceSize>,
    ) -> Self {
        Self {
            dashboard_service: DashboardService::new(),
            streaming_service,
            controls: Mutex::new(ControlState::default()),
            scene_summary,
            resize_tx,
        }
    }

    /// A panicked handler leaves plain values behind, so a poisoned lock is still usable
    pub fn controls(&self) -> MutexGuard<'_, ControlState> {
        self.controls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
