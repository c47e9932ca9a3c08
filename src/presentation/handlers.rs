// HTTP request handlers
use crate::application::render_surface::SurfaceSize;
use crate::domain::dashboard::{ControlInput, ControlPanelView};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest published state, raw snapshot included
pub async fn get_snapshot(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let latest = state.streaming_service.latest();
    into_response(json_response(&latest, accepts_brotli(&headers)).await)
}

/// Every panel's view model for the latest state
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let latest = state.streaming_service.latest();
    let view = {
        let controls = state.controls();
        state
            .dashboard_service
            .get_dashboard(&latest, &controls, Utc::now())
    };
    into_response(json_response(&view, accepts_brotli(&headers)).await)
}

pub async fn get_scene(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let summary = state.scene_summary.borrow().clone();
    into_response(json_response(&summary, accepts_brotli(&headers)).await)
}

pub async fn resize_scene(
    State(state): State<Arc<AppState>>,
    Json(size): Json<SurfaceSize>,
) -> StatusCode {
    match state.resize_tx.send(size).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            tracing::warn!("Resize to {}x{} dropped: scene is gone", size.width, size.height);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Apply an operator control change. Refused with 409 while the link is down.
pub async fn update_controls(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(input): Json<ControlInput>,
) -> Response {
    let latest = state.streaming_service.latest();
    let connected = latest.connection.is_connected();

    let view = {
        let mut controls = state.controls();
        if !controls.apply(input, connected) {
            tracing::debug!("Ignored {:?} while disconnected", input);
            return StatusCode::CONFLICT.into_response();
        }
        ControlPanelView::new(connected, latest.snapshot.rover.status, &controls)
    };
    into_response(json_response(&view, accepts_brotli(&headers)).await)
}

/// Live feed of state changes and notifications
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.streaming_service.stream_dashboard();
    stream_from_receiver(rx, accepts_brotli(&headers)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_loop::{RefreshConfig, RefreshLoop, TickOutcome};
    use crate::application::streaming_service::StreamingDashboardService;
    use crate::application::telemetry_generator::{GeneratorConfig, MockTelemetryGenerator};
    use crate::domain::dashboard::ScanMode;
    use crate::domain::scene::SceneSummary;
    use axum::body::to_bytes;
    use axum::http::header;
    use futures::StreamExt;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::{mpsc, watch};

    fn refresh_loop(connect_probability: f64) -> RefreshLoop<MockTelemetryGenerator> {
        let generator = MockTelemetryGenerator::seeded(
            21,
            GeneratorConfig {
                point_count: 6,
                trajectory_len: 3,
            },
        );
        let config = RefreshConfig {
            connect_probability,
            ..RefreshConfig::default()
        };
        RefreshLoop::new(generator, StdRng::seed_from_u64(21), config)
    }

    fn app_state(
        refresh: &RefreshLoop<MockTelemetryGenerator>,
    ) -> (Arc<AppState>, mpsc::Receiver<SurfaceSize>) {
        let streaming = StreamingDashboardService::new(
            refresh.subscribe_state(),
            refresh.notification_sender(),
        );
        let (_summary_tx, summary_rx) = watch::channel(SceneSummary::default());
        let (resize_tx, resize_rx) = mpsc::channel(4);
        (Arc::new(AppState::new(streaming, summary_rx, resize_tx)), resize_rx)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_reflects_latest_state() {
        let mut refresh = refresh_loop(1.0);
        let (state, _resize_rx) = app_state(&refresh);
        refresh.tick();

        let response = get_dashboard(HeaderMap::new(), State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["header"]["title"], "Autonomous Rescue Rover");
        assert_eq!(json["header"]["statusLabel"], "Connected");
    }

    #[tokio::test]
    async fn test_snapshot_carries_sequence() {
        let mut refresh = refresh_loop(1.0);
        let (state, _resize_rx) = app_state(&refresh);
        refresh.tick();
        refresh.tick();

        let json = json_body(get_snapshot(HeaderMap::new(), State(state)).await).await;
        assert_eq!(json["sequence"], 2);
        assert_eq!(json["connection"], "connected");
        assert_eq!(json["snapshot"]["slam"]["points"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_controls_apply_when_connected() {
        let refresh = refresh_loop(1.0);
        let (state, _resize_rx) = app_state(&refresh);

        let response = update_controls(
            HeaderMap::new(),
            State(state.clone()),
            Json(ControlInput::ScanMode(ScanMode::Deep)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.controls().scan_mode, ScanMode::Deep);
    }

    #[tokio::test]
    async fn test_controls_refused_when_disconnected() {
        let mut refresh = refresh_loop(0.0);
        let (state, _resize_rx) = app_state(&refresh);
        assert_eq!(refresh.tick(), TickOutcome::Skipped);

        let input = Json(ControlInput::Speed(90));
        let response = update_controls(HeaderMap::new(), State(state.clone()), input).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(state.controls().speed_percent, 50);
    }

    #[tokio::test]
    async fn test_resize_is_forwarded() {
        let refresh = refresh_loop(1.0);
        let (state, mut resize_rx) = app_state(&refresh);
        let size = SurfaceSize {
            width: 320,
            height: 200,
        };

        assert_eq!(resize_scene(State(state), Json(size)).await, StatusCode::ACCEPTED);
        assert_eq!(resize_rx.recv().await, Some(size));
    }

    /// Split a body buffer into complete length-prefixed JSON frames
    fn take_frames(buffer: &mut Vec<u8>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while buffer.len() >= 4 {
            let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
            if buffer.len() < 4 + len {
                break;
            }
            frames.push(serde_json::from_slice(&buffer[4..4 + len]).unwrap());
            buffer.drain(..4 + len);
        }
        frames
    }

    #[tokio::test]
    async fn test_stream_emits_length_prefixed_states() {
        let mut refresh = refresh_loop(1.0);
        let (state, _resize_rx) = app_state(&refresh);

        let response = stream_dashboard(HeaderMap::new(), State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-ndjson-chunked"
        );
        refresh.tick();

        let mut body = response.into_body().into_data_stream();
        let mut buffer = Vec::new();
        let mut frames = Vec::new();
        while frames.len() < 2 {
            let chunk = body.next().await.unwrap().unwrap();
            buffer.extend_from_slice(&chunk);
            frames.extend(take_frames(&mut buffer));
        }

        assert_eq!(frames[0]["type"], "state");
        assert_eq!(frames[0]["payload"]["sequence"], 0);
        assert_eq!(frames[1]["type"], "state");
        assert_eq!(frames[1]["payload"]["sequence"], 1);
        assert_eq!(frames[1]["payload"]["connection"], "connected");
    }
}
