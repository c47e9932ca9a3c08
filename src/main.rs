// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rover_telemetry::application::refresh_loop::{RefreshConfig, RefreshLoop};
use rover_telemetry::application::scene_service::SceneService;
use rover_telemetry::application::streaming_service::StreamingDashboardService;
use rover_telemetry::application::telemetry_generator::{GeneratorConfig, MockTelemetryGenerator};
use rover_telemetry::infrastructure::config::load_rover_config;
use rover_telemetry::infrastructure::headless_surface::HeadlessSurface;
use rover_telemetry::presentation::app_state::AppState;
use rover_telemetry::presentation::handlers::{
    get_dashboard, get_scene, get_snapshot, health_check, resize_scene, stream_dashboard,
    update_controls,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_rover_config()?;

    // Telemetry source and link simulation (application layer)
    let generator_config = GeneratorConfig {
        point_count: config.generator.point_count,
        trajectory_len: config.generator.trajectory_len,
    };
    let (generator, link_rng) = match config.generator.seed {
        Some(seed) => {
            tracing::info!("Using fixed seed {}", seed);
            (
                MockTelemetryGenerator::seeded(seed, generator_config),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            )
        }
        None => (
            MockTelemetryGenerator::from_entropy(generator_config),
            StdRng::from_entropy(),
        ),
    };
    let refresh_config = RefreshConfig {
        interval: config.refresh.interval(),
        connect_probability: config.refresh.connect_probability,
    };
    let refresh = RefreshLoop::new(generator, link_rng, refresh_config).spawn();

    // Scene on a headless surface (infrastructure layer)
    let surface = HeadlessSurface::new(config.scene.width, config.scene.height);
    let scene = SceneService::mount(Some(surface), config.scene.frame_interval())
        .spawn(refresh.subscribe_state());

    // Create application state
    let streaming_service =
        StreamingDashboardService::new(refresh.subscribe_state(), refresh.notification_sender());
    let state = Arc::new(AppState::new(
        streaming_service,
        scene.subscribe_summary(),
        scene.resize_sender(),
    ));

    // Build router (presentation layer)
    // Note: responses are compressed by our own builders, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(get_snapshot))
        .route("/dashboard", get(get_dashboard))
        .route("/controls", post(update_controls))
        .route("/scene", get(get_scene))
        .route("/scene/resize", post(resize_scene))
        .route("/stream", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting rover-telemetry service on {}", addr);

    // Stopping the refresh loop closes open dashboard streams so shutdown can finish
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            refresh.stop().await;
        })
        .await?;

    if let Some(surface) = scene.stop().await {
        tracing::info!("Scene presented {} frames", surface.frames_presented());
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
