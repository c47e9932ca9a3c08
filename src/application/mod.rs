pub mod dashboard_service;
pub mod refresh_loop;
pub mod render_surface;
pub mod scene_service;
pub mod streaming_service;
pub mod telemetry_generator;
pub mod telemetry_source;
