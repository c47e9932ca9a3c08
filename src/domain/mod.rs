pub mod dashboard;
pub mod formatting;
pub mod scene;
pub mod telemetry;
