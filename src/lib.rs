// Rescue rover telemetry - synthetic feed, refresh loop, dashboard views and SLAM scene
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
