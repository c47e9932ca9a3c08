pub mod chunked_json;
pub mod config;
pub mod headless_surface;
pub mod http_response;
