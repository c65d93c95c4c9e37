pub mod errors;
pub mod extract;
pub mod geo;
pub mod models;
pub mod orchestrator;
pub mod polyline;
pub mod providers;
pub mod stream;
