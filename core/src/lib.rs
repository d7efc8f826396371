//! Ingestion and normalization pipeline for the PacketLens capture dashboard.
//!
//! The modules mirror the browser-era fetch -> cache -> normalize -> render
//! flow while providing injectable stores, a shape-tolerant normalizer, and
//! an observable upload state machine.

pub mod client;
pub mod latency;
pub mod model;
pub mod normalize;
pub mod prelude;
pub mod sample;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod upload;

pub use normalize::normalize;
pub use prelude::{DataSource, PipelineError, PipelineResult};
