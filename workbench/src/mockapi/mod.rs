//! Self-contained stand-in for the packet analysis service.

pub mod data;
pub mod server;

pub use server::MockAnalysisServer;
