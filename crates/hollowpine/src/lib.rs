//! # Hollowpine
//!
//! Headless runner for the forest simulation: layered configuration and
//! scripted sessions with a summary report.

pub mod config;
pub mod headless;

// Re-export core modules for convenience
pub use hollowpine_core::entity;
pub use hollowpine_core::simulation;
pub use hollowpine_core::world;
