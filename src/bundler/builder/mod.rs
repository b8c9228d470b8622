//! Bundle orchestration and coordination.
//!
//! - [`checksum`] - SHA256 checksum and size of artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct and the build sequence
//! - [`tool_detection`] - External packaging tool availability

mod checksum;
mod orchestrator;
mod tool_detection;

pub use orchestrator::Bundler;
