//! # Arm Bench Library
//!
//! Manipulation test-bench orchestration for a robotic arm: a mode
//! dispatcher, a system readiness check, bounded trial loops, a guarded
//! planning scene, and calibration waypoint generation. The planning and
//! execution stacks live behind traits so the same procedures run against
//! hardware or the built-in simulation.

pub mod dispatcher;
pub mod interfaces;
pub mod orchestrator;
pub mod remote;
pub mod scene;
pub mod sim;
pub mod trial;
pub mod types;
pub mod utils;
pub mod waypoints;

mod modes;

#[cfg(test)]
pub(crate) mod testing;

// Re-export everything for convenience
pub use dispatcher::Mode;
pub use orchestrator::{Collaborators, Orchestrator};
pub use remote::{Liveness, RemoteControl};
pub use types::*;
pub use utils::*;
