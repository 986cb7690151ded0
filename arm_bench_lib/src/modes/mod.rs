//! The named operational procedures, grouped by family. Each file adds an
//! impl block to [`crate::orchestrator::Orchestrator`].

mod calibration;
mod end_effector;
mod poses;
mod trajectory;
