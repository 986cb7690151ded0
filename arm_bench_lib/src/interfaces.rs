//! Collaborator interfaces consumed by the orchestrator.
//!
//! The actual kinematics, collision checking, trajectory interpolation, and
//! transport all live behind these traits; the orchestrator only sequences
//! calls and applies failure policy.

use crate::types::{JointLimit, KinematicGroup, RobotState};
use eyre::Result;
use nalgebra::Isometry3;
use std::path::Path;

/// Kinematics and planning engine for one robot.
pub trait PlanningEngine: Send + Sync {
    /// Read-only snapshot of the live robot state.
    fn current_state(&self) -> Result<RobotState>;

    /// Plan a motion from `start` to `goal` for one group and execute it.
    fn plan_and_execute(
        &self,
        start: &RobotState,
        goal: &RobotState,
        group: &KinematicGroup,
        velocity_scale: f64,
    ) -> Result<()>;

    /// Execute a straight-line path through the given end-effector poses.
    /// Failing partway through the sequence is a failure of the whole call.
    fn execute_cartesian_path(
        &self,
        group: &KinematicGroup,
        waypoints: &[Isometry3<f64>],
        velocity_scale: f64,
    ) -> Result<()>;

    /// Solve IK for `target`, writing the solution into `state`.
    /// `attempts` and `timeout` of zero select the engine defaults.
    fn solve_ik(
        &self,
        group: &KinematicGroup,
        target: &Isometry3<f64>,
        attempts: usize,
        timeout: f64,
        state: &mut RobotState,
    ) -> Result<()>;

    /// Collision and bounds check of a candidate state for one group.
    fn state_valid(&self, state: &RobotState, group: &KinematicGroup) -> bool;

    fn joint_limits(&self, group: &KinematicGroup) -> Result<Vec<JointLimit>>;

    /// Live pose of the group's end-effector link.
    fn end_effector_pose(&self, group: &KinematicGroup) -> Result<Isometry3<f64>>;

    /// Live pose of an arbitrary named frame (camera, gantry, ...).
    fn frame_pose(&self, frame: &str) -> Result<Isometry3<f64>>;
}

/// Low-level trajectory execution stack.
pub trait ExecutionInterface: Send + Sync {
    /// Whether the trajectory controller manager can be reached.
    fn controller_reachable(&self) -> bool;
}

pub trait PerceptionInterface: Send + Sync {
    fn is_ready(&self) -> bool;
}

/// Records live trajectories and plays saved joint-waypoint files back.
pub trait TrajectoryIo: Send + Sync {
    fn record(&self, path: &Path) -> Result<()>;

    fn playback(&self, path: &Path, group: &KinematicGroup, velocity_scale: f64) -> Result<()>;
}
