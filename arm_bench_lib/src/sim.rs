//! Simulated collaborators for running the orchestrator without hardware.
//!
//! The simulated engine tracks joint state, enforces the configured joint
//! limits, and answers IK requests with mid-range solutions. It is good
//! enough to exercise every mode end to end.

use crate::interfaces::{ExecutionInterface, PerceptionInterface, PlanningEngine, TrajectoryIo};
use crate::types::{JointLimit, KinematicGroup, OrchestratorConfig, RobotState};
use eyre::{eyre, Result};
use nalgebra::Isometry3;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct SimPlanningEngine {
    config: Arc<OrchestratorConfig>,
    state: Mutex<RobotState>,
}

impl SimPlanningEngine {
    pub fn new(config: Arc<OrchestratorConfig>) -> Self {
        let mut state = RobotState::new();
        for joint in config.joint_limits.keys() {
            state.set_joint_position(joint, 0.0);
        }
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    fn within_limits(&self, state: &RobotState, group: &KinematicGroup) -> bool {
        for joint in &group.joints {
            let Some(position) = state.joint_position(joint) else {
                return false;
            };
            let Some(limit) = self.config.joint_limits.get(joint) else {
                return false;
            };
            if position < limit.min_angle || position > limit.max_angle {
                return false;
            }
        }
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RobotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlanningEngine for SimPlanningEngine {
    fn current_state(&self) -> Result<RobotState> {
        Ok(self.lock_state().clone())
    }

    fn plan_and_execute(
        &self,
        _start: &RobotState,
        goal: &RobotState,
        group: &KinematicGroup,
        velocity_scale: f64,
    ) -> Result<()> {
        if !self.within_limits(goal, group) {
            return Err(eyre!("Goal state violates joint limits for {}", group.name));
        }
        debug!(
            "Simulated move of {} at velocity scale {:.2}",
            group.name, velocity_scale
        );
        let values = goal.group_positions(group)?;
        self.lock_state().set_group_positions(group, &values)?;
        Ok(())
    }

    fn execute_cartesian_path(
        &self,
        group: &KinematicGroup,
        waypoints: &[Isometry3<f64>],
        velocity_scale: f64,
    ) -> Result<()> {
        debug!(
            "Simulated cartesian path of {} waypoints for {} at velocity scale {:.2}",
            waypoints.len(),
            group.name,
            velocity_scale
        );
        Ok(())
    }

    fn solve_ik(
        &self,
        group: &KinematicGroup,
        _target: &Isometry3<f64>,
        _attempts: usize,
        _timeout: f64,
        state: &mut RobotState,
    ) -> Result<()> {
        // Mid-range posture stands in for a real solution
        let limits = self.joint_limits(group)?;
        for (joint, limit) in group.joints.iter().zip(&limits) {
            state.set_joint_position(joint, (limit.min_angle + limit.max_angle) / 2.0);
        }
        Ok(())
    }

    fn state_valid(&self, state: &RobotState, group: &KinematicGroup) -> bool {
        self.within_limits(state, group)
    }

    fn joint_limits(&self, group: &KinematicGroup) -> Result<Vec<JointLimit>> {
        self.config.limits_for(group)
    }

    fn end_effector_pose(&self, _group: &KinematicGroup) -> Result<Isometry3<f64>> {
        Ok(Isometry3::translation(0.4, 0.0, 0.6))
    }

    fn frame_pose(&self, frame: &str) -> Result<Isometry3<f64>> {
        debug!("Simulated lookup of frame {}", frame);
        Ok(Isometry3::translation(0.0, 0.2, 1.0))
    }
}

/// Always-connected stand-in for the trajectory controller stack.
pub struct SimExecutionInterface;

impl ExecutionInterface for SimExecutionInterface {
    fn controller_reachable(&self) -> bool {
        true
    }
}

/// Always-ready stand-in for the perception pipeline.
pub struct SimPerception;

impl PerceptionInterface for SimPerception {
    fn is_ready(&self) -> bool {
        true
    }
}

/// File-backed trajectory IO. Recording writes a CSV header so a real
/// recorder can append rows; playback only checks the file is present.
pub struct SimTrajectoryIo;

impl TrajectoryIo for SimTrajectoryIo {
    fn record(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        writeln!(file, "timestamp,joint,position")?;
        info!("Started trajectory file {}", path.display());
        Ok(())
    }

    fn playback(&self, path: &Path, group: &KinematicGroup, velocity_scale: f64) -> Result<()> {
        if !path.exists() {
            return Err(eyre!("Trajectory file {} does not exist", path.display()));
        }
        info!(
            "Simulated playback of {} for {} at velocity scale {:.2}",
            path.display(),
            group.name,
            velocity_scale
        );
        Ok(())
    }
}
