//! Orchestrator construction, preflight checks, and shared motion helpers.

use crate::interfaces::{ExecutionInterface, PerceptionInterface, PlanningEngine, TrajectoryIo};
use crate::remote::{Liveness, RemoteControl};
use crate::scene::SceneHandle;
use crate::types::{KinematicGroup, OrchestratorConfig};
use crate::waypoints::{retreat_target, vertical_target};
use eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const FRAME_RULE: &str = "-------------------------------------------------------";

/// External subsystems the orchestrator drives.
pub struct Collaborators {
    pub engine: Arc<dyn PlanningEngine>,
    pub execution: Arc<dyn ExecutionInterface>,
    pub perception: Arc<dyn PerceptionInterface>,
    pub trajectory_io: Arc<dyn TrajectoryIo>,
}

/// Drives the arm through its named operational procedures.
///
/// One primary control thread per instance; the planning scene handle is
/// the only shared-mutable state and is always accessed through its scoped
/// lock.
pub struct Orchestrator {
    pub(crate) config: Arc<OrchestratorConfig>,
    pub(crate) engine: Arc<dyn PlanningEngine>,
    pub(crate) execution: Arc<dyn ExecutionInterface>,
    pub(crate) perception: Arc<dyn PerceptionInterface>,
    pub(crate) trajectory_io: Arc<dyn TrajectoryIo>,
    pub(crate) scene: SceneHandle,
    pub(crate) remote: Arc<RemoteControl>,
    pub(crate) liveness: Liveness,
}

impl Orchestrator {
    pub fn new(
        config: Arc<OrchestratorConfig>,
        collaborators: Collaborators,
        remote: Arc<RemoteControl>,
        liveness: Liveness,
    ) -> Self {
        info!("Orchestrator ready for robot '{}'", config.name);
        if config.fake_perception {
            info!("In fake perception mode");
        }
        Self {
            config,
            engine: collaborators.engine,
            execution: collaborators.execution,
            perception: collaborators.perception,
            trajectory_io: collaborators.trajectory_io,
            scene: SceneHandle::new(),
            remote,
            liveness,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// Preflight check run before any mode. Gating checks short-circuit in
    /// order: arm joint count, end-effector joint count, controller
    /// reachability. Idempotent for a fixed configuration.
    pub fn check_system_ready(&self) -> Result<()> {
        info!("{}", FRAME_RULE);
        info!("Starting system ready check");

        let arm = &self.config.groups.right_arm;
        if !(6..=7).contains(&arm.joint_count()) {
            error!(
                "Incorrect number of joints for group {}: {}",
                arm.name,
                arm.joint_count()
            );
            return Err(eyre::eyre!(
                "Incorrect number of joints for group {}: {}",
                arm.name,
                arm.joint_count()
            ));
        }

        let end_effector = &self.config.grasp_for(&arm.name)?.end_effector;
        if end_effector.joint_count() > 6 {
            error!(
                "Incorrect number of joints for group {}: {}",
                end_effector.name,
                end_effector.joint_count()
            );
            return Err(eyre::eyre!(
                "Incorrect number of joints for group {}: {}",
                end_effector.name,
                end_effector.joint_count()
            ));
        }

        if !self.execution.controller_reachable() {
            error!("Trajectory controllers unable to connect");
            return Err(eyre::eyre!("Trajectory controllers unable to connect"));
        }

        if !self.config.fake_perception {
            info!("Checking perception");
            // Readiness here is logged but not gating; the retreat-path
            // checks nearby gate hard, so this looks inconsistent, but the
            // permissiveness is long-standing behavior.
            let ready = self.perception.is_ready();
            info!("Perception pipeline ready: {}", ready);
        }

        let allowed_pairs = self
            .scene
            .with_read(|scene| scene.allowed_collisions.allowed_pair_count());
        info!("Collision matrix: {} allowed pairs", allowed_pairs);

        info!("System ready check COMPLETE");
        info!("{}", FRAME_RULE);
        Ok(())
    }

    /// Allow contact between every pair of the group's end-effector links.
    pub fn allow_group_collisions(&self, group_name: &str) -> Result<()> {
        let links = &self.config.grasp_for(group_name)?.end_effector_links;
        self.scene.with_write(|scene| {
            for (index, first) in links.iter().enumerate() {
                for second in &links[index + 1..] {
                    scene.allowed_collisions.set_entry(first, second, true);
                }
            }
        });
        Ok(())
    }

    /// Settle delay scaled by the configured base unit so hardware timing
    /// stays adjustable in one place.
    pub(crate) fn settle(&self, multiplier: f64) -> Duration {
        Duration::from_secs_f64(self.config.test.settle_seconds.max(0.0) * multiplier)
    }

    /// Straight vertical lift or descent for one arm.
    pub(crate) fn execute_vertical_path(
        &self,
        group: &KinematicGroup,
        distance: f64,
        velocity_scale: f64,
        up: bool,
    ) -> Result<()> {
        let current = self.engine.end_effector_pose(group)?;
        let target = vertical_target(&current, distance, up);
        self.engine
            .execute_cartesian_path(group, &[target], velocity_scale)
    }

    /// Straight advance or retreat along the tool's approach axis.
    pub(crate) fn execute_retreat_path(
        &self,
        group: &KinematicGroup,
        distance: f64,
        retreat: bool,
    ) -> Result<()> {
        let current = self.engine.end_effector_pose(group)?;
        let target = retreat_target(&current, distance, retreat);
        self.engine
            .execute_cartesian_path(group, &[target], self.config.velocity.main_scaling)
    }
}
