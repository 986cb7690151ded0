//! Camera calibration sweep and the IK stress loop.

use crate::orchestrator::Orchestrator;
use crate::trial::TrialEngine;
use crate::waypoints::circular_sweep;
use eyre::{eyre, Result};
use nalgebra::{Isometry3, Vector3};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, info};

impl Orchestrator {
    /// Mode 11: sweep the tool through a circle of poses facing the
    /// camera's calibration target. Failing to complete the whole path is
    /// terminal.
    pub fn calibrate_in_circle(&self) -> Result<()> {
        let arm = &self.config.groups.right_arm;
        let grasp = self.config.grasp_for(&arm.name)?;
        let calibration = &self.config.calibration;

        let camera_pose = self.engine.frame_pose(&calibration.camera_frame)?;

        // Push the sweep center out in front of the camera
        let mut forward = Isometry3::identity();
        forward.translation.vector.x += calibration.forward_offset;
        forward.translation.vector.z -= calibration.drop_offset;
        let reference = forward * camera_pose;

        let waypoints = circular_sweep(
            &reference,
            calibration.radius,
            calibration.steps,
            &grasp.grasp_to_tool_isometry(),
        );
        info!(
            "Executing calibration sweep of {} waypoints around {}",
            waypoints.len(),
            calibration.camera_frame
        );

        self.engine
            .execute_cartesian_path(arm, &waypoints, self.config.velocity.calibration_scaling)
            .map_err(|report| eyre!("Error executing calibration path: {report}"))
    }

    /// Mode 25: repeatedly solve IK for a fixed target pose from randomized
    /// seed states. Any solve failure is terminal.
    pub fn test_ik_solver(&self) -> Result<()> {
        let group = &self.config.groups.right_arm;
        let mut goal = self.engine.current_state()?;

        let mut target =
            Isometry3::translation(0.3, 0.2, 1.4) * Isometry3::rotation(Vector3::y() * -FRAC_PI_2);

        // Optionally express the target in a secondary frame
        if let Some(frame) = &self.config.test.ik_frame {
            target = self.engine.frame_pose(frame)? * target;
        }

        let mut rng = rand::rng();
        let limits = self.engine.joint_limits(group)?;
        let trial = TrialEngine::new("IK solver stress", self.settle(0.5), &self.liveness);
        trial.run(|_| {
            self.engine
                .solve_ik(group, &target, 0, 0.0, &mut goal)
                .map_err(|report| {
                    eyre!("Unable to find arm solution for desired pose: {report}")
                })?;
            info!("Solved IK for target pose");
            debug!(
                "Solution joints: {:?}",
                goal.group_positions(group).unwrap_or_default()
            );

            goal.randomize_group(group, &limits, &mut rng)?;
            Ok(())
        })
    }
}
