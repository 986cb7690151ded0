//! End-effector cycling procedures.

use crate::orchestrator::Orchestrator;
use crate::trial::TrialEngine;
use crate::types::KinematicGroup;
use eyre::Result;
use tracing::{error, info, warn};

impl Orchestrator {
    /// Mode 8: alternate fully closed and fully open end-effectors until
    /// shutdown. This cycle never fails the procedure.
    pub fn test_end_effectors(&self) -> Result<()> {
        let trial = TrialEngine::new("end effector cycle", self.settle(2.0), &self.liveness);
        trial.run(|iteration| {
            let open = iteration % 2 != 0;
            info!(
                "{} all end effectors",
                if open { "Opening" } else { "Closing" }
            );
            for group in self.config.arm_groups() {
                if let Err(report) =
                    self.set_end_effector_fraction(group, if open { 1.0 } else { 0.0 })
                {
                    warn!("End effector command failed for {}: {}", group.name, report);
                }
            }
            Ok(())
        })
    }

    /// Mode 20: step the commanded finger width from the minimum to the
    /// maximum in tenths, wrapping around, one step per operator signal.
    pub fn test_grasp_widths(&self) -> Result<()> {
        let arm = &self.config.groups.right_arm;
        let grasp = self.config.grasp_for(&arm.name)?;
        let span = grasp.max_finger_width - grasp.min_finger_width;
        let mut width = grasp.min_finger_width;

        let trial = TrialEngine::new("grasp width cycle", self.settle(1.0), &self.liveness);
        trial.run(|_| {
            warn!("Setting finger width distance {:.3}", width);

            self.remote.wait_for_next_step("move fingers")?;
            if !self.liveness.is_live() {
                return Ok(());
            }

            let fraction = (width - grasp.min_finger_width) / span;
            if let Err(report) = self.set_end_effector_fraction(arm, fraction) {
                error!("Failed to set finger width: {}", report);
            }

            width += span / 10.0;
            // Small tolerance so accumulation error cannot skip the final width
            if width > grasp.max_finger_width + 1e-9 {
                info!("Wrapping around");
                width = grasp.min_finger_width;
            }
            Ok(())
        })
    }

    /// Command the arm's end-effector group to a fraction of its travel:
    /// 0.0 fully closed, 1.0 fully open.
    pub(crate) fn set_end_effector_fraction(
        &self,
        arm: &KinematicGroup,
        fraction: f64,
    ) -> Result<()> {
        let end_effector = &self.config.grasp_for(&arm.name)?.end_effector;
        let limits = self.engine.joint_limits(end_effector)?;

        let current = self.engine.current_state()?;
        let mut goal = current.clone();
        for (joint, limit) in end_effector.joints.iter().zip(&limits) {
            goal.set_joint_position(
                joint,
                limit.min_angle + fraction * (limit.max_angle - limit.min_angle),
            );
        }
        self.engine.plan_and_execute(
            &current,
            &goal,
            end_effector,
            self.config.velocity.main_scaling,
        )
    }
}
