//! Named-pose motions and the live joint-pose dump.

use crate::orchestrator::Orchestrator;
use crate::trial::TrialEngine;
use eyre::{eyre, Result};
use tracing::{debug, info};

impl Orchestrator {
    /// Mode 2: move the active arm group to the configured home pose.
    pub fn go_home(&self) -> Result<()> {
        debug!("Going home");
        self.move_to_named_pose("home")
    }

    /// Mode 9: move to a named pose, then hold position and watch until
    /// shutdown. The blocking idle is intentional, not a hang.
    pub fn goto_pose(&self, pose_name: &str) -> Result<()> {
        info!("Going to pose {}", pose_name);
        self.move_to_named_pose(pose_name)?;

        info!("Holding position until shutdown is requested");
        self.liveness.park();
        Ok(())
    }

    /// Mode 41: periodically print the active group's joint values in a
    /// form that can be pasted into a named-pose definition.
    pub fn dump_joint_pose(&self) -> Result<()> {
        let group = self.config.active_arm();
        let trial = TrialEngine::new("joint pose dump", self.settle(4.0), &self.liveness);
        trial.run(|_| {
            let state = self.engine.current_state()?;
            info!("<group_state name=\"\" group=\"{}\">", group.name);
            for joint in &group.joints {
                info!(
                    "  <joint name=\"{}\" value=\"{:.5}\" />",
                    joint,
                    state.joint_position(joint).unwrap_or(0.0)
                );
            }
            info!("</group_state>");
            Ok(())
        })
    }

    fn move_to_named_pose(&self, pose_name: &str) -> Result<()> {
        let pose = self
            .config
            .named_poses
            .get(pose_name)
            .ok_or_else(|| eyre!("Unknown named pose {pose_name}"))?;

        let group = self.config.active_arm();
        let current = self.engine.current_state()?;
        let mut goal = current.clone();
        for (joint, value) in pose {
            goal.set_joint_position(joint, *value);
        }

        if !self.engine.state_valid(&goal, group) {
            return Err(eyre!(
                "Named pose {pose_name} fails the collision/bounds check"
            ));
        }
        self.engine
            .plan_and_execute(&current, &goal, group, self.config.velocity.main_scaling)
            .map_err(|report| eyre!("Unable to move to pose {pose_name}: {report}"))
    }
}
