use crate::types::config::{JointLimit, KinematicGroup};
use eyre::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete joint-position snapshot of the robot at one instant.
///
/// Procedures copy the current snapshot into a goal state and mutate the
/// copy; the live snapshot itself is never changed in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    positions: HashMap<String, f64>,
}

impl RobotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: HashMap<String, f64>) -> Self {
        Self { positions }
    }

    pub fn joint_position(&self, joint: &str) -> Option<f64> {
        self.positions.get(joint).copied()
    }

    pub fn set_joint_position(&mut self, joint: &str, value: f64) {
        self.positions.insert(joint.to_string(), value);
    }

    pub fn group_positions(&self, group: &KinematicGroup) -> Result<Vec<f64>> {
        group
            .joints
            .iter()
            .map(|joint| {
                self.joint_position(joint)
                    .ok_or_else(|| eyre::eyre!("State has no position for joint {}", joint))
            })
            .collect()
    }

    pub fn set_group_positions(&mut self, group: &KinematicGroup, values: &[f64]) -> Result<()> {
        if values.len() != group.joint_count() {
            return Err(eyre::eyre!(
                "Value count {} doesn't match joint count {} of group {}",
                values.len(),
                group.joint_count(),
                group.name
            ));
        }
        for (joint, value) in group.joints.iter().zip(values) {
            self.set_joint_position(joint, *value);
        }
        Ok(())
    }

    /// Draw a uniformly random position inside the limits for every joint of
    /// the group, leaving all other joints untouched.
    pub fn randomize_group(
        &mut self,
        group: &KinematicGroup,
        limits: &[JointLimit],
        rng: &mut impl Rng,
    ) -> Result<()> {
        if limits.len() != group.joint_count() {
            return Err(eyre::eyre!(
                "Limit count {} doesn't match joint count {} of group {}",
                limits.len(),
                group.joint_count(),
                group.name
            ));
        }
        for (joint, limit) in group.joints.iter().zip(limits) {
            self.set_joint_position(joint, rng.random_range(limit.min_angle..=limit.max_angle));
        }
        Ok(())
    }
}
