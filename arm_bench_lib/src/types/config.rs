use eyre::Result;
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// A named, ordered set of controllable joints planned as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicGroup {
    pub name: String,
    pub joints: Vec<String>,
}

impl KinematicGroup {
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    pub min_angle: f64,
    pub max_angle: f64,
    pub max_velocity: f64,
}

/// Fixed transform given as translation + roll/pitch/yaw, radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    pub translation: [f64; 3],
    pub rpy: [f64; 3],
}

impl TransformConfig {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.translation;
        let [roll, pitch, yaw] = self.rpy;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

/// Static per-arm end-effector configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraspData {
    pub min_finger_width: f64,
    pub max_finger_width: f64,
    /// Offset from the grasp pose to the commandable tool pose.
    pub grasp_to_tool: TransformConfig,
    pub end_effector: KinematicGroup,
    pub end_effector_links: Vec<String>,
}

impl GraspData {
    pub fn grasp_to_tool_isometry(&self) -> Isometry3<f64> {
        self.grasp_to_tool.to_isometry()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsConfig {
    pub right_arm: KinematicGroup,
    pub left_arm: Option<KinematicGroup>,
    pub both_arms: Option<KinematicGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityConfig {
    pub main_scaling: f64,
    pub lift_scaling: f64,
    pub calibration_scaling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    pub lift_distance: f64,
    pub approach_distance: f64,
    /// Joint index to exercise in the limit sweep; negative means all joints.
    pub joint_limit_joint: i64,
    /// Base unit for the per-iteration settle delays, seconds.
    pub settle_seconds: f64,
    /// Link pairs allowed to touch during the random-motion test.
    pub allowed_collision_pairs: Vec<[String; 2]>,
    /// Optional frame the IK stress target is expressed in.
    pub ik_frame: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub camera_frame: String,
    pub radius: f64,
    pub steps: usize,
    /// Pushes the sweep center out in front of the camera.
    pub forward_offset: f64,
    pub drop_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub name: String,
    pub dual_arm: bool,
    pub fake_perception: bool,
    pub trajectory_dir: PathBuf,
    pub velocity: VelocityConfig,
    pub test: TestConfig,
    pub calibration: CalibrationConfig,
    pub groups: GroupsConfig,
    /// Grasp data keyed by arm group name.
    pub grasp: HashMap<String, GraspData>,
    pub joint_limits: HashMap<String, JointLimit>,
    /// Named full-group joint poses ("home", ...).
    pub named_poses: HashMap<String, HashMap<String, f64>>,
}

impl OrchestratorConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: OrchestratorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dual_arm {
            if self.groups.left_arm.is_none() {
                return Err(eyre::eyre!("Dual arm configured but no left arm group"));
            }
            if self.groups.both_arms.is_none() {
                return Err(eyre::eyre!("Dual arm configured but no both-arms group"));
            }
        }

        for group in self.arm_groups() {
            let grasp = self.grasp.get(&group.name).ok_or_else(|| {
                eyre::eyre!("No grasp data configured for arm group {}", group.name)
            })?;
            if grasp.min_finger_width >= grasp.max_finger_width {
                return Err(eyre::eyre!(
                    "Finger width range [{:.3}, {:.3}] for {} is empty",
                    grasp.min_finger_width,
                    grasp.max_finger_width,
                    group.name
                ));
            }
            for joint in group.joints.iter().chain(&grasp.end_effector.joints) {
                if !self.joint_limits.contains_key(joint) {
                    return Err(eyre::eyre!("No joint limits configured for {}", joint));
                }
            }
        }

        for (pose_name, pose) in &self.named_poses {
            for joint in pose.keys() {
                if !self.joint_limits.contains_key(joint) {
                    return Err(eyre::eyre!(
                        "Named pose {} references unknown joint {}",
                        pose_name,
                        joint
                    ));
                }
            }
        }

        Ok(())
    }

    /// The group motion modes plan with: both arms when dual, else the right arm.
    pub fn active_arm(&self) -> &KinematicGroup {
        if self.dual_arm {
            self.groups.both_arms.as_ref().unwrap_or(&self.groups.right_arm)
        } else {
            &self.groups.right_arm
        }
    }

    /// Individual arm groups, right first.
    pub fn arm_groups(&self) -> Vec<&KinematicGroup> {
        let mut groups = vec![&self.groups.right_arm];
        if self.dual_arm {
            if let Some(left) = &self.groups.left_arm {
                groups.push(left);
            }
        }
        groups
    }

    pub fn grasp_for(&self, group_name: &str) -> Result<&GraspData> {
        self.grasp
            .get(group_name)
            .ok_or_else(|| eyre::eyre!("No grasp data for group {}", group_name))
    }

    pub fn limits_for(&self, group: &KinematicGroup) -> Result<Vec<JointLimit>> {
        group
            .joints
            .iter()
            .map(|joint| {
                self.joint_limits
                    .get(joint)
                    .copied()
                    .ok_or_else(|| eyre::eyre!("No joint limits configured for {}", joint))
            })
            .collect()
    }
}
