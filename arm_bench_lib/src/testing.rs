//! Recording mock collaborators shared by the unit tests.

use crate::interfaces::{ExecutionInterface, PerceptionInterface, PlanningEngine, TrajectoryIo};
use crate::orchestrator::{Collaborators, Orchestrator};
use crate::remote::{Liveness, RemoteControl};
use crate::types::{
    CalibrationConfig, GraspData, GroupsConfig, JointLimit, KinematicGroup, OrchestratorConfig,
    RobotState, TestConfig, TransformConfig, VelocityConfig,
};
use eyre::Result;
use nalgebra::Isometry3;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub(crate) fn group(name: &str, joints: &[&str]) -> KinematicGroup {
    KinematicGroup {
        name: name.to_string(),
        joints: joints.iter().map(|j| j.to_string()).collect(),
    }
}

fn wide_limit() -> JointLimit {
    JointLimit {
        min_angle: -2.9,
        max_angle: 2.9,
        max_velocity: 1.0,
    }
}

fn grasp_for(ee_name: &str, finger_joints: &[&str], links: &[&str]) -> GraspData {
    GraspData {
        min_finger_width: 0.01,
        max_finger_width: 0.08,
        grasp_to_tool: TransformConfig {
            translation: [0.0, 0.0, -0.1],
            rpy: [0.0, 0.0, 0.0],
        },
        end_effector: group(ee_name, finger_joints),
        end_effector_links: links.iter().map(|l| l.to_string()).collect(),
    }
}

/// Single-arm six-joint configuration with zero settle delays.
pub(crate) fn test_config() -> OrchestratorConfig {
    let arm = group("right_arm", &["j1", "j2", "j3", "j4", "j5", "j6"]);
    let grasp_data = grasp_for("right_hand", &["f1", "f2"], &["finger_1", "finger_2"]);

    let mut joint_limits = HashMap::new();
    for joint in arm.joints.iter().chain(&grasp_data.end_effector.joints) {
        joint_limits.insert(joint.clone(), wide_limit());
    }

    let mut grasp = HashMap::new();
    grasp.insert("right_arm".to_string(), grasp_data);

    let mut home = HashMap::new();
    for joint in &arm.joints {
        home.insert(joint.clone(), 0.5);
    }
    let mut named_poses = HashMap::new();
    named_poses.insert("home".to_string(), home);

    OrchestratorConfig {
        name: "bench".to_string(),
        dual_arm: false,
        fake_perception: true,
        trajectory_dir: PathBuf::from("trajectories"),
        velocity: VelocityConfig {
            main_scaling: 0.6,
            lift_scaling: 0.4,
            calibration_scaling: 0.2,
        },
        test: TestConfig {
            lift_distance: 0.5,
            approach_distance: 1.0,
            joint_limit_joint: -1,
            settle_seconds: 0.0,
            allowed_collision_pairs: Vec::new(),
            ik_frame: None,
        },
        calibration: CalibrationConfig {
            camera_frame: "right_camera_frame".to_string(),
            radius: 0.05,
            steps: 4,
            forward_offset: 0.22,
            drop_offset: 0.15,
        },
        groups: GroupsConfig {
            right_arm: arm,
            left_arm: None,
            both_arms: None,
        },
        grasp,
        joint_limits,
        named_poses,
    }
}

/// Dual-arm variant of [`test_config`].
pub(crate) fn test_config_dual() -> OrchestratorConfig {
    let mut config = test_config();
    let left = group("left_arm", &["l1", "l2", "l3", "l4", "l5", "l6"]);
    let both = group(
        "both_arms",
        &[
            "j1", "j2", "j3", "j4", "j5", "j6", "l1", "l2", "l3", "l4", "l5", "l6",
        ],
    );
    for joint in left.joints.iter().chain(["lf1".to_string(), "lf2".to_string()].iter()) {
        config.joint_limits.insert(joint.clone(), wide_limit());
    }
    config.grasp.insert(
        "left_arm".to_string(),
        grasp_for("left_hand", &["lf1", "lf2"], &["l_finger_1", "l_finger_2"]),
    );
    config.groups.left_arm = Some(left);
    config.groups.both_arms = Some(both);
    config.dual_arm = true;
    config
}

/// Scripted behavior for the recording engine.
#[derive(Debug, Clone)]
pub(crate) struct EngineScript {
    pub controller_reachable: bool,
    pub perception_ready: bool,
    /// The first N validity checks report invalid.
    pub invalid_samples: usize,
    pub fail_plans: bool,
    pub fail_cartesian: bool,
    pub fail_ik: bool,
    /// Shut the liveness flag down after N motion commands
    /// (plan + cartesian + IK attempts combined).
    pub shutdown_after_commands: Option<usize>,
    /// Shut the liveness flag down after N validity checks.
    pub shutdown_after_validity: Option<usize>,
}

impl Default for EngineScript {
    fn default() -> Self {
        Self {
            controller_reachable: true,
            perception_ready: true,
            invalid_samples: 0,
            fail_plans: false,
            fail_cartesian: false,
            fail_ik: false,
            shutdown_after_commands: None,
            shutdown_after_validity: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EngineLog {
    pub validity_checks: usize,
    pub plan_attempts: usize,
    pub cartesian_attempts: usize,
    pub ik_solves: usize,
    /// Successful plan+execute calls: (group name, goal state).
    pub executed: Vec<(String, RobotState)>,
    /// Successful cartesian calls: (group name, waypoints).
    pub cartesian: Vec<(String, Vec<Isometry3<f64>>)>,
}

pub(crate) struct RecordingEngine {
    config: Arc<OrchestratorConfig>,
    liveness: Liveness,
    script: EngineScript,
    state: Mutex<RobotState>,
    log: Mutex<EngineLog>,
}

impl RecordingEngine {
    pub fn new(config: Arc<OrchestratorConfig>, liveness: Liveness, script: EngineScript) -> Self {
        let mut state = RobotState::new();
        for joint in config.joint_limits.keys() {
            state.set_joint_position(joint, 0.0);
        }
        Self {
            config,
            liveness,
            script,
            state: Mutex::new(state),
            log: Mutex::new(EngineLog::default()),
        }
    }

    pub fn log(&self) -> EngineLog {
        self.log.lock().unwrap().clone()
    }

    fn command_issued(&self, log: &EngineLog) {
        let commands = log.plan_attempts + log.cartesian_attempts + log.ik_solves;
        if self.script.shutdown_after_commands == Some(commands) {
            self.liveness.shutdown();
        }
    }
}

impl PlanningEngine for RecordingEngine {
    fn current_state(&self) -> Result<RobotState> {
        Ok(self.state.lock().unwrap().clone())
    }

    fn plan_and_execute(
        &self,
        _start: &RobotState,
        goal: &RobotState,
        group: &KinematicGroup,
        _velocity_scale: f64,
    ) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.plan_attempts += 1;
        self.command_issued(&log);
        if self.script.fail_plans {
            return Err(eyre::eyre!("scripted planning failure"));
        }
        log.executed.push((group.name.clone(), goal.clone()));
        drop(log);

        let values = goal.group_positions(group)?;
        self.state
            .lock()
            .unwrap()
            .set_group_positions(group, &values)?;
        Ok(())
    }

    fn execute_cartesian_path(
        &self,
        group: &KinematicGroup,
        waypoints: &[Isometry3<f64>],
        _velocity_scale: f64,
    ) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.cartesian_attempts += 1;
        self.command_issued(&log);
        if self.script.fail_cartesian {
            return Err(eyre::eyre!("scripted cartesian failure"));
        }
        log.cartesian.push((group.name.clone(), waypoints.to_vec()));
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
        let mut log = self.log.lock().unwrap();
        log.ik_solves += 1;
        self.command_issued(&log);
        if self.script.fail_ik {
            return Err(eyre::eyre!("scripted IK failure"));
        }
        drop(log);
        for joint in &group.joints {
            state.set_joint_position(joint, 0.1);
        }
        Ok(())
    }

    fn state_valid(&self, _state: &RobotState, _group: &KinematicGroup) -> bool {
        let mut log = self.log.lock().unwrap();
        log.validity_checks += 1;
        let checks = log.validity_checks;
        if self.script.shutdown_after_validity == Some(checks) {
            self.liveness.shutdown();
        }
        checks > self.script.invalid_samples
    }

    fn joint_limits(&self, group: &KinematicGroup) -> Result<Vec<JointLimit>> {
        self.config.limits_for(group)
    }

    fn end_effector_pose(&self, _group: &KinematicGroup) -> Result<Isometry3<f64>> {
        Ok(Isometry3::translation(0.4, 0.0, 0.6))
    }

    fn frame_pose(&self, frame: &str) -> Result<Isometry3<f64>> {
        if frame == "missing_frame" {
            return Err(eyre::eyre!("unknown frame {frame}"));
        }
        Ok(Isometry3::translation(0.0, 0.2, 1.0))
    }
}

struct StubExecution {
    reachable: bool,
}

impl ExecutionInterface for StubExecution {
    fn controller_reachable(&self) -> bool {
        self.reachable
    }
}

struct StubPerception {
    ready: bool,
}

impl PerceptionInterface for StubPerception {
    fn is_ready(&self) -> bool {
        self.ready
    }
}

#[derive(Default)]
pub(crate) struct RecordingTrajectoryIo {
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl TrajectoryIo for RecordingTrajectoryIo {
    fn record(&self, path: &Path) -> Result<()> {
        if self.fail {
            return Err(eyre::eyre!("scripted record failure"));
        }
        self.calls
            .lock()
            .unwrap()
            .push(format!("record:{}", path.display()));
        Ok(())
    }

    fn playback(&self, path: &Path, group: &KinematicGroup, velocity_scale: f64) -> Result<()> {
        if self.fail {
            return Err(eyre::eyre!("scripted playback failure"));
        }
        self.calls.lock().unwrap().push(format!(
            "playback:{}:{}:{:.2}",
            path.display(),
            group.name,
            velocity_scale
        ));
        Ok(())
    }
}

pub(crate) fn test_orchestrator(
    config: OrchestratorConfig,
    script: EngineScript,
) -> (Orchestrator, Arc<RecordingEngine>) {
    let (orchestrator, engine, _io) = test_orchestrator_with_io(config, script, false);
    (orchestrator, engine)
}

pub(crate) fn test_orchestrator_with_io(
    config: OrchestratorConfig,
    script: EngineScript,
    fail_io: bool,
) -> (Orchestrator, Arc<RecordingEngine>, Arc<RecordingTrajectoryIo>) {
    let liveness = Liveness::new();
    let config = Arc::new(config);
    let engine = Arc::new(RecordingEngine::new(
        config.clone(),
        liveness.clone(),
        script.clone(),
    ));
    let io = Arc::new(RecordingTrajectoryIo {
        fail: fail_io,
        calls: Mutex::new(Vec::new()),
    });
    let (_tx, remote) = RemoteControl::new(liveness.clone(), true);
    let orchestrator = Orchestrator::new(
        config,
        Collaborators {
            engine: engine.clone(),
            execution: Arc::new(StubExecution {
                reachable: script.controller_reachable,
            }),
            perception: Arc::new(StubPerception {
                ready: script.perception_ready,
            }),
            trajectory_io: io.clone(),
        },
        Arc::new(remote),
        liveness,
    );
    (orchestrator, engine, io)
}
