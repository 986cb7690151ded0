//! Top-level mode selection. One mode runs per invocation; its terminal
//! outcome is the only result the caller ever branches on.

use crate::orchestrator::Orchestrator;
use eyre::Result;
use tracing::{error, info};

/// The named operational procedures, keyed by their historical numeric ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    GoHome,                        // 2
    TestUpAndDown,                 // 5
    TestRandomValidMotions,        // 6
    TestEndEffectors,              // 8
    GotoPose { pose: String },     // 9
    TestInAndOut,                  // 10
    CalibrateInCircle,             // 11
    TestJointLimits,               // 17
    TestGraspWidths,               // 20
    TestIkSolver,                  // 25
    RecordTrajectory,              // 33
    PlaybackTrajectory,            // 34
    DumpJointPose,                 // 41
    WatchCollisionAndBounds,       // 42
}

impl Mode {
    /// Look a mode up by numeric id. `pose` only applies to the goto-pose
    /// mode and defaults to "home". Unknown ids yield `None`; reporting
    /// them is the caller's job and must not take the process down.
    pub fn from_id(id: u32, pose: Option<&str>) -> Option<Self> {
        match id {
            2 => Some(Mode::GoHome),
            5 => Some(Mode::TestUpAndDown),
            6 => Some(Mode::TestRandomValidMotions),
            8 => Some(Mode::TestEndEffectors),
            9 => Some(Mode::GotoPose {
                pose: pose.unwrap_or("home").to_string(),
            }),
            10 => Some(Mode::TestInAndOut),
            11 => Some(Mode::CalibrateInCircle),
            17 => Some(Mode::TestJointLimits),
            20 => Some(Mode::TestGraspWidths),
            25 => Some(Mode::TestIkSolver),
            33 => Some(Mode::RecordTrajectory),
            34 => Some(Mode::PlaybackTrajectory),
            41 => Some(Mode::DumpJointPose),
            42 => Some(Mode::WatchCollisionAndBounds),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::GoHome => "go home",
            Mode::TestUpAndDown => "up and down test",
            Mode::TestRandomValidMotions => "random valid motion test",
            Mode::TestEndEffectors => "end effector test",
            Mode::GotoPose { .. } => "goto pose",
            Mode::TestInAndOut => "in and out test",
            Mode::CalibrateInCircle => "circle calibration",
            Mode::TestJointLimits => "joint limit test",
            Mode::TestGraspWidths => "grasp width test",
            Mode::TestIkSolver => "IK solver test",
            Mode::RecordTrajectory => "trajectory recording",
            Mode::PlaybackTrajectory => "trajectory playback",
            Mode::DumpJointPose => "joint pose dump",
            Mode::WatchCollisionAndBounds => "collision and bounds watch",
        }
    }

    /// Pure observers and manual recording skip the preflight check; every
    /// mode that commands motion requires it.
    fn requires_ready_system(&self) -> bool {
        !matches!(
            self,
            Mode::RecordTrajectory | Mode::DumpJointPose | Mode::WatchCollisionAndBounds
        )
    }
}

impl Orchestrator {
    /// Run one mode to its terminal outcome, gating on system readiness and
    /// the operator's step signal first.
    pub fn run_mode(&self, mode: &Mode) -> Result<()> {
        info!("Running mode: {}", mode.label());

        if mode.requires_ready_system() {
            self.check_system_ready()?;
        }

        self.remote.wait_for_next_step(mode.label())?;
        if !self.liveness.is_live() {
            info!("Shutdown requested before mode start");
            return Ok(());
        }

        let outcome = match mode {
            Mode::GoHome => self.go_home(),
            Mode::TestUpAndDown => self.test_up_and_down(),
            Mode::TestRandomValidMotions => self.test_random_valid_motions(),
            Mode::TestEndEffectors => self.test_end_effectors(),
            Mode::GotoPose { pose } => self.goto_pose(pose),
            Mode::TestInAndOut => self.test_in_and_out(),
            Mode::CalibrateInCircle => self.calibrate_in_circle(),
            Mode::TestJointLimits => self.test_joint_limits(),
            Mode::TestGraspWidths => self.test_grasp_widths(),
            Mode::TestIkSolver => self.test_ik_solver(),
            Mode::RecordTrajectory => self.record_trajectory(),
            Mode::PlaybackTrajectory => self.playback_trajectory(),
            Mode::DumpJointPose => self.dump_joint_pose(),
            Mode::WatchCollisionAndBounds => self.watch_collision_and_bounds(),
        };

        match &outcome {
            Ok(()) => info!("Mode '{}' complete", mode.label()),
            Err(report) => error!("Mode '{}' failed: {}", mode.label(), report),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_config, test_orchestrator, test_orchestrator_with_io, EngineScript};

    #[test]
    fn test_mode_lookup_by_id() {
        assert_eq!(
            Mode::from_id(6, None),
            Some(Mode::TestRandomValidMotions)
        );
        assert_eq!(
            Mode::from_id(9, Some("observe")),
            Some(Mode::GotoPose {
                pose: "observe".to_string()
            })
        );
        assert_eq!(
            Mode::from_id(9, None),
            Some(Mode::GotoPose {
                pose: "home".to_string()
            })
        );
        assert_eq!(Mode::from_id(999, None), None);
    }

    #[test]
    fn test_motion_mode_gated_on_readiness() {
        let mut config = test_config();
        config.groups.right_arm.joints.truncate(5);
        let (orchestrator, engine) = test_orchestrator(config, EngineScript::default());
        assert!(orchestrator.run_mode(&Mode::GoHome).is_err());
        // The failed preflight check kept the arm still
        assert_eq!(engine.log().plan_attempts, 0);
    }

    #[test]
    fn test_unreachable_controller_blocks_motion_modes() {
        let script = EngineScript {
            controller_reachable: false,
            ..EngineScript::default()
        };
        let (orchestrator, engine) = test_orchestrator(test_config(), script);
        assert!(orchestrator.run_mode(&Mode::GoHome).is_err());
        assert_eq!(engine.log().plan_attempts, 0);
    }

    #[test]
    fn test_recording_skips_readiness_gate() {
        let script = EngineScript {
            controller_reachable: false,
            ..EngineScript::default()
        };
        let (orchestrator, _engine, io) = test_orchestrator_with_io(test_config(), script, false);
        orchestrator.run_mode(&Mode::RecordTrajectory).unwrap();
        assert_eq!(io.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_run_mode_reports_terminal_outcome() {
        let (orchestrator, engine) = test_orchestrator(test_config(), EngineScript::default());
        orchestrator.run_mode(&Mode::GoHome).unwrap();
        assert_eq!(engine.log().executed.len(), 1);

        let script = EngineScript {
            fail_plans: true,
            ..EngineScript::default()
        };
        let (orchestrator, _engine) = test_orchestrator(test_config(), script);
        assert!(orchestrator.run_mode(&Mode::GoHome).is_err());
    }
}
