use arm_bench_lib::sim::{SimExecutionInterface, SimPerception, SimPlanningEngine, SimTrajectoryIo};
use arm_bench_lib::{
    init_tracing, Collaborators, Liveness, Mode, Orchestrator, OrchestratorConfig, RemoteControl,
    StepSignal,
};
use dora_node_api::{
    arrow::array::{Array, AsArray, BinaryArray},
    dora_core::config::DataId,
    DoraNode, Event,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use std::thread;

/// Terminal mode outcome published on the dataflow for monitors.
#[derive(Debug, Serialize, Deserialize)]
struct ModeStatus {
    mode: String,
    success: bool,
    detail: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let _guard = init_tracing();

    tracing::info!("Starting task orchestrator node");

    let config_path =
        std::env::var("ORCHESTRATOR_CONFIG").unwrap_or_else(|_| "config/arm_bench.toml".to_owned());
    let mode_id: u32 = std::env::var("TASK_MODE")
        .unwrap_or_else(|_| "6".to_owned())
        .parse()?;
    let pose = std::env::var("TASK_POSE").unwrap_or_else(|_| "home".to_owned());
    let single_step = std::env::var("SINGLE_STEP").is_ok();

    let Some(mode) = Mode::from_id(mode_id, Some(&pose)) else {
        tracing::error!("Unknown mode id {}, nothing to run", mode_id);
        return Ok(());
    };

    let config = Arc::new(OrchestratorConfig::load_from_file(&config_path)?);
    tracing::info!(
        "Loaded configuration for robot '{}' from {}",
        config.name,
        config_path
    );

    let (mut node, mut events) = DoraNode::init_from_env()?;
    let status_output = DataId::from("mode_status".to_owned());

    let liveness = Liveness::new();
    let (step_tx, remote) = RemoteControl::new(liveness.clone(), !single_step);

    let engine = Arc::new(SimPlanningEngine::new(config.clone()));
    let orchestrator = Orchestrator::new(
        config.clone(),
        Collaborators {
            engine,
            execution: Arc::new(SimExecutionInterface),
            perception: Arc::new(SimPerception),
            trajectory_io: Arc::new(SimTrajectoryIo),
        },
        Arc::new(remote),
        liveness.clone(),
    );

    // End-effector links are expected to touch each other
    orchestrator.allow_group_collisions(&config.groups.right_arm.name)?;
    if let Some(left_arm) = &config.groups.left_arm {
        orchestrator.allow_group_collisions(&left_arm.name)?;
    }

    // The mode runs on its own thread so the dataflow event loop below can
    // keep feeding step signals and react to stop events.
    let control_liveness = liveness.clone();
    let control = thread::spawn(move || {
        let outcome = orchestrator.run_mode(&mode);
        let status = ModeStatus {
            mode: mode.label().to_owned(),
            success: outcome.is_ok(),
            detail: outcome.err().map(|report| report.to_string()),
        };

        match serde_json::to_vec(&status) {
            Ok(serialized) => {
                let arrow_data = BinaryArray::from_vec(vec![serialized.as_slice()]);
                if let Err(report) =
                    node.send_output(status_output, Default::default(), arrow_data)
                {
                    tracing::warn!("Unable to publish mode status: {}", report);
                }
            }
            Err(report) => tracing::warn!("Unable to serialize mode status: {}", report),
        }

        // Holding modes only return once shutdown was requested; for the
        // one-shot modes this flag releases the event loop below.
        control_liveness.shutdown();
    });

    while let Some(event) = events.recv() {
        match event {
            Event::Input {
                id,
                metadata: _,
                data,
            } => {
                if id.as_str() == "step_signal" {
                    if let Some(string_array) = data.as_string_opt::<i32>() {
                        if string_array.len() > 0 {
                            let text = string_array.value(0);
                            match StepSignal::parse(text) {
                                Some(signal) => {
                                    tracing::debug!("Forwarding step signal: {:?}", signal);
                                    if step_tx.send(signal).is_err() {
                                        tracing::debug!("Control thread no longer listening");
                                    }
                                }
                                None => {
                                    tracing::warn!("Ignoring malformed step signal '{}'", text)
                                }
                            }
                        }
                    }
                }
            }
            Event::Stop(_) => {
                tracing::info!("Stop event received - shutting down task orchestrator");
                liveness.shutdown();
                break;
            }
            _ => {}
        }
        if !liveness.is_live() {
            break;
        }
    }

    liveness.shutdown();
    if control.join().is_err() {
        tracing::error!("Control thread panicked");
    }
    tracing::info!("Task orchestrator stopped");
    Ok(())
}
