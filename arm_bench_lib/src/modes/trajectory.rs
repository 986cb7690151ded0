//! Trajectory recording and playback modes. The file formats live inside
//! the Trajectory IO collaborator; this side only supplies paths.

use crate::orchestrator::Orchestrator;
use eyre::{eyre, Result};
use std::path::PathBuf;
use tracing::info;

const RECORD_FILE: &str = "test_trajectory";
const PLAYBACK_FILE: &str = "calibration_waypoints";

impl Orchestrator {
    /// Mode 33: record the live trajectory until the recorder stops.
    pub fn record_trajectory(&self) -> Result<()> {
        let path = self.trajectory_file_path(RECORD_FILE);
        info!("Recording trajectory to {}", path.display());
        self.trajectory_io.record(&path)?;
        info!("Done recording");
        Ok(())
    }

    /// Mode 34: play the saved calibration waypoints back at calibration
    /// speed.
    pub fn playback_trajectory(&self) -> Result<()> {
        let group = &self.config.groups.right_arm;
        let path = self.trajectory_file_path(PLAYBACK_FILE);
        info!("Playing back waypoints from {}", path.display());
        self.trajectory_io
            .playback(&path, group, self.config.velocity.calibration_scaling)
            .map_err(|report| {
                eyre!(
                    "Unable to play back waypoints from {}: {report}",
                    path.display()
                )
            })
    }

    fn trajectory_file_path(&self, file_name: &str) -> PathBuf {
        self.config.trajectory_dir.join(format!("{file_name}.csv"))
    }
}
