//! Cartesian waypoint synthesis for the calibration and path-test modes.

use nalgebra::{Isometry3, Vector3};
use std::f64::consts::PI;

/// Circle of commandable poses around a reference frame.
///
/// Each pose is offset from the reference origin by `radius * (cos, sin)`
/// in the Y-Z plane, flipped 180 degrees about the local Y axis so a
/// camera-looking-at-target frame becomes a tool-approaching-target frame,
/// then composed with the fixed grasp-to-tool transform. The closing angle
/// is included, so `steps + 1` poses come back.
pub fn circular_sweep(
    reference: &Isometry3<f64>,
    radius: f64,
    steps: usize,
    tool_offset: &Isometry3<f64>,
) -> Vec<Isometry3<f64>> {
    let flip = Isometry3::rotation(Vector3::y() * PI);
    let increment = 2.0 * PI / steps as f64;

    let mut waypoints = Vec::with_capacity(steps + 1);
    for index in 0..=steps {
        let angle = increment * index as f64;

        let mut offset = Isometry3::identity();
        offset.translation.vector.z += radius * angle.cos();
        offset.translation.vector.y += radius * angle.sin();

        waypoints.push(offset * reference * flip * tool_offset);
    }
    waypoints
}

/// Target pose for a fixed-distance vertical displacement in the world frame.
pub fn vertical_target(current: &Isometry3<f64>, distance: f64, up: bool) -> Isometry3<f64> {
    let mut target = *current;
    target.translation.vector.z += if up { distance } else { -distance };
    target
}

/// Target pose displaced along the tool's own approach axis. `retreat`
/// pulls back, otherwise the tool advances.
pub fn retreat_target(current: &Isometry3<f64>, distance: f64, retreat: bool) -> Isometry3<f64> {
    let sign = if retreat { -1.0 } else { 1.0 };
    current * Isometry3::translation(sign * distance, 0.0, 0.0)
}
