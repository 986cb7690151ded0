//! Repeat-with-policy executor shared by all test and calibration modes.
//!
//! Every mode has the same outer shape: iterate until shutdown, frame each
//! iteration for the operator, run the mode-specific body, settle, repeat.
//! The body's `Err` is the terminal failure of the whole procedure; modes
//! that only log individual failures swallow them inside the body.

use crate::remote::Liveness;
use eyre::Result;
use std::time::Duration;
use tracing::info;

const FRAME_RULE: &str = "-------------------------------------------------------";

pub struct TrialEngine<'a> {
    label: &'a str,
    settle_delay: Duration,
    liveness: &'a Liveness,
    iteration_limit: Option<usize>,
}

impl<'a> TrialEngine<'a> {
    pub fn new(label: &'a str, settle_delay: Duration, liveness: &'a Liveness) -> Self {
        Self {
            label,
            settle_delay,
            liveness,
            iteration_limit: None,
        }
    }

    /// Cap the number of outer iterations instead of running to shutdown.
    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Run `iteration` repeatedly until shutdown (or the iteration limit).
    /// An `Err` from the body ends the procedure immediately.
    pub fn run<F>(&self, mut iteration: F) -> Result<()>
    where
        F: FnMut(usize) -> Result<()>,
    {
        let mut index = 0;
        while self.liveness.is_live() {
            if let Some(limit) = self.iteration_limit {
                if index >= limit {
                    break;
                }
            }

            info!("{}", FRAME_RULE);
            info!("{}: iteration {}", self.label, index);
            iteration(index)?;

            if !self.liveness.sleep(self.settle_delay) {
                break;
            }
            index += 1;
        }
        info!("Done running {}", self.label);
        Ok(())
    }
}

/// Bounded inner-attempt loop. The closure returns `Ok(Some(_))` on success,
/// `Ok(None)` to retry silently, and `Err` to end the procedure. Exhausting
/// the budget yields `Ok(None)`; the caller decides what exhaustion means.
pub fn attempts<T>(
    budget: usize,
    mut attempt: impl FnMut(usize) -> Result<Option<T>>,
) -> Result<Option<T>> {
    for index in 0..budget {
        if let Some(found) = attempt(index)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
