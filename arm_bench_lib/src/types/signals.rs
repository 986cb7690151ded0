use serde::{Deserialize, Serialize};

/// Discrete operator signal gating single-step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepSignal {
    /// Advance one step.
    Next,
    /// Stop gating and run continuously from here on.
    RunContinuously,
}

impl StepSignal {
    /// Parse the plain-text form used on the dataflow wire.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "next" => Some(StepSignal::Next),
            "run" => Some(StepSignal::RunContinuously),
            _ => None,
        }
    }
}
