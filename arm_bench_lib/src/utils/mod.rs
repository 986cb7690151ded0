pub mod tracing;

pub use tracing::*;
