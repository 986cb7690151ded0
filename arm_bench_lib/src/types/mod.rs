pub mod config;
pub mod robot_state;
pub mod signals;

pub use config::*;
pub use robot_state::*;
pub use signals::*;
