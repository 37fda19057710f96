pub mod config;
pub mod controller;
pub mod counters;
pub mod gate;
pub mod probe;
pub mod scheduler;
pub mod stats;

pub use config::*;
pub use controller::*;
pub use counters::*;
pub use gate::*;
pub use probe::*;
pub use scheduler::*;
pub use stats::*;
