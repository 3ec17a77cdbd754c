//! Business logic layer

pub mod progress_engine;
pub mod stage_locks;

pub use progress_engine::ProgressEngine;
pub use stage_locks::StageLocks;
