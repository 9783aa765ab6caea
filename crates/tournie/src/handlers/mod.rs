//! Command and callback pipelines.
//!
//! Each public function returns the pipeline for one command or callback,
//! assembled from validation steps, service steps and a rendering step.

pub mod matches;
pub mod tournaments;
pub mod usage;
pub mod users;
