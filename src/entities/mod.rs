//! Entity type definitions
//!
//! - [`Goal`] - Long-lived objectives
//! - [`Project`] - Bodies of work, optionally attached to a goal
//! - [`Task`] - Individual units of work, optionally attached to a project

pub mod goal;
pub mod project;
pub mod task;

pub use goal::Goal;
pub use project::Project;
pub use task::Task;
