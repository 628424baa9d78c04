//! Trackwise: goals, projects and tasks on a local SQLite store
//!
//! List queries are answered from a per-session [`core::QueryCache`] that
//! the store keeps current by publishing domain events after each write.

pub mod cli;
pub mod core;
pub mod entities;
