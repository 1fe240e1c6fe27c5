//! Core type definitions used across the planner workspace.

pub mod id;

pub use id::*;
