//! # veltraj_motion
//!
//! A small library for jerk-limited velocity trajectory generation in Rust.
//!
//! Given the current kinematic state of one axis and a desired terminal
//! velocity, it computes a time-optimal bang-bang jerk command per control
//! tick, under bounded jerk and bounded acceleration with a final
//! acceleration of zero. The whole maneuver is replanned from scratch at
//! every tick from closed-form arithmetic, making it suitable for
//! receding-horizon position/velocity control loops with hard execution
//! time budgets.
//!
//! This library provides the following modules:
//! - `generator` for the per-tick trajectory generator and its inter-tick memory.
//! - `solver` for the closed-form bang-bang phase-duration computations.
//! - `integrator` for exact one-tick state propagation under constant jerk.
//! - `constraints` for validated motion bounds and solver fallback options.
//! - `kinematic_state` for the per-axis state triple.
//! - `position_freeze` for an optional caller-side position hold policy.

pub mod constraints;
pub mod generator;
pub mod integrator;
pub mod kinematic_state;
pub mod position_freeze;
pub mod solver;

// Re-export main structs for convenience:
pub use constraints::*;
pub use generator::*;
pub use integrator::*;
pub use kinematic_state::*;
pub use position_freeze::*;
pub use solver::*;
