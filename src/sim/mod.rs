//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, no wall-clock time
//! - RNG passed in by the caller, never global
//! - Stable ball iteration order
//! - No rendering, input or recording dependencies

pub mod collision;
pub mod mode;
pub mod state;
pub mod step;

pub use collision::{BoundaryContact, boundary_contact, reflect_velocity};
pub use mode::{BoundaryRule, GameMode, LaunchRule, ModePolicy, Perturbation, Recolor};
pub use state::{Ball, Boundary, Color, PALETTE, SimulationState, initialize};
pub use step::{StepOutcome, step};
