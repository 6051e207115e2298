//! Bounce Fill - balls bouncing inside a circle until one fills it
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state, mode table, collision, step)
//! - `settings`: Configuration from defaults, JSON file and environment
//! - `shell`: Presentation/input collaborators (session flow, terminal UI, recording)

pub mod error;
pub mod settings;
pub mod shell;
pub mod sim;

pub use error::{ModeError, SettingsError};
pub use settings::{Settings, StartMode};

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// World dimensions (the boundary is centred in this rectangle)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    pub const BOUNDARY_CENTER: Vec2 = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);

    /// Boundary defaults
    pub const BOUNDARY_RADIUS: f32 = 250.0;
    /// Gap kept between the largest ball and the smallest boundary extent
    pub const BOUNDARY_MARGIN: f32 = 10.0;

    /// Pulse mode boundary oscillation
    pub const PULSE_MIN_RADIUS: f32 = 150.0;
    pub const PULSE_MAX_RADIUS: f32 = 250.0;
    pub const PULSE_SPEED: f32 = 1.0;

    /// Ball defaults
    pub const BALL_START_RADIUS: f32 = 20.0;
    /// Radius gained per bounce
    pub const BALL_GROWTH: f32 = 1.0;

    /// Gravity mode acceleration per frame (screen space, y down)
    pub const GRAVITY: Vec2 = Vec2::new(0.0, 0.2);

    /// Target frame rate of the shell loop
    pub const FRAME_RATE: u32 = 60;
}
