//! Simulation state and initialization
//!
//! A `SimulationState` is built fresh for every episode and replaced
//! wholesale on reset. Nothing here holds an RNG; callers pass one in.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::mode::{BoundaryRule, GameMode, LaunchRule, ModePolicy};
use crate::consts::*;

/// Display color of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Palette balls draw their colors from
pub const PALETTE: [Color; 6] = [
    Color::rgb(255, 0, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(0, 0, 255),
    Color::rgb(255, 255, 0),
    Color::rgb(255, 0, 255),
    Color::rgb(0, 255, 255),
];

/// Uniformly random palette entry
pub fn random_color<R: Rng>(rng: &mut R) -> Color {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Ball {
    /// Ball at the boundary center with the starting radius
    pub fn new(vel: Vec2, color: Color) -> Self {
        Self {
            pos: BOUNDARY_CENTER,
            vel,
            radius: BALL_START_RADIUS,
            color,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The circular arena wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub center: Vec2,
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Signed radius change per frame (0 for a static boundary)
    pub pulse_speed: f32,
}

impl Boundary {
    pub fn fixed(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            min_radius: radius,
            max_radius: radius,
            pulse_speed: 0.0,
        }
    }

    /// Pulsing boundary starting at its largest extent, shrinking
    pub fn pulsing(center: Vec2, min_radius: f32, max_radius: f32, speed: f32) -> Self {
        Self {
            center,
            radius: max_radius,
            min_radius,
            max_radius,
            pulse_speed: -speed.abs(),
        }
    }

    pub fn from_rule(rule: BoundaryRule) -> Self {
        match rule {
            BoundaryRule::Static { radius } => Self::fixed(BOUNDARY_CENTER, radius),
            BoundaryRule::Pulse { min, max, speed } => {
                Self::pulsing(BOUNDARY_CENTER, min, max, speed)
            }
        }
    }

    /// Advance the pulse by one frame. Reaching either extent reverses direction.
    pub fn advance(&mut self) {
        if self.pulse_speed == 0.0 {
            return;
        }
        self.radius = (self.radius + self.pulse_speed).clamp(self.min_radius, self.max_radius);
        if self.radius >= self.max_radius || self.radius <= self.min_radius {
            self.pulse_speed = -self.pulse_speed;
        }
    }

    /// Largest radius a ball may grow to inside this boundary
    pub fn max_ball_radius(&self) -> f32 {
        self.min_radius - BOUNDARY_MARGIN
    }
}

/// Complete simulation state for one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub policy: ModePolicy,
    pub balls: Vec<Ball>,
    pub boundary: Boundary,
    /// Total bounces across all balls
    pub bounce_count: u64,
    /// Frames stepped so far
    pub frame: u64,
}

impl SimulationState {
    /// Fresh state for a mode, using the mode's table entry
    pub fn new<R: Rng>(mode: GameMode, rng: &mut R) -> Self {
        Self::with_policy(mode.policy(), rng)
    }

    /// Fresh state for an explicit (possibly customised) policy
    pub fn with_policy<R: Rng>(policy: ModePolicy, rng: &mut R) -> Self {
        let balls = (0..policy.ball_count)
            .map(|_| {
                let vel = launch_velocity(policy.launch, rng);
                Ball::new(vel, random_color(rng))
            })
            .collect();

        Self {
            policy,
            balls,
            boundary: Boundary::from_rule(policy.boundary),
            bounce_count: 0,
            frame: 0,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.policy.mode
    }

    pub fn max_ball_radius(&self) -> f32 {
        self.boundary.max_ball_radius()
    }

    /// Whether any ball has reached the fill cap
    pub fn is_filled(&self) -> bool {
        let cap = self.max_ball_radius();
        self.balls.iter().any(|b| b.radius >= cap)
    }
}

/// Build a fresh state for `mode`
pub fn initialize<R: Rng>(mode: GameMode, rng: &mut R) -> SimulationState {
    SimulationState::new(mode, rng)
}

fn launch_velocity<R: Rng>(rule: LaunchRule, rng: &mut R) -> Vec2 {
    match rule {
        LaunchRule::Diagonal { speed } => {
            let mut component = || if rng.random_bool(0.5) { speed } else { -speed };
            Vec2::new(component(), component())
        }
        LaunchRule::Uniform { max } => Vec2::new(
            rng.random_range(-max..=max),
            rng.random_range(-max..=max),
        ),
        LaunchRule::Horizontal { max } => Vec2::new(rng.random_range(-max..=max), 0.0),
    }
}
