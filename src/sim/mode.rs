//! Game modes and their per-mode policy table
//!
//! Every mode-specific constant lives in [`ModePolicy::for_mode`]. The step
//! function and initialization only read the policy, they never match on the
//! mode themselves.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ModeError;

/// Selectable game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Classic,
    Frenzy,
    Chaos,
    Rainbow,
    MultiBall,
    Gravity,
    Pulse,
}

impl GameMode {
    /// All modes in menu order
    pub const ALL: [GameMode; 7] = [
        GameMode::Classic,
        GameMode::Frenzy,
        GameMode::Chaos,
        GameMode::Rainbow,
        GameMode::MultiBall,
        GameMode::Gravity,
        GameMode::Pulse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Frenzy => "Frenzy",
            GameMode::Chaos => "Chaos",
            GameMode::Rainbow => "Rainbow",
            GameMode::MultiBall => "Multi-ball",
            GameMode::Gravity => "Gravity",
            GameMode::Pulse => "Pulse",
        }
    }

    /// Policy table entry for this mode
    pub fn policy(self) -> ModePolicy {
        ModePolicy::for_mode(self)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "frenzy" => Ok(GameMode::Frenzy),
            "chaos" => Ok(GameMode::Chaos),
            "rainbow" => Ok(GameMode::Rainbow),
            "multi-ball" | "multiball" | "multi_ball" => Ok(GameMode::MultiBall),
            "gravity" => Ok(GameMode::Gravity),
            "pulse" => Ok(GameMode::Pulse),
            _ => Err(ModeError::Unknown(s.to_string())),
        }
    }
}

/// How initial ball velocities are sampled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LaunchRule {
    /// Each component independently `+speed` or `-speed`
    Diagonal { speed: f32 },
    /// Each component independently uniform in `[-max, max]`
    Uniform { max: f32 },
    /// `(uniform[-max, max], 0)`
    Horizontal { max: f32 },
}

/// Random kick added to each velocity component after a reflection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub min: f32,
    pub max: f32,
}

/// When balls pick a new palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recolor {
    /// Only when a bounce grows the ball
    OnGrowth,
    /// Every frame, regardless of collisions
    EveryFrame,
}

/// Boundary motion rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryRule {
    Static { radius: f32 },
    /// Radius bounces between `min` and `max` by `speed` per frame, starting at `max` shrinking
    Pulse { min: f32, max: f32, speed: f32 },
}

/// Per-mode configuration bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub mode: GameMode,
    pub ball_count: usize,
    pub launch: LaunchRule,
    /// Velocity scale applied on every bounce (`None` = reflection only)
    pub speed_multiplier: Option<f32>,
    pub perturbation: Option<Perturbation>,
    /// Added to velocity every frame before integration
    pub gravity: Option<Vec2>,
    pub recolor: Recolor,
    pub grows_on_bounce: bool,
    /// Whether a ball reaching the fill cap ends the episode
    pub terminates_on_fill: bool,
    pub boundary: BoundaryRule,
}

const DEFAULT_PERTURBATION: Perturbation = Perturbation { min: -1.0, max: 2.0 };
const CLASSIC_MULTIPLIER: f32 = 1.015;
const FRENZY_MULTIPLIER: f32 = 1.05;

impl ModePolicy {
    pub fn for_mode(mode: GameMode) -> Self {
        let base = ModePolicy {
            mode,
            ball_count: 1,
            launch: LaunchRule::Diagonal { speed: 5.0 },
            speed_multiplier: Some(CLASSIC_MULTIPLIER),
            perturbation: Some(DEFAULT_PERTURBATION),
            gravity: None,
            recolor: Recolor::OnGrowth,
            grows_on_bounce: true,
            terminates_on_fill: true,
            boundary: BoundaryRule::Static {
                radius: BOUNDARY_RADIUS,
            },
        };

        match mode {
            GameMode::Classic => base,
            GameMode::Frenzy => ModePolicy {
                launch: LaunchRule::Diagonal { speed: 10.0 },
                speed_multiplier: Some(FRENZY_MULTIPLIER),
                ..base
            },
            GameMode::Chaos => ModePolicy {
                ball_count: 10,
                perturbation: None,
                ..base
            },
            GameMode::Rainbow => ModePolicy {
                recolor: Recolor::EveryFrame,
                ..base
            },
            GameMode::MultiBall => ModePolicy {
                ball_count: 3,
                launch: LaunchRule::Uniform { max: 5.0 },
                ..base
            },
            GameMode::Gravity => ModePolicy {
                launch: LaunchRule::Horizontal { max: 5.0 },
                speed_multiplier: None,
                perturbation: None,
                gravity: Some(GRAVITY),
                ..base
            },
            GameMode::Pulse => ModePolicy {
                perturbation: None,
                boundary: BoundaryRule::Pulse {
                    min: PULSE_MIN_RADIUS,
                    max: PULSE_MAX_RADIUS,
                    speed: PULSE_SPEED,
                },
                ..base
            },
        }
    }

    /// Same policy with all randomness removed from the bounce response
    pub fn without_perturbation(self) -> Self {
        ModePolicy {
            perturbation: None,
            ..self
        }
    }
}
