//! Per-frame physics step
//!
//! Advances a `SimulationState` by exactly one frame. Balls never interact,
//! so each is integrated and bounced against the boundary on its own.

use glam::Vec2;
use rand::Rng;

use super::collision::{boundary_contact, reflect_velocity, resting_position};
use super::mode::Recolor;
use super::state::{SimulationState, random_color};
use crate::consts::BALL_GROWTH;

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// Bounces that occurred this frame
    pub bounces: u32,
    /// A ball filled the boundary; the episode is over
    pub terminal: bool,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Advance the simulation by one frame
pub fn step<R: Rng>(state: &mut SimulationState, rng: &mut R) -> StepOutcome {
    let policy = state.policy;
    let max_ball_radius = state.max_ball_radius();
    let mut outcome = StepOutcome::default();

    state.frame += 1;
    state.boundary.advance();

    if policy.recolor == Recolor::EveryFrame {
        for ball in &mut state.balls {
            ball.color = random_color(rng);
        }
    }

    for ball in &mut state.balls {
        if let Some(gravity) = policy.gravity {
            ball.vel += gravity;
        }
        ball.pos += ball.vel;

        if let Some(contact) = boundary_contact(ball, &state.boundary) {
            let normal = contact.normal;
            ball.vel = reflect_velocity(ball.vel, normal);

            if let Some(kick) = policy.perturbation {
                ball.vel += Vec2::new(
                    rng.random_range(kick.min..kick.max),
                    rng.random_range(kick.min..kick.max),
                );
            }
            // A ball already at the cap keeps its speed; otherwise it would
            // accelerate without bound when the fill does not end the episode
            if let Some(multiplier) = policy.speed_multiplier {
                if ball.radius < max_ball_radius {
                    ball.vel *= multiplier;
                }
            }

            if policy.grows_on_bounce && ball.radius < max_ball_radius {
                ball.radius = (ball.radius + BALL_GROWTH).min(max_ball_radius);
                if policy.recolor == Recolor::OnGrowth {
                    ball.color = random_color(rng);
                }
            }

            ball.pos = resting_position(&state.boundary, normal, ball.radius);
            state.bounce_count += 1;
            outcome.bounces += 1;
        }

        if policy.terminates_on_fill && ball.radius >= max_ball_radius {
            outcome.terminal = true;
        }
    }

    if outcome.terminal {
        log::debug!(
            "{} filled after {} bounces ({} frames)",
            policy.mode,
            state.bounce_count,
            state.frame
        );
    }

    outcome
}
