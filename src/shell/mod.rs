//! Presentation and input collaborators
//!
//! The simulation never calls into this module. A [`Shell`] renders state and
//! reports input; [`Session`] drives the menu → play → end-screen flow on top
//! of any shell.

pub mod recording;
pub mod session;
pub mod terminal;

pub use recording::{FrameSink, FrameSnapshot, JsonlRecorder, RecordingSummary};
pub use session::{FrameClock, Session};
pub use terminal::TerminalShell;

use crate::sim::{GameMode, SimulationState};

/// Input event reported by a shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    /// Window closed / quit key
    Quit,
    KeyPress(char),
    /// Pointer click in shell coordinates
    Click { x: u16, y: u16 },
}

/// Result of the mode menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Play(GameMode),
    Quit,
}

/// Result of the end-of-episode screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndChoice {
    PlayAgain,
    ToMenu,
    Quit,
}

/// Extra display information that is not part of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hud {
    pub recording: bool,
    pub seed: u64,
}

/// Rendering/input backend
pub trait Shell {
    /// Input since the last call; never blocks
    fn poll_events(&mut self) -> anyhow::Result<Vec<ShellEvent>>;

    /// Draw one frame of the current state
    fn render_frame(&mut self, state: &SimulationState, hud: &Hud) -> anyhow::Result<()>;

    /// Block until a mode is chosen (or the user quits)
    fn show_mode_menu(&mut self) -> anyhow::Result<MenuChoice>;

    /// Block until the player decides what follows a finished episode
    fn show_end_screen(&mut self, state: &SimulationState) -> anyhow::Result<EndChoice>;
}
