//! Session flow: mode menu, play loop, end screen
//!
//! Single-threaded. The shell's modal screens block; the play loop polls
//! input without blocking, steps the simulation once and renders once per
//! frame, then waits on the frame clock.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::recording::{FrameSink, FrameSnapshot, JsonlRecorder};
use super::{EndChoice, Hud, MenuChoice, Shell, ShellEvent};
use crate::settings::{Settings, StartMode};
use crate::sim::{GameMode, SimulationState, initialize, step};

/// Opens a fresh sink each time recording is switched on
pub type RecorderFactory = Box<dyn FnMut() -> anyhow::Result<Box<dyn FrameSink>>>;

/// Sleep-based frame pacing
#[derive(Debug)]
pub struct FrameClock {
    period: Option<Duration>,
    last: Instant,
}

impl FrameClock {
    /// Clock targeting `frame_rate` frames per second (0 = unpaced)
    pub fn new(frame_rate: u32) -> Self {
        Self {
            period: (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate),
            last: Instant::now(),
        }
    }

    pub fn unpaced() -> Self {
        Self::new(0)
    }

    /// Sleep out the remainder of the current frame
    pub fn wait(&mut self) {
        if let Some(period) = self.period {
            let elapsed = self.last.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            }
            self.last = Instant::now();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Menu,
    Play(GameMode),
    Quit,
}

/// Drives episodes on top of a shell
pub struct Session<S: Shell, R: Rng> {
    shell: S,
    rng: R,
    seed: u64,
    clock: FrameClock,
    recorder_factory: Option<RecorderFactory>,
    recorder: Option<Box<dyn FrameSink>>,
    episodes: u32,
}

impl<S: Shell> Session<S, Pcg32> {
    /// Session seeded and paced from settings, recording to `settings.recording_path`
    pub fn from_settings(shell: S, settings: &Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seed {seed}");

        let path = settings.recording_path.clone();
        let capacity = settings.recording_buffer;
        let factory: RecorderFactory = Box::new(move || -> anyhow::Result<Box<dyn FrameSink>> {
            let recorder = JsonlRecorder::create(&path, capacity)?;
            Ok(Box::new(recorder) as Box<dyn FrameSink>)
        });

        Session::new(
            shell,
            Pcg32::seed_from_u64(seed),
            seed,
            FrameClock::new(settings.frame_rate),
        )
        .with_recorder(factory)
    }
}

impl<S: Shell, R: Rng> Session<S, R> {
    pub fn new(shell: S, rng: R, seed: u64, clock: FrameClock) -> Self {
        Self {
            shell,
            rng,
            seed,
            clock,
            recorder_factory: None,
            recorder: None,
            episodes: 0,
        }
    }

    pub fn with_recorder(mut self, factory: RecorderFactory) -> Self {
        self.recorder_factory = Some(factory);
        self
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Episodes that ran to a fill
    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Run until the player quits
    pub fn run(&mut self, start: StartMode) -> anyhow::Result<()> {
        let mut flow = match start {
            StartMode::Menu => Flow::Menu,
            StartMode::Random => {
                Flow::Play(GameMode::ALL[self.rng.random_range(0..GameMode::ALL.len())])
            }
            StartMode::Mode(mode) => Flow::Play(mode),
        };

        let result = loop {
            flow = match flow {
                Flow::Menu => match self.shell.show_mode_menu() {
                    Ok(MenuChoice::Play(mode)) => Flow::Play(mode),
                    Ok(MenuChoice::Quit) => Flow::Quit,
                    Err(e) => break Err(e),
                },
                Flow::Play(mode) => match self.play(mode) {
                    Ok(next) => next,
                    Err(e) => break Err(e),
                },
                Flow::Quit => break Ok(()),
            };
        };

        self.stop_recording();
        log::info!("Session over after {} finished episodes", self.episodes);
        result
    }

    fn play(&mut self, mode: GameMode) -> anyhow::Result<Flow> {
        let mut state = self.start_episode(mode);

        loop {
            for event in self.shell.poll_events()? {
                match event {
                    ShellEvent::Quit => return Ok(Flow::Quit),
                    ShellEvent::KeyPress('r' | 'R') => self.toggle_recording(),
                    _ => {}
                }
            }

            let outcome = step(&mut state, &mut self.rng);

            let hud = Hud {
                recording: self.is_recording(),
                seed: self.seed,
            };
            self.shell.render_frame(&state, &hud)?;
            if let Some(sink) = self.recorder.as_mut() {
                sink.submit(FrameSnapshot::capture(&state));
            }
            self.clock.wait();

            if outcome.is_terminal() {
                self.episodes += 1;
                log::info!(
                    "{} filled: {} bounces in {} frames",
                    mode,
                    state.bounce_count,
                    state.frame
                );
                match self.shell.show_end_screen(&state)? {
                    EndChoice::PlayAgain => state = self.start_episode(mode),
                    EndChoice::ToMenu => {
                        self.stop_recording();
                        return Ok(Flow::Menu);
                    }
                    EndChoice::Quit => return Ok(Flow::Quit),
                }
            }
        }
    }

    fn start_episode(&mut self, mode: GameMode) -> SimulationState {
        let state = initialize(mode, &mut self.rng);
        log::info!("Starting {} with {} ball(s)", mode, state.balls.len());
        state
    }

    fn toggle_recording(&mut self) {
        if self.recorder.is_some() {
            self.stop_recording();
            return;
        }
        let Some(factory) = self.recorder_factory.as_mut() else {
            log::warn!("Recording is not available in this session");
            return;
        };
        match factory() {
            Ok(sink) => {
                log::info!("Recording started");
                self.recorder = Some(sink);
            }
            Err(e) => log::warn!("Could not start recording: {e:#}"),
        }
    }

    fn stop_recording(&mut self) {
        if let Some(sink) = self.recorder.take() {
            match sink.finish() {
                Ok(summary) => log::info!(
                    "Recording stopped ({} frames written, {} dropped)",
                    summary.written,
                    summary.dropped
                ),
                Err(e) => log::warn!("Recording failed: {e:#}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::RecordingSummary;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Plays back canned input; gives up (quits) after a frame limit
    #[derive(Default)]
    struct ScriptedShell {
        menu: VecDeque<MenuChoice>,
        end: VecDeque<EndChoice>,
        events: VecDeque<Vec<ShellEvent>>,
        frames: usize,
        menus_shown: usize,
        end_screens: usize,
        modes: Vec<GameMode>,
        recording_flags: Vec<bool>,
    }

    const FRAME_LIMIT: usize = 1_000_000;

    impl Shell for ScriptedShell {
        fn poll_events(&mut self) -> anyhow::Result<Vec<ShellEvent>> {
            if self.frames >= FRAME_LIMIT {
                return Ok(vec![ShellEvent::Quit]);
            }
            Ok(self.events.pop_front().unwrap_or_default())
        }

        fn render_frame(&mut self, state: &SimulationState, hud: &Hud) -> anyhow::Result<()> {
            self.frames += 1;
            if self.modes.last() != Some(&state.mode()) {
                self.modes.push(state.mode());
            }
            self.recording_flags.push(hud.recording);
            Ok(())
        }

        fn show_mode_menu(&mut self) -> anyhow::Result<MenuChoice> {
            self.menus_shown += 1;
            Ok(self.menu.pop_front().unwrap_or(MenuChoice::Quit))
        }

        fn show_end_screen(&mut self, state: &SimulationState) -> anyhow::Result<EndChoice> {
            assert!(state.is_filled());
            self.end_screens += 1;
            Ok(self.end.pop_front().unwrap_or(EndChoice::Quit))
        }
    }

    struct CountingSink {
        frames: Rc<Cell<usize>>,
        finished: Rc<Cell<usize>>,
    }

    impl FrameSink for CountingSink {
        fn submit(&mut self, _frame: FrameSnapshot) -> bool {
            self.frames.set(self.frames.get() + 1);
            true
        }

        fn finish(self: Box<Self>) -> anyhow::Result<RecordingSummary> {
            self.finished.set(self.finished.get() + 1);
            Ok(RecordingSummary {
                written: self.frames.get() as u64,
                dropped: 0,
            })
        }
    }

    fn session(shell: ScriptedShell) -> Session<ScriptedShell, Pcg32> {
        Session::new(shell, Pcg32::seed_from_u64(2024), 2024, FrameClock::unpaced())
    }

    fn counting_factory(frames: &Rc<Cell<usize>>, finished: &Rc<Cell<usize>>) -> RecorderFactory {
        let frames = Rc::clone(frames);
        let finished = Rc::clone(finished);
        Box::new(move || -> anyhow::Result<Box<dyn FrameSink>> {
            Ok(Box::new(CountingSink {
                frames: Rc::clone(&frames),
                finished: Rc::clone(&finished),
            }) as Box<dyn FrameSink>)
        })
    }

    #[test]
    fn test_quit_from_menu() {
        let mut session = session(ScriptedShell::default());
        session.run(StartMode::Menu).unwrap();
        assert_eq!(session.shell().menus_shown, 1);
        assert_eq!(session.shell().frames, 0);
    }

    #[test]
    fn test_menu_selection_then_quit() {
        let shell = ScriptedShell {
            menu: VecDeque::from([MenuChoice::Play(GameMode::Pulse)]),
            events: VecDeque::from([vec![], vec![], vec![ShellEvent::Quit]]),
            ..Default::default()
        };
        let mut session = session(shell);
        session.run(StartMode::Menu).unwrap();
        assert_eq!(session.shell().frames, 2);
        assert_eq!(session.shell().modes, vec![GameMode::Pulse]);
    }

    #[test]
    fn test_play_again_then_quit() {
        let shell = ScriptedShell {
            end: VecDeque::from([EndChoice::PlayAgain, EndChoice::Quit]),
            ..Default::default()
        };
        let mut session = session(shell);
        session.run(StartMode::Mode(GameMode::Classic)).unwrap();
        assert_eq!(session.shell().end_screens, 2);
        assert_eq!(session.episodes(), 2);
        assert_eq!(session.shell().menus_shown, 0);
    }

    #[test]
    fn test_end_screen_back_to_menu() {
        let shell = ScriptedShell {
            end: VecDeque::from([EndChoice::ToMenu]),
            menu: VecDeque::from([MenuChoice::Quit]),
            ..Default::default()
        };
        let mut session = session(shell);
        session.run(StartMode::Mode(GameMode::Frenzy)).unwrap();
        assert_eq!(session.shell().end_screens, 1);
        assert_eq!(session.shell().menus_shown, 1);
    }

    #[test]
    fn test_random_start_plays_a_mode() {
        let shell = ScriptedShell {
            events: VecDeque::from([vec![], vec![ShellEvent::Quit]]),
            ..Default::default()
        };
        let mut session = session(shell);
        session.run(StartMode::Random).unwrap();
        assert_eq!(session.shell().frames, 1);
        assert_eq!(session.shell().modes.len(), 1);
        assert_eq!(session.shell().menus_shown, 0);
    }

    #[test]
    fn test_recording_toggle() {
        let frames = Rc::new(Cell::new(0));
        let finished = Rc::new(Cell::new(0));
        let shell = ScriptedShell {
            events: VecDeque::from([
                vec![ShellEvent::KeyPress('r')],
                vec![ShellEvent::Click { x: 3, y: 4 }],
                vec![],
                vec![ShellEvent::KeyPress('r')],
                vec![ShellEvent::Quit],
            ]),
            ..Default::default()
        };
        let mut session = session(shell).with_recorder(counting_factory(&frames, &finished));
        session.run(StartMode::Mode(GameMode::Classic)).unwrap();

        assert_eq!(frames.get(), 3);
        assert_eq!(finished.get(), 1);
        assert_eq!(session.shell().recording_flags, vec![true, true, true, false]);
    }

    #[test]
    fn test_recording_closed_on_quit() {
        let frames = Rc::new(Cell::new(0));
        let finished = Rc::new(Cell::new(0));
        let shell = ScriptedShell {
            events: VecDeque::from([vec![ShellEvent::KeyPress('R')], vec![ShellEvent::Quit]]),
            ..Default::default()
        };
        let mut session = session(shell).with_recorder(counting_factory(&frames, &finished));
        session.run(StartMode::Mode(GameMode::Gravity)).unwrap();

        assert_eq!(frames.get(), 1);
        assert_eq!(finished.get(), 1);
        assert!(!session.is_recording());
    }

    #[test]
    fn test_recording_unavailable_keeps_playing() {
        let attempts = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&attempts);
        let factory: RecorderFactory = Box::new(move || -> anyhow::Result<Box<dyn FrameSink>> {
            *counter.borrow_mut() += 1;
            Err(anyhow::anyhow!("disk full"))
        });
        let shell = ScriptedShell {
            events: VecDeque::from([vec![ShellEvent::KeyPress('r')], vec![], vec![ShellEvent::Quit]]),
            ..Default::default()
        };
        let mut session = session(shell).with_recorder(factory);
        session.run(StartMode::Mode(GameMode::Classic)).unwrap();

        assert_eq!(*attempts.borrow(), 1);
        assert_eq!(session.shell().frames, 2);
        assert_eq!(session.shell().recording_flags, vec![false, false]);
    }

    #[test]
    fn test_frame_clock_paces() {
        let mut clock = FrameClock::new(1000);
        let start = Instant::now();
        for _ in 0..4 {
            clock.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(3));
    }
}
