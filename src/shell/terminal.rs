//! Terminal shell (ratatui + crossterm)
//!
//! Draws the arena on a braille canvas. Menus are modal: they block, redraw
//! and poll input until a choice is made.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color as TuiColor, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use super::{EndChoice, Hud, MenuChoice, Shell, ShellEvent};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::sim::{GameMode, SimulationState};

/// How long a modal screen waits for input before redrawing
const MODAL_POLL: Duration = Duration::from_millis(50);
const BUTTON_WIDTH: u16 = 34;
const BUTTON_HEIGHT: u16 = 3;
/// Minimum gap between the rings used to fill a ball
const RING_SPACING: f64 = 2.0;

const END_BUTTONS: [(char, &str, EndChoice); 3] = [
    ('p', "Play Again", EndChoice::PlayAgain),
    ('m', "Menu", EndChoice::ToMenu),
    ('q', "Quit", EndChoice::Quit),
];

pub struct TerminalShell {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalShell {
    /// Switch the terminal to raw mode on the alternate screen with mouse capture
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn next_event(&mut self) -> anyhow::Result<Option<ShellEvent>> {
        if event::poll(MODAL_POLL)? {
            Ok(translate(event::read()?))
        } else {
            Ok(None)
        }
    }
}

impl Drop for TerminalShell {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

impl Shell for TerminalShell {
    fn poll_events(&mut self) -> anyhow::Result<Vec<ShellEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            events.extend(translate(event::read()?));
        }
        Ok(events)
    }

    fn render_frame(&mut self, state: &SimulationState, hud: &Hud) -> anyhow::Result<()> {
        self.terminal.draw(|frame| draw_arena(frame, state, hud))?;
        Ok(())
    }

    fn show_mode_menu(&mut self) -> anyhow::Result<MenuChoice> {
        loop {
            let mut buttons = Vec::new();
            self.terminal.draw(|frame| {
                buttons = draw_menu(frame);
            })?;

            match self.next_event()? {
                Some(ShellEvent::Quit) => return Ok(MenuChoice::Quit),
                Some(ShellEvent::KeyPress(key)) => {
                    if let Some(mode) = mode_for_key(key) {
                        return Ok(MenuChoice::Play(mode));
                    }
                }
                Some(ShellEvent::Click { x, y }) => {
                    if let Some(i) = hit_test(&buttons, x, y) {
                        return Ok(MenuChoice::Play(GameMode::ALL[i]));
                    }
                }
                None => {}
            }
        }
    }

    fn show_end_screen(&mut self, state: &SimulationState) -> anyhow::Result<EndChoice> {
        loop {
            let mut buttons = Vec::new();
            self.terminal.draw(|frame| {
                buttons = draw_end_screen(frame, state);
            })?;

            match self.next_event()? {
                Some(ShellEvent::Quit) => return Ok(EndChoice::Quit),
                Some(ShellEvent::KeyPress('\n')) => return Ok(EndChoice::PlayAgain),
                Some(ShellEvent::KeyPress(key)) => {
                    let key = key.to_ascii_lowercase();
                    if let Some((_, _, choice)) = END_BUTTONS.iter().find(|(k, _, _)| *k == key) {
                        return Ok(*choice);
                    }
                }
                Some(ShellEvent::Click { x, y }) => {
                    if let Some(i) = hit_test(&buttons, x, y) {
                        return Ok(END_BUTTONS[i].2);
                    }
                }
                None => {}
            }
        }
    }
}

/// Map a crossterm event to a shell event
fn translate(event: Event) -> Option<ShellEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(ShellEvent::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(ShellEvent::Quit)
            }
            KeyCode::Char(c) => Some(ShellEvent::KeyPress(c)),
            KeyCode::Enter => Some(ShellEvent::KeyPress('\n')),
            _ => None,
        },
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some(ShellEvent::Click {
                x: mouse.column,
                y: mouse.row,
            })
        }
        _ => None,
    }
}

/// Menu hotkeys `1`..`7` in menu order
fn mode_for_key(key: char) -> Option<GameMode> {
    let index = key.to_digit(10)?.checked_sub(1)?;
    GameMode::ALL.get(index as usize).copied()
}

fn hit_test(buttons: &[Rect], x: u16, y: u16) -> Option<usize> {
    buttons
        .iter()
        .position(|rect| rect.contains(Position::new(x, y)))
}

/// Title area plus `count` stacked buttons, centred in `area`
fn stacked_buttons(area: Rect, count: usize) -> (Rect, Vec<Rect>) {
    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(BUTTON_WIDTH),
        Constraint::Fill(1),
    ])
    .areas(area);

    let mut constraints = vec![Constraint::Fill(1), Constraint::Length(4)];
    constraints.extend(std::iter::repeat_n(Constraint::Length(BUTTON_HEIGHT), count));
    constraints.push(Constraint::Fill(1));

    let rows = Layout::vertical(constraints).split(column);
    (rows[1], rows[2..2 + count].to_vec())
}

fn button(label: String) -> Paragraph<'static> {
    Paragraph::new(Line::from(label))
        .alignment(Alignment::Center)
        .style(Style::default().fg(TuiColor::Black).bg(TuiColor::White))
        .block(Block::default().borders(Borders::ALL))
}

fn title(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines).alignment(Alignment::Center)
}

fn draw_menu(frame: &mut Frame) -> Vec<Rect> {
    let (title_area, buttons) = stacked_buttons(frame.area(), GameMode::ALL.len());

    frame.render_widget(
        title(vec![Line::from(Span::styled(
            "Select a Game Mode",
            Style::default().add_modifier(Modifier::BOLD),
        ))]),
        title_area,
    );
    for (i, (mode, rect)) in GameMode::ALL.iter().zip(&buttons).enumerate() {
        frame.render_widget(button(format!("[{}] {}", i + 1, mode)), *rect);
    }
    buttons
}

fn draw_end_screen(frame: &mut Frame, state: &SimulationState) -> Vec<Rect> {
    let (title_area, buttons) = stacked_buttons(frame.area(), END_BUTTONS.len());

    frame.render_widget(
        title(vec![
            Line::from(Span::styled(
                "Game Over",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} - {} bounces in {} frames",
                state.mode(),
                state.bounce_count,
                state.frame
            )),
        ]),
        title_area,
    );
    for ((key, label, _), rect) in END_BUTTONS.iter().zip(&buttons) {
        frame.render_widget(
            button(format!("[{}] {}", key.to_ascii_uppercase(), label)),
            *rect,
        );
    }
    buttons
}

fn hud_line(state: &SimulationState, hud: &Hud) -> Line<'static> {
    let label = Style::default().fg(TuiColor::White).add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("Bounces: ", label),
        Span::styled(state.bounce_count.to_string(), Style::default().fg(TuiColor::Cyan)),
        Span::styled("  Mode: ", label),
        Span::styled(state.mode().to_string(), Style::default().fg(TuiColor::Yellow)),
        Span::styled(format!("  seed {}", hud.seed), Style::default().fg(TuiColor::DarkGray)),
        Span::styled("  [R] record  [Q] quit", Style::default().fg(TuiColor::DarkGray)),
    ];
    if hud.recording {
        spans.push(Span::styled(
            "  ● REC",
            Style::default().fg(TuiColor::Red).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// World y grows downward, canvas y grows upward
fn flip_y(y: f32) -> f64 {
    f64::from(WORLD_HEIGHT - y)
}

/// Radii of the concentric rings that approximate a filled disc
fn fill_rings(radius: f32) -> impl Iterator<Item = f64> {
    let radius = f64::from(radius);
    let spacing = (radius / 8.0).max(RING_SPACING);
    (0u32..)
        .map(move |i| radius - spacing * f64::from(i))
        .take_while(|r| *r > 0.0)
}

fn draw_arena(frame: &mut Frame, state: &SimulationState, hud: &Hud) {
    let [hud_area, arena_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(frame.area());

    frame.render_widget(Paragraph::new(hud_line(state, hud)), hud_area);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(TuiColor::DarkGray)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(WORLD_WIDTH)])
        .y_bounds([0.0, f64::from(WORLD_HEIGHT)])
        .paint(|ctx| {
            let center = state.boundary.center;
            ctx.draw(&Circle {
                x: f64::from(center.x),
                y: flip_y(center.y),
                radius: f64::from(state.boundary.radius),
                color: TuiColor::White,
            });

            for ball in &state.balls {
                let color = TuiColor::Rgb(ball.color.r, ball.color.g, ball.color.b);
                for radius in fill_rings(ball.radius) {
                    ctx.draw(&Circle {
                        x: f64::from(ball.pos.x),
                        y: flip_y(ball.pos.y),
                        radius,
                        color,
                    });
                }
            }
        });
    frame.render_widget(canvas, arena_area);
}
