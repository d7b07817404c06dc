//! Main UI Application
//!
//! Translates key events into held-key state for the game and draws the
//! minimap and status panel.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::game::{FrameInput, Game};
use crate::ui::widgets::MinimapWidget;

/// Terminals only report presses and repeats, so a key counts as held for
/// this long after its last event. Covers the usual auto-repeat delay.
const HOLD_WINDOW: Duration = Duration::from_millis(550);

const MIN_ZOOM: i32 = 1;
const MAX_ZOOM: i32 = 8;

/// Last time a movement key fired
#[derive(Debug, Clone, Copy, Default)]
struct KeyLatch {
    last: Option<Instant>,
}

impl KeyLatch {
    fn press(&mut self, now: Instant) {
        self.last = Some(now);
    }

    fn release(&mut self) {
        self.last = None;
    }

    fn is_down(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|t| now.saturating_duration_since(t) < HOLD_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    forward: KeyLatch,
    backward: KeyLatch,
    turn_left: KeyLatch,
    turn_right: KeyLatch,
}

/// Main UI application
pub struct App {
    held: HeldKeys,
    /// Cells per minimap glyph
    zoom: i32,
    /// Last notable event, shown in the status panel
    status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            held: HeldKeys::default(),
            zoom: 2,
            status: String::from("Welcome to the dungeon"),
        }
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Movement keys considered held at `now`
    pub fn frame_input(&self, now: Instant) -> FrameInput {
        FrameInput {
            forward: self.held.forward.is_down(now),
            backward: self.held.backward.is_down(now),
            turn_left: self.held.turn_left.is_down(now),
            turn_right: self.held.turn_right.is_down(now),
        }
    }

    fn latch(&mut self, code: KeyCode) -> Option<&mut KeyLatch> {
        match code {
            KeyCode::Up | KeyCode::Char('w') => Some(&mut self.held.forward),
            KeyCode::Down | KeyCode::Char('s') => Some(&mut self.held.backward),
            KeyCode::Left | KeyCode::Char('a') => Some(&mut self.held.turn_left),
            KeyCode::Right | KeyCode::Char('d') => Some(&mut self.held.turn_right),
            _ => None,
        }
    }

    /// Handle a key event; returns true when the app should quit
    pub fn handle_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        let now = Instant::now();

        if key.kind == KeyEventKind::Release {
            if let Some(latch) = self.latch(key.code) {
                latch.release();
            }
            return Ok(false);
        }

        if let Some(latch) = self.latch(key.code) {
            latch.press(now);
            return Ok(false);
        }
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('c') => {
                game.toggle_collision();
                self.status = format!(
                    "Collision {}",
                    if game.collision_on() { "on" } else { "off" }
                );
            }
            KeyCode::Char('r') => match game.regenerate(None) {
                Ok(()) => {
                    self.held = HeldKeys::default();
                    self.status = match game.seed() {
                        Some(seed) => format!("New dungeon (seed {})", seed),
                        None => String::from("New dungeon"),
                    };
                }
                Err(e) => {
                    log::warn!("Regeneration failed: {}", e);
                    self.status = format!("Regeneration failed: {}", e);
                }
            },
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.zoom = (self.zoom - 1).max(MIN_ZOOM);
            }
            KeyCode::Char('-') => {
                self.zoom = (self.zoom + 1).min(MAX_ZOOM);
            }
            _ => {}
        }
        Ok(false)
    }

    pub fn render(&self, frame: &mut Frame, game: &Game) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(34)])
            .split(frame.area());

        let dungeon = game.dungeon();
        let player_cell = dungeon.transform().world_to_cell(game.player_position());
        let title = format!("Map 1:{}", self.zoom);
        frame.render_widget(
            MinimapWidget::new(dungeon.grid())
                .player(player_cell)
                .zoom(self.zoom)
                .title(&title),
            chunks[0],
        );

        self.render_status(frame, game, chunks[1]);
    }

    fn render_status(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let dungeon = game.dungeon();
        let stats = dungeon.stats();
        let position = dungeon.transform().world_to_dungeon(game.player_position());
        let cell = dungeon.transform().world_to_cell(game.player_position());
        let here = dungeon
            .piece_at(game.player_position())
            .and_then(|id| dungeon.piece(id))
            .map(|p| p.kind.name())
            .unwrap_or("outside");

        let label = Style::default().fg(Color::Rgb(140, 140, 160));
        let value = Style::default().fg(Color::White);
        let row = |name: &'static str, text: String| {
            Line::from(vec![Span::styled(format!("{:<11}", name), label), Span::styled(text, value)])
        };

        let collision_style = if game.collision_on() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };

        let lines = vec![
            row("Seed", dungeon.seed().map_or_else(|| "-".into(), |s| s.to_string())),
            row("Rooms", stats.rooms.to_string()),
            row("Corridors", stats.corridors.to_string()),
            row("Doors", stats.doors.to_string()),
            row("Depth", stats.deepest.to_string()),
            Line::from(""),
            row("Position", format!("{:.2}, {:.2}", position.x, position.z)),
            row("Cell", format!("{}, {}", cell.x, cell.y)),
            row("Heading", format!("{:.0}°", game.motion().yaw())),
            row("In", here.to_string()),
            Line::from(vec![
                Span::styled(format!("{:<11}", "Collision"), label),
                Span::styled(if game.collision_on() { "on" } else { "off" }, collision_style),
            ]),
            row("Time", format!("{:.0}s", game.clock().elapsed())),
            row("FPS", format!("{:.0}", game.clock().fps())),
            Line::from(""),
            Line::from(Span::styled(self.status.clone(), Style::default().fg(Color::Yellow))),
            Line::from(""),
            Line::from(Span::styled("arrows/wasd  move, turn", label)),
            Line::from(Span::styled("c  toggle collision", label)),
            Line::from(Span::styled("r  new dungeon", label)),
            Line::from(Span::styled("+/-  zoom", label)),
            Line::from(Span::styled("q/esc  quit", label)),
        ];

        let block = Block::default()
            .title("Status")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 100, 120)));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
