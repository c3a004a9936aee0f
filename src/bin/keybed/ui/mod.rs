//! TUI for keybed
//!
//! Draws the key bed and voice selector, turns key events into engine calls.

mod piano;
mod status;
mod waveform;

use std::{
    collections::HashMap,
    io::stdout,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use keybed::{
    keyboard::{HeldKeys, KeyMap, KeyboardLayout},
    synth::RingBackend,
    PolyphonyEngine,
};

use piano::render_keybed;
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Without release events a held key is let go this long after its last
/// press or auto-repeat.
const HOLD_TIMEOUT: Duration = Duration::from_millis(650);

pub struct UiApp {
    engine: PolyphonyEngine<RingBackend>,
    keymap: KeyMap,
    held: HeldKeys,
    /// Last press or repeat per held key, for auto-release.
    last_seen: HashMap<char, Instant>,
    layout: KeyboardLayout,
    octaves: u8,
    shifted: bool,
    /// Whether the terminal reports key releases.
    releases: bool,
    scope_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    sample_rate: f32,
    message: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        engine: PolyphonyEngine<RingBackend>,
        scope_rx: Consumer<f32>,
        octaves: u8,
        sample_rate: f32,
    ) -> Self {
        Self {
            engine,
            keymap: KeyMap::standard(),
            held: HeldKeys::new(),
            last_seen: HashMap::new(),
            layout: KeyboardLayout::new(octaves),
            octaves,
            shifted: false,
            releases: false,
            scope_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            sample_rate,
            message: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.releases = supports_keyboard_enhancement().unwrap_or(false);
        if self.releases {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.event_loop(terminal);

        if let Err(err) = self.engine.panic() {
            warn!("failed to silence voices on exit: {err}");
        }
        if self.releases {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.engine.maintain();
            if !self.releases {
                self.auto_release();
            }

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Keep the newest VIS_BUFFER_SIZE samples.
    fn poll_scope(&mut self) {
        let mut fresh = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.audio_buffer.push(sample);
            fresh = true;
        }
        if fresh && self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn auto_release(&mut self) {
        let expired: Vec<char> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| seen.elapsed() >= HOLD_TIMEOUT)
            .map(|(key, _)| *key)
            .collect();
        for key in expired {
            self.key_up(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press => self.key_pressed(key.code),
            KeyEventKind::Repeat => {
                if let KeyCode::Char(c) = key.code {
                    self.touch(c);
                }
            }
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.key_up(c);
                }
            }
        }
    }

    fn key_pressed(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::CapsLock => self.shifted = !self.shifted,
            KeyCode::Left => self.cycle_voice(-1),
            KeyCode::Right => self.cycle_voice(1),
            KeyCode::Up => self.resize(1),
            KeyCode::Down => self.resize(-1),
            KeyCode::Char(' ') => self.release_all(),
            KeyCode::Char(c) => self.key_down(c),
            _ => {}
        }
    }

    fn key_down(&mut self, key: char) {
        if self.held.is_held(key) {
            // auto-repeat from terminals that only report presses
            self.touch(key);
            return;
        }
        let Some(note) = self.held.press(&self.keymap, key, self.shifted) else {
            return;
        };
        self.last_seen.insert(key.to_ascii_lowercase(), Instant::now());
        let velocity = self.engine.default_velocity();
        let result = self.engine.start_note(note, velocity);
        self.report(result);
    }

    fn key_up(&mut self, key: char) {
        self.last_seen.remove(&key.to_ascii_lowercase());
        if let Some(note) = self.held.release(key) {
            let result = self.engine.stop_note(note);
            self.report(result);
        }
    }

    fn touch(&mut self, key: char) {
        if let Some(seen) = self.last_seen.get_mut(&key.to_ascii_lowercase()) {
            *seen = Instant::now();
        }
    }

    fn release_all(&mut self) {
        self.held.release_all();
        self.last_seen.clear();
        let result = self.engine.all_notes_off();
        self.report(result);
    }

    fn cycle_voice(&mut self, step: isize) {
        let names: Vec<String> = self
            .engine
            .voice_profile_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let current = names
            .iter()
            .position(|name| name == self.engine.active_profile().name())
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(names.len().max(1) as isize) as usize;
        if let Some(name) = names.get(next) {
            let result = self.engine.set_active_voice_profile(name);
            self.report(result);
        }
    }

    fn resize(&mut self, step: i8) {
        self.octaves = (self.octaves as i8 + step).clamp(1, 3) as u8;
        self.layout = KeyboardLayout::new(self.octaves);
    }

    fn report(&mut self, result: keybed::Result<()>) {
        self.message = result.err().map(|err| err.to_string());
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Key bed
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(
            frame,
            chunks[0],
            &self.engine,
            self.shifted,
            self.sample_rate,
            &stats,
        );
        render_keybed(
            frame,
            chunks[1],
            &self.layout,
            &self.keymap,
            &self.engine,
            self.shifted,
        );
        render_waveform(frame, chunks[2], &self.audio_buffer);

        let help = match &self.message {
            Some(message) => Paragraph::new(format!(" {message}"))
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new(
                " [Esc] Quit  [Tab] Octave shift  [←/→] Voice  [↑/↓] Keys  [Space] All off",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[3]);
    }
}
