//! TUI module for cvsynth
//!
//! Turns key events into synth messages and shows the voice's output.

mod spectrum;
pub mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use cvsynth::synth::{keyboard::pitch_to_key_mod, NoteMode, ParamId, PatchParams, SynthMessage};

use crate::keys::{self, Action, OCTAVE_RANGE};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use state::{UiInit, VoiceStatus};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size (also the FFT size)
pub const VIS_BUFFER_SIZE: usize = 2048;

/// UI application state
pub struct UiApp {
    init: UiInit,
    control_tx: Producer<SynthMessage>,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<VoiceStatus>,
    error_rx: Consumer<String>,
    status: VoiceStatus,
    last_error: Option<String>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    octave: i16,
    priority: NoteMode,
    /// Normalized op1 level and frequency, as last sent
    depth: f32,
    ratio: f32,
    /// Pitch each held piano key started, so a release after an octave shift
    /// still ends the right note
    held: Vec<(char, i16)>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        init: UiInit,
        control_tx: Producer<SynthMessage>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<VoiceStatus>,
        error_rx: Consumer<String>,
        status: VoiceStatus,
    ) -> Self {
        let defaults = PatchParams::default();
        let spectrum = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, init.sample_rate);
        Self {
            init,
            control_tx,
            audio_rx,
            status_rx,
            error_rx,
            priority: status.priority,
            status,
            last_error: None,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum,
            octave: 4,
            depth: ParamId::Op1Level.to_normalized(defaults.get(ParamId::Op1Level)),
            ratio: ParamId::Op1Frequency.to_normalized(defaults.get(ParamId::Op1Frequency)),
            held: Vec::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        self.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    /// Poll for new audio samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.spectrum.update(&self.audio_buffer);
        }
    }

    /// Keep only the latest status; surface stream errors
    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
        while let Ok(err) = self.error_rx.pop() {
            self.last_error = Some(err);
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.control_tx.push(msg).is_err() {
            self.last_error = Some(String::from("control queue full"));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press => {}
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.release_key(c.to_ascii_lowercase());
                }
                return;
            }
            KeyEventKind::Repeat => return,
        }

        let Some(action) = keys::action_for(key.code) else {
            return;
        };
        match action {
            Action::Quit => self.should_quit = true,
            Action::Note(offset) => {
                let KeyCode::Char(c) = key.code else {
                    return;
                };
                let c = c.to_ascii_lowercase();
                if self.held.iter().any(|&(k, _)| k == c) {
                    return;
                }
                let pitch = keys::pitch(self.octave, offset);
                if self.init.key_releases {
                    self.held.push((c, pitch));
                }
                self.send(SynthMessage::NoteOn { pitch });
            }
            Action::OctaveDown => self.octave = (self.octave - 1).max(OCTAVE_RANGE.0),
            Action::OctaveUp => self.octave = (self.octave + 1).min(OCTAVE_RANGE.1),
            Action::CyclePriority => {
                self.priority = self.priority.next();
                self.held.clear();
                self.send(SynthMessage::SetPriority(self.priority));
            }
            Action::ModulationDepth(delta) => {
                self.depth = (self.depth + delta).clamp(0.0, 1.0);
                self.send(SynthMessage::SetParam {
                    id: ParamId::Op1Level,
                    value: self.depth,
                });
            }
            Action::ModulationRatio(delta) => {
                self.ratio = (self.ratio + delta).clamp(0.0, 1.0);
                self.send(SynthMessage::SetParam {
                    id: ParamId::Op1Frequency,
                    value: self.ratio,
                });
            }
            Action::ReleaseAll => {
                self.held.clear();
                self.send(SynthMessage::AllNotesOff);
            }
        }
    }

    fn release_key(&mut self, c: char) {
        if let Some(index) = self.held.iter().position(|&(k, _)| k == c) {
            let (_, pitch) = self.held.remove(index);
            self.send(SynthMessage::NoteOff { pitch });
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Scope
                Constraint::Min(8),    // Spectrum
                Constraint::Length(3), // Patch
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(
            frame,
            chunks[0],
            &self.init,
            &self.status,
            &stats,
            self.last_error.as_deref(),
        );

        render_waveform(frame, chunks[1], &self.audio_buffer);

        let fundamental = self
            .status
            .current_pitch
            .map(|p| self.status.carrier_frequency * pitch_to_key_mod(p));
        render_spectrum(frame, chunks[2], &self.spectrum, fundamental);

        self.render_patch(frame, chunks[3]);

        let help = if self.init.key_releases {
            " [a-;] Play  [Z/X] Octave  [Tab] Priority  [1/2] Depth  [3/4] Ratio  [Space] Release  [Q] Quit"
        } else {
            " [a-;] Play  [Space] Release (no key-up events)  [Z/X] Octave  [Tab] Priority  [1-4] FM  [Q] Quit"
        };
        let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }

    fn render_patch(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let block = Block::default().title(" Patch ").borders(Borders::ALL);
        let depth = ParamId::Op1Level.to_physical(self.depth);
        let op1_freq = ParamId::Op1Frequency.to_physical(self.ratio);
        let ratio = op1_freq / self.status.carrier_frequency.max(f32::EPSILON);

        let line = Line::from(vec![
            Span::styled(
                format!(" Index: {depth:.2} rad  "),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("Modulator: {op1_freq:.0} Hz (x{ratio:.2})  "),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("Octave: {}  ", self.octave),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("Device: {}", self.init.device),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
