//! Computer keyboard → synth actions
//!
//! Two-row piano layout, one octave and a bit:
//!
//!     w e   t y u   o p
//!    a s d f g h j k l ;
//!    C D E F G A B C D E

use std::io;

use crossterm::{
    event::{KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};

/// Lowest and highest octave the piano rows can shift to.
pub const OCTAVE_RANGE: (i16, i16) = (0, 8);

/// Normalized step for the parameter nudge keys.
const NUDGE: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Semitones above C of the current octave
    Note(i16),
    OctaveDown,
    OctaveUp,
    CyclePriority,
    /// Normalized change of op1 level (modulation index)
    ModulationDepth(f32),
    /// Normalized change of op1 frequency (modulator ratio)
    ModulationRatio(f32),
    ReleaseAll,
    Quit,
}

/// Semitone offset of a piano key, if `c` is one.
pub fn piano_offset(c: char) -> Option<i16> {
    let offset = match c.to_ascii_lowercase() {
        'a' => 0,
        'w' => 1,
        's' => 2,
        'e' => 3,
        'd' => 4,
        'f' => 5,
        't' => 6,
        'g' => 7,
        'y' => 8,
        'h' => 9,
        'u' => 10,
        'j' => 11,
        'k' => 12,
        'o' => 13,
        'l' => 14,
        'p' => 15,
        ';' => 16,
        _ => return None,
    };
    Some(offset)
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Tab => Action::CyclePriority,
        KeyCode::Char(' ') => Action::ReleaseAll,
        KeyCode::Char('z') => Action::OctaveDown,
        KeyCode::Char('x') => Action::OctaveUp,
        KeyCode::Char('1') => Action::ModulationDepth(-NUDGE),
        KeyCode::Char('2') => Action::ModulationDepth(NUDGE),
        KeyCode::Char('3') => Action::ModulationRatio(-NUDGE),
        KeyCode::Char('4') => Action::ModulationRatio(NUDGE),
        KeyCode::Char(c) => Action::Note(piano_offset(c)?),
        _ => return None,
    };
    Some(action)
}

/// MIDI pitch of a piano key in `octave` (C4 = 60).
pub fn pitch(octave: i16, offset: i16) -> i16 {
    12 * (octave + 1) + offset
}

/// Ask the terminal to report key releases. Returns whether it agreed.
pub fn enable_key_releases() -> bool {
    matches!(supports_keyboard_enhancement(), Ok(true))
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok()
}

pub fn disable_key_releases(enabled: bool) {
    if enabled {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
}
