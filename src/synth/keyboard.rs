use arrayvec::ArrayVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::module::{Module, Pitched, Triggerable};
use crate::graph::rack::{Handle, ModuleId, Rack};

/*
Monophonic Keyboard
===================

A keyboard turns key events into two kinds of control:

  pitch   Every pitch receiver gets a key mod, the multiplier that takes the
          receiver's base frequency (A4) to the pressed key:

              key_mod = 2^((pitch − 69) / 12)

          pitch 69 → 1.0, pitch 81 → 2.0, pitch 57 → 0.5

  gate    Every gate receiver (an envelope) is pressed or released.

With only one voice, something has to decide what happens when keys overlap.
That decision is the note priority:

  Naive     Every key on retunes and re-presses, every key off releases, no
            matter which key went up. Fast trills cut out.

  Highest   Only a key above the held one takes over (with a fresh press).
            Only releasing the held key releases the gate. There is no
            fallback: after releasing the top key of a chord, the lower keys
            still held stay silent.

  Last      Keys are stacked in press order. A new key retunes; the gate is
            pressed only if nothing was held (legato). Releasing a key
            retunes to the most recent key still held, and the gate is
            released only when the stack empties.

    keys:    C4 ───────────────────┐
                  E4 ─────┐        │
    Highest  C4   E4      ·        ·       (E4 up: release; C4 silent)
    Last     C4   E4 ~~~~ C4 ~~~~~ ·       (~~ legato retune, no re-press)
*/

/// MIDI note number of A4, the pitch at which key mod is 1.0.
pub const REFERENCE_PITCH: i16 = 69;

/// Most keys the last-note stack tracks at once.
pub const MAX_HELD_KEYS: usize = 128;

/// Key mod for `pitch` in equal temperament around A4.
#[inline]
pub fn pitch_to_key_mod(pitch: i16) -> f32 {
    2.0_f32.powf((f32::from(pitch) - f32::from(REFERENCE_PITCH)) / 12.0)
}

/// What the keyboard should do with its receivers after a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave every receiver alone.
    Ignore,
    /// Update pitch receivers only.
    Retune(i16),
    /// Update pitch receivers and press every gate.
    Retrigger(i16),
    /// Release every gate.
    Release,
}

/// Note priority policy for a monophonic keyboard.
pub trait NotePriority: Send {
    fn key_on(&mut self, pitch: i16) -> KeyAction;

    fn key_off(&mut self, pitch: i16) -> KeyAction;

    /// The pitch the policy considers sounding, if it tracks one.
    fn current(&self) -> Option<i16>;

    /// Forget every held key.
    fn reset(&mut self);
}

/// No memory: every key on presses, every key off releases.
#[derive(Debug, Clone, Default)]
pub struct NaiveMono;

impl NotePriority for NaiveMono {
    fn key_on(&mut self, pitch: i16) -> KeyAction {
        KeyAction::Retrigger(pitch)
    }

    fn key_off(&mut self, _pitch: i16) -> KeyAction {
        KeyAction::Release
    }

    fn current(&self) -> Option<i16> {
        None
    }

    fn reset(&mut self) {}
}

/// Highest held key wins; no fallback to lower keys.
#[derive(Debug, Clone, Default)]
pub struct HighestNote {
    held: Option<i16>,
}

impl NotePriority for HighestNote {
    fn key_on(&mut self, pitch: i16) -> KeyAction {
        match self.held {
            Some(held) if pitch <= held => KeyAction::Ignore,
            _ => {
                self.held = Some(pitch);
                KeyAction::Retrigger(pitch)
            }
        }
    }

    fn key_off(&mut self, pitch: i16) -> KeyAction {
        if self.held == Some(pitch) {
            self.held = None;
            KeyAction::Release
        } else {
            KeyAction::Ignore
        }
    }

    fn current(&self) -> Option<i16> {
        self.held
    }

    fn reset(&mut self) {
        self.held = None;
    }
}

/// Most recent held key wins, with legato between held keys.
#[derive(Debug, Clone, Default)]
pub struct LastNote {
    stack: ArrayVec<i16, MAX_HELD_KEYS>,
}

impl LastNote {
    /// Held keys, oldest first.
    pub fn held(&self) -> &[i16] {
        &self.stack
    }
}

impl NotePriority for LastNote {
    fn key_on(&mut self, pitch: i16) -> KeyAction {
        if self.stack.contains(&pitch) {
            return KeyAction::Ignore;
        }
        let was_empty = self.stack.is_empty();
        if self.stack.try_push(pitch).is_err() {
            return KeyAction::Ignore;
        }
        if was_empty {
            KeyAction::Retrigger(pitch)
        } else {
            KeyAction::Retune(pitch)
        }
    }

    fn key_off(&mut self, pitch: i16) -> KeyAction {
        // A stray key off with nothing held still closes the gates.
        match self.stack.iter().position(|&p| p == pitch) {
            Some(index) => {
                self.stack.remove(index);
            }
            None if !self.stack.is_empty() => return KeyAction::Ignore,
            None => {}
        }
        match self.stack.last() {
            Some(&top) => KeyAction::Retune(top),
            None => KeyAction::Release,
        }
    }

    fn current(&self) -> Option<i16> {
        self.stack.last().copied()
    }

    fn reset(&mut self) {
        self.stack.clear();
    }
}

/// Selector for the built-in note priorities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteMode {
    Naive,
    Highest,
    #[default]
    Last,
}

impl NoteMode {
    pub const ALL: [NoteMode; 3] = [NoteMode::Naive, NoteMode::Highest, NoteMode::Last];

    pub fn name(self) -> &'static str {
        match self {
            NoteMode::Naive => "naive",
            NoteMode::Highest => "highest",
            NoteMode::Last => "last",
        }
    }

    /// The next mode in `ALL`, wrapping around.
    pub fn next(self) -> Self {
        match self {
            NoteMode::Naive => NoteMode::Highest,
            NoteMode::Highest => NoteMode::Last,
            NoteMode::Last => NoteMode::Naive,
        }
    }
}

/// Any built-in note priority, switchable at runtime without allocating.
#[derive(Debug, Clone)]
pub enum Priority {
    Naive(NaiveMono),
    Highest(HighestNote),
    Last(LastNote),
}

impl Priority {
    pub fn new(mode: NoteMode) -> Self {
        match mode {
            NoteMode::Naive => Priority::Naive(NaiveMono),
            NoteMode::Highest => Priority::Highest(HighestNote::default()),
            NoteMode::Last => Priority::Last(LastNote::default()),
        }
    }

    pub fn mode(&self) -> NoteMode {
        match self {
            Priority::Naive(_) => NoteMode::Naive,
            Priority::Highest(_) => NoteMode::Highest,
            Priority::Last(_) => NoteMode::Last,
        }
    }

    fn policy(&mut self) -> &mut dyn NotePriority {
        match self {
            Priority::Naive(p) => p,
            Priority::Highest(p) => p,
            Priority::Last(p) => p,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::new(NoteMode::default())
    }
}

impl NotePriority for Priority {
    fn key_on(&mut self, pitch: i16) -> KeyAction {
        self.policy().key_on(pitch)
    }

    fn key_off(&mut self, pitch: i16) -> KeyAction {
        self.policy().key_off(pitch)
    }

    fn current(&self) -> Option<i16> {
        match self {
            Priority::Naive(p) => p.current(),
            Priority::Highest(p) => p.current(),
            Priority::Last(p) => p.current(),
        }
    }

    fn reset(&mut self) {
        self.policy().reset();
    }
}

/// Note router capability.
pub trait Keyboard {
    fn key_on(&mut self, rack: &mut Rack, pitch: i16);
    fn key_off(&mut self, rack: &mut Rack, pitch: i16);
}

/// One-voice keyboard driving lists of pitch and gate receivers in a rack.
///
/// The receiver lists are wiring only; the receivers themselves live in the
/// rack.
#[derive(Debug, Clone)]
pub struct MonoKeyboard<P = Priority> {
    priority: P,
    pitch_receivers: Vec<ModuleId>,
    gate_receivers: Vec<ModuleId>,
}

impl<P: NotePriority> MonoKeyboard<P> {
    pub fn new(priority: P) -> Self {
        Self {
            priority,
            pitch_receivers: Vec::new(),
            gate_receivers: Vec::new(),
        }
    }

    pub fn add_pitch_receiver<T: Module + Pitched>(&mut self, receiver: Handle<T>) {
        self.pitch_receivers.push(receiver.id());
    }

    pub fn add_gate_receiver<T: Module + Triggerable>(&mut self, receiver: Handle<T>) {
        self.gate_receivers.push(receiver.id());
    }

    pub fn pitch_receivers(&self) -> &[ModuleId] {
        &self.pitch_receivers
    }

    pub fn gate_receivers(&self) -> &[ModuleId] {
        &self.gate_receivers
    }

    pub fn priority(&self) -> &P {
        &self.priority
    }

    /// The pitch the priority considers sounding, if it tracks one.
    pub fn current_pitch(&self) -> Option<i16> {
        self.priority.current()
    }

    /// Drop both receiver lists and forget held keys.
    pub fn clear(&mut self) {
        self.pitch_receivers.clear();
        self.gate_receivers.clear();
        self.priority.reset();
    }

    /// Forget held keys and release every gate receiver.
    pub fn all_notes_off(&mut self, rack: &mut Rack) {
        self.priority.reset();
        self.release(rack);
    }

    fn apply(&self, rack: &mut Rack, action: KeyAction) {
        match action {
            KeyAction::Ignore => {}
            KeyAction::Retune(pitch) => self.retune(rack, pitch),
            KeyAction::Retrigger(pitch) => {
                self.retune(rack, pitch);
                self.press(rack);
            }
            KeyAction::Release => self.release(rack),
        }
    }

    fn retune(&self, rack: &mut Rack, pitch: i16) {
        let key_mod = pitch_to_key_mod(pitch);
        for &id in &self.pitch_receivers {
            if let Some(receiver) = rack.pitched_mut(id) {
                receiver.set_key_mod(key_mod);
            }
        }
    }

    fn press(&self, rack: &mut Rack) {
        for &id in &self.gate_receivers {
            if let Some(receiver) = rack.triggerable_mut(id) {
                receiver.press();
            }
        }
    }

    fn release(&self, rack: &mut Rack) {
        for &id in &self.gate_receivers {
            if let Some(receiver) = rack.triggerable_mut(id) {
                receiver.release();
            }
        }
    }
}

impl MonoKeyboard<Priority> {
    pub fn with_mode(mode: NoteMode) -> Self {
        Self::new(Priority::new(mode))
    }

    pub fn mode(&self) -> NoteMode {
        self.priority.mode()
    }

    /// Switch note priority. Held keys are released first so no gate sticks.
    pub fn set_mode(&mut self, rack: &mut Rack, mode: NoteMode) {
        if mode == self.mode() {
            return;
        }
        self.all_notes_off(rack);
        self.priority = Priority::new(mode);
    }
}

impl Default for MonoKeyboard<Priority> {
    fn default() -> Self {
        Self::new(Priority::default())
    }
}

impl<P: NotePriority> Keyboard for MonoKeyboard<P> {
    fn key_on(&mut self, rack: &mut Rack, pitch: i16) {
        let action = self.priority.key_on(pitch);
        self.apply(rack, action);
    }

    fn key_off(&mut self, rack: &mut Rack, pitch: i16) {
        let action = self.priority.key_off(pitch);
        self.apply(rack, action);
    }
}
