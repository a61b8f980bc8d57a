// Ramp comparisons are negated so a NaN step lands on the target.
#![allow(clippy::neg_cmp_op_on_partial_ord)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Gates and Linear Envelopes
==========================

Three triggerable control sources live here. All of them are plain state
machines: `press()` and `release()` only change the stage, and each call to
`next_sample()` moves the value one step.

Vocabulary
----------

  value       The current output (0.0 to 1.0). Multiplying audio by it shapes
              the amplitude of a note.

  stage       Which segment of the shape we are in. A state machine governs
              transitions.

  increment   How much `value` changes per sample, derived from a stage time
              and the sample rate:

                  increment = distance / (time_seconds * sample_rate)

  press       Gate high. The note starts.
  release     Gate low. The note ends from wherever the value currently is.


Gate
----

    1.0 ┐   ┌─────────┐
        │   │         │
    0.0 └───┘         └─────
          press     release

Instant on, instant off. Clicks if used directly on audio, fine as a CV.


SmoothGate
----------

    1.0 ┐    ╱‾‾‾‾‾‾‾╲
        │   ╱         ╲
    0.0 └──╱           ╲────
        Rising  Held  Falling

A gate with 5 ms linear ramps on both edges, enough to remove the click
without audibly softening the attack.


Linear ADSR
-----------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

    ┌─────┐  press  ┌────────┐ value=1 ┌───────┐ value=S ┌─────────┐
    │ Off │ ──────→ │ Attack │ ──────→ │ Decay │ ──────→ │ Sustain │
    └─────┘         └────────┘         └───────┘         └─────────┘
       ↑                 │ release         │ release          │ release
       │  value=0   ┌─────────┐            │                  │
       └─────────── │ Release │ ←──────────┴──────────────────┘
                    └─────────┘

Increments are cached and recomputed by the setters and on a sample rate
change:

    attack  = (1 - value)         / (attack_time  * sample_rate)
    decay   = (sustain_level - 1) / (decay_time   * sample_rate)    (< 0)
    release = -value              / (release_time * sample_rate)    (< 0)

Release is also recomputed the moment it is triggered. Attack is not: a
retrigger climbs from wherever the envelope sits at the cached slope, so it
never jumps and reaches the peak sooner the higher it starts.

Each step adds the increment, then clamps to the stage target and switches
stage once the target is reached. The comparisons are written so that a NaN
step (for example a zero decay time with sustain at 1.0) lands on the target
instead of poisoning the value.
*/

/// Tolerance used when deciding a ramp has reached its target.
const STAGE_EPSILON: f32 = 1e-6;

/// Full-scale ramps per second for [`SmoothGate`] (a 5 ms edge).
const SMOOTH_GATE_RAMP_RATE: f32 = 200.0;

/// Stage of a [`LinearAdsr`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Off,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Stage of a [`SmoothGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateStage {
    #[default]
    Idle,
    Rising,
    Held,
    Falling,
}

/// Binary gate: 1.0 while pressed, 0.0 otherwise.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    on: bool,
}

impl Gate {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn press(&mut self) {
        self.on = true;
    }

    pub fn release(&mut self) {
        self.on = false;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.on {
            1.0
        } else {
            0.0
        }
    }

    pub fn is_active(&self) -> bool {
        self.on
    }
}

/// Gate with short linear ramps on both edges.
#[derive(Debug, Clone)]
pub struct SmoothGate {
    value: f32,
    stage: GateStage,
    increment: f32,
}

impl SmoothGate {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            stage: GateStage::Idle,
            increment: 0.005,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.increment = SMOOTH_GATE_RAMP_RATE / sample_rate;
        }
    }

    pub fn press(&mut self) {
        self.stage = GateStage::Rising;
    }

    pub fn release(&mut self) {
        self.stage = GateStage::Falling;
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            GateStage::Idle => {}
            GateStage::Rising => {
                let next = self.value + self.increment;
                if !(next < 1.0 - STAGE_EPSILON) {
                    self.value = 1.0;
                    self.stage = GateStage::Held;
                } else {
                    self.value = next.max(0.0);
                }
            }
            GateStage::Held => {
                self.value = 1.0;
            }
            GateStage::Falling => {
                let next = self.value - self.increment;
                if !(next > STAGE_EPSILON) {
                    self.value = 0.0;
                    self.stage = GateStage::Idle;
                } else {
                    self.value = next.min(1.0);
                }
            }
        }
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.stage != GateStage::Idle
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn stage(&self) -> GateStage {
        self.stage
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }
}

impl Default for SmoothGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Four-stage linear envelope with cached per-sample increments.
#[derive(Debug, Clone)]
pub struct LinearAdsr {
    sample_rate: f32,

    // Shape parameters, in seconds except the sustain level
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    // Per-sample steps, recomputed by the setters
    attack_increment: f32,
    decay_increment: f32,
    release_increment: f32,

    stage: EnvelopeStage,
    value: f32,
}

impl LinearAdsr {
    pub fn new() -> Self {
        Self::adsr(0.005, 0.005, 1.0, 0.005)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            sample_rate: 0.0,
            attack_time: attack,
            decay_time: decay,
            sustain_level: sustain,
            release_time: release,
            attack_increment: 0.0,
            decay_increment: 0.0,
            release_increment: 0.0,
            stage: EnvelopeStage::Off,
            value: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_attack_increment();
        self.update_decay_increment();
        self.update_release_increment();
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_time = seconds;
        self.update_attack_increment();
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_time = seconds;
        self.update_decay_increment();
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level;
        self.update_decay_increment();
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.release_time = seconds;
        self.update_release_increment();
    }

    fn per_sample(&self, distance: f32, seconds: f32) -> f32 {
        if self.sample_rate > 0.0 {
            distance / (seconds * self.sample_rate)
        } else {
            0.0
        }
    }

    fn update_attack_increment(&mut self) {
        self.attack_increment = self.per_sample(1.0 - self.value, self.attack_time);
    }

    fn update_decay_increment(&mut self) {
        self.decay_increment = self.per_sample(self.sustain_level - 1.0, self.decay_time);
    }

    fn update_release_increment(&mut self) {
        self.release_increment = self.per_sample(-self.value, self.release_time);
    }

    /// Gate high: enter attack from whatever stage and value we are at.
    ///
    /// The attack slope is the one the setters computed, so a retrigger from a
    /// raised level reaches full scale sooner.
    pub fn press(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: ramp to zero from the current value over the release time.
    pub fn release(&mut self) {
        self.stage = EnvelopeStage::Release;
        self.update_release_increment();
    }

    /// Advance the envelope by one sample and return the new value.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Off => {}

            EnvelopeStage::Attack => {
                let next = self.value + self.attack_increment;
                if !(next < 1.0 - STAGE_EPSILON) {
                    self.value = 1.0;
                    self.stage = EnvelopeStage::Decay;
                } else {
                    // a negative attack time stalls here instead of going below zero
                    self.value = next.max(0.0);
                }
            }

            EnvelopeStage::Decay => {
                let target = self.sustain_target();
                let next = self.value + self.decay_increment;
                // a non-negative step means sustain sits at or above the peak
                if !(next > target + STAGE_EPSILON) || !(self.decay_increment < 0.0) {
                    self.value = target;
                    self.stage = EnvelopeStage::Sustain;
                } else {
                    self.value = next.min(1.0);
                }
            }

            EnvelopeStage::Sustain => {
                self.value = self.sustain_target();
            }

            EnvelopeStage::Release => {
                let next = self.value + self.release_increment;
                if !(next > STAGE_EPSILON) {
                    self.value = 0.0;
                    self.stage = EnvelopeStage::Off;
                } else {
                    self.value = next.min(1.0);
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.value));
        self.value
    }

    fn sustain_target(&self) -> f32 {
        self.sustain_level.clamp(0.0, 1.0)
    }

    /// Returns true unless the envelope is off.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Off
    }

    /// Back to off at zero without ramping.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Off;
        self.value = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn attack_time(&self) -> f32 {
        self.attack_time
    }

    pub fn decay_time(&self) -> f32 {
        self.decay_time
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    pub fn release_increment(&self) -> f32 {
        self.release_increment
    }
}

impl Default for LinearAdsr {
    fn default() -> Self {
        Self::new()
    }
}
