//! Automatable parameters of the two-operator voice.
//!
//! Hosts and UIs send normalized values in `0.0..=1.0`; [`ParamId::to_physical`]
//! turns them into the units the modules take (radians of modulation index,
//! Hz, seconds, linear gain).

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest attack and release the normalized range maps to.
pub const MIN_RAMP_TIME: f32 = 0.005;

/// Frequency a normalized 1.0 maps to.
pub const MAX_OPERATOR_FREQUENCY: f32 = 880.0;

/// Parameter identifiers, numbered from 100 so they never collide with the
/// host's reserved ids.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParamId {
    Op1Level = 100,
    Op1Frequency = 101,
    Op1Attack = 102,
    Op1Decay = 103,
    Op1Sustain = 104,
    Op1Release = 105,
    Op2Level = 106,
    Op2Frequency = 107,
    Op2Attack = 108,
    Op2Decay = 109,
    Op2Sustain = 110,
    Op2Release = 111,
    MasterVolume = 112,
}

/// Which part of an operator a parameter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorParam {
    Level,
    Frequency,
    Attack,
    Decay,
    Sustain,
    Release,
}

impl ParamId {
    pub const ALL: [ParamId; 13] = [
        ParamId::Op1Level,
        ParamId::Op1Frequency,
        ParamId::Op1Attack,
        ParamId::Op1Decay,
        ParamId::Op1Sustain,
        ParamId::Op1Release,
        ParamId::Op2Level,
        ParamId::Op2Frequency,
        ParamId::Op2Attack,
        ParamId::Op2Decay,
        ParamId::Op2Sustain,
        ParamId::Op2Release,
        ParamId::MasterVolume,
    ];

    /// Normalized value every parameter starts at.
    pub const DEFAULT_NORMALIZED: f32 = 0.5;

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.raw() == raw)
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Operator index (0 or 1) and part, or `None` for the master volume.
    pub fn target(self) -> Option<(usize, OperatorParam)> {
        use OperatorParam::*;
        let target = match self {
            ParamId::Op1Level => (0, Level),
            ParamId::Op1Frequency => (0, Frequency),
            ParamId::Op1Attack => (0, Attack),
            ParamId::Op1Decay => (0, Decay),
            ParamId::Op1Sustain => (0, Sustain),
            ParamId::Op1Release => (0, Release),
            ParamId::Op2Level => (1, Level),
            ParamId::Op2Frequency => (1, Frequency),
            ParamId::Op2Attack => (1, Attack),
            ParamId::Op2Decay => (1, Decay),
            ParamId::Op2Sustain => (1, Sustain),
            ParamId::Op2Release => (1, Release),
            ParamId::MasterVolume => return None,
        };
        Some(target)
    }

    /// Map a normalized value onto the parameter's physical unit.
    pub fn to_physical(self, normalized: f32) -> f32 {
        match self.target() {
            Some((_, OperatorParam::Level)) => normalized * TAU,
            Some((_, OperatorParam::Frequency)) => normalized * MAX_OPERATOR_FREQUENCY,
            Some((_, OperatorParam::Attack | OperatorParam::Release)) => {
                normalized + MIN_RAMP_TIME
            }
            Some((_, OperatorParam::Decay | OperatorParam::Sustain)) | None => normalized,
        }
    }

    /// Inverse of [`to_physical`](Self::to_physical).
    pub fn to_normalized(self, physical: f32) -> f32 {
        match self.target() {
            Some((_, OperatorParam::Level)) => physical / TAU,
            Some((_, OperatorParam::Frequency)) => physical / MAX_OPERATOR_FREQUENCY,
            Some((_, OperatorParam::Attack | OperatorParam::Release)) => {
                physical - MIN_RAMP_TIME
            }
            Some((_, OperatorParam::Decay | OperatorParam::Sustain)) | None => physical,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Op1Level => "op1 level",
            ParamId::Op1Frequency => "op1 freq",
            ParamId::Op1Attack => "op1 attack",
            ParamId::Op1Decay => "op1 decay",
            ParamId::Op1Sustain => "op1 sustain",
            ParamId::Op1Release => "op1 release",
            ParamId::Op2Level => "op2 level",
            ParamId::Op2Frequency => "op2 freq",
            ParamId::Op2Attack => "op2 attack",
            ParamId::Op2Decay => "op2 decay",
            ParamId::Op2Sustain => "op2 sustain",
            ParamId::Op2Release => "op2 release",
            ParamId::MasterVolume => "master",
        }
    }
}

/// Physical settings of one operator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorParams {
    pub level: f32,
    pub frequency: f32,
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl OperatorParams {
    pub fn get(&self, param: OperatorParam) -> f32 {
        match param {
            OperatorParam::Level => self.level,
            OperatorParam::Frequency => self.frequency,
            OperatorParam::Attack => self.attack,
            OperatorParam::Decay => self.decay,
            OperatorParam::Sustain => self.sustain,
            OperatorParam::Release => self.release,
        }
    }

    pub fn set(&mut self, param: OperatorParam, value: f32) {
        match param {
            OperatorParam::Level => self.level = value,
            OperatorParam::Frequency => self.frequency = value,
            OperatorParam::Attack => self.attack = value,
            OperatorParam::Decay => self.decay = value,
            OperatorParam::Sustain => self.sustain = value,
            OperatorParam::Release => self.release = value,
        }
    }
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self {
            level: 1.0,
            frequency: 440.0,
            attack: MIN_RAMP_TIME,
            decay: 0.0,
            sustain: 1.0,
            release: MIN_RAMP_TIME,
        }
    }
}

/// Physical settings of the whole voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchParams {
    pub operators: [OperatorParams; 2],
    pub master_volume: f32,
}

impl PatchParams {
    /// Physical value of `id`.
    pub fn get(&self, id: ParamId) -> f32 {
        match id.target() {
            Some((op, param)) => self.operators[op].get(param),
            None => self.master_volume,
        }
    }

    /// Store the physical value of `id`.
    pub fn set(&mut self, id: ParamId, value: f32) {
        match id.target() {
            Some((op, param)) => self.operators[op].set(param, value),
            None => self.master_volume = value,
        }
    }
}

impl Default for PatchParams {
    fn default() -> Self {
        Self {
            operators: [OperatorParams::default(); 2],
            master_volume: 1.0,
        }
    }
}
