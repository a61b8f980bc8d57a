//! Envelope and gate modules.
//!
//! The DSP state machines in [`crate::dsp::envelope`] become rack modules
//! here: each one is [`Triggerable`] so a keyboard can press and release it,
//! and each one is a [`Signal`] so an amplifier can own it as a modulator.

use crate::dsp::envelope::{Gate, LinearAdsr, SmoothGate};
use crate::graph::module::{Module, Signal, Triggerable};
use crate::graph::rack::Rack;

impl Triggerable for Gate {
    fn press(&mut self) {
        Gate::press(self);
    }

    fn release(&mut self) {
        Gate::release(self);
    }
}

impl Module for Gate {
    fn output(&mut self, _rack: &mut Rack) -> f32 {
        self.next_sample()
    }

    fn is_on(&self, _rack: &Rack) -> bool {
        self.is_active()
    }

    fn as_triggerable(&mut self) -> Option<&mut dyn Triggerable> {
        Some(self)
    }
}

impl Triggerable for SmoothGate {
    fn press(&mut self) {
        SmoothGate::press(self);
    }

    fn release(&mut self) {
        SmoothGate::release(self);
    }
}

impl Module for SmoothGate {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        SmoothGate::set_sample_rate(self, sample_rate);
    }

    fn output(&mut self, _rack: &mut Rack) -> f32 {
        self.next_sample()
    }

    fn is_on(&self, _rack: &Rack) -> bool {
        self.is_active()
    }

    fn as_triggerable(&mut self) -> Option<&mut dyn Triggerable> {
        Some(self)
    }
}

impl Triggerable for LinearAdsr {
    fn press(&mut self) {
        LinearAdsr::press(self);
    }

    fn release(&mut self) {
        LinearAdsr::release(self);
    }
}

impl Module for LinearAdsr {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        LinearAdsr::set_sample_rate(self, sample_rate);
    }

    fn output(&mut self, _rack: &mut Rack) -> f32 {
        self.next_sample()
    }

    fn is_on(&self, _rack: &Rack) -> bool {
        self.is_active()
    }

    fn as_triggerable(&mut self) -> Option<&mut dyn Triggerable> {
        Some(self)
    }
}

impl Signal for LinearAdsr {
    #[inline]
    fn sample(&mut self, _rack: &mut Rack) -> f32 {
        self.next_sample()
    }

    fn is_on(&self, _rack: &Rack) -> bool {
        self.is_active()
    }
}
