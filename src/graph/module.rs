use std::any::Any;

use crate::graph::rack::Rack;

/// Downcasting support so a [`Rack`] can hand back concrete module types.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Core trait for every unit that lives in a [`Rack`].
///
/// A module produces one sample per `output` call and pulls whatever it is
/// wired to through the rack. Modules:
/// - do NOT allocate in `output`
/// - do NOT own the modules they are wired to
/// - DO recompute cached increments whenever a setter changes them
pub trait Module: AsAny + Send {
    /// Push the host sample rate into the module.
    ///
    /// Must be called before the first `output`; until then increments stay
    /// at zero and the module produces silence or a frozen phase.
    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    /// Produce the next sample, pulling inputs from `rack`.
    fn output(&mut self, rack: &mut Rack) -> f32;

    /// Whether the module currently contributes non-silent output.
    ///
    /// This is an optimization hint: amplifiers skip evaluating their inputs
    /// entirely while closed.
    fn is_on(&self, _rack: &Rack) -> bool {
        true
    }

    /// Drop every connection this module holds in a list.
    ///
    /// Only the wiring is released, never the referenced modules.
    fn clear(&mut self) {}

    /// Keyboard pitch capability, if the module has one.
    fn as_pitched(&mut self) -> Option<&mut dyn Pitched> {
        None
    }

    /// Keyboard gate capability, if the module has one.
    fn as_triggerable(&mut self) -> Option<&mut dyn Triggerable> {
        None
    }
}

/// Something a keyboard can retune.
pub trait Pitched {
    /// Base frequency in Hz, played when key mod is 1.0.
    fn set_frequency(&mut self, frequency: f32);

    /// Unitless pitch multiplier written by a keyboard.
    fn set_key_mod(&mut self, key_mod: f32);
}

/// Something a keyboard can press and release.
pub trait Triggerable {
    fn press(&mut self);
    fn release(&mut self);
}

/// A signal an amplifier can pull from: either a wired [`Source`] or a
/// part the amplifier owns by value.
///
/// [`Source`]: crate::graph::Source
pub trait Signal: Send {
    fn sample(&mut self, rack: &mut Rack) -> f32;

    fn is_on(&self, rack: &Rack) -> bool;

    /// True only for the silent default source.
    fn is_silent(&self) -> bool {
        false
    }
}

/// Stateless module that always outputs silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Module for Silence {
    fn output(&mut self, _rack: &mut Rack) -> f32 {
        0.0
    }
}
