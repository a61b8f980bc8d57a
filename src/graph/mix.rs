use crate::graph::module::Module;
use crate::graph::rack::{ModuleId, Rack};

/*
Averaging Mixer
===============

The mixer sums any number of wired inputs and divides by how many there are:

    out = (in₁ + in₂ + … + inₙ) / n

Every input is weighted equally and the gain is recomputed on each insertion,
so n inputs all outputting 1.0 mix to exactly 1.0 and the mixer can never clip
louder than its loudest input.

Inputs can only be added one at a time or dropped all at once with `clear`.
An empty mixer outputs 0.0.

Typical use is the FM input of an operator: every operator wired as a
modulator lands here and the oscillator sees their average.

Example usage:
  let mut mixer = Mixer::new();
  mixer.add_input(op1);
  mixer.add_input(op2);
  let mixer = rack.add(mixer);
*/

/// N-input equal-weight mixer.
#[derive(Debug, Clone)]
pub struct Mixer {
    inputs: Vec<ModuleId>,
    gain: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            gain: 1.0,
        }
    }

    /// Pre-size the input list so wiring up to `capacity` inputs never reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inputs: Vec::with_capacity(capacity),
            gain: 1.0,
        }
    }

    pub fn add_input(&mut self, input: impl Into<ModuleId>) {
        self.inputs.push(input.into());
        self.gain = 1.0 / self.inputs.len() as f32;
    }

    pub fn inputs(&self) -> &[ModuleId] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Mixer {
    fn output(&mut self, rack: &mut Rack) -> f32 {
        if self.inputs.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0;
        for &input in &self.inputs {
            sum += rack.output(input);
        }
        sum * self.gain
    }

    fn clear(&mut self) {
        self.inputs.clear();
        self.gain = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dc(f32);

    impl Module for Dc {
        fn output(&mut self, _rack: &mut Rack) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_empty_mixer_is_silent() {
        let mut rack = Rack::new();
        let mixer = rack.add(Mixer::new());
        assert_eq!(rack.output(mixer), 0.0);
    }

    #[test]
    fn test_equal_inputs_average_to_themselves() {
        let mut rack = Rack::new();
        let mut mixer = Mixer::new();
        for n in 1..=8 {
            mixer.add_input(rack.add(Dc(1.0)));
            assert!(
                (mixer.gain() * n as f32 - 1.0).abs() < 1e-6,
                "gain {} wrong for {n} inputs",
                mixer.gain()
            );
        }
        let mixer = rack.add(mixer);

        assert!((rack.output(mixer) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_inputs_average() {
        let mut rack = Rack::new();
        let mut mixer = Mixer::new();
        mixer.add_input(rack.add(Dc(1.0)));
        mixer.add_input(rack.add(Dc(0.0)));
        mixer.add_input(rack.add(Dc(-0.4)));
        let mixer = rack.add(mixer);

        assert!((rack.output(mixer) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_clear_drops_every_input() {
        let mut rack = Rack::new();
        let dc = rack.add(Dc(1.0));
        let mut mixer = Mixer::new();
        mixer.add_input(dc);
        mixer.add_input(dc);
        let mixer = rack.add(mixer);
        assert_eq!(rack.output(mixer), 1.0);

        rack.clear(mixer);
        assert!(rack[mixer].is_empty());
        assert_eq!(rack.output(mixer), 0.0);
        assert_eq!(rack.output(dc), 1.0, "cleared inputs stay in the rack");
    }
}
