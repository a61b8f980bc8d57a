use std::{
    any::type_name,
    cell::Cell,
    fmt,
    marker::PhantomData,
    ops::{Index, IndexMut},
};

use crate::graph::module::{AsAny, Module, Pitched, Signal, Triggerable};

/*
The Rack
========

A rack is the arena that owns every top-level module of a patch. Modules never
own each other through wiring; they hold a `ModuleId` (an index into the rack)
and pull samples through it:

    ┌──────────────────────────── Rack ────────────────────────────┐
    │  [0] FmOperator ──┐                                          │
    │  [1] FmOperator ←─┘ modulator   [2] Mixer ← [1]              │
    │  [3] ModAmp ← input [2]                                      │
    └──────────────────────────────────────────────────────────────┘

    rack.output(master) → ModAmp → Mixer → op2 → op1 → one sample

Pulling a sample
----------------

To evaluate module `i`, the rack moves its box out of the slot, hands the
module `&mut Rack` so it can pull its own inputs, then puts it back. Moving a
`Box` is a pointer copy, so this stays allocation-free.

While module `i` is out of its slot, anything that asks for `i` again (a
feedback loop wired by the caller) gets the sample `i` produced last time
instead of recursing forever. That is a one-sample delay, the usual way FM
feedback is realized digitally.
*/

/// Index of a module inside a [`Rack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Typed [`ModuleId`] returned by [`Rack::add`].
pub struct Handle<T> {
    id: ModuleId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(id: ModuleId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(self) -> ModuleId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", type_name::<T>(), self.id.0)
    }
}

impl<T> From<Handle<T>> for ModuleId {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

/// Where a module reads an input or modulator from.
///
/// `Silent` is the default for every unconnected jack and behaves like a
/// module that always outputs 0.0 and always reports itself on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    Silent,
    Bound(ModuleId),
}

impl Source {
    pub fn is_silent(self) -> bool {
        matches!(self, Source::Silent)
    }

    #[inline]
    pub fn output(self, rack: &mut Rack) -> f32 {
        match self {
            Source::Silent => 0.0,
            Source::Bound(id) => rack.output(id),
        }
    }

    pub fn is_on(self, rack: &Rack) -> bool {
        match self {
            Source::Silent => true,
            Source::Bound(id) => rack.is_on(id),
        }
    }
}

impl From<ModuleId> for Source {
    fn from(id: ModuleId) -> Self {
        Source::Bound(id)
    }
}

impl<T> From<Handle<T>> for Source {
    fn from(handle: Handle<T>) -> Self {
        Source::Bound(handle.id)
    }
}

impl Signal for Source {
    #[inline]
    fn sample(&mut self, rack: &mut Rack) -> f32 {
        self.output(rack)
    }

    fn is_on(&self, rack: &Rack) -> bool {
        Source::is_on(*self, rack)
    }

    fn is_silent(&self) -> bool {
        Source::is_silent(*self)
    }
}

struct Slot {
    /// `None` while the module is being evaluated.
    module: Option<Box<dyn Module>>,
    /// Last sample produced, served to re-entrant reads.
    last: f32,
    /// Set while the module answers `is_on`, so activity cycles terminate.
    probing: Cell<bool>,
}

/// Arena owning the modules of one patch.
pub struct Rack {
    slots: Vec<Slot>,
    sample_rate: f32,
}

impl Rack {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            sample_rate: 0.0,
        }
    }

    /// Create a rack whose modules all start at `sample_rate`.
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            slots: Vec::new(),
            sample_rate,
        }
    }

    /// Move a module into the rack.
    ///
    /// If the rack already has a sample rate the module receives it first.
    pub fn add<T: Module>(&mut self, mut module: T) -> Handle<T> {
        if self.sample_rate > 0.0 {
            module.set_sample_rate(self.sample_rate);
        }
        let id = ModuleId(self.slots.len());
        self.slots.push(Slot {
            module: Some(Box::new(module)),
            last: 0.0,
            probing: Cell::new(false),
        });
        Handle::new(id)
    }

    pub fn get<T: Module>(&self, handle: Handle<T>) -> Option<&T> {
        let module = self.slots.get(handle.id.0)?.module.as_deref()?;
        AsAny::as_any(module).downcast_ref::<T>()
    }

    pub fn get_mut<T: Module>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let module = self.slots.get_mut(handle.id.0)?.module.as_deref_mut()?;
        AsAny::as_any_mut(module).downcast_mut::<T>()
    }

    /// Push a new sample rate to every module in the rack.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        log::debug!(
            "rack: sample rate {} -> {} Hz ({} modules)",
            self.sample_rate,
            sample_rate,
            self.slots.len()
        );
        self.sample_rate = sample_rate;
        for module in self.slots.iter_mut().filter_map(|s| s.module.as_deref_mut()) {
            module.set_sample_rate(sample_rate);
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Pull one sample from module `id`.
    ///
    /// Unknown ids read as silence. A module that is already being evaluated
    /// returns its previous sample.
    pub fn output(&mut self, id: impl Into<ModuleId>) -> f32 {
        let index = id.into().0;
        let Some(slot) = self.slots.get_mut(index) else {
            return 0.0;
        };
        let Some(mut module) = slot.module.take() else {
            return slot.last;
        };

        let sample = module.output(self);

        let slot = &mut self.slots[index];
        slot.module = Some(module);
        slot.last = sample;
        sample
    }

    /// Activity hint of module `id`.
    ///
    /// A module mid-evaluation, or one asked again while it is still answering
    /// (an activity cycle), counts as on.
    pub fn is_on(&self, id: impl Into<ModuleId>) -> bool {
        let Some(slot) = self.slots.get(id.into().0) else {
            return false;
        };
        let Some(module) = slot.module.as_deref() else {
            return true;
        };
        if slot.probing.replace(true) {
            return true;
        }
        let on = module.is_on(self);
        slot.probing.set(false);
        on
    }

    /// Drop the list connections held by module `id`.
    pub fn clear(&mut self, id: impl Into<ModuleId>) {
        if let Some(module) = self.module_mut(id.into()) {
            module.clear();
        }
    }

    /// Drop the list connections of every module in the rack.
    pub fn clear_all(&mut self) {
        for module in self.slots.iter_mut().filter_map(|s| s.module.as_deref_mut()) {
            module.clear();
        }
    }

    pub fn pitched_mut(&mut self, id: ModuleId) -> Option<&mut dyn Pitched> {
        self.module_mut(id)?.as_pitched()
    }

    pub fn triggerable_mut(&mut self, id: ModuleId) -> Option<&mut dyn Triggerable> {
        self.module_mut(id)?.as_triggerable()
    }

    fn module_mut(&mut self, id: ModuleId) -> Option<&mut dyn Module> {
        Some(self.slots.get_mut(id.0)?.module.as_deref_mut()?)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for Rack {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Module> Index<Handle<T>> for Rack {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(module) => module,
            None => panic!("{handle:?} does not belong to this rack"),
        }
    }
}

impl<T: Module> IndexMut<Handle<T>> for Rack {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(module) => module,
            None => panic!("{handle:?} does not belong to this rack"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::amplify::{Amplifier, PassThrough};
    use crate::graph::module::Silence;

    /// Outputs an ever-increasing counter so evaluation order is visible.
    struct Counter {
        next: f32,
    }

    impl Module for Counter {
        fn output(&mut self, _rack: &mut Rack) -> f32 {
            self.next += 1.0;
            self.next
        }
    }

    /// Adds its own input to a constant, so wiring it to itself is feedback.
    struct Feedback {
        input: Source,
    }

    impl Module for Feedback {
        fn output(&mut self, rack: &mut Rack) -> f32 {
            1.0 + 0.5 * self.input.output(rack)
        }
    }

    struct RateProbe {
        rate: f32,
    }

    impl Module for RateProbe {
        fn set_sample_rate(&mut self, sample_rate: f32) {
            self.rate = sample_rate;
        }

        fn output(&mut self, _rack: &mut Rack) -> f32 {
            self.rate
        }
    }

    #[test]
    fn test_typed_lookup() {
        let mut rack = Rack::new();
        let counter = rack.add(Counter { next: 0.0 });
        let silence = rack.add(Silence);

        assert_eq!(rack.len(), 2);
        assert!(rack.get(counter).is_some());
        assert_eq!(rack.output(counter), 1.0);
        assert_eq!(rack[counter].next, 1.0);
        assert_eq!(rack.output(silence), 0.0);
    }

    #[test]
    fn test_silent_source_reads_zero_and_is_on() {
        let mut rack = Rack::new();
        let source = Source::default();

        assert!(source.is_silent());
        assert_eq!(source.output(&mut rack), 0.0);
        assert!(source.is_on(&rack));
    }

    #[test]
    fn test_unknown_id_is_silent_and_off() {
        let mut other = Rack::new();
        other.add(Silence);
        let foreign = other.add(Counter { next: 0.0 });

        let mut rack = Rack::new();
        assert_eq!(rack.output(foreign), 0.0);
        assert!(!rack.is_on(foreign));
        assert!(rack.get(foreign).is_none());
    }

    #[test]
    fn test_feedback_reads_previous_sample() {
        let mut rack = Rack::new();
        let node = rack.add(Feedback {
            input: Source::Silent,
        });
        rack[node].input = node.into();

        // y[n] = 1 + 0.5 * y[n-1], y[-1] = 0
        assert_eq!(rack.output(node), 1.0);
        assert_eq!(rack.output(node), 1.5);
        assert_eq!(rack.output(node), 1.75);
    }

    #[test]
    fn test_amplifier_cycle_terminates() {
        let mut rack = Rack::new();
        let a = rack.add(Amplifier::new());
        let b = rack.add(Amplifier::new());
        rack[a].set_input(b);
        rack[b].set_input(a);

        assert_eq!(rack.output(a), 0.0);
        assert!(rack.is_on(a));
        assert!(rack.is_on(b));

        rack[b].set_volume(0.0);
        assert!(!rack.is_on(a), "a closed link anywhere in the loop closes it");
        assert!(!rack.is_on(b));
    }

    #[test]
    fn test_pass_through_self_loop_is_on() {
        let mut rack = Rack::new();
        let wire = rack.add(PassThrough::new());
        rack[wire].set_input(wire);

        assert!(rack.is_on(wire));
        assert_eq!(rack.output(wire), 0.0);
        assert!(rack.is_on(wire), "asking again after a full answer still works");
    }

    #[test]
    fn test_sample_rate_reaches_existing_and_new_modules() {
        let mut rack = Rack::new();
        let early = rack.add(RateProbe { rate: 0.0 });
        rack.set_sample_rate(44_100.0);
        let late = rack.add(RateProbe { rate: 0.0 });

        assert_eq!(rack.output(early), 44_100.0);
        assert_eq!(rack.output(late), 44_100.0);
        assert_eq!(rack.sample_rate(), 44_100.0);
    }

    #[test]
    #[should_panic(expected = "does not belong to this rack")]
    fn test_indexing_with_foreign_handle_panics() {
        let mut other = Rack::new();
        let handle = other.add(Counter { next: 0.0 });
        let rack = Rack::new();
        let _ = &rack[handle];
    }
}
