// Purpose: Note routing, parameter mapping and the playable FM voice
// This layer sits above graph modules and turns control events into wiring calls

pub mod keyboard;
pub mod message;
pub mod params;
pub mod voice;

pub use keyboard::{Keyboard, MonoKeyboard, NoteMode, NotePriority};
pub use message::{MessageReceiver, SynthMessage};
pub use params::{ParamId, PatchParams};
pub use voice::FmVoice;
