pub mod action_key;
pub mod constants;
pub mod hit_window;
pub mod note;

pub use action_key::{ActionKey, Lane};
pub use constants::*;
pub use hit_window::{HitWindow, ScoreMark, WindowTolerances};
pub use note::{ActiveNote, Note, beat_partition};
