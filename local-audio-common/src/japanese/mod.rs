//! Japanese text utilities
//!
//! Kana script conversion, mora segmentation and pitch accent display text.

pub mod kana;
pub mod mora;
pub mod pitch;

pub use kana::{hiragana_to_katakana, is_hiragana, is_kana, katakana_to_hiragana};
pub use mora::split_into_mora;
pub use pitch::{render_accent, render_katakana_pitch, AccentSegment, DOWNSTEP_MARKER};
