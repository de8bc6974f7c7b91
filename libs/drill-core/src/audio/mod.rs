//! Audio playback: source resolution and the fallback engine.

pub mod engine;
pub mod resolver;
