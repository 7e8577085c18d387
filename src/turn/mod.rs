//! Turn reassembly
//!
//! The dialogue stream delivers a model response as many small fragments
//! (text deltas and base64 PCM chunks) followed by a completion signal.
//! `TurnAccumulator` buffers them and `run_turns` drives it from a channel.

mod accumulator;
mod processor;

pub use accumulator::{AudioChunk, DialogueEvent, Fragment, Turn, TurnAccumulator};
pub use processor::{run_turns, TurnStats};
