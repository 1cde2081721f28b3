//! Inline-graphics sub-protocols: Sixel, ReGIS, Kitty-style APC images.
//!
//! Each is dispatched from a different entry point (`session::dcs` for
//! Sixel/ReGIS since both ride DCS passthrough, `parser::ApcSink` for
//! Kitty since it rides APC) but all three share the same posture: bound
//! every accumulating buffer, never panic on garbage input, and fail back
//! to a quiescent sub-state rather than aborting the whole parser.

pub mod kitty;
pub mod regis;
pub mod sixel;
