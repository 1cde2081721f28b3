//! Create-time configuration.
//!
//! Mirrors the teacher's `RainConfig`/`TerminalConfig` shape (plain struct,
//! `Default` impl) but carries no file-loading methods: config-file I/O is
//! an embedder concern the core doesn't own (see spec Non-goals).

use serde::{Deserialize, Serialize};

/// Minimum/maximum grid dimension in either axis, per spec §6/§4.5
/// (`SET WIDTH`/`SET HEIGHT`/`SET SIZE` clamp to the same range).
pub const MIN_DIMENSION: u16 = 1;
pub const MAX_DIMENSION: u16 = 2048;

/// Fixed session-table capacity (`MAX_SESSIONS`).
pub const MAX_SESSIONS: usize = 16;

/// Options recognized at `Terminal::create` time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConfig {
    pub width: u16,
    pub height: u16,
    /// Extra scrollback rows per session, beyond the visible grid.
    pub scrollback_capacity: usize,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            scrollback_capacity: 500,
        }
    }
}

impl CreateConfig {
    /// Clamp width/height into `[MIN_DIMENSION, MAX_DIMENSION]`.
    pub fn clamped(mut self) -> Self {
        self.width = self.width.clamp(MIN_DIMENSION, MAX_DIMENSION);
        self.height = self.height.clamp(MIN_DIMENSION, MAX_DIMENSION);
        self
    }
}

/// VT conformance level selected per session via `set_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConformanceLevel {
    AnsiSys,
    Vt100,
    Vt220,
    Vt420,
    Vt525,
    #[default]
    Xterm,
}
