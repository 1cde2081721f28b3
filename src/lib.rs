//! `kterm-core`: a VT100/VT220/VT420/VT525/xterm-compatible, multi-session
//! terminal emulation engine.
//!
//! The engine owns no I/O: bytes come in through [`terminal::Terminal::write_string`]
//! / [`terminal::Terminal::process_char`], are parsed and applied to an
//! in-memory screen model on [`terminal::Terminal::update`], and observable
//! effects (responses, resizes, gateway side-channels, errors) are reported
//! back through the [`callbacks::Collaborators`] bundle. Embedders own the
//! PTY, the render surface, and the event loop.

pub mod callbacks;
pub mod cell;
pub mod color;
pub mod config;
pub mod cursor;
pub mod error;
pub mod gateway;
pub mod graphics;
pub mod grid;
pub mod modes;
pub mod op_queue;
pub mod pane;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod terminal;

pub use callbacks::{Collaborators, ErrorLevel, ErrorSource, GatewayHandler, PrinterSink, ResizeHandler, ResponseSink};
pub use cell::{Cell, CellFlags, UnderlineStyle};
pub use color::Color;
pub use config::{ConformanceLevel, CreateConfig, MAX_SESSIONS};
pub use error::{GatewayError, ResourceError};
pub use gateway::GatewayCommand;
pub use pane::{Orientation, Pane, Rect};
pub use session::Session;
pub use terminal::Terminal;

/// Install a `tracing` subscriber reading `KTERM_LOG` (falling back to
/// `kterm_core=info`), mirroring the teacher's own `tracing_subscriber::fmt`
/// setup. Embedders that already run their own subscriber should skip this
/// and just depend on the `tracing` events this crate emits.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KTERM_LOG")
                .unwrap_or_else(|_| "kterm_core=info".into()),
        )
        .try_init();
}
