//! Internal error taxonomy.
//!
//! Nothing here crosses the public `Terminal`/`Session` API: every variant is
//! caught where it originates and turned into an `error_callback` invocation
//! (see [`callbacks::ErrorLevel`]/[`callbacks::ErrorSource`]) plus a
//! `tracing` event. The only entry point that can fail at the API boundary
//! is [`crate::terminal::Terminal::create`].

use thiserror::Error;

/// Failures that can occur allocating or growing per-session resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to allocate grid of {rows}x{cols} cells")]
    GridAlloc { rows: u16, cols: u16 },
    #[error("session index {0} is out of range")]
    InvalidSessionIndex(usize),
    #[error("no free session slot available (capacity {0})")]
    SessionTableFull(usize),
}

/// Failures parsing or applying a gateway command. All are non-fatal: the
/// dispatcher logs and ignores them, per the gateway's "never crash, never
/// mutate on error" contract.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed hex payload")]
    InvalidHex,
    #[error("malformed base64 payload")]
    InvalidBase64,
    #[error("unknown gateway command `{0}`")]
    UnknownCommand(String),
    #[error("parameter out of range")]
    ParamOutOfRange,
}
