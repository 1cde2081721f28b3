//! Collaborator traits.
//!
//! The core never touches pixels, processes, or scancodes directly; it talks
//! to its embedder through these small trait objects instead, matching the
//! "Opaque collaborator types" design note: a single owner (`Terminal`) holds
//! `Box<dyn Trait>` fields and calls them at well-defined points. Tests
//! substitute in-memory fakes (see `tests::RecordingCollaborators` below).

/// Severity for [`ErrorReporter::report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

/// Subsystem that produced an error, for embedder-side filtering/log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Parser,
    Gateway,
    System,
}

/// Receives bytes the core wants written back to the host (DSR/DA replies,
/// DECRQSS answers, XON/XOFF, gateway acknowledgements).
pub trait ResponseSink {
    fn on_response(&mut self, session_index: usize, bytes: &[u8]);
}

/// Receives printer-controller output (MC / `CSI 5 i`).
pub trait PrinterSink {
    fn on_print(&mut self, session_index: usize, bytes: &[u8]);
}

/// Notified after a resize has committed for a session.
pub trait ResizeHandler {
    fn on_resize(&mut self, session_index: usize, cols: u16, rows: u16);
}

/// Notified for gateway classes/commands the core doesn't own (anything
/// other than the built-in `KTERM` class), so embedders can extend the
/// protocol without forking the dispatcher.
pub trait GatewayHandler {
    fn on_gateway(&mut self, class: &str, id: &str, command: &str, params: &str);
}

/// Structured error/warning/info reporting. Never causes a panic or an
/// `Err` to propagate to the public API; this is the sink for the taxonomy
/// in `error.rs`.
pub trait ErrorReporter {
    fn report(&mut self, level: ErrorLevel, source: ErrorSource, message: &str);
}

/// Default reporter: forwards everything to `tracing`. Used when an
/// embedder doesn't install its own.
#[derive(Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&mut self, level: ErrorLevel, source: ErrorSource, message: &str) {
        match level {
            ErrorLevel::Info => tracing::info!(source = ?source, "{}", message),
            ErrorLevel::Warning => tracing::warn!(source = ?source, "{}", message),
            ErrorLevel::Error => tracing::error!(source = ?source, "{}", message),
        }
    }
}

/// Bundle of collaborator trait objects a `Terminal` owns. Any field left as
/// `None` is a no-op collaborator (the core never requires one to be
/// present).
#[derive(Default)]
pub struct Collaborators {
    pub response: Option<Box<dyn ResponseSink>>,
    pub printer: Option<Box<dyn PrinterSink>>,
    pub resize: Option<Box<dyn ResizeHandler>>,
    pub gateway: Option<Box<dyn GatewayHandler>>,
    pub error: Option<Box<dyn ErrorReporter>>,
}

impl Collaborators {
    pub fn emit_response(&mut self, session_index: usize, bytes: &[u8]) {
        if let Some(sink) = self.response.as_mut() {
            sink.on_response(session_index, bytes);
        }
    }

    pub fn emit_print(&mut self, session_index: usize, bytes: &[u8]) {
        if let Some(sink) = self.printer.as_mut() {
            sink.on_print(session_index, bytes);
        }
    }

    pub fn emit_resize(&mut self, session_index: usize, cols: u16, rows: u16) {
        if let Some(sink) = self.resize.as_mut() {
            sink.on_resize(session_index, cols, rows);
        }
    }

    pub fn emit_gateway(&mut self, class: &str, id: &str, command: &str, params: &str) {
        if let Some(sink) = self.gateway.as_mut() {
            sink.on_gateway(class, id, command, params);
        }
    }

    pub fn report_error(&mut self, level: ErrorLevel, source: ErrorSource, message: &str) {
        if let Some(sink) = self.error.as_mut() {
            sink.report(level, source, message);
        } else {
            TracingErrorReporter.report(level, source, message);
        }
    }
}
