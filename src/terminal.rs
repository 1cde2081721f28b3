//! `Terminal`: the process-wide façade described in spec §3 — a fixed
//! session table, the pane tree, shared palette, and the collaborator
//! bundle, generalizing the teacher's single-session `TerminalState`
//! (which owned one grid directly) to a multiplexed session table with a
//! terminal-scoped op queue and gateway queue sitting above it.

use std::time::{Duration, Instant};

use crate::callbacks::{Collaborators, ErrorLevel, ErrorSource};
use crate::color;
use crate::config::{ConformanceLevel, CreateConfig, MAX_SESSIONS};
use crate::error::ResourceError;
use crate::gateway::{self, GatewayCommand};
use crate::op_queue::OpQueue;
use crate::pane::{Orientation, Pane};
use crate::parser::VtParser;
use crate::session::{DispatchCtx, Session};

/// Minimum interval between resize-propagate walks, unless a gateway
/// command bypasses it by driving `last_resize_time` to the past.
const RESIZE_THROTTLE: Duration = Duration::from_millis(16);

pub struct Terminal {
    sessions: Vec<Option<Session>>,
    parsers: Vec<VtParser>,
    pub active_session: usize,
    pub root: Pane,
    pub focused_pane: usize,

    /// `None` routes gateway/sixel commands to `active_session`.
    pub gateway_target_session: Option<usize>,
    pub sixel_target_session: Option<usize>,

    pub palette: [(u8, u8, u8); 16],
    /// Opaque to the core; no dedicated collaborator trait exists for
    /// font changes (see `callbacks.rs`), so this is plain data the
    /// embedder reads back after `set_font`.
    pub font_name: String,
    font_dirty: bool,

    pub queue: OpQueue,
    pub gateway_queue: Vec<GatewayCommand>,
    pub collaborators: Collaborators,

    pub debug: bool,
    last_resize_time: Instant,

    default_conformance: ConformanceLevel,
    scrollback_capacity: usize,
}

impl Terminal {
    pub fn create(config: CreateConfig) -> Result<Self, ResourceError> {
        let config = config.clamped();
        let mut sessions: Vec<Option<Session>> = (0..MAX_SESSIONS).map(|_| None).collect();
        sessions[0] = Some(Session::new(config.width, config.height, config.scrollback_capacity));

        Ok(Self {
            sessions,
            parsers: (0..MAX_SESSIONS).map(|_| VtParser::new()).collect(),
            active_session: 0,
            root: Pane::leaf(0),
            focused_pane: 0,
            gateway_target_session: None,
            sixel_target_session: None,
            palette: color::DEFAULT_PALETTE,
            font_name: String::new(),
            font_dirty: false,
            queue: OpQueue::new(),
            gateway_queue: Vec::new(),
            collaborators: Collaborators::default(),
            debug: false,
            last_resize_time: Instant::now(),
            default_conformance: ConformanceLevel::default(),
            scrollback_capacity: config.scrollback_capacity,
        })
    }

    /// Tear down a session slot, removing it from the pane tree. The
    /// caller is responsible for re-layout (`layout_root`) if the pane
    /// tree shape changed.
    pub fn destroy(&mut self, session_index: usize) {
        if let Some(slot) = self.sessions.get_mut(session_index) {
            *slot = None;
        }
    }

    fn session_or_report(&mut self, index: usize) -> Option<&mut Session> {
        match self.sessions.get_mut(index) {
            Some(Some(_)) => self.sessions[index].as_mut(),
            _ => {
                self.collaborators.report_error(
                    ErrorLevel::Error,
                    ErrorSource::System,
                    &format!("session index {index} is out of range or unallocated"),
                );
                None
            }
        }
    }

    /// Resolve the session commands should currently target: the gateway
    /// override if set, otherwise `active_session`.
    pub(crate) fn routed_session(&self) -> usize {
        self.gateway_target_session.unwrap_or(self.active_session)
    }

    pub fn init_session(&mut self, index: usize) -> Result<(), ResourceError> {
        if index >= MAX_SESSIONS {
            return Err(ResourceError::InvalidSessionIndex(index));
        }
        if self.sessions[index].is_none() {
            let (cols, rows) = self
                .sessions
                .get(self.active_session)
                .and_then(|s| s.as_ref())
                .map(|s| (s.cols(), s.rows()))
                .unwrap_or((80, 24));
            let mut session = Session::new(cols, rows, self.scrollback_capacity);
            session.conformance = self.default_conformance;
            self.sessions[index] = Some(session);
        }
        Ok(())
    }

    /// `set_active_session`: no-op when already active, otherwise updates
    /// the index and marks the font atlas dirty (the spec's collaborator
    /// signal has no dedicated trait; embedders poll `font_dirty` via
    /// `take_font_dirty`).
    pub fn set_active_session(&mut self, index: usize) {
        if index == self.active_session || index >= MAX_SESSIONS {
            return;
        }
        self.active_session = index;
        self.font_dirty = true;
    }

    pub fn take_font_dirty(&mut self) -> bool {
        std::mem::take(&mut self.font_dirty)
    }

    pub fn set_font(&mut self, name: &str) {
        self.font_name = name.to_string();
        self.font_dirty = true;
    }

    /// Sets the conformance level for the active session (and the
    /// default new sessions are created with).
    pub fn set_level(&mut self, level: ConformanceLevel) {
        self.default_conformance = level;
        let active = self.active_session;
        if let Some(session) = self.session_or_report(active) {
            session.conformance = level;
        }
    }

    pub fn split_pane(&mut self, target: usize, orientation: Orientation, ratio: f32) -> Result<usize, ResourceError> {
        let new_index = self
            .sessions
            .iter()
            .position(Option::is_none)
            .ok_or(ResourceError::SessionTableFull(MAX_SESSIONS))?;
        self.init_session(new_index)?;
        if !self.root.split(target, new_index, orientation, ratio) {
            self.destroy(new_index);
            return Err(ResourceError::InvalidSessionIndex(target));
        }
        self.layout_root();
        Ok(new_index)
    }

    fn layout_root(&mut self) {
        let (cols, rows) = self
            .sessions
            .get(self.active_session)
            .and_then(|s| s.as_ref())
            .map(|s| (s.cols(), s.rows()))
            .unwrap_or((80, 24));
        self.root.layout(crate::pane::Rect { x: 0, y: 0, w: cols, h: rows });
    }

    /// Resize every leaf in the pane tree to its recomputed geometry,
    /// throttled by wall-clock time.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.resize_throttled(cols, rows, false);
    }

    /// Gateway-driven resize (`SET WIDTH`/`SET HEIGHT`/`SET SIZE`), which
    /// bypasses the wall-clock throttle.
    pub(crate) fn resize_bypass_throttle(&mut self, cols: u16, rows: u16) {
        self.resize_throttled(cols, rows, true);
    }

    fn resize_throttled(&mut self, cols: u16, rows: u16, bypass_throttle: bool) {
        let now = Instant::now();
        if !bypass_throttle && now.duration_since(self.last_resize_time) < RESIZE_THROTTLE {
            return;
        }
        self.last_resize_time = now;

        self.root.layout(crate::pane::Rect { x: 0, y: 0, w: cols, h: rows });
        let mut leaves = Vec::new();
        self.root.leaf_geometries(&mut leaves);
        for (session_index, geometry) in leaves {
            self.resize_session_internal(session_index, geometry.w, geometry.h);
        }
    }

    fn resize_session_internal(&mut self, session_index: usize, cols: u16, rows: u16) {
        if let Some(session) = self.sessions.get_mut(session_index).and_then(Option::as_mut) {
            session.primary.resize(rows, cols);
            session.alternate.resize_no_scrollback(rows, cols);
            session.scroll_bottom = rows.saturating_sub(1);
            session.margin_right = cols.saturating_sub(1);
            session.tab_stops.resize(cols as usize, false);
            session.cursor.row = session.cursor.row.min(rows.saturating_sub(1));
            session.cursor.col = session.cursor.col.min(cols.saturating_sub(1));
            self.collaborators.emit_resize(session_index, cols, rows);
        }
    }

    pub fn write_string(&mut self, session_index: usize, bytes: &[u8]) {
        if let Some(session) = self.sessions.get_mut(session_index).and_then(Option::as_mut) {
            session.pipeline.push(bytes);
        }
    }

    pub fn write_char(&mut self, byte: u8) {
        self.write_string(self.active_session, &[byte]);
    }

    pub fn process_char(&mut self, session_index: usize, byte: u8) {
        self.write_string(session_index, &[byte]);
    }

    /// Drain each session's pipeline through its parser, then flush the
    /// accumulated op queue, then execute any gateway commands that were
    /// parsed along the way, then re-route completed sixel streams per
    /// `sixel_target_session`, then check flow control.
    pub fn update(&mut self) {
        let mut drained = Vec::new();
        for session_index in 0..self.sessions.len() {
            if self.sessions[session_index].is_none() {
                continue;
            }
            drained.clear();
            {
                let session = self.sessions[session_index].as_ref().unwrap();
                session.pipeline.pop(&mut drained, 64 * 1024);
            }
            if drained.is_empty() {
                continue;
            }

            let Some(mut session) = self.sessions[session_index].take() else { continue };
            {
                let mut ctx = DispatchCtx {
                    session_index,
                    session: &mut session,
                    queue: &mut self.queue,
                    collaborators: &mut self.collaborators,
                    palette: &self.palette,
                    gateway_queue: &mut self.gateway_queue,
                };
                for &byte in &drained {
                    self.parsers[session_index].advance(&mut ctx, byte);
                }
            }

            if session.modes.xon_xoff {
                if let Some(byte) = session.flow.check(session.pipeline.usage()) {
                    session.queue_response(&[byte]);
                }
            }

            let response = session.take_response();
            if !response.is_empty() {
                self.collaborators.emit_response(session_index, &response);
            }

            self.sessions[session_index] = Some(session);
        }

        self.flush_ops();
        self.run_gateway_commands();
        self.reroute_sixel_streams();
    }

    fn flush_ops(&mut self) {
        let sessions = &mut self.sessions;
        self.queue.flush(move |index| {
            sessions
                .get_mut(index)
                .and_then(Option::as_mut)
                .map(Session::active_grid_mut)
        });
    }

    fn run_gateway_commands(&mut self) {
        let pending = std::mem::take(&mut self.gateway_queue);
        for cmd in pending {
            gateway::dispatch::execute(self, cmd);
        }
    }

    fn reroute_sixel_streams(&mut self) {
        let Some(target) = self.sixel_target_session else { return };
        for index in 0..self.sessions.len() {
            if index == target {
                continue;
            }
            let became_active = self
                .sessions
                .get(index)
                .and_then(|s| s.as_ref())
                .map(|s| s.sixel.active)
                .unwrap_or(false);
            if !became_active {
                continue;
            }
            let moved = self.sessions[index]
                .as_mut()
                .map(|s| std::mem::take(&mut s.sixel));
            if let Some(state) = moved {
                if let Some(dest) = self.sessions.get_mut(target).and_then(Option::as_mut) {
                    dest.sixel = state;
                }
            }
        }
    }

    pub fn session(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index).and_then(|s| s.as_ref())
    }

    pub fn session_mut(&mut self, index: usize) -> Option<&mut Session> {
        self.sessions.get_mut(index).and_then(Option::as_mut)
    }

    pub fn report_error(&mut self, level: ErrorLevel, source: ErrorSource, message: &str) {
        self.collaborators.report_error(level, source, message);
    }
}
