//! Per-session state: two grids, cursor, modes, margins, tab stops, parse
//! sub-states, and the input pipeline. Generalizes the teacher's
//! `TerminalState`, which bundled the equivalent fields directly onto the
//! `vte::Perform` sink; here the data (`Session`) and the dispatch logic
//! (`dispatch::DispatchCtx`, a short-lived wrapper borrowing a `Session`
//! plus the terminal-scoped op queue/collaborators for one `update()`
//! call) are kept separate, since ops are terminal-scoped rather than
//! session-owned.

mod cursor_ops;
mod dcs;
mod dispatch;
mod erase;
mod mc;
mod modes_ops;
mod osc;
mod rect_ops;
mod reporting;
mod scrolling;
mod sgr;

pub use dispatch::DispatchCtx;

use crate::cell::{Cell, CellFlags, UnderlineStyle};
use crate::color::Color;
use crate::config::{ConformanceLevel, MAX_DIMENSION, MIN_DIMENSION};
use crate::cursor::CursorState;
use crate::grid::Grid;
use crate::modes::TerminalModes;
use crate::pipeline::{FlowControl, PipelineRing, MIN_PIPELINE_CAPACITY};

/// Graphics sub-protocol state, generalized from the teacher's
/// `sixel_active`/`sixel_buffer` pair.
#[derive(Default)]
pub struct SixelState {
    pub active: bool,
    pub strips: Vec<Vec<u8>>,
    pub current_row: Vec<u8>,
}

#[derive(Default)]
pub struct RegisState {
    pub macro_buf: Vec<u8>,
    pub recording_macro: bool,
    pub pen_x: i32,
    pub pen_y: i32,
}

pub const REGIS_MACRO_SPACE: usize = 4096;
pub const REGIS_COORD_SATURATE: i64 = 100_000_000;
pub const REGIS_MAX_X: i32 = 799;

#[derive(Default)]
pub struct KittyState {
    pub pending_id: Option<u64>,
    pub buffer: Vec<u8>,
}

/// DCS final-letter sub-parser selection, tracked across `hook`/`put`/
/// `unhook`. Rectangular-area ops (`$t`/`$u`/`*y`) turned out to be CSI-
/// dispatched on real hardware and in this spec's own worked scenario, not
/// DCS (see `session::rect_ops`), so they never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DcsMode {
    #[default]
    None,
    Sixel,
    Regis,
    Decrqss,
    Gateway,
}

#[derive(Default)]
pub struct DcsState {
    pub mode: DcsMode,
    pub buffer: Vec<u8>,
}

pub const MAX_COMMAND_BUFFER: usize = 65536;

/// Printer controller mode status (`CSI 5 i` / `CSI 4 i`, `CSI ? 9 i`).
#[derive(Default)]
pub struct PrinterState {
    pub controller_active: bool,
    pub auto_print: bool,
}

/// One terminal session: a pair of screen buffers (primary/alternate),
/// cursor and pen state, scrolling/margin state, tab stops, the input
/// pipeline, and graphics/protocol sub-states.
pub struct Session {
    pub primary: Grid,
    pub alternate: Grid,
    pub using_alternate: bool,

    pub cursor: CursorState,
    pub modes: TerminalModes,
    pub conformance: ConformanceLevel,

    pub scroll_top: u16,
    pub scroll_bottom: u16,
    pub margin_left: u16,
    pub margin_right: u16,

    pub tab_stops: Vec<bool>,

    pub pipeline: PipelineRing,
    pub flow: FlowControl,
    pub response: Vec<u8>,

    pub dcs: DcsState,
    pub sixel: SixelState,
    pub regis: RegisState,
    pub kitty: KittyState,

    pub programmable_keys: std::collections::HashMap<u16, Vec<u8>>,
    pub printer: PrinterState,
    pub protected_pen: bool,
    pub locator_event_mask: u8,
    pub debug: bool,
    pub printer_available: bool,

    /// Window title set via OSC 0/2, reported back through `GatewayHandler`
    /// style side channels rather than carried by a dedicated collaborator
    /// trait (the spec doesn't otherwise surface one).
    pub title: String,
}

impl Session {
    pub fn new(cols: u16, rows: u16, scrollback_capacity: usize) -> Self {
        let cols = cols.clamp(MIN_DIMENSION, MAX_DIMENSION);
        let rows = rows.clamp(MIN_DIMENSION, MAX_DIMENSION);
        let mut tab_stops = vec![false; cols as usize];
        let mut i = 0usize;
        while i < tab_stops.len() {
            tab_stops[i] = true;
            i += 8;
        }
        Self {
            primary: Grid::new(rows, cols, scrollback_capacity),
            alternate: Grid::new(rows, cols, 0),
            using_alternate: false,
            cursor: CursorState::new(),
            modes: TerminalModes::new(),
            conformance: ConformanceLevel::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            margin_left: 0,
            margin_right: cols.saturating_sub(1),
            tab_stops,
            pipeline: PipelineRing::new(MIN_PIPELINE_CAPACITY),
            flow: FlowControl::new(),
            response: Vec::new(),
            dcs: DcsState::default(),
            sixel: SixelState::default(),
            regis: RegisState::default(),
            kitty: KittyState::default(),
            programmable_keys: std::collections::HashMap::new(),
            printer: PrinterState::default(),
            protected_pen: false,
            locator_event_mask: 0,
            debug: false,
            printer_available: false,
            title: String::new(),
        }
    }

    pub fn active_grid(&self) -> &Grid {
        if self.using_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    pub fn active_grid_mut(&mut self) -> &mut Grid {
        if self.using_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn cols(&self) -> u16 {
        self.active_grid().cols
    }

    pub fn rows(&self) -> u16 {
        self.active_grid().rows_visible
    }

    /// Effective left/right margins: full row unless DECLRMM is on.
    pub fn effective_margins(&self) -> (u16, u16) {
        if self.modes.left_right_margin {
            (self.margin_left, self.margin_right)
        } else {
            (0, self.cols().saturating_sub(1))
        }
    }

    pub fn queue_response(&mut self, bytes: &[u8]) {
        self.response.extend_from_slice(bytes);
    }

    pub fn take_response(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.response)
    }

    /// DECSTR: reset modes/SGR/margins, preserve buffer contents.
    pub fn soft_reset(&mut self) {
        self.modes.soft_reset();
        self.cursor.fg = Color::Default;
        self.cursor.bg = Color::Default;
        self.cursor.attrs = CellFlags::empty();
        self.cursor.underline = UnderlineStyle::None;
        self.cursor.wrap_pending = false;
        self.scroll_top = 0;
        self.scroll_bottom = self.rows().saturating_sub(1);
        self.margin_left = 0;
        self.margin_right = self.cols().saturating_sub(1);
        self.protected_pen = false;
        self.printer.controller_active = false;
    }

    /// RIS: clear both grids, scrollback, saved cursor, programmable keys.
    pub fn hard_reset(&mut self) {
        let cols = self.cols();
        let rows = self.rows();
        let scrollback = self.primary.scrollback_capacity;
        *self = Session::new(cols, rows, scrollback);
    }

    pub fn write_cell_advance(&mut self, c: char) {
        let cols = self.cols();
        if self.cursor.wrap_pending && self.modes.autowrap {
            self.linefeed_cursor_only();
            self.cursor.col = 0;
            self.cursor.wrap_pending = false;
            let row = self.cursor.row;
            self.active_grid_mut().visible_row_mut(row).dirty = true;
        }

        let mut flags = self.cursor.attrs;
        if self.protected_pen {
            flags.insert(CellFlags::PROTECTED);
        }
        let cell = Cell {
            c,
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            flags,
            underline: self.cursor.underline,
            combining: None,
        };
        let (row, col) = (self.cursor.row, self.cursor.col);
        self.active_grid_mut().set_cell(row, col, cell);

        if self.cursor.col + 1 >= cols {
            self.cursor.wrap_pending = true;
        } else {
            self.cursor.col += 1;
        }
    }

    fn linefeed_cursor_only(&mut self) {
        if self.cursor.row >= self.scroll_bottom {
            let (left, right) = self.effective_margins();
            self.active_grid_mut()
                .scroll_up_region(self.scroll_top, self.scroll_bottom, left, right, Color::Default);
        } else {
            self.cursor.row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_clamps_dimensions() {
        let session = Session::new(5000, 0, 10);
        assert_eq!(session.cols(), MAX_DIMENSION);
        assert_eq!(session.rows(), MIN_DIMENSION);
    }

    #[test]
    fn write_char_advances_cursor() {
        let mut session = Session::new(10, 5, 0);
        session.write_cell_advance('A');
        assert_eq!(session.cursor.col, 1);
        assert_eq!(session.active_grid().visible_row(0).cells[0].c, 'A');
    }

    #[test]
    fn wrap_pending_defers_to_next_print() {
        let mut session = Session::new(3, 2, 0);
        session.write_cell_advance('a');
        session.write_cell_advance('b');
        session.write_cell_advance('c');
        assert!(session.cursor.wrap_pending);
        assert_eq!(session.cursor.col, 2);
        session.write_cell_advance('d');
        assert_eq!(session.cursor.row, 1);
        assert_eq!(session.cursor.col, 1);
        assert_eq!(session.active_grid().visible_row(1).cells[0].c, 'd');
    }

    #[test]
    fn hard_reset_restores_fresh_state() {
        let mut session = Session::new(10, 5, 0);
        session.write_cell_advance('A');
        session.cursor.row = 3;
        session.hard_reset();
        assert_eq!(session.cursor.row, 0);
        assert_eq!(session.active_grid().visible_row(0).cells[0].c, ' ');
    }
}
