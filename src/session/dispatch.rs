//! `DispatchCtx`: a short-lived borrow of one session plus the terminal-
//! scoped resources dispatch needs (op queue, collaborators, palette,
//! gateway queue), constructed fresh by `Terminal::update` for each byte
//! processed and implementing `vte::Perform` + `parser::ApcSink`.
//!
//! The teacher's `TerminalState` implements `vte::Perform` directly on
//! the type that also owns the grid, cursor, and modes. Here that sink
//! role is played by `DispatchCtx` instead of `Session`, since several
//! operations this spec adds (rectangular copy between sessions, gateway
//! commands, sixel re-routing) need to reach state that lives above any
//! single session.

use unicode_width::UnicodeWidthChar;
use vte::Perform;

use crate::cell::{Cell, CellFlags};
use crate::callbacks::Collaborators;
use crate::gateway::GatewayCommand;
use crate::op_queue::OpQueue;
use crate::parser::{extract_params, ApcSink};

use super::{cursor_ops, dcs, erase, mc, modes_ops, osc, rect_ops, reporting, scrolling, sgr, Session};

/// Borrowed view into one session plus the terminal-wide resources
/// dispatch may need to touch. Lives only for the duration of one
/// `update()` pass over a session's pending input.
pub struct DispatchCtx<'a> {
    pub session_index: usize,
    pub session: &'a mut Session,
    pub queue: &'a mut OpQueue,
    pub collaborators: &'a mut Collaborators,
    pub palette: &'a [(u8, u8, u8); 16],
    pub gateway_queue: &'a mut Vec<GatewayCommand>,
}

impl Perform for DispatchCtx<'_> {
    fn print(&mut self, c: char) {
        if UnicodeWidthChar::width(c) == Some(0) && !self.session.cursor.wrap_pending {
            self.merge_combining(c);
            return;
        }

        let width = (UnicodeWidthChar::width(c).unwrap_or(1) as u16).max(1);
        let cols = self.session.cols();

        if self.session.cursor.wrap_pending && self.session.modes.autowrap {
            self.linefeed();
            self.session.cursor.col = 0;
            self.session.cursor.wrap_pending = false;
        }

        if self.session.modes.insert {
            let (row, col) = (self.session.cursor.row, self.session.cursor.col);
            let (left, right) = self.session.effective_margins();
            self.session.active_grid_mut().insert_cells(row, col, width, left, right);
        }

        let flags = if width == 2 { CellFlags::WIDE_CHAR } else { CellFlags::empty() };
        let mut flags = self.session.cursor.attrs | flags;
        if self.session.protected_pen {
            flags.insert(CellFlags::PROTECTED);
        }
        let cell = Cell {
            c,
            fg: self.session.cursor.fg,
            bg: self.session.cursor.bg,
            flags,
            underline: self.session.cursor.underline,
            combining: None,
        };
        let (row, col) = (self.session.cursor.row, self.session.cursor.col);
        self.session.active_grid_mut().set_cell(row, col, cell);
        if width == 2 && col + 1 < cols {
            self.session.active_grid_mut().set_cell(row, col + 1, Cell::wide_spacer());
        }

        if col + width >= cols {
            self.session.cursor.col = cols.saturating_sub(1);
            self.session.cursor.wrap_pending = true;
        } else {
            self.session.cursor.col = col + width;
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => {
                // BEL: the embedder decides what to do with it; nothing to
                // mutate in the core beyond making it observable via the
                // response sink isn't appropriate (not host-bound), so this
                // is a deliberate no-op at the core layer.
            }
            0x08 => {
                if self.session.cursor.col > 0 {
                    self.session.cursor.col -= 1;
                }
                self.session.cursor.wrap_pending = false;
            }
            0x09 => cursor_ops::tab_forward(self),
            0x0a | 0x0b | 0x0c => {
                self.linefeed();
                if self.session.modes.linefeed_newline {
                    self.session.cursor.col = 0;
                }
            }
            0x0d => {
                self.session.cursor.col = 0;
                self.session.cursor.wrap_pending = false;
            }
            0x11 | 0x13 => {
                // XON/XOFF from the host are handled at the pipeline layer,
                // not re-dispatched here.
            }
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        let raw = extract_params(params);
        let private = intermediates.contains(&b'?');

        match (intermediates, action) {
            ([], 'A') => cursor_ops::cuu(self, &raw),
            ([], 'B') => cursor_ops::cud(self, &raw),
            ([], 'C') => cursor_ops::cuf(self, &raw),
            ([], 'D') => cursor_ops::cub(self, &raw),
            ([], 'E') => cursor_ops::cnl(self, &raw),
            ([], 'F') => cursor_ops::cpl(self, &raw),
            ([], 'G') | ([], '`') => cursor_ops::hpa(self, &raw),
            ([], 'H') | ([], 'f') => cursor_ops::cup(self, &raw),
            ([], 'I') => {
                let n = raw.first().map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(1);
                for _ in 0..n {
                    cursor_ops::tab_forward(self);
                }
            }
            ([], 'J') => erase::ed(self, &raw, false),
            ([b'?'], 'J') => erase::ed(self, &raw, true),
            ([], 'K') => erase::el(self, &raw, false),
            ([b'?'], 'K') => erase::el(self, &raw, true),
            ([], 'L') => scrolling::il(self, &raw),
            ([], 'M') => scrolling::dl(self, &raw),
            ([], 'P') => scrolling::dch(self, &raw),
            ([], 'S') => scrolling::su(self, &raw),
            ([], 'T') => scrolling::sd(self, &raw),
            ([], 'X') => erase_chars(self, &raw),
            ([], 'Z') => cursor_ops::tab_backward(self, &raw),
            ([], '@') => scrolling::ich(self, &raw),
            ([], 'a') => cursor_ops::hpr(self, &raw),
            ([], 'd') => cursor_ops::vpa(self, &raw),
            ([], 'e') => cursor_ops::vpr(self, &raw),
            ([], 'g') => cursor_ops::tab_clear(self, &raw),
            ([], 'c') if !private => reporting::da1(self),
            ([b'>'], 'c') => reporting::da2(self),
            ([b'='], 'c') => reporting::da3(self),
            ([], 'n') => reporting::dsr(self, &raw),
            ([], 'h') => modes_ops::set_ansi(self, &raw, true),
            ([], 'l') => modes_ops::set_ansi(self, &raw, false),
            ([b'?'], 'h') => modes_ops::set_private(self, &raw, true),
            ([b'?'], 'l') => modes_ops::set_private(self, &raw, false),
            ([], 'm') => sgr::dispatch(self, &raw),
            ([], 'r') => scrolling::decstbm(self, &raw),
            ([], 's') => scrolling::csi_s(self, &raw),
            ([], 'u') => {
                if let Some(origin) = self.session.cursor.restore() {
                    self.session.modes.origin = origin;
                }
            }
            ([], 'i') => mc::mc(self, &raw),
            ([b'?'], 'i') => mc::mc_private(self, &raw),
            ([b' '], 'q') => cursor_style(self, &raw),
            ([b'"'], 'q') => decsca(self, &raw),
            ([b'!'], 'p') => self.session.soft_reset(),
            ([b'$'], 't') => rect_ops::deccara(self, &raw),
            ([b'$'], 'u') => rect_ops::decrara(self, &raw),
            ([b'$'], 'v') => rect_ops::deccra(self, &raw),
            ([b'$'], 'x') => rect_ops::decfra(self, &raw),
            ([b'$'], 'z') => rect_ops::decera(self, &raw),
            ([b'$'], '{') => rect_ops::decsera(self, &raw),
            ([b'*'], 'y') => rect_ops::decrqcra(self, &raw),
            ([b'$'], '~') => reporting::decrqpku(self, &raw),
            ([b'$'], '|') => reporting::decrs(self),
            ([b'&'], 'w') => reporting::decrqtsr(self),
            ([b'&'], 'u') => reporting::decrqupss(self),
            ([b'$'], '}') => reporting::decrqde(self),
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        match (intermediates, byte) {
            ([], b'c') => self.session.hard_reset(),
            ([], b'D') => self.linefeed(),
            ([], b'E') => {
                self.session.cursor.col = 0;
                self.linefeed();
            }
            ([], b'H') => {
                let col = self.session.cursor.col as usize;
                if let Some(stop) = self.session.tab_stops.get_mut(col) {
                    *stop = true;
                }
            }
            ([], b'M') => self.reverse_index(),
            ([], b'7') => {
                let origin = self.session.modes.origin;
                self.session.cursor.save(origin);
            }
            ([], b'8') => {
                if let Some(origin) = self.session.cursor.restore() {
                    self.session.modes.origin = origin;
                }
            }
            ([], b'=') => self.session.modes.cursor_keys_application = true,
            ([], b'>') => self.session.modes.cursor_keys_application = false,
            _ => {}
        }
    }

    fn hook(&mut self, _params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        dcs::hook(self, intermediates, action);
    }

    fn put(&mut self, byte: u8) {
        dcs::put(self, byte);
    }

    fn unhook(&mut self) {
        dcs::unhook(self);
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        osc::dispatch(self, params);
    }
}

impl ApcSink for DispatchCtx<'_> {
    fn on_apc(&mut self, payload: &[u8]) {
        if !payload.starts_with(b"G") {
            return;
        }
        let screen_head_marker = self.session.active_grid().rows_visible as usize;
        if let Some(cmd) = crate::graphics::kitty::feed(&mut self.session.kitty, payload, screen_head_marker) {
            // Placement bookkeeping (actual pixel compositing) belongs to
            // the embedder's renderer; the core's job ends at handing over
            // a fully decoded, bounds-checked command.
            self.collaborators.emit_gateway(
                "KITTY",
                &cmd.image_id.map(|i| i.to_string()).unwrap_or_default(),
                &cmd.action.to_string(),
                &format!("bytes={}", cmd.data.len()),
            );
        }
    }
}

impl DispatchCtx<'_> {
    /// Fold a zero-width combining mark onto the previous printable cell
    /// instead of giving it a column of its own. Stepping back over a wide
    /// char's spacer lands on the wide char itself; at column 0 there's
    /// nothing to combine with, so the mark is dropped.
    fn merge_combining(&mut self, c: char) {
        let row = self.session.cursor.row;
        let col = self.session.cursor.col;
        if col == 0 {
            return;
        }
        let target = {
            let grid_row = self.session.active_grid().visible_row(row);
            let prev = col - 1;
            if grid_row.cells.get(prev as usize).map(|cell| cell.flags.contains(CellFlags::WIDE_SPACER)).unwrap_or(false) && prev > 0 {
                prev - 1
            } else {
                prev
            }
        };
        let grid_row = self.session.active_grid_mut().visible_row_mut(row);
        if let Some(cell) = grid_row.cells.get_mut(target as usize) {
            match &mut cell.combining {
                Some(marks) => {
                    let mut v = marks.to_vec();
                    v.push(c);
                    *marks = v.into_boxed_slice();
                }
                None => cell.combining = Some(Box::from([c])),
            }
            grid_row.dirty = true;
        }
    }

    fn linefeed(&mut self) {
        if self.session.cursor.row >= self.session.scroll_bottom {
            let (left, right) = self.session.effective_margins();
            self.queue.enqueue(crate::op_queue::Op::ScrollRegion {
                session: self.session_index,
                top: self.session.scroll_top,
                bottom: self.session.scroll_bottom,
                left,
                right,
                dy: 1,
                bg: self.session.cursor.bg,
                respect_protected: false,
            });
        } else {
            self.session.cursor.row += 1;
        }
        self.session.cursor.wrap_pending = false;
    }

    fn reverse_index(&mut self) {
        if self.session.cursor.row <= self.session.scroll_top {
            let (left, right) = self.session.effective_margins();
            self.queue.enqueue(crate::op_queue::Op::ScrollRegion {
                session: self.session_index,
                top: self.session.scroll_top,
                bottom: self.session.scroll_bottom,
                left,
                right,
                dy: -1,
                bg: self.session.cursor.bg,
                respect_protected: false,
            });
        } else {
            self.session.cursor.row -= 1;
        }
    }
}

fn erase_chars(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = params.first().map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(1);
    let row = ctx.session.cursor.row;
    let col = ctx.session.cursor.col;
    let end = (col + n).min(ctx.session.cols());
    ctx.queue.enqueue(crate::op_queue::Op::EraseRect {
        session: ctx.session_index,
        top: row,
        left: col,
        bottom: row,
        right: end.saturating_sub(1),
        bg: ctx.session.cursor.bg,
        respect_protected: false,
    });
}

fn cursor_style(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    use crate::cursor::CursorShape;
    let ps = params.first().map(|(v, _)| *v).unwrap_or(1);
    ctx.session.cursor.shape = match ps {
        0 | 1 | 2 => CursorShape::Block,
        3 | 4 => CursorShape::Underline,
        5 | 6 => CursorShape::Bar,
        _ => ctx.session.cursor.shape,
    };
}

/// DECSCA (`CSI Ps " q`): select character protection attribute. Ps=1
/// marks subsequently written cells protected; Ps=0/2 clears it.
fn decsca(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let ps = params.first().map(|(v, _)| *v).unwrap_or(0);
    ctx.session.protected_pen = ps == 1;
    if ctx.session.protected_pen {
        ctx.session.cursor.attrs.insert(CellFlags::PROTECTED);
    } else {
        ctx.session.cursor.attrs.remove(CellFlags::PROTECTED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::parser::VtParser;

    fn fixture() -> (Session, OpQueue, Collaborators, [(u8, u8, u8); 16], Vec<GatewayCommand>) {
        (
            Session::new(10, 5, 100),
            OpQueue::new(),
            Collaborators::default(),
            crate::color::DEFAULT_PALETTE,
            Vec::new(),
        )
    }

    #[test]
    fn cursor_position_report_round_trip() {
        let (mut session, mut queue, mut collab, palette, mut gateway_queue) = fixture();
        let mut parser = VtParser::new();
        {
            let mut ctx = DispatchCtx {
                session_index: 0,
                session: &mut session,
                queue: &mut queue,
                collaborators: &mut collab,
                palette: &palette,
                gateway_queue: &mut gateway_queue,
            };
            for &b in b"\x1b[6n" {
                parser.advance(&mut ctx, b);
            }
        }
        assert_eq!(session.take_response(), b"\x1b[1;1R");
    }

    #[test]
    fn deccara_scenario_via_full_dispatch() {
        let (mut session, mut queue, mut collab, palette, mut gateway_queue) = fixture();
        let mut parser = VtParser::new();
        {
            let mut ctx = DispatchCtx {
                session_index: 0,
                session: &mut session,
                queue: &mut queue,
                collaborators: &mut collab,
                palette: &palette,
                gateway_queue: &mut gateway_queue,
            };
            for &b in b"ABCDE\x1b[1;1;1;5;1$t" {
                parser.advance(&mut ctx, b);
            }
        }
        queue.flush(|s| if s == 0 { Some(session.active_grid_mut()) } else { None });
        assert!(session.active_grid().visible_row(0).cells[2]
            .flags
            .contains(CellFlags::BOLD));
    }

    #[test]
    fn csi_buffer_overflow_returns_to_ground_with_no_dispatch() {
        let (mut session, mut queue, mut collab, palette, mut gateway_queue) = fixture();
        let mut parser = VtParser::new();
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut gateway_queue,
        };
        parser.advance(&mut ctx, 0x1b);
        parser.advance(&mut ctx, b'[');
        // An unbounded digit run, never terminated, well past
        // MAX_COMMAND_BUFFER: must hard-reset to ground rather than let the
        // accumulation grow forever or eventually dispatch on a final byte.
        for _ in 0..(crate::parser::MAX_COMMAND_BUFFER + 16) {
            parser.advance(&mut ctx, b'9');
        }
        // Cursor position unaffected by the discarded sequence, and a fresh
        // CUP dispatched afterward proves ground was actually restored.
        assert_eq!(ctx.session.cursor.row, 0);
        for &b in b"\x1b[5;5H" {
            parser.advance(&mut ctx, b);
        }
        assert_eq!(ctx.session.cursor.row, 4);
        assert_eq!(ctx.session.cursor.col, 4);
    }

    #[test]
    fn combining_mark_folds_onto_previous_cell() {
        let (mut session, mut queue, mut collab, palette, mut gateway_queue) = fixture();
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut gateway_queue,
        };
        ctx.print('e');
        ctx.print('\u{0301}'); // combining acute accent
        assert_eq!(ctx.session.cursor.col, 1);
        let cell = &ctx.session.active_grid().visible_row(0).cells[0];
        assert_eq!(cell.c, 'e');
        assert_eq!(cell.combining.as_deref(), Some(&['\u{0301}'][..]));
    }

    #[test]
    fn combining_mark_at_column_zero_is_dropped_without_panic() {
        let (mut session, mut queue, mut collab, palette, mut gateway_queue) = fixture();
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut gateway_queue,
        };
        ctx.print('\u{0301}');
        assert_eq!(ctx.session.cursor.col, 0);
    }
}
