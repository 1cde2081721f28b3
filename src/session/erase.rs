//! EL/ED erase dispatch, including the DEC-private-marker selective
//! variants (DECSEL/DECSED) that respect the protected attribute.

use crate::op_queue::Op;

use super::dispatch::DispatchCtx;

fn param(params: &[(u16, bool)], idx: usize) -> u16 {
    params.get(idx).map(|(v, _)| *v).unwrap_or(0)
}

/// EL (`CSI Ps K`) / DECSEL (`CSI ? Ps K`).
pub fn el(ctx: &mut DispatchCtx, params: &[(u16, bool)], selective: bool) {
    let row = ctx.session.cursor.row;
    let col = ctx.session.cursor.col;
    let cols = ctx.session.cols();
    let (start, end) = match param(params, 0) {
        0 => (col, cols),
        1 => (0, col + 1),
        2 => (0, cols),
        _ => return,
    };
    ctx.queue.enqueue(Op::EraseRect {
        session: ctx.session_index,
        top: row,
        left: start,
        bottom: row,
        right: end.saturating_sub(1),
        bg: ctx.session.cursor.bg,
        respect_protected: selective,
    });
}

/// ED (`CSI Ps J`) / DECSED (`CSI ? Ps J`).
pub fn ed(ctx: &mut DispatchCtx, params: &[(u16, bool)], selective: bool) {
    let row = ctx.session.cursor.row;
    let col = ctx.session.cursor.col;
    let rows = ctx.session.rows();
    let cols = ctx.session.cols();
    let bg = ctx.session.cursor.bg;

    match param(params, 0) {
        0 => {
            ctx.queue.enqueue(Op::EraseRect {
                session: ctx.session_index,
                top: row,
                left: col,
                bottom: row,
                right: cols.saturating_sub(1),
                bg,
                respect_protected: selective,
            });
            if row + 1 < rows {
                ctx.queue.enqueue(Op::EraseRect {
                    session: ctx.session_index,
                    top: row + 1,
                    left: 0,
                    bottom: rows.saturating_sub(1),
                    right: cols.saturating_sub(1),
                    bg,
                    respect_protected: selective,
                });
            }
        }
        1 => {
            if row > 0 {
                ctx.queue.enqueue(Op::EraseRect {
                    session: ctx.session_index,
                    top: 0,
                    left: 0,
                    bottom: row - 1,
                    right: cols.saturating_sub(1),
                    bg,
                    respect_protected: selective,
                });
            }
            ctx.queue.enqueue(Op::EraseRect {
                session: ctx.session_index,
                top: row,
                left: 0,
                bottom: row,
                right: col,
                bg,
                respect_protected: selective,
            });
        }
        2 => {
            ctx.queue.enqueue(Op::EraseRect {
                session: ctx.session_index,
                top: 0,
                left: 0,
                bottom: rows.saturating_sub(1),
                right: cols.saturating_sub(1),
                bg,
                respect_protected: selective,
            });
            if ctx.session.conformance == crate::config::ConformanceLevel::AnsiSys {
                ctx.session.cursor.row = 0;
                ctx.session.cursor.col = 0;
            }
        }
        3 => {
            ctx.queue.enqueue(Op::EraseRect {
                session: ctx.session_index,
                top: 0,
                left: 0,
                bottom: rows.saturating_sub(1),
                right: cols.saturating_sub(1),
                bg,
                respect_protected: selective,
            });
            ctx.queue.enqueue(Op::ClearScrollback {
                session: ctx.session_index,
            });
        }
        _ => {}
    }
}
