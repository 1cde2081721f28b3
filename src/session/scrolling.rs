//! SU/SD, insert/delete lines and characters, DECSTBM, DECSLRM/`CSI s`.

use crate::op_queue::Op;

use super::dispatch::DispatchCtx;

fn param(params: &[(u16, bool)], idx: usize, default: u16) -> u16 {
    params.get(idx).map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(default)
}

fn scroll_region(ctx: &mut DispatchCtx, dy: i32) {
    let (left, right) = ctx.session.effective_margins();
    ctx.queue.enqueue(Op::ScrollRegion {
        session: ctx.session_index,
        top: ctx.session.scroll_top,
        bottom: ctx.session.scroll_bottom,
        left,
        right,
        dy,
        bg: ctx.session.cursor.bg,
        respect_protected: false,
    });
}

pub fn su(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1) as i32;
    scroll_region(ctx, n);
}

pub fn sd(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1) as i32;
    scroll_region(ctx, -n);
}

pub fn il(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let (left, right) = ctx.session.effective_margins();
    let row = ctx.session.cursor.row;
    ctx.queue.enqueue(Op::InsertLines {
        session: ctx.session_index,
        top: row,
        bottom: ctx.session.scroll_bottom,
        left,
        right,
        count: n,
        bg: ctx.session.cursor.bg,
    });
}

pub fn dl(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let (left, right) = ctx.session.effective_margins();
    let row = ctx.session.cursor.row;
    ctx.queue.enqueue(Op::DeleteLines {
        session: ctx.session_index,
        top: row,
        bottom: ctx.session.scroll_bottom,
        left,
        right,
        count: n,
        bg: ctx.session.cursor.bg,
    });
}

/// ICH: insert `n` blank characters at the cursor, shifting the rest of
/// the line (within margins) right.
pub fn ich(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let (left, right) = ctx.session.effective_margins();
    let (row, col) = (ctx.session.cursor.row, ctx.session.cursor.col);
    ctx.session.active_grid_mut().insert_cells(row, col, n, left, right);
}

/// DCH: delete `n` characters at the cursor, shifting the rest of the
/// line (within margins) left.
pub fn dch(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let (left, right) = ctx.session.effective_margins();
    let (row, col) = (ctx.session.cursor.row, ctx.session.cursor.col);
    ctx.session.active_grid_mut().delete_cells(row, col, n, left, right);
}

/// DECSTBM: set top/bottom scrolling margins.
pub fn decstbm(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let rows = ctx.session.rows();
    let top = param(params, 0, 1).saturating_sub(1);
    let bottom = param(params, 1, rows).saturating_sub(1).min(rows.saturating_sub(1));
    if top < bottom {
        ctx.session.scroll_top = top;
        ctx.session.scroll_bottom = bottom;
    }
    ctx.session.cursor.row = if ctx.session.modes.origin { ctx.session.scroll_top } else { 0 };
    ctx.session.cursor.col = 0;
}

/// DECSLRM: set left/right margins (only meaningful under DECLRMM).
pub fn decslrm(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let cols = ctx.session.cols();
    let left = param(params, 0, 1).saturating_sub(1);
    let right = param(params, 1, cols).saturating_sub(1).min(cols.saturating_sub(1));
    if left < right {
        ctx.session.margin_left = left;
        ctx.session.margin_right = right;
    }
}

/// `CSI s`: DECSLRM when DECLRMM is on, SCO save-cursor otherwise.
pub fn csi_s(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    if ctx.session.modes.left_right_margin {
        decslrm(ctx, params);
    } else {
        let origin = ctx.session.modes.origin;
        ctx.session.cursor.save(origin);
    }
}
