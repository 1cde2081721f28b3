//! Cursor motion: CUU/CUD/CUF/CUB, CUP/HVP, CNL/CPL, HPA/VPA/HPR/VPR, tabs.

use super::dispatch::DispatchCtx;

fn param(params: &[(u16, bool)], idx: usize, default: u16) -> u16 {
    params.get(idx).map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(default)
}

/// Clamp the cursor into the scrolling region when origin mode is set,
/// otherwise into the full grid.
fn clamp_cursor(ctx: &mut DispatchCtx) {
    let cols = ctx.session.cols();
    let rows = ctx.session.rows();
    if ctx.session.modes.origin {
        let (left, right) = ctx.session.effective_margins();
        let top = ctx.session.scroll_top;
        let bottom = ctx.session.scroll_bottom;
        ctx.session.cursor.row = ctx.session.cursor.row.clamp(top, bottom);
        ctx.session.cursor.col = ctx.session.cursor.col.clamp(left, right);
    } else {
        ctx.session.cursor.row = ctx.session.cursor.row.min(rows.saturating_sub(1));
        ctx.session.cursor.col = ctx.session.cursor.col.min(cols.saturating_sub(1));
    }
    ctx.session.cursor.wrap_pending = false;
}

pub fn cuu(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let top = if ctx.session.modes.origin { ctx.session.scroll_top } else { 0 };
    ctx.session.cursor.row = ctx.session.cursor.row.saturating_sub(n).max(top);
    ctx.session.cursor.wrap_pending = false;
}

pub fn cud(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let bottom = if ctx.session.modes.origin {
        ctx.session.scroll_bottom
    } else {
        ctx.session.rows().saturating_sub(1)
    };
    ctx.session.cursor.row = (ctx.session.cursor.row + n).min(bottom);
    ctx.session.cursor.wrap_pending = false;
}

pub fn cuf(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let right = if ctx.session.modes.origin {
        ctx.session.effective_margins().1
    } else {
        ctx.session.cols().saturating_sub(1)
    };
    ctx.session.cursor.col = (ctx.session.cursor.col + n).min(right);
    ctx.session.cursor.wrap_pending = false;
}

pub fn cub(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    let left = if ctx.session.modes.origin {
        ctx.session.effective_margins().0
    } else {
        0
    };
    ctx.session.cursor.col = ctx.session.cursor.col.saturating_sub(n).max(left);
    ctx.session.cursor.wrap_pending = false;
}

pub fn cnl(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    cud(ctx, params);
    ctx.session.cursor.col = 0;
}

pub fn cpl(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    cuu(ctx, params);
    ctx.session.cursor.col = 0;
}

pub fn cup(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let row = param(params, 0, 1).saturating_sub(1);
    let col = param(params, 1, 1).saturating_sub(1);
    let (top, left) = if ctx.session.modes.origin {
        (ctx.session.scroll_top, ctx.session.effective_margins().0)
    } else {
        (0, 0)
    };
    ctx.session.cursor.row = top + row;
    ctx.session.cursor.col = left + col;
    clamp_cursor(ctx);
}

pub fn hpa(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let col = param(params, 0, 1).saturating_sub(1);
    ctx.session.cursor.col = col.min(ctx.session.cols().saturating_sub(1));
    ctx.session.cursor.wrap_pending = false;
}

pub fn vpa(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let row = param(params, 0, 1).saturating_sub(1);
    ctx.session.cursor.row = row.min(ctx.session.rows().saturating_sub(1));
    ctx.session.cursor.wrap_pending = false;
}

pub fn hpr(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    cuf(ctx, params);
}

pub fn vpr(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    cud(ctx, params);
}

/// HT: advance to the next tab stop, or the last column if none remain.
pub fn tab_forward(ctx: &mut DispatchCtx) {
    let cols = ctx.session.cols() as usize;
    let start = ctx.session.cursor.col as usize + 1;
    let next = ctx
        .session
        .tab_stops
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, &stop)| stop)
        .map(|(i, _)| i)
        .unwrap_or(cols.saturating_sub(1));
    ctx.session.cursor.col = next as u16;
}

/// CBT: move backward to the previous tab stop.
pub fn tab_backward(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let n = param(params, 0, 1);
    for _ in 0..n {
        let col = ctx.session.cursor.col;
        if col == 0 {
            break;
        }
        let prev = ctx.session.tab_stops[..col as usize]
            .iter()
            .rposition(|&stop| stop)
            .unwrap_or(0);
        ctx.session.cursor.col = prev as u16;
    }
}

/// TBC: clear tab stops. Ps=0 clears the stop at the cursor; Ps=3 clears
/// all stops.
pub fn tab_clear(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    match param(params, 0, 0) {
        3 => {
            for stop in &mut ctx.session.tab_stops {
                *stop = false;
            }
        }
        _ => {
            let col = ctx.session.cursor.col as usize;
            if let Some(stop) = ctx.session.tab_stops.get_mut(col) {
                *stop = false;
            }
        }
    }
}
