//! Media Copy (`CSI Ps i` / `CSI ? Ps i`): printer-controller mode and
//! screen dump.

use super::dispatch::DispatchCtx;

fn param(params: &[(u16, bool)], idx: usize, default: u16) -> u16 {
    params.get(idx).map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(default)
}

/// ANSI MC (`CSI Ps i`): Ps=4 stops the printer controller, Ps=5 starts
/// it, Ps=0 prints the current line, Ps=1 prints the cursor's page.
pub fn mc(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    match param(params, 0, 0) {
        4 => ctx.session.printer.controller_active = false,
        5 => ctx.session.printer.controller_active = true,
        0 => print_row(ctx, ctx.session.cursor.row),
        1 => dump_screen(ctx),
        _ => {}
    }
}

/// DEC private MC (`CSI ? Ps i`): Ps=1 print cursor line, Ps=4/5 toggle
/// auto-print, Ps=10/11 print composed page, Ps=9 print the whole screen
/// to the printer collaborator.
pub fn mc_private(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    match param(params, 0, 0) {
        1 => print_row(ctx, ctx.session.cursor.row),
        4 => ctx.session.printer.auto_print = false,
        5 => ctx.session.printer.auto_print = true,
        9 | 10 | 11 => dump_screen(ctx),
        _ => {}
    }
}

fn print_row(ctx: &mut DispatchCtx, row: u16) {
    let text: String = ctx
        .session
        .active_grid()
        .visible_row(row)
        .cells
        .iter()
        .map(|c| c.c)
        .collect();
    ctx.collaborators.emit_print(ctx.session_index, text.as_bytes());
}

fn dump_screen(ctx: &mut DispatchCtx) {
    let rows = ctx.session.rows();
    let mut out = String::new();
    for y in 0..rows {
        for cell in &ctx.session.active_grid().visible_row(y).cells {
            out.push(cell.c);
        }
        out.push('\n');
    }
    ctx.collaborators.emit_print(ctx.session_index, out.as_bytes());
}
