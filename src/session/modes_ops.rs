//! SM/RM (`CSI Pm h` / `CSI Pm l`) and DEC private mode set/reset
//! (`CSi ? Pm h` / `CSI ? Pm l`), plus DECCOLM's 80/132-column resize.

use crate::op_queue::Op;

use super::dispatch::DispatchCtx;

/// ANSI modes (`CSI Pm h`/`l`, no `?` intermediate).
pub fn set_ansi(ctx: &mut DispatchCtx, params: &[(u16, bool)], enable: bool) {
    for &(code, _) in params {
        match code {
            4 => ctx.session.modes.insert = enable,
            20 => ctx.session.modes.linefeed_newline = enable,
            _ => {}
        }
    }
}

/// DEC private modes (`CSI ? Pm h`/`l`).
pub fn set_private(ctx: &mut DispatchCtx, params: &[(u16, bool)], enable: bool) {
    for &(code, _) in params {
        match code {
            1 => ctx.session.modes.cursor_keys_application = enable,
            3 => decolm(ctx, enable),
            4 => ctx.session.modes.slow_scroll = enable,
            6 => {
                ctx.session.modes.origin = enable;
                let (top, left) = (ctx.session.scroll_top, ctx.session.effective_margins().0);
                ctx.session.cursor.row = if enable { top } else { 0 };
                ctx.session.cursor.col = if enable { left } else { 0 };
            }
            7 => ctx.session.modes.autowrap = enable,
            8 => ctx.session.modes.auto_repeat = enable,
            9 | 1000 => ctx.session.modes.mouse_tracking = enable,
            1002 => ctx.session.modes.mouse_motion = enable,
            1003 => ctx.session.modes.mouse_all_motion = enable,
            1004 => ctx.session.modes.focus_events = enable,
            1005 => ctx.session.modes.utf8_mouse = enable,
            1006 => ctx.session.modes.sgr_mouse = enable,
            1007 => ctx.session.modes.alternate_scroll = enable,
            12 => {}
            25 => ctx.session.cursor.visible = enable,
            47 | 1047 => swap_alt_screen(ctx, enable, false),
            1049 => swap_alt_screen(ctx, enable, true),
            2004 => ctx.session.modes.bracketed_paste = enable,
            2026 => ctx.session.modes.synchronized_output = enable,
            69 => {
                ctx.session.modes.left_right_margin = enable;
                if !enable {
                    ctx.session.margin_left = 0;
                    ctx.session.margin_right = ctx.session.cols().saturating_sub(1);
                }
            }
            88 => ctx.session.modes.xon_xoff = enable,
            95 => ctx.session.modes.no_clear_on_column_change = enable,
            _ => {}
        }
    }
}

/// DECCOLM (`CSI ? 3 h/l`): switch between 80 and 132 columns, clearing
/// the grid unless DECNCSM (mode 95) suppresses it.
fn decolm(ctx: &mut DispatchCtx, wide: bool) {
    let cols = if wide { 132 } else { 80 };
    let rows = ctx.session.rows();
    let preserve = ctx.session.modes.no_clear_on_column_change;
    ctx.queue.enqueue(Op::ResizeGrid {
        session: ctx.session_index,
        rows,
        cols,
        preserve_scrollback: preserve,
    });
    ctx.session.cursor.row = 0;
    ctx.session.cursor.col = 0;
}

/// Mode 47/1047/1049 family: switch the active grid. 1049 additionally
/// saves/restores the cursor and clears on entry, matching xterm.
fn swap_alt_screen(ctx: &mut DispatchCtx, enable: bool, save_cursor: bool) {
    if enable == ctx.session.modes.alt_screen {
        return;
    }
    if enable {
        if save_cursor {
            let origin = ctx.session.modes.origin;
            ctx.session.cursor.save(origin);
        }
        ctx.session.using_alternate = true;
        ctx.session.active_grid_mut().clear_viewport(ctx.session.cursor.bg, false);
    } else {
        ctx.session.using_alternate = false;
        if save_cursor {
            if let Some(origin) = ctx.session.cursor.restore() {
                ctx.session.modes.origin = origin;
            }
        }
    }
    ctx.session.modes.alt_screen = enable;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::session::Session;

    #[test]
    fn origin_mode_repositions_cursor_home() {
        let mut session = Session::new(10, 5, 0);
        session.scroll_top = 1;
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut Vec::new(),
        };
        set_private(&mut ctx, &[(6, false)], true);
        assert!(ctx.session.modes.origin);
        assert_eq!(ctx.session.cursor.row, 1);
    }

    #[test]
    fn declrmm_reset_restores_full_width_margins() {
        let mut session = Session::new(10, 5, 0);
        session.margin_left = 2;
        session.margin_right = 6;
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut ctx = DispatchCtx {
            session_index: 0,
            session: &mut session,
            queue: &mut queue,
            collaborators: &mut collab,
            palette: &palette,
            gateway_queue: &mut Vec::new(),
        };
        set_private(&mut ctx, &[(69, false)], false);
        assert_eq!(ctx.session.margin_left, 0);
        assert_eq!(ctx.session.margin_right, 9);
    }
}
