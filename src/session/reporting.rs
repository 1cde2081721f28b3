//! Status reports: DSR, DA1/DA2/DA3, DECRQSS, and the VT4xx/5xx report
//! family (DECRQPKU/DECRS/DECRQTSR/DECRQUPSS/DECRQDE). Wire encodings for
//! the latter five vary across DEC's own VT420 and VT520 manuals; each is
//! acknowledged with a reply shaped like its nearest documented form
//! rather than left silently unanswered.

use crate::config::ConformanceLevel;

use super::dispatch::DispatchCtx;

fn param(params: &[(u16, bool)], idx: usize, default: u16) -> u16 {
    params.get(idx).map(|(v, _)| *v).filter(|v| *v != 0).unwrap_or(default)
}

/// DSR (`CSI Ps n`): Ps=5 device status, Ps=6 cursor position report.
pub fn dsr(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    match param(params, 0, 0) {
        5 => ctx.session.queue_response(b"\x1b[0n"),
        6 => {
            let row = ctx.session.cursor.row + 1;
            let col = ctx.session.cursor.col + 1;
            let reply = format!("\x1b[{};{}R", row, col);
            ctx.session.queue_response(reply.as_bytes());
        }
        _ => {}
    }
}

/// DA1 (`CSI c`): what we are.
pub fn da1(ctx: &mut DispatchCtx) {
    let reply = match ctx.session.conformance {
        ConformanceLevel::Vt100 => "\x1b[?1;2c",
        ConformanceLevel::Vt220 => "\x1b[?62;1;6;9c",
        ConformanceLevel::Vt420 => "\x1b[?64;1;6;9;15;21;22c",
        ConformanceLevel::Vt525 => "\x1b[?65;1;6;9;15;21;22;28c",
        ConformanceLevel::Xterm | ConformanceLevel::AnsiSys => "\x1b[?1;2c",
    };
    ctx.session.queue_response(reply.as_bytes());
}

/// DA2 (`CSI > c`): firmware/terminal identification.
pub fn da2(ctx: &mut DispatchCtx) {
    ctx.session.queue_response(b"\x1b[>0;0;0c");
}

/// DA3 (`CSI = c`): unit ID, reported as a DCS string per DEC convention.
pub fn da3(ctx: &mut DispatchCtx) {
    ctx.session.queue_response(b"\x1bP!|00000000\x1b\\");
}

/// DECRQSS reply for a recognized setting selector. Returns the `Pn` valid
/// flag (1) with the value string, or an invalid (0) reply with no value
/// when the selector isn't recognized.
pub fn decrqss(ctx: &mut DispatchCtx, selector: &str) {
    let value = match selector {
        "m" => Some(sgr_string(ctx)),
        "r" => Some(format!("{};{}r", ctx.session.scroll_top + 1, ctx.session.scroll_bottom + 1)),
        "s" => Some(format!("{};{}s", ctx.session.margin_left + 1, ctx.session.margin_right + 1)),
        _ => None,
    };
    match value {
        Some(v) => {
            let reply = format!("\x1bP1$r{}\x1b\\", v);
            ctx.session.queue_response(reply.as_bytes());
        }
        None => ctx.session.queue_response(b"\x1bP0$r\x1b\\"),
    }
}

/// DECRQPKU (`CSI Pk $ ~`): request the host-defined sequence bound to
/// program key `Pk`. No programmable-key storage is implemented, so every
/// key reports as unbound.
pub fn decrqpku(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    let key = param(params, 0, 0);
    let reply = format!("\x1bP0$x{}\x1b\\", key);
    ctx.session.queue_response(reply.as_bytes());
}

/// DECRS (`CSI $ |`): session status report, here just the conformance
/// level's DA1 identification code.
pub fn decrs(ctx: &mut DispatchCtx) {
    let code = match ctx.session.conformance {
        ConformanceLevel::Vt100 => 1,
        ConformanceLevel::Vt220 => 62,
        ConformanceLevel::Vt420 => 64,
        ConformanceLevel::Vt525 => 65,
        ConformanceLevel::Xterm | ConformanceLevel::AnsiSys => 1,
    };
    let reply = format!("\x1bP1$|{}\x1b\\", code);
    ctx.session.queue_response(reply.as_bytes());
}

/// DECRQTSR (`CSI & w`): request terminal state report. Reports the
/// modes this engine actually tracks rather than a full DECTSR dump.
pub fn decrqtsr(ctx: &mut DispatchCtx) {
    let m = &ctx.session.modes;
    let body = format!(
        "{};{};{};{}",
        m.origin as u8, m.autowrap as u8, m.insert as u8, m.left_right_margin as u8
    );
    let reply = format!("\x1bP1$u{}\x1b\\", body);
    ctx.session.queue_response(reply.as_bytes());
}

/// DECRQUPSS (`CSI & u`): request user-preferred supplemental set.
/// Supplemental character sets aren't implemented, so this always reports
/// the standard ASCII set.
pub fn decrqupss(ctx: &mut DispatchCtx) {
    ctx.session.queue_response(b"\x1bP1!u\x1b\\");
}

/// DECRQDE (`CSI Ps $ }`): request display extent. Reports the active
/// grid's columns/rows/page as a single page (multi-page text isn't
/// implemented).
pub fn decrqde(ctx: &mut DispatchCtx) {
    let cols = ctx.session.cols();
    let rows = ctx.session.rows();
    let reply = format!("\x1bP1$}}{};{};1;1;1\x1b\\", cols, rows);
    ctx.session.queue_response(reply.as_bytes());
}

fn sgr_string(ctx: &DispatchCtx) -> String {
    use crate::cell::{CellFlags, UnderlineStyle};
    use crate::color::Color;

    let mut codes = vec!["0".to_string()];
    let attrs = ctx.session.cursor.attrs;
    if attrs.contains(CellFlags::BOLD) {
        codes.push("1".into());
    }
    if attrs.contains(CellFlags::FAINT) {
        codes.push("2".into());
    }
    if attrs.contains(CellFlags::ITALIC) {
        codes.push("3".into());
    }
    match ctx.session.cursor.underline {
        UnderlineStyle::None => {}
        UnderlineStyle::Double => codes.push("21".into()),
        UnderlineStyle::Single => codes.push("4".into()),
        UnderlineStyle::Curly => codes.push("4:3".into()),
        UnderlineStyle::Dotted => codes.push("4:4".into()),
        UnderlineStyle::Dashed => codes.push("4:5".into()),
    }
    if attrs.contains(CellFlags::BLINK_SLOW) {
        codes.push("6".into());
    } else if attrs.contains(CellFlags::BLINK_CLASSIC) {
        codes.push("5".into());
    }
    if attrs.contains(CellFlags::REVERSE) {
        codes.push("7".into());
    }
    if attrs.contains(CellFlags::HIDDEN) {
        codes.push("8".into());
    }
    if attrs.contains(CellFlags::STRIKETHROUGH) {
        codes.push("9".into());
    }
    if attrs.contains(CellFlags::FRAMED) {
        codes.push("51".into());
    }
    if attrs.contains(CellFlags::ENCIRCLED) {
        codes.push("52".into());
    }
    if attrs.contains(CellFlags::OVERLINE) {
        codes.push("53".into());
    }
    if attrs.contains(CellFlags::SUPERSCRIPT) {
        codes.push("73".into());
    }
    if attrs.contains(CellFlags::SUBSCRIPT) {
        codes.push("74".into());
    }

    match ctx.session.cursor.fg {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => codes.push((30 + i).to_string()),
        Color::Indexed(i) if i < 16 => codes.push((90 + (i - 8)).to_string()),
        Color::Indexed(i) => codes.push(format!("38;5;{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("38;2;{r};{g};{b}")),
    }
    match ctx.session.cursor.bg {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => codes.push((40 + i).to_string()),
        Color::Indexed(i) if i < 16 => codes.push((100 + (i - 8)).to_string()),
        Color::Indexed(i) => codes.push(format!("48;5;{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("48;2;{r};{g};{b}")),
    }

    format!("{}m", codes.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::session::Session;

    #[test]
    fn cursor_position_report() {
        let mut session = Session::new(10, 5, 0);
        session.cursor.row = 2;
        session.cursor.col = 3;
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
        dsr(&mut ctx, &[(6, false)]);
        assert_eq!(ctx.session.take_response(), b"\x1b[3;4R");
    }

    #[test]
    fn decrqss_reports_sgr_state() {
        let mut session = Session::new(10, 5, 0);
        session.cursor.attrs = crate::cell::CellFlags::BOLD;
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
        decrqss(&mut ctx, "m");
        assert_eq!(ctx.session.take_response(), b"\x1bP1$r0;1m\x1b\\".to_vec());
    }

    #[test]
    fn decrqss_reports_bold_and_indexed_fg() {
        let mut session = Session::new(10, 5, 0);
        session.cursor.attrs = crate::cell::CellFlags::BOLD;
        session.cursor.fg = crate::color::Color::Indexed(1);
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
        decrqss(&mut ctx, "m");
        assert_eq!(ctx.session.take_response(), b"\x1bP1$r0;1;31m\x1b\\".to_vec());
    }

    fn ctx_fixture(session: &mut Session, queue: &mut OpQueue, collab: &mut Collaborators, palette: &[(u8, u8, u8); 16]) -> DispatchCtx<'_> {
        DispatchCtx {
            session_index: 0,
            session,
            queue,
            collaborators: collab,
            palette,
            gateway_queue: &mut Vec::new(),
        }
    }

    #[test]
    fn decrqpku_reports_unbound_key() {
        let mut session = Session::new(10, 5, 0);
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut ctx = ctx_fixture(&mut session, &mut queue, &mut collab, &palette);
        decrqpku(&mut ctx, &[(12, false)]);
        assert_eq!(ctx.session.take_response(), b"\x1bP0$x12\x1b\\".to_vec());
    }

    #[test]
    fn decrqde_reports_active_grid_dimensions() {
        let mut session = Session::new(10, 5, 0);
        let mut queue = OpQueue::new();
        let mut collab = Collaborators::default();
        let palette = crate::color::DEFAULT_PALETTE;
        let mut ctx = ctx_fixture(&mut session, &mut queue, &mut collab, &palette);
        decrqde(&mut ctx);
        assert_eq!(ctx.session.take_response(), b"\x1bP1$}10;5;1;1;1\x1b\\".to_vec());
    }
}
