//! SGR (Select Graphic Rendition) dispatch.
//!
//! Generalizes the teacher's `apply_sgr` in `terminal/state.rs` (which
//! matched on a flat `Vec<u16>`) to operate on the separator-preserving
//! `(value, is_subparam)` pairs `parser::extract_params` now returns, so
//! `38:2:r:g:b` and `38;2;r;g;b` both parse correctly instead of only the
//! semicolon form.

use crate::cell::{CellFlags, UnderlineStyle};
use crate::color::Color;
use crate::config::ConformanceLevel;

use super::dispatch::DispatchCtx;

pub fn dispatch(ctx: &mut DispatchCtx, params: &[(u16, bool)]) {
    if params.is_empty() {
        reset(ctx);
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let (code, _) = params[i];
        match code {
            0 => reset(ctx),
            1 => ctx.session.cursor.attrs.insert(CellFlags::BOLD),
            2 => ctx.session.cursor.attrs.insert(CellFlags::FAINT),
            3 => ctx.session.cursor.attrs.insert(CellFlags::ITALIC),
            4 => {
                // Colon-extended: `4:n` selects an underline style.
                if i + 1 < params.len() && params[i + 1].1 {
                    i += 1;
                    ctx.session.cursor.underline = match params[i].0 {
                        0 => UnderlineStyle::None,
                        2 => UnderlineStyle::Double,
                        3 => UnderlineStyle::Curly,
                        4 => UnderlineStyle::Dotted,
                        5 => UnderlineStyle::Dashed,
                        _ => UnderlineStyle::Single,
                    };
                } else {
                    ctx.session.cursor.underline = UnderlineStyle::Single;
                }
            }
            5 => {
                ctx.session.cursor.attrs.insert(CellFlags::BLINK_CLASSIC | CellFlags::BLINK_BG);
                ctx.session.cursor.attrs.remove(CellFlags::BLINK_SLOW);
            }
            6 => {
                if ctx.session.conformance != ConformanceLevel::AnsiSys {
                    ctx.session.cursor.attrs.insert(CellFlags::BLINK_SLOW);
                }
            }
            7 => ctx.session.cursor.attrs.insert(CellFlags::REVERSE),
            8 => ctx.session.cursor.attrs.insert(CellFlags::HIDDEN),
            9 => ctx.session.cursor.attrs.insert(CellFlags::STRIKETHROUGH),
            21 => ctx.session.cursor.underline = UnderlineStyle::Double,
            22 => {
                ctx.session.cursor.attrs.remove(CellFlags::BOLD | CellFlags::FAINT);
            }
            23 => ctx.session.cursor.attrs.remove(CellFlags::ITALIC),
            24 => ctx.session.cursor.underline = UnderlineStyle::None,
            25 => ctx.session.cursor.attrs.clear_blink(),
            27 => ctx.session.cursor.attrs.remove(CellFlags::REVERSE),
            28 => ctx.session.cursor.attrs.remove(CellFlags::HIDDEN),
            29 => ctx.session.cursor.attrs.remove(CellFlags::STRIKETHROUGH),
            30..=37 => ctx.session.cursor.fg = Color::Indexed((code - 30) as u8),
            38 => i += set_extended_color(ctx, &params[i..], true),
            39 => ctx.session.cursor.fg = Color::Default,
            40..=47 => ctx.session.cursor.bg = Color::Indexed((code - 40) as u8),
            48 => i += set_extended_color(ctx, &params[i..], false),
            49 => ctx.session.cursor.bg = Color::Default,
            51 => ctx.session.cursor.attrs.insert(CellFlags::FRAMED),
            52 => ctx.session.cursor.attrs.insert(CellFlags::ENCIRCLED),
            53 => ctx.session.cursor.attrs.insert(CellFlags::OVERLINE),
            54 => ctx
                .session
                .cursor
                .attrs
                .remove(CellFlags::FRAMED | CellFlags::ENCIRCLED),
            55 => ctx.session.cursor.attrs.remove(CellFlags::OVERLINE),
            66 => {
                // SGR 66 is undefined under ANSI.SYS conformance; no-op there.
            }
            73 => {
                ctx.session.cursor.attrs.remove(CellFlags::SUBSCRIPT);
                ctx.session.cursor.attrs.insert(CellFlags::SUPERSCRIPT);
            }
            74 => {
                ctx.session.cursor.attrs.remove(CellFlags::SUPERSCRIPT);
                ctx.session.cursor.attrs.insert(CellFlags::SUBSCRIPT);
            }
            75 => ctx
                .session
                .cursor
                .attrs
                .remove(CellFlags::SUPERSCRIPT | CellFlags::SUBSCRIPT),
            90..=97 => {
                if ctx.session.conformance != ConformanceLevel::AnsiSys {
                    ctx.session.cursor.fg = Color::Indexed((code - 90 + 8) as u8);
                }
            }
            100..=107 => {
                if ctx.session.conformance != ConformanceLevel::AnsiSys {
                    ctx.session.cursor.bg = Color::Indexed((code - 100 + 8) as u8);
                }
            }
            _ => {}
        }
        i += 1;
    }
}

fn reset(ctx: &mut DispatchCtx) {
    ctx.session.cursor.fg = Color::Default;
    ctx.session.cursor.bg = Color::Default;
    ctx.session.cursor.attrs = CellFlags::empty();
    ctx.session.cursor.underline = UnderlineStyle::None;
}

/// Handle `38;5;n` / `38;2;r;g;b` (and the colon-separated equivalents) for
/// foreground (`fg = true`) or background. Returns how many extra
/// parameter slots were consumed so the caller can skip past them.
fn set_extended_color(ctx: &mut DispatchCtx, rest: &[(u16, bool)], fg: bool) -> usize {
    if rest.len() < 2 {
        return 0;
    }
    let selector = rest[1].0;
    let color = match selector {
        5 if rest.len() >= 3 => Some((Color::Indexed(rest[2].0 as u8), 2)),
        2 if rest.len() >= 5 => Some((
            Color::Rgb(rest[2].0 as u8, rest[3].0 as u8, rest[4].0 as u8),
            4,
        )),
        _ => None,
    };
    match color {
        Some((color, consumed)) => {
            if fg {
                ctx.session.cursor.fg = color;
            } else {
                ctx.session.cursor.bg = color;
            }
            consumed
        }
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Collaborators;
    use crate::op_queue::OpQueue;
    use crate::session::Session;

    fn run(input: &[(u16, bool)]) -> Session {
        let mut session = Session::new(10, 5, 0);
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
        dispatch(&mut ctx, input);
        session
    }

    #[test]
    fn attribute_inheritance_scenario() {
        // ESC[0m ESC[1m ESC[3m ESC[22m, per spec scenario 1.
        let mut session = Session::new(10, 5, 0);
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
        dispatch(&mut ctx, &[(0, false)]);
        dispatch(&mut ctx, &[(1, false)]);
        dispatch(&mut ctx, &[(3, false)]);
        dispatch(&mut ctx, &[(22, false)]);
        assert!(ctx.session.cursor.attrs.contains(CellFlags::ITALIC));
        assert!(!ctx.session.cursor.attrs.contains(CellFlags::BOLD));
    }

    #[test]
    fn truecolor_semicolon_form() {
        let session = run(&[(38, false), (2, false), (10, false), (20, false), (30, false)]);
        assert_eq!(session.cursor.fg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn indexed_256_form() {
        let session = run(&[(48, false), (5, false), (200, false)]);
        assert_eq!(session.cursor.bg, Color::Indexed(200));
    }
}
