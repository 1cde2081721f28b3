//! Cursor position, pen state (current SGR attributes/colors), and the
//! single DECSC/DECRC save slot.

use crate::cell::{CellFlags, UnderlineStyle};
use crate::color::Color;

/// Cursor shape for rendering, set via DECSCUSR (`CSI Ps SP q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Full cursor state: position, pen (current SGR attrs/colors), visibility,
/// shape, and deferred-wrap flag.
///
/// `wrap_pending` is true exactly when the cursor sits at the last column
/// and the next printable character should wrap before being placed (the
/// "is wrap-pending only valid when cursor.x == cols-1" invariant in spec
/// §3). Representing it as a flag rather than moving the cursor to a
/// one-past-the-end column keeps cursor position reports (`CSI 6n`)
/// correct without a special case there.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellFlags,
    pub underline: UnderlineStyle,
    pub shape: CursorShape,
    pub visible: bool,
    pub wrap_pending: bool,
    saved: Option<SavedCursor>,
}

/// Snapshot captured by DECSC (`ESC 7`) and restored by DECRC (`ESC 8`).
/// Includes origin-mode so DECRC is a true state restore, not just a
/// position/pen restore.
#[derive(Debug, Clone)]
struct SavedCursor {
    row: u16,
    col: u16,
    fg: Color,
    bg: Color,
    attrs: CellFlags,
    underline: UnderlineStyle,
    origin_mode: bool,
    wrap_pending: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellFlags::empty(),
            underline: UnderlineStyle::None,
            shape: CursorShape::Block,
            visible: true,
            wrap_pending: false,
            saved: None,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_saved(&self) -> bool {
        self.saved.is_some()
    }

    pub fn save(&mut self, origin_mode: bool) {
        self.saved = Some(SavedCursor {
            row: self.row,
            col: self.col,
            fg: self.fg,
            bg: self.bg,
            attrs: self.attrs,
            underline: self.underline,
            origin_mode,
            wrap_pending: self.wrap_pending,
        });
    }

    /// Restore the saved snapshot, returning the saved origin-mode value so
    /// the caller (which owns `TerminalModes`) can apply it. No-op (leaves
    /// current state and returns `None`) when nothing was ever saved,
    /// matching DEC behavior of DECRC before any DECSC.
    pub fn restore(&mut self) -> Option<bool> {
        let saved = self.saved.clone()?;
        self.row = saved.row;
        self.col = saved.col;
        self.fg = saved.fg;
        self.bg = saved.bg;
        self.attrs = saved.attrs;
        self.underline = saved.underline;
        self.wrap_pending = saved.wrap_pending;
        Some(saved.origin_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_without_save_is_noop() {
        let mut cursor = CursorState::new();
        cursor.row = 5;
        cursor.col = 7;
        assert_eq!(cursor.restore(), None);
        assert_eq!((cursor.row, cursor.col), (5, 7));
    }

    #[test]
    fn save_restore_round_trip() {
        let mut cursor = CursorState::new();
        cursor.row = 3;
        cursor.col = 4;
        cursor.fg = Color::Indexed(1);
        cursor.attrs = CellFlags::BOLD;
        cursor.save(true);

        cursor.row = 10;
        cursor.col = 10;
        cursor.fg = Color::Default;
        cursor.attrs = CellFlags::empty();

        let origin = cursor.restore();
        assert_eq!(origin, Some(true));
        assert_eq!((cursor.row, cursor.col), (3, 4));
        assert_eq!(cursor.fg, Color::Indexed(1));
        assert!(cursor.attrs.contains(CellFlags::BOLD));
    }
}
