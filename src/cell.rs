//! Grid cell representation: a Unicode scalar, two colors, and a flags word.
//!
//! Generalizes the teacher's `terminal::grid::CellFlags` /
//! `terminal::cursor::CellAttrs` (which together covered bold/faint/italic/
//! underline/blink/reverse/hidden/strikethrough plus wide-char tracking)
//! with the remaining attributes the spec's data model names: framed,
//! encircled, overline, superscript/subscript, protected, soft-hyphen,
//! wrap-continuation, and a per-cell dirty bit.
//!
//! Underline and blink are each multi-valued (underline has six styles;
//! blink has three independently-settable flavors per the SGR 5/6 contract
//! in spec §8 invariant 7), so they don't fit a single boolean bit each.
//! Blink's three flavors genuinely are independent booleans and stay in
//! `CellFlags`; underline's style is richer than a bit can hold and is
//! split out into `UnderlineStyle`, carried alongside `CellFlags` on `Cell`
//! rather than packed into it.

use bitflags::bitflags;

use crate::color::Color;

bitflags! {
    /// Per-cell attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u32 {
        const BOLD              = 1 << 0;
        const FAINT              = 1 << 1;
        const ITALIC             = 1 << 2;
        const REVERSE            = 1 << 3;
        const HIDDEN             = 1 << 4;
        const STRIKETHROUGH      = 1 << 5;
        const FRAMED             = 1 << 6;
        const ENCIRCLED          = 1 << 7;
        const OVERLINE           = 1 << 8;
        const SUPERSCRIPT        = 1 << 9;
        const SUBSCRIPT          = 1 << 10;
        const PROTECTED          = 1 << 11;
        const SOFT_HYPHEN        = 1 << 12;
        const WRAP_CONTINUATION  = 1 << 13;
        const DIRTY              = 1 << 14;
        /// SGR 5: classic (fast) blink + background blink, per spec invariant 7.
        const BLINK_CLASSIC      = 1 << 15;
        /// SGR 6: slow-blink flavor, independent of `BLINK_CLASSIC`.
        const BLINK_SLOW         = 1 << 16;
        const BLINK_BG           = 1 << 17;
        /// This cell holds a wide (2-column) character.
        const WIDE_CHAR          = 1 << 18;
        /// This cell is the trailing spacer of a wide character.
        const WIDE_SPACER        = 1 << 19;
        /// Line wrapped after this position (DECAWM-driven wrap).
        const WRAP               = 1 << 20;
    }
}

impl CellFlags {
    /// Clear the classic/slow blink bits and whatever background-blink
    /// flavor they imply, leaving every other attribute untouched. Used by
    /// SGR 25 ("blink off").
    pub fn clear_blink(&mut self) {
        self.remove(Self::BLINK_CLASSIC | Self::BLINK_SLOW | Self::BLINK_BG);
    }
}

/// Underline rendering style. `None` means "no underline" and is the
/// default; `Cell::default()` carries it implicitly via `UnderlineStyle::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// A single grid position.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub c: char,
    pub fg: Color,
    pub bg: Color,
    pub flags: CellFlags,
    pub underline: UnderlineStyle,
    /// Combining marks layered on top of `c`, only allocated when present.
    pub combining: Option<Box<[char]>>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::Default,
            bg: Color::Default,
            flags: CellFlags::empty(),
            underline: UnderlineStyle::None,
            combining: None,
        }
    }
}

impl Cell {
    /// Create a spacer cell for the trailing half of a wide character.
    pub fn wide_spacer() -> Self {
        Self {
            flags: CellFlags::WIDE_SPACER,
            ..Default::default()
        }
    }

    /// Reset cell to default blank state, discarding all attributes.
    pub fn clear(&mut self) {
        *self = Cell::default();
    }

    /// Erase cell using the given background color, per ECMA-48 (erased
    /// cells keep the current background but drop all other attributes).
    /// When `respect_protected` is set and the cell is protected, the cell
    /// is left untouched (DECSCA / ED-EL protected-erase contract).
    pub fn erase(&mut self, bg: Color, respect_protected: bool) {
        if respect_protected && self.flags.contains(CellFlags::PROTECTED) {
            return;
        }
        self.c = ' ';
        self.fg = Color::Default;
        self.bg = bg;
        self.flags = CellFlags::empty();
        self.underline = UnderlineStyle::None;
        self.combining = None;
    }

    /// Append a combining mark onto this cell's base character.
    pub fn push_combining(&mut self, mark: char) {
        let mut marks: Vec<char> = self
            .combining
            .take()
            .map(|b| b.into_vec())
            .unwrap_or_default();
        marks.push(mark);
        self.combining = Some(marks.into_boxed_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_respects_protected_cell() {
        let mut cell = Cell {
            c: 'x',
            flags: CellFlags::PROTECTED,
            ..Default::default()
        };
        cell.erase(Color::Indexed(2), true);
        assert_eq!(cell.c, 'x', "protected cell must not be erased");

        cell.erase(Color::Indexed(2), false);
        assert_eq!(cell.c, ' ');
        assert_eq!(cell.bg, Color::Indexed(2));
    }

    #[test]
    fn clear_blink_leaves_other_flags() {
        let mut flags = CellFlags::BOLD | CellFlags::BLINK_CLASSIC | CellFlags::BLINK_BG;
        flags.clear_blink();
        assert!(flags.contains(CellFlags::BOLD));
        assert!(!flags.contains(CellFlags::BLINK_CLASSIC));
        assert!(!flags.contains(CellFlags::BLINK_BG));
    }
}
