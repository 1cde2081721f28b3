//! Bounded, single-producer op queue between dispatch and flush.
//!
//! The teacher's `TerminalState` (a `vte::Perform` impl) mutates its `Grid`
//! directly from inside dispatch methods. The spec instead wants dispatch
//! to only *enqueue* structured operations, with a separate flush phase
//! applying them — so a single dispatch cycle never observes (or leaves
//! behind) a half-updated grid, and so rectangle ops can carry one
//! `respect_protected` bit applied uniformly across every cell they touch.
//! There's no teacher analog for the queue itself; its ring-buffer
//! overflow handling follows the same "bounded, drop with a logged
//! warning rather than block or panic" posture the teacher's pipeline and
//! macro-space buffers use elsewhere.

use crate::cell::{Cell, CellFlags};
use crate::color::Color;
use crate::grid::Grid;

/// Queue capacity. Power-of-two per spec (`KTERM_OP_QUEUE_SIZE`).
pub const OP_QUEUE_CAPACITY: usize = 4096;

/// How `SetAttrRect` combines with existing cell attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrRectMode {
    /// DECCARA: apply SGR (colors + flags) to every cell in the rect.
    Apply,
    /// DECRARA: toggle the given flag bits, leaving colors untouched.
    Toggle,
}

/// A single structured grid-mutation operation. Each carries the target
/// session so the queue can be global (terminal-scoped) while still
/// routing per-session.
#[derive(Debug, Clone)]
pub enum Op {
    SetCell {
        session: usize,
        row: u16,
        col: u16,
        cell: Cell,
    },
    /// Scroll `[top, bottom] x [left, right]` by `dy` lines; positive scrolls
    /// up (content moves toward row 0), negative scrolls down.
    ScrollRegion {
        session: usize,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        dy: i32,
        bg: Color,
        respect_protected: bool,
    },
    /// Copy a `height x width` rectangle from `(src_row, src_col)` to
    /// `(dst_row, dst_col)`, both within the same session's grid.
    CopyRect {
        session: usize,
        src_row: u16,
        src_col: u16,
        dst_row: u16,
        dst_col: u16,
        height: u16,
        width: u16,
    },
    FillRect {
        session: usize,
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
        cell: Cell,
        respect_protected: bool,
    },
    EraseRect {
        session: usize,
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
        bg: Color,
        respect_protected: bool,
    },
    SetAttrRect {
        session: usize,
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
        flags: CellFlags,
        fg: Option<Color>,
        bg: Option<Color>,
        mode: AttrRectMode,
    },
    InsertLines {
        session: usize,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        count: u16,
        bg: Color,
    },
    DeleteLines {
        session: usize,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        count: u16,
        bg: Color,
    },
    ResizeGrid {
        session: usize,
        rows: u16,
        cols: u16,
        preserve_scrollback: bool,
    },
    /// DECSED `Ps=3`: drop scrollback history, leaving the viewport as-is.
    ClearScrollback {
        session: usize,
    },
}

impl Op {
    fn session(&self) -> usize {
        match self {
            Op::SetCell { session, .. }
            | Op::ScrollRegion { session, .. }
            | Op::CopyRect { session, .. }
            | Op::FillRect { session, .. }
            | Op::EraseRect { session, .. }
            | Op::SetAttrRect { session, .. }
            | Op::InsertLines { session, .. }
            | Op::DeleteLines { session, .. }
            | Op::ResizeGrid { session, .. }
            | Op::ClearScrollback { session, .. } => *session,
        }
    }
}

/// Bounded FIFO of pending ops. `enqueue` never blocks; on a full queue it
/// returns `false` and the caller is expected to log + drop.
#[derive(Default)]
pub struct OpQueue {
    ops: std::collections::VecDeque<Op>,
}

impl OpQueue {
    pub fn new() -> Self {
        Self {
            ops: std::collections::VecDeque::with_capacity(OP_QUEUE_CAPACITY),
        }
    }

    pub fn enqueue(&mut self, op: Op) -> bool {
        if self.ops.len() >= OP_QUEUE_CAPACITY {
            return false;
        }
        self.ops.push_back(op);
        true
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drain the queue in FIFO order, resolving each op's target grid via
    /// `resolve`. Ops whose session no longer resolves (session destroyed
    /// between enqueue and flush) are silently skipped.
    pub fn flush<'a>(&mut self, mut resolve: impl FnMut(usize) -> Option<&'a mut Grid>) {
        while let Some(op) = self.ops.pop_front() {
            let session = op.session();
            if let Some(grid) = resolve(session) {
                apply(grid, op);
            }
        }
    }
}

fn apply(grid: &mut Grid, op: Op) {
    match op {
        Op::SetCell { row, col, cell, .. } => grid.set_cell(row, col, cell),
        Op::ScrollRegion {
            top,
            bottom,
            left,
            right,
            dy,
            bg,
            ..
        } => {
            if dy > 0 {
                for _ in 0..dy {
                    grid.scroll_up_region(top, bottom, left, right, bg);
                }
            } else if dy < 0 {
                for _ in 0..(-dy) {
                    grid.scroll_down_region(top, bottom, left, right, bg);
                }
            }
        }
        Op::CopyRect {
            src_row,
            src_col,
            dst_row,
            dst_col,
            height,
            width,
            ..
        } => copy_rect(grid, src_row, src_col, dst_row, dst_col, height, width),
        Op::FillRect {
            top,
            left,
            bottom,
            right,
            cell,
            respect_protected,
            ..
        } => {
            for y in top..=bottom {
                for x in left..=right {
                    if respect_protected && cell_protected(grid, y, x) {
                        continue;
                    }
                    grid.set_cell(y, x, cell.clone());
                }
            }
        }
        Op::EraseRect {
            top,
            left,
            bottom,
            right,
            bg,
            respect_protected,
            ..
        } => {
            for y in top..=bottom {
                grid.erase_cells(y, left, right + 1, bg, respect_protected);
            }
        }
        Op::SetAttrRect {
            top,
            left,
            bottom,
            right,
            flags,
            fg,
            bg,
            mode,
            ..
        } => {
            for y in top..=bottom {
                let row = grid.visible_row_mut(y);
                for x in left..=right {
                    if let Some(cell) = row.cells.get_mut(x as usize) {
                        match mode {
                            AttrRectMode::Apply => {
                                cell.flags = flags;
                                if let Some(fg) = fg {
                                    cell.fg = fg;
                                }
                                if let Some(bg) = bg {
                                    cell.bg = bg;
                                }
                            }
                            AttrRectMode::Toggle => {
                                cell.flags.toggle(flags);
                            }
                        }
                    }
                }
                row.dirty = true;
            }
        }
        Op::InsertLines {
            top,
            bottom,
            left,
            right,
            count,
            bg,
            ..
        } => {
            for _ in 0..count {
                grid.scroll_down_region(top, bottom, left, right, bg);
            }
        }
        Op::DeleteLines {
            top,
            bottom,
            left,
            right,
            count,
            bg,
            ..
        } => {
            for _ in 0..count {
                grid.scroll_up_region(top, bottom, left, right, bg);
            }
        }
        Op::ResizeGrid {
            rows,
            cols,
            preserve_scrollback,
            ..
        } => {
            if preserve_scrollback {
                grid.resize(rows, cols);
            } else {
                grid.resize_no_scrollback(rows, cols);
            }
        }
        Op::ClearScrollback { .. } => grid.clear_scrollback(),
    }
}

fn cell_protected(grid: &Grid, y: u16, x: u16) -> bool {
    grid.visible_row(y)
        .cells
        .get(x as usize)
        .map(|c| c.flags.contains(CellFlags::PROTECTED))
        .unwrap_or(false)
}

/// Copy a rectangle cell-by-cell, choosing row/column traversal order from
/// the sign of `dst - src` so overlapping source/destination rectangles
/// don't corrupt already-copied cells (matches `memmove` semantics).
fn copy_rect(
    grid: &mut Grid,
    src_row: u16,
    src_col: u16,
    dst_row: u16,
    dst_col: u16,
    height: u16,
    width: u16,
) {
    let row_forward = dst_row <= src_row;
    let col_forward = dst_col <= src_col;

    let rows: Box<dyn Iterator<Item = u16>> = if row_forward {
        Box::new(0..height)
    } else {
        Box::new((0..height).rev())
    };

    for dy in rows {
        let cols: Box<dyn Iterator<Item = u16>> = if col_forward {
            Box::new(0..width)
        } else {
            Box::new((0..width).rev())
        };
        for dx in cols {
            let cell = grid
                .visible_row(src_row + dy)
                .cells
                .get((src_col + dx) as usize)
                .cloned()
                .unwrap_or_default();
            grid.set_cell(dst_row + dy, dst_col + dx, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_fails_past_capacity() {
        let mut queue = OpQueue::new();
        for _ in 0..OP_QUEUE_CAPACITY {
            assert!(queue.enqueue(Op::SetCell {
                session: 0,
                row: 0,
                col: 0,
                cell: Cell::default(),
            }));
        }
        assert!(!queue.enqueue(Op::SetCell {
            session: 0,
            row: 0,
            col: 0,
            cell: Cell::default(),
        }));
    }

    #[test]
    fn flush_applies_in_fifo_order() {
        let mut grid = Grid::new(1, 2, 0);
        let mut queue = OpQueue::new();
        queue.enqueue(Op::SetCell {
            session: 0,
            row: 0,
            col: 0,
            cell: Cell {
                c: 'A',
                ..Default::default()
            },
        });
        queue.enqueue(Op::SetCell {
            session: 0,
            row: 0,
            col: 0,
            cell: Cell {
                c: 'B',
                ..Default::default()
            },
        });
        queue.flush(|s| if s == 0 { Some(&mut grid) } else { None });
        assert_eq!(grid.visible_row(0).cells[0].c, 'B');
    }

    #[test]
    fn clear_scrollback_op_routes_through_flush() {
        let mut grid = Grid::new(1, 2, 3);
        grid.scroll_up_region(0, 0, 0, 1, Color::Default);
        assert!(grid.scrollback_row(0).is_some());

        let mut queue = OpQueue::new();
        queue.enqueue(Op::ClearScrollback { session: 0 });
        queue.flush(|s| if s == 0 { Some(&mut grid) } else { None });
        assert_eq!(grid.scrollback_row(0).unwrap().cells[0].c, ' ');
    }

    #[test]
    fn copy_rect_overlap_forward_preserves_source() {
        let mut grid = Grid::new(1, 5, 0);
        for (i, c) in ['a', 'b', 'c', 'd', 'e'].into_iter().enumerate() {
            grid.set_cell(
                0,
                i as u16,
                Cell {
                    c,
                    ..Default::default()
                },
            );
        }
        // shift right by one: dst > src means copy back-to-front
        copy_rect(&mut grid, 0, 0, 0, 1, 1, 4);
        let chars: Vec<char> = grid.visible_row(0).cells.iter().map(|c| c.c).collect();
        assert_eq!(chars, vec!['a', 'a', 'b', 'c', 'd']);
    }
}
