//! Ring-addressed screen model.
//!
//! Generalizes the teacher's `terminal::grid::Grid` (a `VecDeque<Row>` that
//! grows unboundedly and is trimmed from the front once over
//! `scrollback_limit`) into the fixed-capacity ring the spec's data model
//! calls for: `cols × (rows + scrollback_capacity)` cells addressed via a
//! `screen_head` index, so a full-screen scroll is an O(1) head advance
//! plus clearing the newly-exposed row rather than a `VecDeque` shuffle.
//! Margin-gated operations (insert/delete/erase within `[left, right]`,
//! scrolling within `[top, bottom]`) fall back to an in-place row shift
//! since only a full-width, full-height, no-margin scroll can use the
//! zero-copy ring-rotation path.

use crate::cell::Cell;
use crate::color::Color;

/// A single row of the ring buffer.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub dirty: bool,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            dirty: true,
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.dirty = true;
    }

    pub fn erase_with_bg(&mut self, bg: Color, respect_protected: bool) {
        for cell in &mut self.cells {
            cell.erase(bg, respect_protected);
        }
        self.dirty = true;
    }

    pub fn resize(&mut self, cols: u16) {
        let new_len = cols as usize;
        if self.cells.len() != new_len {
            self.cells.resize(new_len, Cell::default());
            self.dirty = true;
        }
    }
}

/// Per-session screen buffer: a ring of `buffer_rows` rows, the last
/// `rows_visible` of which (relative to `screen_head`) are the on-screen
/// viewport. `get_screen_cell(y, x)` computes into the ring via
/// `((screen_head + y) % buffer_rows) * cols + x` conceptually; this
/// implementation keeps `Row`s as `Vec<Cell>` rather than a single flat
/// `Vec<Cell>`, so the modular part alone is `(screen_head + y) %
/// buffer_rows` and indexing the row gives the `x` axis directly.
pub struct Grid {
    rows: Vec<Row>,
    pub cols: u16,
    pub rows_visible: u16,
    pub scrollback_capacity: usize,
    screen_head: usize,
}

impl Grid {
    pub fn new(rows_visible: u16, cols: u16, scrollback_capacity: usize) -> Self {
        let buffer_rows = rows_visible as usize + scrollback_capacity;
        let mut rows = Vec::with_capacity(buffer_rows);
        for _ in 0..buffer_rows {
            rows.push(Row::new(cols));
        }
        Self {
            rows,
            cols,
            rows_visible,
            scrollback_capacity,
            screen_head: 0,
        }
    }

    fn buffer_rows(&self) -> usize {
        self.rows.len()
    }

    /// Ring index for screen-relative row `y` (0 = top of viewport).
    fn ring_index(&self, y: u16) -> usize {
        (self.screen_head + y as usize) % self.buffer_rows()
    }

    pub fn visible_row(&self, y: u16) -> &Row {
        let idx = self.ring_index(y);
        &self.rows[idx]
    }

    pub fn visible_row_mut(&mut self, y: u16) -> &mut Row {
        let idx = self.ring_index(y);
        &mut self.rows[idx]
    }

    /// Scrollback row `n` above the viewport (0 = immediately above row 0).
    pub fn scrollback_row(&self, n: usize) -> Option<&Row> {
        if n >= self.scrollback_capacity {
            return None;
        }
        let idx = (self.screen_head + self.buffer_rows() - 1 - n) % self.buffer_rows();
        Some(&self.rows[idx])
    }

    pub fn set_cell(&mut self, row: u16, col: u16, cell: Cell) {
        if col < self.cols && row < self.rows_visible {
            let r = self.visible_row_mut(row);
            r.cells[col as usize] = cell;
            r.dirty = true;
        }
    }

    /// Scroll the rectangular region `[top, bottom] x [left, right]` up by
    /// one line: row `top` is discarded (or, for a full-width/full-height
    /// unmargined region, promoted to scrollback via ring rotation), every
    /// other row in the region shifts up, and a blank line fills `bottom`.
    pub fn scroll_up_region(
        &mut self,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        bg: Color,
    ) {
        if top > bottom || bottom >= self.rows_visible {
            return;
        }

        let full_width = left == 0 && right + 1 >= self.cols;
        let full_height = top == 0 && bottom + 1 == self.rows_visible;

        if full_width && full_height {
            self.screen_head = (self.screen_head + 1) % self.buffer_rows();
            let new_bottom = self.visible_row_mut(bottom);
            new_bottom.clear();
            new_bottom.dirty = true;
            return;
        }

        for y in top..bottom {
            let (src, dst) = (y + 1, y);
            self.copy_row_range(src, dst, left, right);
        }
        let last = self.visible_row_mut(bottom);
        for x in left..=right.min(self.cols.saturating_sub(1)) {
            last.cells[x as usize] = Cell::default_with_bg(bg);
        }
        last.dirty = true;
    }

    /// Scroll the rectangular region down by one line: row `bottom` is
    /// discarded, every other row shifts down, `top` is blanked.
    pub fn scroll_down_region(
        &mut self,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        bg: Color,
    ) {
        if top > bottom || bottom >= self.rows_visible {
            return;
        }

        let mut y = bottom;
        while y > top {
            self.copy_row_range(y - 1, y, left, right);
            y -= 1;
        }
        let first = self.visible_row_mut(top);
        for x in left..=right.min(self.cols.saturating_sub(1)) {
            first.cells[x as usize] = Cell::default_with_bg(bg);
        }
        first.dirty = true;
    }

    fn copy_row_range(&mut self, src: u16, dst: u16, left: u16, right: u16) {
        let src_idx = self.ring_index(src);
        let dst_idx = self.ring_index(dst);
        if src_idx == dst_idx {
            return;
        }
        let right = right.min(self.cols.saturating_sub(1)) as usize;
        let left = left as usize;
        let (lo, hi) = if src_idx < dst_idx {
            (src_idx, dst_idx)
        } else {
            (dst_idx, src_idx)
        };
        let (first, second) = self.rows.split_at_mut(hi);
        let (src_row, dst_row) = if src_idx < dst_idx {
            (&first[lo], &mut second[0])
        } else {
            (&second[0], &mut first[lo])
        };
        dst_row.cells[left..=right].clone_from_slice(&src_row.cells[left..=right]);
        dst_row.dirty = true;
    }

    /// Erase `[start_col, end_col)` on `row`, honoring protected cells when
    /// `respect_protected` is set.
    pub fn erase_cells(
        &mut self,
        row: u16,
        start_col: u16,
        end_col: u16,
        bg: Color,
        respect_protected: bool,
    ) {
        if row >= self.rows_visible {
            return;
        }
        let r = self.visible_row_mut(row);
        let start = start_col as usize;
        let end = (end_col as usize).min(r.cells.len());
        for i in start..end {
            r.cells[i].erase(bg, respect_protected);
        }
        r.dirty = true;
    }

    /// Insert `count` blank cells at `col` within `[left, right]`, shifting
    /// cells in that margin range right; cells pushed past `right` are
    /// discarded.
    pub fn insert_cells(&mut self, row: u16, col: u16, count: u16, left: u16, right: u16) {
        if row >= self.rows_visible {
            return;
        }
        let r = self.visible_row_mut(row);
        let right = (right as usize).min(r.cells.len().saturating_sub(1));
        let left = left as usize;
        let col = (col as usize).max(left).min(right + 1);
        let count = (count as usize).min(right + 1 - col);

        for _ in 0..count {
            if right < r.cells.len() {
                r.cells.remove(right);
                r.cells.insert(col, Cell::default());
            }
        }
        r.dirty = true;
    }

    /// Delete `count` cells at `col` within `[left, right]`, shifting
    /// remaining margin-range cells left and filling the vacated tail with
    /// blanks.
    pub fn delete_cells(&mut self, row: u16, col: u16, count: u16, left: u16, right: u16) {
        if row >= self.rows_visible {
            return;
        }
        let r = self.visible_row_mut(row);
        let right = (right as usize).min(r.cells.len().saturating_sub(1));
        let left = left as usize;
        let col = (col as usize).max(left).min(right + 1);
        let count = (count as usize).min(right + 1 - col);

        for _ in 0..count {
            if col <= right && col < r.cells.len() {
                r.cells.remove(col);
                r.cells.insert(right, Cell::default());
            }
        }
        r.dirty = true;
    }

    /// Resize preserving content (primary screen behavior): shrinking rows
    /// pushes overflow into scrollback rather than discarding it; growing
    /// rows pulls blank rows into the viewport.
    pub fn resize(&mut self, new_rows: u16, new_cols: u16) {
        for row in &mut self.rows {
            row.resize(new_cols);
        }

        if new_rows > self.rows_visible {
            let needed = (new_rows - self.rows_visible) as usize;
            let buffer_rows = self.buffer_rows();
            for _ in 0..needed.min(buffer_rows) {
                self.screen_head = (self.screen_head + buffer_rows - 1) % buffer_rows;
            }
        }

        self.rows_visible = new_rows;
        self.cols = new_cols;
        self.mark_all_dirty();
    }

    /// Resize discarding content entirely (alternate screen behavior: TUIs
    /// always repaint from scratch after SIGWINCH, so there's no value in
    /// carrying stale cells into a new geometry).
    pub fn resize_no_scrollback(&mut self, new_rows: u16, new_cols: u16) {
        let buffer_rows = new_rows as usize + self.scrollback_capacity;
        self.rows = (0..buffer_rows).map(|_| Row::new(new_cols)).collect();
        self.rows_visible = new_rows;
        self.cols = new_cols;
        self.screen_head = 0;
        self.mark_all_dirty();
    }

    pub fn mark_all_dirty(&mut self) {
        for y in 0..self.rows_visible {
            self.visible_row_mut(y).dirty = true;
        }
    }

    /// Wipe every row outside the current viewport, leaving the on-screen
    /// `rows_visible` rows untouched (DECSED `Ps=3`: erase scrollback only).
    pub fn clear_scrollback(&mut self) {
        let buffer_rows = self.buffer_rows();
        let rows_visible = self.rows_visible as usize;
        for idx in 0..buffer_rows {
            let offset = (idx + buffer_rows - self.screen_head) % buffer_rows;
            if offset >= rows_visible {
                self.rows[idx].clear();
            }
        }
    }

    pub fn clear_viewport(&mut self, bg: Color, respect_protected: bool) {
        for y in 0..self.rows_visible {
            self.visible_row_mut(y).erase_with_bg(bg, respect_protected);
        }
    }
}

impl Cell {
    fn default_with_bg(bg: Color) -> Self {
        let mut cell = Cell::default();
        cell.bg = bg;
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_scroll_is_ring_rotation() {
        let mut grid = Grid::new(3, 4, 10);
        grid.set_cell(
            0,
            0,
            Cell {
                c: 'A',
                ..Default::default()
            },
        );
        grid.scroll_up_region(0, 2, 0, 3, Color::Default);
        assert_eq!(grid.visible_row(2).cells[0].c, ' ');
        assert_eq!(grid.scrollback_row(0).unwrap().cells[0].c, 'A');
    }

    #[test]
    fn clear_scrollback_preserves_viewport() {
        let mut grid = Grid::new(2, 3, 5);
        grid.set_cell(
            0,
            0,
            Cell {
                c: 'A',
                ..Default::default()
            },
        );
        grid.scroll_up_region(0, 1, 0, 2, Color::Default);
        assert_eq!(grid.scrollback_row(0).unwrap().cells[0].c, 'A');

        grid.set_cell(
            1,
            0,
            Cell {
                c: 'B',
                ..Default::default()
            },
        );
        grid.clear_scrollback();
        assert_eq!(grid.scrollback_row(0).unwrap().cells[0].c, ' ');
        assert_eq!(grid.visible_row(1).cells[0].c, 'B');
    }

    #[test]
    fn margin_scroll_does_not_touch_outside_columns() {
        let mut grid = Grid::new(2, 5, 0);
        grid.set_cell(
            0,
            0,
            Cell {
                c: 'X',
                ..Default::default()
            },
        );
        grid.set_cell(
            0,
            2,
            Cell {
                c: 'Y',
                ..Default::default()
            },
        );
        grid.scroll_up_region(0, 1, 1, 3, Color::Default);
        assert_eq!(grid.visible_row(0).cells[0].c, 'X', "column 0 outside margin untouched");
    }

    #[test]
    fn erase_respects_protection() {
        let mut grid = Grid::new(1, 3, 0);
        let mut protected = Cell::default();
        protected.flags = crate::cell::CellFlags::PROTECTED;
        grid.set_cell(0, 1, protected);
        grid.erase_cells(0, 0, 3, Color::Default, true);
        assert_eq!(grid.visible_row(0).cells[1].flags, crate::cell::CellFlags::PROTECTED);
    }

    #[test]
    fn insert_cells_shifts_within_margin_only() {
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
        grid.insert_cells(0, 1, 1, 0, 4);
        let chars: Vec<char> = grid.visible_row(0).cells.iter().map(|c| c.c).collect();
        assert_eq!(chars, vec!['a', ' ', 'b', 'c', 'd']);
    }
}
