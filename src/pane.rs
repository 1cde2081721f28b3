//! Binary pane tree: leaves reference sessions by index, splits hold two
//! children plus an orientation and ratio.
//!
//! Grounded in the teacher's tmux integration — `tmux/parser.rs`'s
//! `LayoutNode` (leaf-vs-split recursive shape, `collect_leaf_panes`) and
//! `tmux/controller.rs`'s `layout_node_to_tree`, which already solve the
//! same problem (turning a tree description into absolute pane geometry)
//! for tmux's own pane layout strings. Referencing sessions by index
//! rather than by pointer/`Rc` keeps the tree free of lifetime
//! entanglement with the session table, matching the "Pane↔session
//! index-based references" design note.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Cached absolute geometry for a pane, recomputed on every
/// resize-propagate walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

pub enum Pane {
    Leaf {
        session_index: usize,
        geometry: Rect,
    },
    Split {
        orientation: Orientation,
        /// Fraction of the split owned by the first child, in [0.0, 1.0].
        ratio: f32,
        first: Box<Pane>,
        second: Box<Pane>,
        geometry: Rect,
    },
}

impl Pane {
    pub fn leaf(session_index: usize) -> Self {
        Pane::Leaf {
            session_index,
            geometry: Rect::default(),
        }
    }

    pub fn geometry(&self) -> Rect {
        match self {
            Pane::Leaf { geometry, .. } => *geometry,
            Pane::Split { geometry, .. } => *geometry,
        }
    }

    /// Recompute `geometry` for this pane and every descendant, given the
    /// rectangle this pane now occupies.
    pub fn layout(&mut self, rect: Rect) {
        match self {
            Pane::Leaf { geometry, .. } => *geometry = rect,
            Pane::Split {
                orientation,
                ratio,
                first,
                second,
                geometry,
            } => {
                *geometry = rect;
                let ratio = ratio.clamp(0.0, 1.0);
                match orientation {
                    Orientation::Horizontal => {
                        let split_w = ((rect.w as f32) * ratio).round() as u16;
                        first.layout(Rect {
                            x: rect.x,
                            y: rect.y,
                            w: split_w,
                            h: rect.h,
                        });
                        second.layout(Rect {
                            x: rect.x + split_w,
                            y: rect.y,
                            w: rect.w.saturating_sub(split_w),
                            h: rect.h,
                        });
                    }
                    Orientation::Vertical => {
                        let split_h = ((rect.h as f32) * ratio).round() as u16;
                        first.layout(Rect {
                            x: rect.x,
                            y: rect.y,
                            w: rect.w,
                            h: split_h,
                        });
                        second.layout(Rect {
                            x: rect.x,
                            y: rect.y + split_h,
                            w: rect.w,
                            h: rect.h.saturating_sub(split_h),
                        });
                    }
                }
            }
        }
    }

    /// Find the leaf holding `session_index` and split it in place,
    /// replacing it with a `Split` whose first child is the original leaf
    /// and whose second child is a new leaf for `new_session_index`.
    /// Returns `false` if no such leaf exists.
    pub fn split(
        &mut self,
        target_session: usize,
        new_session_index: usize,
        orientation: Orientation,
        ratio: f32,
    ) -> bool {
        match self {
            Pane::Leaf { session_index, .. } if *session_index == target_session => {
                let original = std::mem::replace(self, Pane::leaf(new_session_index));
                *self = Pane::Split {
                    orientation,
                    ratio,
                    first: Box::new(original),
                    second: Box::new(Pane::leaf(new_session_index)),
                    geometry: Rect::default(),
                };
                true
            }
            Pane::Leaf { .. } => false,
            Pane::Split { first, second, .. } => {
                first.split(target_session, new_session_index, orientation, ratio)
                    || second.split(target_session, new_session_index, orientation, ratio)
            }
        }
    }

    /// Remove the leaf for `target_session`. A `Split` whose direct child
    /// is that leaf collapses into its surviving sibling; the caller
    /// handles the degenerate case of `target_session` being the tree's
    /// sole remaining leaf (nothing to collapse into). Returns the
    /// removed session index alongside the (possibly collapsed) subtree.
    pub fn close(self, target_session: usize) -> (Option<usize>, Pane) {
        match self {
            Pane::Leaf { .. } => (None, self),
            Pane::Split {
                orientation,
                ratio,
                first,
                second,
                geometry,
            } => {
                if let Pane::Leaf { session_index, .. } = *first {
                    if session_index == target_session {
                        return (Some(session_index), *second);
                    }
                }
                if let Pane::Leaf { session_index, .. } = *second {
                    if session_index == target_session {
                        return (Some(session_index), *first);
                    }
                }

                let (removed, new_first) = first.close(target_session);
                if removed.is_some() {
                    return (
                        removed,
                        Pane::Split {
                            orientation,
                            ratio,
                            first: Box::new(new_first),
                            second,
                            geometry,
                        },
                    );
                }
                let (removed, new_second) = second.close(target_session);
                (
                    removed,
                    Pane::Split {
                        orientation,
                        ratio,
                        first,
                        second: Box::new(new_second),
                        geometry,
                    },
                )
            }
        }
    }

    /// Collect every leaf's session index, in tree order.
    pub fn leaf_sessions(&self, out: &mut Vec<usize>) {
        match self {
            Pane::Leaf { session_index, .. } => out.push(*session_index),
            Pane::Split { first, second, .. } => {
                first.leaf_sessions(out);
                second.leaf_sessions(out);
            }
        }
    }

    /// Collect every leaf's session index alongside its own last-computed
    /// `geometry`, in tree order. Callers resizing sessions after `layout`
    /// must use this rather than `leaf_sessions` plus the terminal's full
    /// dimensions — a split leaf's rect is almost never the whole terminal.
    pub fn leaf_geometries(&self, out: &mut Vec<(usize, Rect)>) {
        match self {
            Pane::Leaf { session_index, geometry } => out.push((*session_index, *geometry)),
            Pane::Split { first, second, .. } => {
                first.leaf_geometries(out);
                second.leaf_geometries(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_splits_horizontally_by_ratio() {
        let mut root = Pane::leaf(0);
        root.split(0, 1, Orientation::Horizontal, 0.5);
        root.layout(Rect { x: 0, y: 0, w: 100, h: 40 });

        let mut sessions = Vec::new();
        root.leaf_sessions(&mut sessions);
        assert_eq!(sessions, vec![0, 1]);

        if let Pane::Split { first, second, .. } = &root {
            assert_eq!(first.geometry().w, 50);
            assert_eq!(second.geometry().w, 50);
            assert_eq!(second.geometry().x, 50);
        } else {
            panic!("expected split");
        }
    }

    #[test]
    fn leaf_geometries_reports_each_leafs_own_rect() {
        let mut root = Pane::leaf(0);
        root.split(0, 1, Orientation::Horizontal, 0.5);
        root.layout(Rect { x: 0, y: 0, w: 100, h: 40 });

        let mut geometries = Vec::new();
        root.leaf_geometries(&mut geometries);
        assert_eq!(geometries, vec![(0, Rect { x: 0, y: 0, w: 50, h: 40 }), (1, Rect { x: 50, y: 0, w: 50, h: 40 })]);
    }

    #[test]
    fn split_on_missing_session_is_noop() {
        let mut root = Pane::leaf(0);
        assert!(!root.split(7, 1, Orientation::Vertical, 0.5));
    }

    #[test]
    fn close_collapses_into_sibling() {
        let mut root = Pane::leaf(0);
        root.split(0, 1, Orientation::Horizontal, 0.5);
        let (removed, collapsed) = root.close(1);
        assert_eq!(removed, Some(1));
        let mut sessions = Vec::new();
        collapsed.leaf_sessions(&mut sessions);
        assert_eq!(sessions, vec![0]);
    }
}
