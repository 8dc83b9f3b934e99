//! # Layout
//!
//! One recursive pass per call, rooted at any view:
//!
//! 1. Match-parent dimensions take the parent's size minus its padding.
//! 2. Children are laid out in order and their rects unioned.
//! 3. Wrap-content dimensions adopt the union as their content size.
//! 4. The view must have a measured width or height by now.
//! 5. The horizontal rule, then the vertical rule, place the view against
//!    its alignment target.
//! 6. Scroll views re-derive their indicator.
//!
//! Children are placed before their own rules run, so a view may only
//! align to its parent or to siblings that come earlier in the child list.

use rice_core::{Insets, LayoutError, Rect};

use crate::view::{
    HorizontalPosition, HorizontalRule, MeasureFlags, SizeType, VerticalPosition, VerticalRule,
    ViewId, ViewTree,
};

/// What to do when a match-parent view is reached before its parent has
/// a measured size on that axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Fail the pass with [`LayoutError::ParentNotMeasured`].
    Strict,
    /// Log a warning and leave that view's branch untouched.
    Lenient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    pub ordering: OrderingPolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            ordering: if cfg!(debug_assertions) {
                OrderingPolicy::Strict
            } else {
                OrderingPolicy::Lenient
            },
        }
    }
}

/// The geometry one rule needs from a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub rect: Rect,
    pub padding: Insets,
    pub content_width: i32,
    pub content_height: i32,
}

impl Frame {
    /// Vertical center of the content box, relative to the rect's origin.
    fn content_center_y(&self) -> i32 {
        self.padding.top + self.content_height / 2
    }

    fn content_center_x(&self) -> i32 {
        self.padding.left + self.content_width / 2
    }
}

/// Offset that centers `me`'s content on a sibling's content, vertically.
fn sibling_dy(me: &Frame, t: &Frame) -> i32 {
    (t.rect.y + t.content_center_y()) - (me.rect.y + me.content_center_y())
}

fn sibling_dx(me: &Frame, t: &Frame) -> i32 {
    (t.rect.x + t.content_center_x()) - (me.rect.x + me.content_center_x())
}

/// Offset that centers `me`'s content inside the parent's content box.
fn parent_dy(me: &Frame, t: &Frame) -> i32 {
    t.content_center_y() - (me.rect.y + me.content_center_y())
}

fn parent_dx(me: &Frame, t: &Frame) -> i32 {
    t.content_center_x() - (me.rect.x + me.content_center_x())
}

/// New `(left, top)` for `me` under a horizontal rule against `t`.
pub fn place_horizontal(rule: HorizontalRule, me: &Frame, t: &Frame) -> (i32, i32) {
    use HorizontalRule as H;
    use VerticalPosition as V;

    let (mut left, mut top) = (me.rect.x, me.rect.y);
    let r = t.rect;
    let (w, h) = (me.rect.w, me.rect.h);
    match rule {
        H::None => {}
        H::LeftWith(pos) | H::RightWith(pos) => {
            left = if matches!(rule, H::LeftWith(_)) {
                r.x
            } else {
                r.x + r.w - w
            };
            match pos {
                V::Top => top = r.y - h,
                V::Bottom => top = r.y + r.h,
                V::Center => top += sibling_dy(me, t),
                V::Unset => {}
            }
        }
        H::LeftOf(pos) | H::RightOf(pos) => {
            left = if matches!(rule, H::LeftOf(_)) {
                r.x - w
            } else {
                r.x + r.w
            };
            match pos {
                V::Top => top = r.y,
                V::Center => top += sibling_dy(me, t),
                V::Bottom => top = r.y + r.h,
                V::Unset => {}
            }
        }
        H::ParentLeft(pos) | H::ParentRight(pos) => {
            left = if matches!(rule, H::ParentLeft(_)) {
                t.padding.left
            } else {
                r.w - t.padding.right - w
            };
            match pos {
                V::Top => top = t.padding.top,
                V::Center => top += parent_dy(me, t),
                V::Bottom => top = r.h - t.padding.bottom - h,
                V::Unset => {}
            }
        }
        H::ParentCenter => left += parent_dx(me, t),
    }
    (left, top)
}

/// New `(left, top)` for `me` under a vertical rule against `t`.
pub fn place_vertical(rule: VerticalRule, me: &Frame, t: &Frame) -> (i32, i32) {
    use HorizontalPosition as P;
    use VerticalRule as V;

    let (mut left, mut top) = (me.rect.x, me.rect.y);
    let r = t.rect;
    let (w, h) = (me.rect.w, me.rect.h);
    match rule {
        V::None => {}
        V::TopWith(pos) | V::BottomWith(pos) => {
            top = if matches!(rule, V::TopWith(_)) {
                r.y
            } else {
                r.y + r.h - h
            };
            match pos {
                P::Left => left = r.x - w,
                P::Right => left = r.x + r.w,
                P::Center => left += sibling_dx(me, t),
                P::Unset => {}
            }
        }
        V::Above(pos) | V::Below(pos) => {
            top = if matches!(rule, V::Above(_)) {
                r.y - h
            } else {
                r.y + r.h
            };
            match pos {
                P::Left => left = r.x,
                P::Center => left += sibling_dx(me, t),
                P::Right => left = r.x + r.w,
                P::Unset => {}
            }
        }
        V::ParentTop(pos) | V::ParentBottom(pos) => {
            top = if matches!(rule, V::ParentTop(_)) {
                t.padding.top
            } else {
                r.h - t.padding.bottom - h
            };
            match pos {
                P::Left => left = t.padding.left,
                P::Center => left += parent_dx(me, t),
                P::Right => left = r.w - t.padding.right - w,
                P::Unset => {}
            }
        }
        V::ParentCenter => top += parent_dy(me, t),
    }
    (left, top)
}

enum Pulled {
    Done,
    Skipped,
}

impl ViewTree {
    /// Lays out the subtree rooted at `id` with the tree's options.
    pub fn layout(&mut self, id: ViewId) -> Result<(), LayoutError> {
        let options = *self.options();
        self.layout_with(id, &options)
    }

    pub fn layout_with(&mut self, id: ViewId, options: &LayoutOptions) -> Result<(), LayoutError> {
        if let Pulled::Skipped = self.pull_parent_size(id, options)? {
            return Ok(());
        }

        let children: Vec<ViewId> = self.get(id)?.children.to_vec();
        if !children.is_empty() {
            let mut area = Rect::default();
            for child in children {
                self.layout_with(child, options)?;
                area.union_with(&self.get(child)?.rect);
            }
            let node = self.get(id)?;
            let (wt, ht) = (node.width_type, node.height_type);
            if wt == SizeType::WrapContent {
                self.set_content_width(id, area.w);
            }
            if ht == SizeType::WrapContent {
                self.set_content_height(id, area.h);
            }
        }

        if self.get(id)?.measured.is_empty() {
            return Err(LayoutError::Unmeasured(format!("{id:?}")));
        }

        self.align(id)?;
        self.update_scroll(id);
        Ok(())
    }

    fn pull_parent_size(&mut self, id: ViewId, options: &LayoutOptions) -> Result<Pulled, LayoutError> {
        let node = self.get(id)?;
        let (wt, ht) = (node.width_type, node.height_type);
        let Some(parent) = node.parent else {
            return Ok(Pulled::Done);
        };
        if wt != SizeType::MatchParent && ht != SizeType::MatchParent {
            return Ok(Pulled::Done);
        }
        let p = self.get(parent)?;
        let (p_rect, p_pad, p_measured) = (p.rect, p.padding, p.measured);
        let axes = [
            (wt, p.width_type, MeasureFlags::WIDTH),
            (ht, p.height_type, MeasureFlags::HEIGHT),
        ];
        for (own, parents, flag) in axes {
            if own != SizeType::MatchParent {
                continue;
            }
            if parents == SizeType::WrapContent {
                return Err(LayoutError::MatchParentInWrapParent(format!("{id:?}")));
            }
            if !p_measured.contains(flag) {
                match options.ordering {
                    OrderingPolicy::Strict => {
                        return Err(LayoutError::ParentNotMeasured(format!("{id:?}")));
                    }
                    OrderingPolicy::Lenient => {
                        log::warn!("layout: parent of {id:?} not measured yet, skipping");
                        return Ok(Pulled::Skipped);
                    }
                }
            }
        }
        if wt == SizeType::MatchParent {
            self.set_width(id, (p_rect.w - p_pad.horizontal()).max(0));
        }
        if ht == SizeType::MatchParent {
            self.set_height(id, (p_rect.h - p_pad.vertical()).max(0));
        }
        Ok(Pulled::Done)
    }

    pub(crate) fn frame(&self, id: ViewId) -> Option<Frame> {
        self.node(id).map(|n| Frame {
            rect: n.rect,
            padding: n.padding,
            content_width: n.content_width,
            content_height: n.content_height,
        })
    }

    fn align(&mut self, id: ViewId) -> Result<(), LayoutError> {
        let node = self.get(id)?;
        let (h_rule, v_rule) = (node.h_rule, node.v_rule);
        if h_rule == HorizontalRule::None && v_rule == VerticalRule::None {
            return Ok(());
        }
        let Some(target) = node.align_target else {
            return Err(LayoutError::MissingAlignTarget(format!("{id:?}")));
        };
        let t = self
            .frame(target)
            .ok_or_else(|| LayoutError::MissingAlignTarget(format!("{id:?}")))?;
        let mut me = self.frame(id).unwrap_or_default();

        let (left, top) = place_horizontal(h_rule, &me, &t);
        me.rect.move_to(left, top);
        let (left, top) = place_vertical(v_rule, &me, &t);
        self.move_to(id, left, top);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: i32, y: i32, w: i32, h: i32, pad: i32) -> Frame {
        Frame {
            rect: Rect::new(x, y, w, h),
            padding: Insets::uniform(pad),
            content_width: w - 2 * pad,
            content_height: h - 2 * pad,
        }
    }

    #[test]
    fn test_sibling_rules() {
        let t = frame(10, 20, 30, 40, 0);
        let me = frame(0, 0, 6, 8, 0);
        assert_eq!(place_horizontal(HorizontalRule::RightOf(VerticalPosition::Top), &me, &t), (40, 20));
        assert_eq!(place_horizontal(HorizontalRule::LeftOf(VerticalPosition::Bottom), &me, &t), (4, 60));
        assert_eq!(place_horizontal(HorizontalRule::LeftWith(VerticalPosition::Top), &me, &t), (10, 12));
        assert_eq!(place_horizontal(HorizontalRule::RightWith(VerticalPosition::Unset), &me, &t), (34, 0));
        assert_eq!(place_vertical(VerticalRule::Below(HorizontalPosition::Right), &me, &t), (40, 60));
        assert_eq!(place_vertical(VerticalRule::Above(HorizontalPosition::Left), &me, &t), (10, 12));
        assert_eq!(place_vertical(VerticalRule::TopWith(HorizontalPosition::Left), &me, &t), (4, 20));
        assert_eq!(place_vertical(VerticalRule::BottomWith(HorizontalPosition::Unset), &me, &t), (0, 52));
    }

    #[test]
    fn test_sibling_centering() {
        let t = frame(10, 20, 30, 40, 0);
        let me = frame(0, 0, 6, 8, 0);
        // Content centers line up: 20 + 20 == top + 4.
        assert_eq!(place_horizontal(HorizontalRule::RightOf(VerticalPosition::Center), &me, &t), (40, 36));
        assert_eq!(place_vertical(VerticalRule::Below(HorizontalPosition::Center), &me, &t), (22, 60));
    }

    #[test]
    fn test_parent_rules_use_padding() {
        let t = frame(0, 0, 100, 50, 5);
        let me = frame(0, 0, 10, 10, 0);
        assert_eq!(place_horizontal(HorizontalRule::ParentLeft(VerticalPosition::Top), &me, &t), (5, 5));
        assert_eq!(place_horizontal(HorizontalRule::ParentRight(VerticalPosition::Bottom), &me, &t), (85, 35));
        assert_eq!(place_vertical(VerticalRule::ParentBottom(HorizontalPosition::Right), &me, &t), (85, 35));
        assert_eq!(place_horizontal(HorizontalRule::ParentCenter, &me, &t), (45, 0));
        assert_eq!(place_vertical(VerticalRule::ParentCenter, &me, &t), (0, 20));
    }

    #[test]
    fn test_parent_center_is_relative_to_current_position() {
        let t = frame(0, 0, 100, 50, 0);
        let me = frame(7, 3, 10, 10, 0);
        assert_eq!(place_horizontal(HorizontalRule::ParentCenter, &me, &t), (45, 3));
    }

    #[test]
    fn test_children_override_explicit_wrap_content_size() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(100, 100);
        let boxed = tree.create();
        tree.add_child(root, boxed);
        tree.set_alignment(
            boxed,
            Some(root),
            SizeType::WrapContent,
            SizeType::WrapContent,
            HorizontalRule::None,
            VerticalRule::None,
        )
        .unwrap();
        tree.set_padding(boxed, Insets::uniform(2));
        tree.set_content_size(boxed, 40, 30);
        assert_eq!(tree.rect(boxed), Rect::new(0, 0, 44, 34));

        let child = tree.create_sized(10, 5);
        tree.add_child(boxed, child);
        tree.layout(root).unwrap();
        // The content size set up front is replaced by the children's union.
        let n = tree.node(boxed).unwrap();
        assert_eq!((n.content_width(), n.content_height()), (10, 5));
        assert_eq!(tree.rect(boxed), Rect::new(0, 0, 14, 9));
    }
}
