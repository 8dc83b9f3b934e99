//! # Scroll views
//!
//! A [`ScrollView`] is a fixed viewport holding two children: a content
//! container that matches the viewport's width and wraps its content's
//! height, and a thin indicator pinned to the right edge.
//!
//! The scroll offset is the content container's top relative to the
//! viewport's padding box, always in `[viewport - content, 0]`. The
//! indicator is only visible while the content is taller than the viewport
//! and its height and position scale by `viewport / content`.
//!
//! ```rust
//! use rice_ui::*;
//!
//! let mut tree = ViewTree::new();
//! let scroll = ScrollView::new(&mut tree, 100, 50);
//! let tall = tree.create_sized(100, 200);
//! tree.add_child(scroll.content(), tall);
//! tree.layout(scroll.id()).unwrap();
//!
//! scroll.scroll_y_by(&mut tree, -500);
//! assert_eq!(scroll.offset(&tree), -150);
//! ```

use rice_core::{Image, Rect};

use crate::content::Content;
use crate::theme::{SCROLL_INDICATOR_WIDTH, scroll_indicator_pixels};
use crate::view::{
    HorizontalPosition, HorizontalRule, SizeType, VerticalPosition, VerticalRule, ViewId, ViewNode,
    ViewTree,
};

/// Smallest indicator height: an odd number of pixels at least the width.
pub const SCROLL_INDICATOR_MIN_HEIGHT: i32 = ((SCROLL_INDICATOR_WIDTH >> 1) << 1) + 1;

/// Scroll bookkeeping stored on the viewport view.
#[derive(Clone, Debug)]
pub struct ScrollState {
    pub(crate) content: ViewId,
    pub(crate) indicator: ViewId,
    pub(crate) offset: i32,
    pub(crate) indicator_top: i32,
    pub(crate) ratio: f32,
}

impl ScrollState {
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }
}

/// Handle to a scroll view; the state itself lives in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollView {
    root: ViewId,
    content: ViewId,
    indicator: ViewId,
}

impl ScrollView {
    /// Creates a detached `width x height` viewport.
    pub fn new(tree: &mut ViewTree, width: i32, height: i32) -> Self {
        let content = tree.create();
        let indicator = tree.create_image(None, None);
        let root = tree.insert(ViewNode::new(
            "Scroll",
            Content::Scroll(ScrollState {
                content,
                indicator,
                offset: 0,
                indicator_top: 0,
                ratio: 1.0,
            }),
        ));
        tree.set_size(root, width, height);

        tree.add_child(root, content);
        if let Err(e) = tree.set_alignment(
            content,
            Some(root),
            SizeType::MatchParent,
            SizeType::WrapContent,
            HorizontalRule::ParentLeft(VerticalPosition::Top),
            VerticalRule::None,
        ) {
            log::error!("scroll view: content alignment rejected: {e}");
        }

        tree.add_child(root, indicator);
        tree.set_size(indicator, SCROLL_INDICATOR_WIDTH, SCROLL_INDICATOR_MIN_HEIGHT);
        if let Err(e) = tree.set_alignment(
            indicator,
            Some(root),
            SizeType::Fixed,
            SizeType::Fixed,
            HorizontalRule::ParentRight(VerticalPosition::Unset),
            VerticalRule::None,
        ) {
            log::error!("scroll view: indicator alignment rejected: {e}");
        }
        tree.set_visible(indicator, false);

        Self {
            root,
            content,
            indicator,
        }
    }

    /// The viewport view.
    pub fn id(&self) -> ViewId {
        self.root
    }

    /// Container for the scrolled children.
    pub fn content(&self) -> ViewId {
        self.content
    }

    pub fn indicator(&self) -> ViewId {
        self.indicator
    }

    pub fn offset(&self, tree: &ViewTree) -> i32 {
        self.state(tree).map_or(0, |s| s.offset)
    }

    fn state<'a>(&self, tree: &'a ViewTree) -> Option<&'a ScrollState> {
        match tree.node(self.root)?.content() {
            Content::Scroll(s) => Some(s),
            _ => None,
        }
    }

    fn state_mut<'a>(&self, tree: &'a mut ViewTree) -> Option<&'a mut ScrollState> {
        match &mut tree.node_mut(self.root)?.content {
            Content::Scroll(s) => Some(s),
            _ => None,
        }
    }

    /// Moves the content by `distance` pixels, clamped so the content never
    /// leaves a gap. Does nothing when the content fits.
    pub fn scroll_y_by(&self, tree: &mut ViewTree, distance: i32) {
        let viewport = tree.rect(self.root).h - tree.node(self.root).map_or(0, |n| n.padding().vertical());
        let min = viewport - tree.rect(self.content).h;
        if distance == 0 || min >= 0 {
            return;
        }
        let Some(state) = self.state_mut(tree) else {
            return;
        };
        state.offset = (state.offset + distance).clamp(min, 0);
        state.indicator_top = (-state.offset as f32 * state.ratio) as i32;
        log::trace!("scroll {:?} offset {}", self.root, state.offset);
        tree.apply_scroll_positions(self.root);
    }

    /// Scrolls by the smallest distance that brings `rect` (in screen
    /// coordinates) fully into the viewport, top edge first.
    pub fn scroll_to_rect(&self, tree: &mut ViewTree, rect: Rect) {
        let view = tree.screen_rect(self.root);
        let delta = if view.y > rect.y {
            view.y - rect.y
        } else if view.bottom() < rect.bottom() {
            view.bottom() - rect.bottom()
        } else {
            0
        };
        self.scroll_y_by(tree, delta);
    }

    pub fn reset_scroll_position(&self, tree: &mut ViewTree) {
        if let Some(state) = self.state_mut(tree) {
            state.offset = 0;
            state.indicator_top = 0;
        }
        tree.apply_scroll_positions(self.root);
    }
}

impl ViewTree {
    /// Post-layout step for scroll views: re-derives the ratio, the
    /// indicator's visibility and height, and re-applies the offset.
    pub(crate) fn update_scroll(&mut self, id: ViewId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let Content::Scroll(state) = &node.content else {
            return;
        };
        let (content, indicator) = (state.content, state.indicator);
        let viewport = node.rect.h - node.padding.vertical();
        let content_h = self.rect(content).h;

        let ratio = if content_h > 0 {
            viewport as f32 / content_h as f32
        } else {
            1.0
        };
        let overflow = content_h > viewport;
        if overflow {
            let height = ((viewport as f32 * ratio) as i32).max(SCROLL_INDICATOR_MIN_HEIGHT);
            if self.rect(indicator).h != height || self.image(indicator).is_none() {
                self.set_height(indicator, height);
                let pixels = scroll_indicator_pixels(SCROLL_INDICATOR_WIDTH, height);
                match Image::from_argb(SCROLL_INDICATOR_WIDTH as u32, height as u32, pixels) {
                    Ok(img) => self.update_image(indicator, Some(img)),
                    Err(e) => log::error!("scroll indicator image: {e}"),
                }
            }
        }
        self.set_visible(indicator, overflow);

        if let Some(Content::Scroll(state)) = self.node_mut(id).map(|n| &mut n.content) {
            let min = (viewport - content_h).min(0);
            state.ratio = ratio;
            state.offset = state.offset.clamp(min, 0);
            state.indicator_top = (-state.offset as f32 * ratio) as i32;
        }
        self.apply_scroll_positions(id);
    }

    fn apply_scroll_positions(&mut self, id: ViewId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let Content::Scroll(state) = &node.content else {
            return;
        };
        let pad_top = node.padding.top;
        let (content, indicator) = (state.content, state.indicator);
        let (offset, indicator_top) = (state.offset, state.indicator_top);
        self.set_top(content, pad_top + offset);
        self.set_top(indicator, pad_top + indicator_top);
    }
}
