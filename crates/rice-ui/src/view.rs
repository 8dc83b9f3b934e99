//! The retained view tree.
//!
//! Views live in a [`ViewTree`] arena and are addressed by [`ViewId`]. A
//! view's rect is relative to its parent's outer origin; padding sits inside
//! the rect and the content box sits inside the padding.
//!
//! Alignment targets are plain ids. When a target is destroyed the id simply
//! stops resolving and the next layout pass reports it.

use bitflags::bitflags;
use rice_canvas::stretch_nine_patch;
use rice_core::{Image, Insets, LayoutError, Point, Rect};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::content::Content;
use crate::layout::LayoutOptions;

slotmap::new_key_type! {
    /// Handle to a view in a [`ViewTree`].
    pub struct ViewId;
}

/// How a dimension is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SizeType {
    /// Set explicitly, never touched by layout.
    #[default]
    Fixed,
    /// Content size plus padding.
    WrapContent,
    /// Parent size minus the parent's padding.
    MatchParent,
}

/// Vertical modifier of a horizontal rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalPosition {
    #[default]
    Unset,
    Top,
    Center,
    Bottom,
}

/// Horizontal modifier of a vertical rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalPosition {
    #[default]
    Unset,
    Left,
    Center,
    Right,
}

/// Horizontal placement relative to the alignment target.
///
/// The `*With` rules share an edge with a sibling, the `*Of` rules sit just
/// outside it and the `Parent*` rules sit inside the target's padding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalRule {
    #[default]
    None,
    LeftWith(VerticalPosition),
    RightWith(VerticalPosition),
    LeftOf(VerticalPosition),
    RightOf(VerticalPosition),
    ParentLeft(VerticalPosition),
    ParentRight(VerticalPosition),
    ParentCenter,
}

/// Vertical placement relative to the alignment target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalRule {
    #[default]
    None,
    TopWith(HorizontalPosition),
    BottomWith(HorizontalPosition),
    Above(HorizontalPosition),
    Below(HorizontalPosition),
    ParentTop(HorizontalPosition),
    ParentBottom(HorizontalPosition),
    ParentCenter,
}

/// What is drawn behind a view. Setting one kind replaces the others.
#[derive(Clone, Debug, Default)]
pub enum Background {
    #[default]
    None,
    /// ARGB fill. Alpha 0 draws nothing, alpha 255 overwrites.
    Color(u32),
    Image(Image),
    /// A nine-patch source and its current stretch for the content box.
    NinePatch { source: Image, stretched: Image },
}

bitflags! {
    /// Dimensions that have been decided since the view was created.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MeasureFlags: u8 {
        const WIDTH = 1 << 0;
        const HEIGHT = 1 << 1;
    }
}

#[derive(Debug)]
pub struct ViewNode {
    pub(crate) kind: &'static str,
    pub(crate) rect: Rect,
    pub(crate) padding: Insets,
    pub(crate) min_padding: Insets,
    pub(crate) width_type: SizeType,
    pub(crate) height_type: SizeType,
    pub(crate) align_target: Option<ViewId>,
    pub(crate) h_rule: HorizontalRule,
    pub(crate) v_rule: VerticalRule,
    pub(crate) background: Background,
    pub(crate) content_width: i32,
    pub(crate) content_height: i32,
    pub(crate) children: SmallVec<[ViewId; 4]>,
    pub(crate) parent: Option<ViewId>,
    pub(crate) visible: bool,
    pub(crate) measured: MeasureFlags,
    pub(crate) content: Content,
}

impl ViewNode {
    pub(crate) fn new(kind: &'static str, content: Content) -> Self {
        Self {
            kind,
            rect: Rect::default(),
            padding: Insets::ZERO,
            min_padding: Insets::ZERO,
            width_type: SizeType::Fixed,
            height_type: SizeType::Fixed,
            align_target: None,
            h_rule: HorizontalRule::None,
            v_rule: VerticalRule::None,
            background: Background::None,
            content_width: 0,
            content_height: 0,
            children: SmallVec::new(),
            parent: None,
            visible: true,
            measured: MeasureFlags::empty(),
            content,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Rect relative to the parent's outer origin.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn left(&self) -> i32 {
        self.rect.x
    }

    pub fn top(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.w
    }

    pub fn height(&self) -> i32 {
        self.rect.h
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn min_padding(&self) -> Insets {
        self.min_padding
    }

    pub fn width_type(&self) -> SizeType {
        self.width_type
    }

    pub fn height_type(&self) -> SizeType {
        self.height_type
    }

    pub fn align_target(&self) -> Option<ViewId> {
        self.align_target
    }

    pub fn horizontal_rule(&self) -> HorizontalRule {
        self.h_rule
    }

    pub fn vertical_rule(&self) -> VerticalRule {
        self.v_rule
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn content_width(&self) -> i32 {
        self.content_width
    }

    pub fn content_height(&self) -> i32 {
        self.content_height
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn measured(&self) -> MeasureFlags {
        self.measured
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

/// Arena of views plus the options the layout pass runs with.
#[derive(Debug, Default)]
pub struct ViewTree {
    nodes: SlotMap<ViewId, ViewNode>,
    options: LayoutOptions,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            options,
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.options = options;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates an empty, detached container view.
    pub fn create(&mut self) -> ViewId {
        self.insert(ViewNode::new("View", Content::None))
    }

    /// Creates a detached container with a fixed size whose content box
    /// fills it.
    pub fn create_sized(&mut self, width: i32, height: i32) -> ViewId {
        let id = self.create();
        self.set_size(id, width, height);
        self.set_content_size(id, width, height);
        id
    }

    pub(crate) fn insert(&mut self, node: ViewNode) -> ViewId {
        self.nodes.insert(node)
    }

    pub fn contains_view(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: ViewId) -> Option<&ViewNode> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Option<&mut ViewNode> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn get(&self, id: ViewId) -> Result<&ViewNode, LayoutError> {
        self.nodes
            .get(id)
            .ok_or_else(|| LayoutError::UnknownView(format!("{id:?}")))
    }

    /// Mutable access for setters; unknown ids are logged and skipped.
    fn edit(&mut self, id: ViewId, op: &str) -> Option<&mut ViewNode> {
        let node = self.nodes.get_mut(id);
        if node.is_none() {
            log::warn!("{op}: unknown view {id:?}");
        }
        node
    }

    pub fn rect(&self, id: ViewId) -> Rect {
        self.node(id).map(|n| n.rect).unwrap_or_default()
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    // ---- geometry ----

    pub fn move_to(&mut self, id: ViewId, left: i32, top: i32) {
        if let Some(n) = self.edit(id, "move_to") {
            n.rect.move_to(left, top);
        }
    }

    pub fn set_left(&mut self, id: ViewId, left: i32) {
        if let Some(n) = self.edit(id, "set_left") {
            n.rect.x = left;
        }
    }

    pub fn set_top(&mut self, id: ViewId, top: i32) {
        if let Some(n) = self.edit(id, "set_top") {
            n.rect.y = top;
        }
    }

    /// Sets the outer width. A changed value marks the width as measured.
    pub fn set_width(&mut self, id: ViewId, width: i32) {
        if let Some(n) = self.edit(id, "set_width") {
            if n.rect.w != width {
                n.rect.w = width;
                n.measured |= MeasureFlags::WIDTH;
            }
        }
    }

    pub fn set_height(&mut self, id: ViewId, height: i32) {
        if let Some(n) = self.edit(id, "set_height") {
            if n.rect.h != height {
                n.rect.h = height;
                n.measured |= MeasureFlags::HEIGHT;
            }
        }
    }

    pub fn set_size(&mut self, id: ViewId, width: i32, height: i32) {
        self.set_width(id, width);
        self.set_height(id, height);
    }

    /// Sets the content width. A wrap-content view follows with its outer
    /// width; a nine-patch background is re-stretched.
    pub fn set_content_width(&mut self, id: ViewId, width: i32) {
        let Some(n) = self.edit(id, "set_content_width") else {
            return;
        };
        if n.content_width == width {
            return;
        }
        n.content_width = width;
        if n.width_type == SizeType::WrapContent {
            n.rect.w = width + n.padding.horizontal();
            n.measured |= MeasureFlags::WIDTH;
        }
        self.restretch_nine_patch(id);
    }

    pub fn set_content_height(&mut self, id: ViewId, height: i32) {
        let Some(n) = self.edit(id, "set_content_height") else {
            return;
        };
        if n.content_height == height {
            return;
        }
        n.content_height = height;
        if n.height_type == SizeType::WrapContent {
            n.rect.h = height + n.padding.vertical();
            n.measured |= MeasureFlags::HEIGHT;
        }
        self.restretch_nine_patch(id);
    }

    pub fn set_content_size(&mut self, id: ViewId, width: i32, height: i32) {
        self.set_content_width(id, width);
        self.set_content_height(id, height);
    }

    // ---- padding ----

    /// Sets all four paddings. Each side is raised to the view's minimum
    /// padding; wrap-content dimensions are recomputed.
    pub fn set_padding(&mut self, id: ViewId, padding: Insets) {
        let Some(n) = self.edit(id, "set_padding") else {
            return;
        };
        let padding = padding.max(&n.min_padding);
        if n.padding == padding {
            return;
        }
        n.padding = padding;
        if n.width_type == SizeType::WrapContent {
            n.rect.w = n.content_width + padding.horizontal();
            n.measured |= MeasureFlags::WIDTH;
        }
        if n.height_type == SizeType::WrapContent {
            n.rect.h = n.content_height + padding.vertical();
            n.measured |= MeasureFlags::HEIGHT;
        }
    }

    pub fn set_padding_left(&mut self, id: ViewId, left: i32) {
        self.update_padding(id, |p| p.left = left);
    }

    pub fn set_padding_top(&mut self, id: ViewId, top: i32) {
        self.update_padding(id, |p| p.top = top);
    }

    pub fn set_padding_right(&mut self, id: ViewId, right: i32) {
        self.update_padding(id, |p| p.right = right);
    }

    pub fn set_padding_bottom(&mut self, id: ViewId, bottom: i32) {
        self.update_padding(id, |p| p.bottom = bottom);
    }

    fn update_padding(&mut self, id: ViewId, f: impl FnOnce(&mut Insets)) {
        let Some(mut padding) = self.node(id).map(|n| n.padding) else {
            log::warn!("set_padding: unknown view {id:?}");
            return;
        };
        f(&mut padding);
        self.set_padding(id, padding);
    }

    /// Floor for the paddings, used by content that draws outside its box
    /// (drop shadows). The current padding is raised to match.
    pub fn set_min_padding(&mut self, id: ViewId, min: Insets) {
        let Some(n) = self.edit(id, "set_min_padding") else {
            return;
        };
        n.min_padding = min;
        let padding = n.padding;
        self.set_padding(id, padding);
    }

    // ---- background ----

    pub fn set_background_color(&mut self, id: ViewId, argb: u32) {
        if let Some(n) = self.edit(id, "set_background_color") {
            n.background = Background::Color(argb);
        }
    }

    pub fn set_background_image(&mut self, id: ViewId, image: Option<Image>) {
        if let Some(n) = self.edit(id, "set_background_image") {
            n.background = image.map_or(Background::None, Background::Image);
        }
    }

    /// Uses `source` as a nine-patch stretched around the content box. The
    /// paddings become half the difference between the stretched image and
    /// the content box.
    pub fn set_background_nine_patch(&mut self, id: ViewId, source: Image) {
        if let Some(n) = self.edit(id, "set_background_nine_patch") {
            n.background = Background::NinePatch {
                stretched: source.clone(),
                source,
            };
            self.restretch_nine_patch(id);
        }
    }

    pub fn clear_background(&mut self, id: ViewId) {
        if let Some(n) = self.edit(id, "clear_background") {
            n.background = Background::None;
        }
    }

    fn restretch_nine_patch(&mut self, id: ViewId) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        let Background::NinePatch { source, stretched } = &mut n.background else {
            return;
        };
        let (cw, ch) = (n.content_width, n.content_height);
        let bg = if cw > 0 || ch > 0 {
            stretch_nine_patch(source, cw, ch, true)
        } else {
            source.clone()
        };
        let (bw, bh) = bg.size();
        *stretched = bg;
        let px = (bw - cw).max(0) >> 1;
        let py = (bh - ch).max(0) >> 1;
        self.set_padding(id, Insets::new(px, py, px, py));
    }

    pub fn set_visible(&mut self, id: ViewId, visible: bool) {
        if let Some(n) = self.edit(id, "set_visible") {
            n.visible = visible;
        }
    }

    pub fn is_visible(&self, id: ViewId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    // ---- hierarchy ----

    /// Inserts `child` into `parent`'s child list at `position`. An empty
    /// list always takes the child; a position past the end is ignored.
    pub fn insert_child(&mut self, parent: ViewId, child: ViewId, position: usize) {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::warn!("insert_child: unknown view {parent:?} or {child:?}");
            return;
        }
        let len = self.nodes[parent].children.len();
        if len > 0 && position > len {
            log::warn!("insert_child: position {position} out of range for {len} children");
            return;
        }
        self.detach(child);
        // Detaching may have shortened this very list.
        let children = &mut self.nodes[parent].children;
        let position = position.min(children.len());
        children.insert(position, child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        let len = self.children(parent).len();
        self.insert_child(parent, child, len);
    }

    /// Detaches `child` from `parent`. The child stays alive.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) {
        let Some(p) = self.nodes.get_mut(parent) else {
            return;
        };
        let before = p.children.len();
        p.children.retain(|c| *c != child);
        if p.children.len() != before {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
            }
        }
    }

    /// Detaches every child of `parent`, destroying their subtrees when
    /// `destroy` is set.
    pub fn remove_all_children(&mut self, parent: ViewId, destroy: bool) {
        let Some(p) = self.nodes.get_mut(parent) else {
            return;
        };
        let children = std::mem::take(&mut p.children);
        for child in children {
            if destroy {
                self.drop_subtree(child);
            } else if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
            }
        }
    }

    /// Removes `id` and its whole subtree from the arena.
    pub fn destroy(&mut self, id: ViewId) {
        self.detach(id);
        self.drop_subtree(id);
    }

    fn detach(&mut self, id: ViewId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
    }

    fn drop_subtree(&mut self, id: ViewId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
    }

    // ---- alignment ----

    /// Configures sizing and placement. A target is required unless both
    /// dimensions are fixed; a match-parent dimension may not sit in a
    /// wrap-content parent.
    pub fn set_alignment(
        &mut self,
        id: ViewId,
        target: Option<ViewId>,
        width_type: SizeType,
        height_type: SizeType,
        h_rule: HorizontalRule,
        v_rule: VerticalRule,
    ) -> Result<(), LayoutError> {
        let node = self.get(id)?;
        let both_fixed = width_type == SizeType::Fixed && height_type == SizeType::Fixed;
        if target.is_none() && !both_fixed {
            return Err(LayoutError::MissingAlignTarget(format!("{id:?}")));
        }
        if let Some(t) = target {
            self.get(t)?;
        }
        if let Some(parent) = node.parent {
            let p = self.get(parent)?;
            let conflict = (width_type == SizeType::MatchParent
                && p.width_type == SizeType::WrapContent)
                || (height_type == SizeType::MatchParent
                    && p.height_type == SizeType::WrapContent);
            if conflict {
                return Err(LayoutError::MatchParentInWrapParent(format!("{id:?}")));
            }
        }
        if let Some(n) = self.node_mut(id) {
            n.align_target = target;
            n.h_rule = h_rule;
            n.v_rule = v_rule;
        }
        self.set_size_types(id, width_type, height_type);
        Ok(())
    }

    /// Changes the size types without touching target or rules. A
    /// dimension switched to wrap-content takes content plus padding.
    pub fn set_size_types(&mut self, id: ViewId, width_type: SizeType, height_type: SizeType) {
        let Some(n) = self.edit(id, "set_size_types") else {
            return;
        };
        n.width_type = width_type;
        n.height_type = height_type;
        let (w, h) = (
            n.content_width + n.padding.horizontal(),
            n.content_height + n.padding.vertical(),
        );
        if width_type == SizeType::WrapContent {
            self.set_width(id, w);
        }
        if height_type == SizeType::WrapContent {
            self.set_height(id, h);
        }
    }

    // ---- queries ----

    /// The view's rect in screen coordinates.
    pub fn screen_rect(&self, id: ViewId) -> Rect {
        let Some(node) = self.node(id) else {
            return Rect::default();
        };
        let mut rect = node.rect;
        let mut cur = node.parent;
        while let Some(pid) = cur {
            let Some(p) = self.node(pid) else {
                break;
            };
            rect = rect.translate(p.rect.x, p.rect.y);
            cur = p.parent;
        }
        rect
    }

    /// Whether the screen point lies inside the view (half-open).
    pub fn contains(&self, id: ViewId, x: i32, y: i32) -> bool {
        self.screen_rect(id).contains(Point { x, y })
    }

    /// Deepest visible view under the screen point, later siblings first.
    pub fn hit_test(&self, root: ViewId, x: i32, y: i32) -> Option<ViewId> {
        let origin = self
            .parent(root)
            .map(|p| self.screen_rect(p))
            .map_or(Point::default(), |r| Point { x: r.x, y: r.y });
        self.hit_test_at(root, origin, Point { x, y })
    }

    fn hit_test_at(&self, id: ViewId, origin: Point, p: Point) -> Option<ViewId> {
        let node = self.node(id)?;
        if !node.visible {
            return None;
        }
        let rect = node.rect.translate(origin.x, origin.y);
        if !rect.contains(p) {
            return None;
        }
        let inner = Point {
            x: rect.x,
            y: rect.y,
        };
        node.children
            .iter()
            .rev()
            .find_map(|&c| self.hit_test_at(c, inner, p))
            .or(Some(id))
    }

    /// Depth-first iteration over a subtree, parents before children.
    pub fn descendants(&self, root: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }
}
