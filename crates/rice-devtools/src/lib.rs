//! Debugging aids for a laid-out [`ViewTree`].
//!
//! [`dump_tree`] prints the geometry of a subtree, one view per line.
//! [`Hud`] outlines the view under the pointer and keeps a smoothed frame
//! rate.

use web_time::Instant;

use rice_core::{Rect, Surface};
use rice_ui::{SizeType, ViewId, ViewTree};

/// Outline color of the hovered view.
pub const HUD_OUTLINE: u32 = 0xFF44_AAFF;

/// Smoothing factor of the frame rate average.
const FPS_ALPHA: f32 = 0.2;

fn size_type(t: SizeType) -> &'static str {
    match t {
        SizeType::Fixed => "fixed",
        SizeType::WrapContent => "wrap",
        SizeType::MatchParent => "match",
    }
}

/// Renders the subtree at `root`, children indented under their parent.
///
/// Each line reads `kind [x,y wxh] width/height pad(l,t,r,b)`, with
/// `hidden` appended for invisible views. Rects are parent relative.
pub fn dump_tree(tree: &ViewTree, root: ViewId) -> String {
    let mut lines = Vec::new();
    dump_node(tree, root, 0, &mut lines);
    lines.join("\n")
}

fn dump_node(tree: &ViewTree, id: ViewId, depth: usize, lines: &mut Vec<String>) {
    let Some(node) = tree.node(id) else {
        log::warn!("dump_tree: {id:?} is not in the tree");
        return;
    };
    let r = node.rect();
    let p = node.padding();
    let mut line = format!(
        "{:indent$}{} [{},{} {}x{}] {}/{} pad({},{},{},{})",
        "",
        node.kind(),
        r.x,
        r.y,
        r.w,
        r.h,
        size_type(node.width_type()),
        size_type(node.height_type()),
        p.left,
        p.top,
        p.right,
        p.bottom,
        indent = depth * 2,
    );
    if !node.is_visible() {
        line.push_str(" hidden");
    }
    lines.push(line);
    for &child in node.children() {
        dump_node(tree, child, depth + 1, lines);
    }
}

pub struct Hud {
    pub inspector_enabled: bool,
    hovered: Option<ViewId>,
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            inspector_enabled: false,
            hovered: None,
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
        }
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_enabled = !self.inspector_enabled;
    }

    pub fn hovered(&self) -> Option<ViewId> {
        self.hovered
    }

    /// Tracks the deepest view under the pointer.
    pub fn set_pointer(&mut self, tree: &ViewTree, root: ViewId, x: i32, y: i32) {
        self.hovered = tree.hit_test(root, x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.hovered = None;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps_smooth
    }

    /// Counts a frame presented at `now`.
    pub fn record_frame_at(&mut self, now: Instant) {
        self.frame_count += 1;
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = now.duration_since(prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - FPS_ALPHA) * self.fps_smooth + FPS_ALPHA * fps
                };
            }
        }
    }

    /// Records a frame and, with the inspector on, outlines the hovered view.
    pub fn overlay(&mut self, tree: &ViewTree, surface: &mut dyn Surface) {
        self.record_frame_at(Instant::now());
        if !self.inspector_enabled {
            return;
        }
        let Some(id) = self.hovered.filter(|&id| tree.contains_view(id)) else {
            return;
        };
        outline(surface, tree.screen_rect(id), HUD_OUTLINE);
    }
}

fn outline(surface: &mut dyn Surface, r: Rect, argb: u32) {
    if r.w <= 0 || r.h <= 0 {
        return;
    }
    let saved = surface.clip();
    surface.set_clip(Rect::new(0, 0, surface.width(), surface.height()));
    surface.fill_rect(Rect::new(r.x, r.y, r.w, 1), argb);
    surface.fill_rect(Rect::new(r.x, r.bottom() - 1, r.w, 1), argb);
    surface.fill_rect(Rect::new(r.x, r.y, 1, r.h), argb);
    surface.fill_rect(Rect::new(r.right() - 1, r.y, 1, r.h), argb);
    surface.set_clip(saved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rice_canvas::Raster;
    use rice_core::Insets;
    use rice_ui::{HorizontalRule, VerticalPosition, VerticalRule};
    use std::time::Duration;

    fn sample_tree() -> (ViewTree, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(40, 30);
        tree.set_padding(root, Insets::new(2, 2, 2, 2));

        let row = tree.create();
        tree.add_child(root, row);
        tree.set_alignment(
            row,
            Some(root),
            SizeType::MatchParent,
            SizeType::WrapContent,
            HorizontalRule::ParentLeft(VerticalPosition::Top),
            VerticalRule::None,
        )
        .unwrap();

        let cell = tree.create_sized(10, 8);
        tree.add_child(row, cell);
        let hidden = tree.create_sized(4, 4);
        tree.add_child(root, hidden);
        tree.set_visible(hidden, false);

        tree.layout(root).unwrap();
        (tree, root, cell)
    }

    #[test]
    fn test_dump_tree() {
        let (tree, root, _) = sample_tree();
        insta::assert_snapshot!(dump_tree(&tree, root), @r"
        View [0,0 40x30] fixed/fixed pad(2,2,2,2)
          View [2,2 36x8] match/wrap pad(0,0,0,0)
            View [0,0 10x8] fixed/fixed pad(0,0,0,0)
          View [0,0 4x4] fixed/fixed pad(0,0,0,0) hidden
        ");
    }

    #[test]
    fn test_dump_of_destroyed_view_is_empty() {
        let (mut tree, root, cell) = sample_tree();
        tree.destroy(cell);
        assert_eq!(dump_tree(&tree, cell), "");
        assert_eq!(dump_tree(&tree, root).lines().count(), 3);
    }

    #[test]
    fn test_overlay_outlines_hovered_view() {
        let (tree, root, cell) = sample_tree();
        let mut hud = Hud::new();
        hud.set_pointer(&tree, root, 5, 5);
        assert_eq!(hud.hovered(), Some(cell));

        let mut surface = Raster::new(40, 30);
        hud.overlay(&tree, &mut surface);
        assert_eq!(surface.pixel(2, 2), Some(0));

        hud.toggle_inspector();
        hud.overlay(&tree, &mut surface);
        assert_eq!(surface.pixel(2, 2), Some(HUD_OUTLINE));
        assert_eq!(surface.pixel(11, 9), Some(HUD_OUTLINE));
        assert_eq!(surface.pixel(5, 5), Some(0));
        assert_eq!(hud.frame_count(), 2);
    }

    #[test]
    fn test_fps_is_smoothed() {
        let mut hud = Hud::new();
        let t0 = Instant::now();
        hud.record_frame_at(t0);
        assert_eq!(hud.fps(), 0.0);
        hud.record_frame_at(t0 + Duration::from_millis(100));
        assert!((hud.fps() - 10.0).abs() < 0.01);
        hud.record_frame_at(t0 + Duration::from_millis(150));
        // 0.8 * 10 + 0.2 * 20
        assert!((hud.fps() - 12.0).abs() < 0.01);
    }
}
