//! Painting: background, content, then children, each clipped to its
//! view's absolute rect.

use rice_core::{Point, Rect, Surface};

use crate::content::paint_content;
use crate::view::{Background, ViewId, ViewTree};

impl ViewTree {
    /// Paints the subtree rooted at `root` onto `surface`.
    ///
    /// The surface clip is restored afterwards.
    pub fn paint(&self, root: ViewId, surface: &mut dyn Surface) {
        if !self.contains_view(root) {
            log::warn!("paint: unknown view {root:?}");
            return;
        }
        let origin = match self.parent(root) {
            Some(p) => {
                let r = self.screen_rect(p);
                Point { x: r.x, y: r.y }
            }
            None => Point::default(),
        };
        let saved = surface.clip();
        self.paint_node(root, origin, saved, surface);
        surface.set_clip(saved);
    }

    fn paint_node(&self, id: ViewId, origin: Point, clip: Rect, surface: &mut dyn Surface) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        let rect = node.rect.translate(origin.x, origin.y);
        let Some(clip) = rect.intersect(&clip) else {
            return;
        };
        surface.set_clip(clip);

        match &node.background {
            Background::None => {}
            Background::Color(argb) => surface.blend_rect(rect, *argb),
            Background::Image(img) | Background::NinePatch { stretched: img, .. } => {
                surface.draw_image(img, rect.x, rect.y)
            }
        }
        paint_content(node, rect, surface);

        let inner = Point {
            x: rect.x,
            y: rect.y,
        };
        for &child in &node.children {
            self.paint_node(child, inner, clip, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rice_canvas::Raster;
    use rice_core::Image;

    #[test]
    fn test_opaque_background_is_exact() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(8, 8);
        tree.set_background_color(root, 0xFF12_3456);
        let mut surface = Raster::filled(8, 8, 0xFFFF_FFFF);
        tree.paint(root, &mut surface);
        assert!(surface.pixels().iter().all(|&c| c == 0xFF12_3456));
    }

    #[test]
    fn test_transparent_background_leaves_surface() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(8, 8);
        tree.set_background_color(root, 0x0012_3456);
        let mut surface = Raster::filled(8, 8, 0xFFAB_CDEF);
        tree.paint(root, &mut surface);
        assert!(surface.pixels().iter().all(|&c| c == 0xFFAB_CDEF));
    }

    #[test]
    fn test_children_are_clipped_to_parent() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(10, 10);
        let child = tree.create_sized(20, 20);
        tree.move_to(child, 5, 5);
        tree.set_background_color(child, 0xFFFF_0000);
        tree.add_child(root, child);
        let mut surface = Raster::new(20, 20);
        tree.paint(root, &mut surface);
        assert_eq!(surface.pixel(5, 5), Some(0xFFFF_0000));
        assert_eq!(surface.pixel(9, 9), Some(0xFFFF_0000));
        assert_eq!(surface.pixel(10, 10), Some(0));
        assert_eq!(surface.pixel(4, 4), Some(0));
        assert_eq!(surface.clip(), Rect::new(0, 0, 20, 20));
    }

    #[test]
    fn test_invisible_subtree_is_skipped() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(4, 4);
        let child = tree.create_sized(4, 4);
        tree.set_background_color(child, 0xFF00_FF00);
        tree.add_child(root, child);
        tree.set_visible(child, false);
        let mut surface = Raster::new(4, 4);
        tree.paint(root, &mut surface);
        assert!(surface.pixels().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_children_paint_in_order_over_parent() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(4, 4);
        tree.set_background_image(root, Some(Image::solid(4, 4, 0xFF00_0000)));
        let a = tree.create_sized(4, 4);
        let b = tree.create_sized(2, 2);
        tree.set_background_color(a, 0xFF00_00FF);
        tree.set_background_color(b, 0xFF00_FF00);
        tree.add_child(root, a);
        tree.add_child(root, b);
        let mut surface = Raster::new(4, 4);
        tree.paint(root, &mut surface);
        assert_eq!(surface.pixel(0, 0), Some(0xFF00_FF00));
        assert_eq!(surface.pixel(3, 3), Some(0xFF00_00FF));
    }
}
