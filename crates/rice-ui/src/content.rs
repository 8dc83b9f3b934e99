//! What a view draws inside its padding box.
//!
//! Text and image views render through an [`Effect`]. The effect's insets
//! become the view's minimum padding, so a shadow always has room around
//! the content box.

use std::sync::Arc;

use rice_core::{Image, Insets, Rect, Surface};

use crate::effect::{Effect, Filtered};
use crate::scroll::ScrollState;
use crate::theme::{DIVIDER_DARK, DIVIDER_LIGHT};
use crate::view::{MeasureFlags, SizeType, ViewId, ViewNode, ViewTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Debug)]
pub struct TextContent {
    pub(crate) text: String,
    pub(crate) effect: Arc<Effect>,
    pub(crate) max_width: Option<i32>,
    pub(crate) ellipsize: bool,
    pub(crate) rendered: Option<Filtered>,
}

impl TextContent {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rendered(&self) -> Option<&Filtered> {
        self.rendered.as_ref()
    }
}

#[derive(Clone, Debug)]
pub struct ImageContent {
    pub(crate) source: Option<Image>,
    pub(crate) effect: Option<Arc<Effect>>,
    pub(crate) rendered: Option<Filtered>,
}

impl ImageContent {
    pub fn source(&self) -> Option<&Image> {
        self.source.as_ref()
    }

    pub fn rendered(&self) -> Option<&Filtered> {
        self.rendered.as_ref()
    }
}

#[derive(Clone, Debug, Default)]
pub enum Content {
    /// A plain container.
    #[default]
    None,
    Text(TextContent),
    Image(ImageContent),
    /// A two-tone line through the middle of the view.
    Divider(Orientation),
    Scroll(ScrollState),
}

impl ViewTree {
    /// Creates a text view sized to its rendered text.
    ///
    /// With `max_width` the text is wrapped (or ellipsized) to that width;
    /// without it the text stays on one line.
    pub fn create_text(
        &mut self,
        text: &str,
        effect: Arc<Effect>,
        max_width: Option<i32>,
        ellipsize: bool,
    ) -> ViewId {
        let content = Content::Text(TextContent {
            text: String::new(),
            effect,
            max_width,
            ellipsize,
            rendered: None,
        });
        let id = self.insert(ViewNode::new("Text", content));
        self.update_text(id, text);
        id
    }

    /// Re-renders a text view and resizes it to the result.
    pub fn update_text(&mut self, id: ViewId, text: &str) {
        let Some(node) = self.node_mut(id) else {
            log::warn!("update_text: unknown view {id:?}");
            return;
        };
        let Content::Text(tc) = &mut node.content else {
            log::warn!("update_text: view {id:?} is not a text view");
            return;
        };
        tc.text = text.to_string();
        let rendered = tc.effect.filter_string(text, tc.max_width, tc.ellipsize);
        tc.rendered = rendered.clone();
        self.apply_rendered(id, rendered.as_ref());
    }

    pub fn text(&self, id: ViewId) -> Option<&str> {
        match &self.node(id)?.content {
            Content::Text(tc) => Some(&tc.text),
            _ => None,
        }
    }

    /// Creates an image view sized to `image` after the optional effect.
    pub fn create_image(&mut self, image: Option<Image>, effect: Option<Arc<Effect>>) -> ViewId {
        let content = Content::Image(ImageContent {
            source: None,
            effect,
            rendered: None,
        });
        let id = self.insert(ViewNode::new("Image", content));
        self.update_image(id, image);
        id
    }

    pub fn update_image(&mut self, id: ViewId, image: Option<Image>) {
        let Some(node) = self.node_mut(id) else {
            log::warn!("update_image: unknown view {id:?}");
            return;
        };
        let Content::Image(ic) = &mut node.content else {
            log::warn!("update_image: view {id:?} is not an image view");
            return;
        };
        let rendered = image.as_ref().map(|img| match &ic.effect {
            Some(effect) => effect.filter_image(img),
            None => Filtered {
                image: img.clone(),
                padding: Insets::ZERO,
            },
        });
        ic.source = image;
        ic.rendered = rendered.clone();
        self.apply_rendered(id, rendered.as_ref());
    }

    /// The source image of an image view.
    pub fn image(&self, id: ViewId) -> Option<&Image> {
        match &self.node(id)?.content {
            Content::Image(ic) => ic.source.as_ref(),
            _ => None,
        }
    }

    pub fn create_divider(&mut self, orientation: Orientation) -> ViewId {
        self.insert(ViewNode::new("Divider", Content::Divider(orientation)))
    }

    /// Outer size follows the rendered image; the content box excludes the
    /// effect's insets, which also become the minimum padding. Both
    /// dimensions count as measured, even for empty content.
    fn apply_rendered(&mut self, id: ViewId, rendered: Option<&Filtered>) {
        let (w, h, inset) = match rendered {
            Some(f) => {
                let (w, h) = f.image.size();
                (w, h, f.padding)
            }
            None => (0, 0, Insets::ZERO),
        };
        self.set_min_padding(id, inset);
        self.set_content_size(
            id,
            (w - inset.horizontal()).max(0),
            (h - inset.vertical()).max(0),
        );
        let Some(n) = self.node_mut(id) else {
            return;
        };
        let (wt, ht) = (n.width_type, n.height_type);
        if wt != SizeType::WrapContent {
            self.set_width(id, w);
        }
        if ht != SizeType::WrapContent {
            self.set_height(id, h);
        }
        self.set_size_types(id, wt, ht);
        if let Some(n) = self.node_mut(id) {
            n.measured = MeasureFlags::all();
        }
    }
}

/// Draws a view's content. `rect` is the view's absolute rect.
pub(crate) fn paint_content(node: &ViewNode, rect: Rect, surface: &mut dyn Surface) {
    let rendered = match &node.content {
        Content::Text(tc) => tc.rendered.as_ref(),
        Content::Image(ic) => ic.rendered.as_ref(),
        Content::Divider(orientation) => {
            paint_divider(*orientation, rect, surface);
            None
        }
        Content::None | Content::Scroll(_) => None,
    };
    if let Some(f) = rendered {
        let x = rect.x + node.padding.left - f.padding.left;
        let y = rect.y + node.padding.top - f.padding.top;
        surface.draw_image(&f.image, x, y);
    }
}

fn paint_divider(orientation: Orientation, rect: Rect, surface: &mut dyn Surface) {
    match orientation {
        Orientation::Horizontal => {
            let y = rect.y + rect.h / 2;
            surface.fill_rect(Rect::new(rect.x, y, rect.w, 1), DIVIDER_DARK);
            if y + 1 < rect.bottom() {
                surface.fill_rect(Rect::new(rect.x, y + 1, rect.w, 1), DIVIDER_LIGHT);
            }
        }
        Orientation::Vertical => {
            let x = rect.x + rect.w / 2;
            surface.fill_rect(Rect::new(x, rect.y, 1, rect.h), DIVIDER_DARK);
            if x + 1 < rect.right() {
                surface.fill_rect(Rect::new(x + 1, rect.y, 1, rect.h), DIVIDER_LIGHT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rice_canvas::Raster;
    use rice_text::BlockFont;

    fn plain() -> Arc<Effect> {
        Arc::new(Effect::plain(Arc::new(BlockFont::new(10, 12)), 0xFF00_0000))
    }

    fn shadowed() -> Arc<Effect> {
        Arc::new(Effect::drop_shadow(
            Arc::new(BlockFont::new(10, 12)),
            0xFFFF_FFFF,
            0xC000_0000,
        ))
    }

    #[test]
    fn test_text_view_sized_to_rendered_text() {
        let mut tree = ViewTree::new();
        let t = tree.create_text("abc", plain(), None, false);
        let n = tree.node(t).unwrap();
        assert_eq!((n.width(), n.height()), (30, 12));
        assert_eq!((n.content_width(), n.content_height()), (30, 12));
        assert_eq!(n.padding(), Insets::ZERO);
        assert_eq!(tree.text(t), Some("abc"));
    }

    #[test]
    fn test_shadow_insets_become_min_padding() {
        let mut tree = ViewTree::new();
        let t = tree.create_text("abc", shadowed(), None, false);
        let n = tree.node(t).unwrap();
        let inset = n.min_padding();
        assert!(inset.right > 0 && inset.bottom > 0);
        assert_eq!(n.padding(), inset);
        assert_eq!(n.content_width(), n.width() - inset.horizontal());
        tree.set_padding(t, Insets::ZERO);
        assert_eq!(tree.node(t).unwrap().padding(), inset);
    }

    #[test]
    fn test_update_text_resizes() {
        let mut tree = ViewTree::new();
        let t = tree.create_text("abc", plain(), None, false);
        tree.update_text(t, "abcdef");
        assert_eq!(tree.node(t).unwrap().width(), 60);
        tree.update_text(t, "");
        assert_eq!(tree.node(t).unwrap().width(), 0);
    }

    #[test]
    fn test_wrapped_text_view() {
        let mut tree = ViewTree::new();
        let t = tree.create_text("AAAA BBBB", plain(), Some(45), false);
        let n = tree.node(t).unwrap();
        assert_eq!((n.width(), n.height()), (40, 24));
    }

    #[test]
    fn test_image_view_without_effect() {
        let mut tree = ViewTree::new();
        let img = Image::solid(7, 3, 0xFF11_2233);
        let v = tree.create_image(Some(img.clone()), None);
        assert_eq!(tree.rect(v).w, 7);
        assert!(tree.image(v).unwrap().ptr_eq(&img));
        tree.update_image(v, None);
        assert_eq!(tree.rect(v).w, 0);
    }

    #[test]
    fn test_divider_paints_two_tone_line() {
        let mut surface = Raster::new(10, 4);
        let node = ViewNode::new("Divider", Content::Divider(Orientation::Horizontal));
        paint_content(&node, Rect::new(0, 0, 10, 4), &mut surface);
        assert_eq!(surface.pixel(3, 2), Some(DIVIDER_DARK));
        assert_eq!(surface.pixel(3, 3), Some(DIVIDER_LIGHT));
        assert_eq!(surface.pixel(3, 1), Some(0));
    }

    #[test]
    fn test_one_pixel_divider_has_no_light_line() {
        let mut surface = Raster::new(4, 3);
        let node = ViewNode::new("Divider", Content::Divider(Orientation::Horizontal));
        paint_content(&node, Rect::new(0, 1, 4, 1), &mut surface);
        assert_eq!(surface.pixel(0, 1), Some(DIVIDER_DARK));
        assert_eq!(surface.pixel(0, 2), Some(0));
    }
}
