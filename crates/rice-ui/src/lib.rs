//! # Views, layout and widgets
//!
//! Rice keeps a retained tree of views in a [`ViewTree`] arena. Each view
//! has a rect relative to its parent, paddings, a size type per axis and an
//! optional alignment rule against a target view (its parent or an earlier
//! sibling). [`ViewTree::layout`] resolves sizes and positions in one pass;
//! [`ViewTree::paint`] draws the tree onto any
//! [`Surface`](rice_core::Surface).
//!
//! ```rust
//! use rice_ui::*;
//!
//! let mut tree = ViewTree::new();
//! let root = tree.create_sized(100, 40);
//! let row = tree.create();
//! tree.add_child(root, row);
//! tree.set_alignment(
//!     row,
//!     Some(root),
//!     SizeType::WrapContent,
//!     SizeType::WrapContent,
//!     HorizontalRule::ParentLeft(VerticalPosition::Top),
//!     VerticalRule::None,
//! )
//! .unwrap();
//!
//! let a = tree.create_sized(10, 20);
//! let b = tree.create_sized(15, 5);
//! tree.add_child(row, a);
//! tree.add_child(row, b);
//! tree.set_alignment(
//!     b,
//!     Some(a),
//!     SizeType::Fixed,
//!     SizeType::Fixed,
//!     HorizontalRule::RightOf(VerticalPosition::Unset),
//!     VerticalRule::None,
//! )
//! .unwrap();
//!
//! tree.layout(root).unwrap();
//! assert_eq!(tree.rect(row).w, 25);
//! assert_eq!(tree.rect(row).h, 20);
//! ```
//!
//! Text and images are rendered through an [`Effect`] (plain or drop
//! shadow). On top of the tree sit the composite widgets ([`IconView`],
//! [`ButtonView`], [`TitleBar`]), the [`ScrollView`] and the adapter-backed
//! [`ListView`].

pub mod content;
pub mod effect;
pub mod gestures;
pub mod layout;
pub mod list;
pub mod paint;
pub mod scroll;
pub mod theme;
pub mod view;
pub mod widgets;

pub use content::{Content, ImageContent, Orientation, TextContent};
pub use effect::{Effect, EffectKind, Filtered};
pub use gestures::{DragBuffer, DragDistance, SwipeDirection};
pub use layout::{Frame, LayoutOptions, OrderingPolicy, place_horizontal, place_vertical};
pub use list::{ItemBinder, ListAdapter, ListView};
pub use scroll::{ScrollState, ScrollView};
pub use theme::{ThemeConfig, ThemeEffects, ThemeFonts, ThemeImages};
pub use view::{
    Background, HorizontalPosition, HorizontalRule, MeasureFlags, SizeType, VerticalPosition,
    VerticalRule, ViewId, ViewNode, ViewTree,
};
pub use widgets::{
    ButtonView, Divider, Extent, Gap, IconView, IconViewOptions, LabelAlign, ShadowBottomBorder,
    TitleBar,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rice_canvas::Raster;
    use rice_core::{Insets, LayoutError, Rect};

    fn fixed(tree: &mut ViewTree, id: ViewId, target: ViewId, h: HorizontalRule, v: VerticalRule) {
        tree.set_alignment(id, Some(target), SizeType::Fixed, SizeType::Fixed, h, v)
            .unwrap();
    }

    #[test]
    fn test_wrap_content_is_union_of_children() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(100, 100);
        let row = tree.create();
        tree.add_child(root, row);
        tree.set_alignment(
            row,
            Some(root),
            SizeType::WrapContent,
            SizeType::WrapContent,
            HorizontalRule::ParentLeft(VerticalPosition::Top),
            VerticalRule::None,
        )
        .unwrap();
        let a = tree.create_sized(10, 20);
        let b = tree.create_sized(15, 5);
        tree.add_child(row, a);
        tree.add_child(row, b);
        fixed(&mut tree, b, a, HorizontalRule::RightOf(VerticalPosition::Unset), VerticalRule::None);
        tree.layout(root).unwrap();
        let n = tree.node(row).unwrap();
        assert_eq!((n.content_width(), n.content_height()), (25, 20));
        assert_eq!(tree.rect(b), Rect::new(10, 0, 15, 5));
    }

    #[test]
    fn test_match_parent_subtracts_parent_padding() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(100, 50);
        tree.set_padding(root, Insets::new(10, 0, 10, 0));
        let child = tree.create();
        tree.set_height(child, 5);
        tree.add_child(root, child);
        tree.set_alignment(
            child,
            Some(root),
            SizeType::MatchParent,
            SizeType::Fixed,
            HorizontalRule::ParentLeft(VerticalPosition::Unset),
            VerticalRule::None,
        )
        .unwrap();
        tree.layout(root).unwrap();
        assert_eq!(tree.rect(child), Rect::new(10, 0, 80, 5));
    }

    #[test]
    fn test_match_parent_clamps_at_zero() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(10, 10);
        tree.set_padding(root, Insets::new(8, 0, 8, 0));
        let child = tree.create();
        tree.set_height(child, 5);
        tree.add_child(root, child);
        tree.set_alignment(
            child,
            Some(root),
            SizeType::MatchParent,
            SizeType::Fixed,
            HorizontalRule::None,
            VerticalRule::None,
        )
        .unwrap();
        tree.layout(root).unwrap();
        assert_eq!(tree.rect(child).w, 0);
    }

    #[test]
    fn test_unmeasured_view_is_an_error() {
        let mut tree = ViewTree::new();
        let root = tree.create();
        assert!(matches!(tree.layout(root), Err(LayoutError::Unmeasured(_))));
    }

    #[test]
    fn test_match_parent_in_wrap_parent_detected_at_layout() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(50, 50);
        let child = tree.create_sized(5, 5);
        tree.add_child(root, child);
        tree.set_alignment(
            child,
            Some(root),
            SizeType::MatchParent,
            SizeType::Fixed,
            HorizontalRule::None,
            VerticalRule::None,
        )
        .unwrap();
        tree.set_size_types(root, SizeType::WrapContent, SizeType::Fixed);
        assert!(matches!(
            tree.layout(root),
            Err(LayoutError::MatchParentInWrapParent(_))
        ));
    }

    #[test]
    fn test_ordering_fault_policies() {
        let build = |options| {
            let mut tree = ViewTree::with_options(options);
            let root = tree.create();
            let child = tree.create_sized(5, 5);
            tree.add_child(root, child);
            tree.set_alignment(
                child,
                Some(root),
                SizeType::Fixed,
                SizeType::MatchParent,
                HorizontalRule::None,
                VerticalRule::None,
            )
            .unwrap();
            (tree, child)
        };

        let (mut strict, child) = build(LayoutOptions {
            ordering: OrderingPolicy::Strict,
        });
        assert!(matches!(
            strict.layout(child),
            Err(LayoutError::ParentNotMeasured(_))
        ));

        let (mut lenient, child) = build(LayoutOptions {
            ordering: OrderingPolicy::Lenient,
        });
        assert!(lenient.layout(child).is_ok());
        assert_eq!(lenient.rect(child).h, 5);
    }

    #[test]
    fn test_destroyed_target_is_reported() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(50, 50);
        let a = tree.create_sized(5, 5);
        let b = tree.create_sized(5, 5);
        tree.add_child(root, a);
        tree.add_child(root, b);
        fixed(&mut tree, b, a, HorizontalRule::RightOf(VerticalPosition::Unset), VerticalRule::None);
        tree.destroy(a);
        assert!(matches!(
            tree.layout(root),
            Err(LayoutError::MissingAlignTarget(_))
        ));
    }

    #[test]
    fn test_layout_then_paint_text_row() {
        let theme = theme::test_theme();
        let mut tree = ViewTree::new();
        let root = tree.create_sized(60, 20);
        tree.set_background_color(root, 0xFFFF_FFFF);
        let label = tree.create_text("ab", theme.effects.default.clone(), None, false);
        tree.add_child(root, label);
        fixed(
            &mut tree,
            label,
            root,
            HorizontalRule::ParentCenter,
            VerticalRule::ParentCenter,
        );
        tree.layout(root).unwrap();
        assert_eq!(tree.rect(label), Rect::new(20, 4, 20, 12));

        let mut surface = Raster::new(60, 20);
        tree.paint(root, &mut surface);
        // BlockFont fills each cell from (1, 1) to its baseline.
        assert_eq!(surface.pixel(21, 5), Some(0xFF00_0000));
        assert_eq!(surface.pixel(20, 4), Some(0xFFFF_FFFF));
        assert_eq!(surface.pixel(0, 0), Some(0xFFFF_FFFF));
    }

    #[test]
    fn test_hit_test_after_scroll() {
        let mut tree = ViewTree::new();
        let scroll = ScrollView::new(&mut tree, 50, 50);
        let a = tree.create_sized(50, 60);
        let b = tree.create_sized(50, 60);
        tree.add_child(scroll.content(), a);
        tree.add_child(scroll.content(), b);
        fixed(&mut tree, b, a, HorizontalRule::LeftWith(VerticalPosition::Bottom), VerticalRule::None);
        tree.layout(scroll.id()).unwrap();
        assert_eq!(tree.hit_test(scroll.id(), 10, 10), Some(a));
        scroll.scroll_y_by(&mut tree, -40);
        // The indicator sits on top at the right edge.
        assert_eq!(tree.hit_test(scroll.id(), 10, 30), Some(b));
        assert_eq!(tree.hit_test(scroll.id(), 47, 30), Some(scroll.indicator()));
    }
}
