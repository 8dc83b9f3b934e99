//! Composite widgets built from plain views.

use std::sync::Arc;

use rice_canvas::{scale_image, stretch_nine_patch};
use rice_core::{Image, LayoutError, Rect};

use crate::content::Orientation;
use crate::effect::Effect;
use crate::theme::{ITEM_GAP_SIZE, ThemeConfig, TRANSPARENT};
use crate::view::{
    HorizontalPosition, HorizontalRule, SizeType, VerticalPosition, VerticalRule, ViewId, ViewTree,
};

/// One dimension of a spacer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    Px(i32),
    MatchParent,
}

impl Extent {
    fn resolve(self) -> (SizeType, i32) {
        match self {
            Extent::Px(v) => (SizeType::Fixed, v.max(0)),
            Extent::MatchParent => (SizeType::MatchParent, 0),
        }
    }
}

/// An empty spacer. Negative sizes are treated as zero.
pub struct Gap;

impl Gap {
    pub fn create(
        tree: &mut ViewTree,
        target: Option<ViewId>,
        width: Extent,
        height: Extent,
        h_rule: HorizontalRule,
        v_rule: VerticalRule,
    ) -> Result<ViewId, LayoutError> {
        let id = tree.create();
        size_spacer(tree, id, target, width, height, h_rule, v_rule)?;
        Ok(id)
    }
}

/// A spacer with a two-tone line through its middle.
pub struct Divider;

impl Divider {
    pub fn create(
        tree: &mut ViewTree,
        target: Option<ViewId>,
        width: Extent,
        height: Extent,
        h_rule: HorizontalRule,
        v_rule: VerticalRule,
        orientation: Orientation,
    ) -> Result<ViewId, LayoutError> {
        let id = tree.create_divider(orientation);
        size_spacer(tree, id, target, width, height, h_rule, v_rule)?;
        Ok(id)
    }
}

fn size_spacer(
    tree: &mut ViewTree,
    id: ViewId,
    target: Option<ViewId>,
    width: Extent,
    height: Extent,
    h_rule: HorizontalRule,
    v_rule: VerticalRule,
) -> Result<(), LayoutError> {
    let (wt, w) = width.resolve();
    let (ht, h) = height.resolve();
    let placed = tree.set_alignment(id, target, wt, ht, h_rule, v_rule);
    if placed.is_err() {
        tree.destroy(id);
        return placed;
    }
    tree.set_content_size(id, w, h);
    tree.set_size(id, w, h);
    Ok(())
}

/// Where an [`IconView`] puts its label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelAlign {
    #[default]
    Right,
    Bottom,
    Center,
}

/// An icon with a label beside, below or on top of it.
///
/// The root wraps both children. It still needs an alignment target of its
/// own before it can be laid out inside a parent.
#[derive(Clone, Debug)]
pub struct IconView {
    root: ViewId,
    icon: ViewId,
    label: ViewId,
    focused: bool,
    selected_background: Option<Image>,
}

#[derive(Clone, Debug)]
pub struct IconViewOptions {
    pub align: LabelAlign,
    pub label_left_padding: i32,
    pub max_width: Option<i32>,
    pub ellipsize: bool,
}

impl Default for IconViewOptions {
    fn default() -> Self {
        Self {
            align: LabelAlign::Right,
            label_left_padding: 0,
            max_width: None,
            ellipsize: false,
        }
    }
}

impl IconView {
    pub fn new(
        tree: &mut ViewTree,
        icon: Option<Image>,
        label: &str,
        effect: Arc<Effect>,
        options: IconViewOptions,
    ) -> Result<Self, LayoutError> {
        let root = tree.create();
        let icon_id = tree.create_image(icon, Some(effect.clone()));
        tree.add_child(root, icon_id);

        let mut max_width = options.max_width;
        if options.align == LabelAlign::Right {
            let icon_w = tree.rect(icon_id).w;
            max_width = max_width.filter(|w| *w > 0).map(|w| w - icon_w);
        }
        let label_id = tree.create_text(label, effect, max_width, options.ellipsize);
        tree.add_child(root, label_id);
        tree.set_size_types(root, SizeType::WrapContent, SizeType::WrapContent);

        let wrap = SizeType::WrapContent;
        let icon_r = tree.rect(icon_id);
        let label_r = tree.rect(label_id);
        match options.align {
            LabelAlign::Center => {
                tree.set_alignment(
                    icon_id,
                    Some(root),
                    wrap,
                    wrap,
                    HorizontalRule::ParentCenter,
                    VerticalRule::ParentCenter,
                )?;
                tree.set_alignment(
                    label_id,
                    Some(root),
                    wrap,
                    wrap,
                    HorizontalRule::ParentCenter,
                    VerticalRule::ParentCenter,
                )?;
                tree.set_content_size(root, icon_r.w.max(label_r.w), icon_r.h.max(label_r.h));
            }
            LabelAlign::Bottom => {
                tree.set_alignment(
                    icon_id,
                    Some(root),
                    wrap,
                    wrap,
                    HorizontalRule::None,
                    VerticalRule::ParentTop(HorizontalPosition::Center),
                )?;
                tree.set_alignment(
                    label_id,
                    Some(icon_id),
                    wrap,
                    wrap,
                    HorizontalRule::None,
                    VerticalRule::Below(HorizontalPosition::Center),
                )?;
                tree.set_content_size(root, icon_r.w.max(label_r.w), icon_r.h + label_r.h);
            }
            LabelAlign::Right => {
                tree.set_alignment(
                    icon_id,
                    Some(root),
                    wrap,
                    wrap,
                    HorizontalRule::ParentLeft(VerticalPosition::Top),
                    VerticalRule::None,
                )?;
                tree.set_alignment(
                    label_id,
                    Some(icon_id),
                    wrap,
                    wrap,
                    HorizontalRule::RightOf(VerticalPosition::Center),
                    VerticalRule::None,
                )?;
                tree.set_content_size(
                    root,
                    icon_r.w + options.label_left_padding + label_r.w,
                    icon_r.h.max(label_r.h),
                );
            }
        }
        tree.set_padding_left(label_id, options.label_left_padding);

        Ok(Self {
            root,
            icon: icon_id,
            label: label_id,
            focused: false,
            selected_background: None,
        })
    }

    pub fn id(&self) -> ViewId {
        self.root
    }

    pub fn icon(&self) -> ViewId {
        self.icon
    }

    pub fn label(&self) -> ViewId {
        self.label
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Replaces the icon, scaled into the current icon content box.
    pub fn update_icon(&self, tree: &mut ViewTree, icon: Image) {
        let (cw, ch) = tree
            .node(self.icon)
            .map_or((0, 0), |n| (n.content_width(), n.content_height()));
        tree.update_image(self.icon, Some(scale_image(&icon, cw, ch)));
    }

    pub fn update_label(&self, tree: &mut ViewTree, text: &str) {
        tree.update_text(self.label, text);
    }

    /// Shows `nine_patch` stretched to the view's size behind it. The
    /// stretched image is kept for later focus changes.
    pub fn request_focus(&mut self, tree: &mut ViewTree, nine_patch: Option<&Image>) {
        if self.focused {
            return;
        }
        self.focused = true;
        if self.selected_background.is_none() {
            let r = tree.rect(self.root);
            self.selected_background = nine_patch.map(|img| stretch_nine_patch(img, r.w, r.h, false));
        }
        tree.set_background_image(self.root, self.selected_background.clone());
    }

    pub fn clear_focus(&mut self, tree: &mut ViewTree) {
        if self.focused {
            self.focused = false;
            tree.set_background_color(self.root, TRANSPARENT);
        }
    }
}

/// A centered label over a normal/selected background image pair.
#[derive(Clone, Debug)]
pub struct ButtonView {
    inner: IconView,
    normal: Option<Image>,
    selected: Option<Image>,
}

impl ButtonView {
    pub fn new(tree: &mut ViewTree, text: &str, effect: Arc<Effect>, theme: &ThemeConfig) -> Result<Self, LayoutError> {
        let normal = theme.images.button_normal.clone();
        let inner = IconView::new(
            tree,
            normal.clone(),
            text,
            effect,
            IconViewOptions {
                align: LabelAlign::Center,
                ..Default::default()
            },
        )?;
        Ok(Self {
            inner,
            normal,
            selected: theme.images.button_selected.clone(),
        })
    }

    pub fn id(&self) -> ViewId {
        self.inner.id()
    }

    pub fn icon_view(&self) -> &IconView {
        &self.inner
    }

    pub fn is_focused(&self) -> bool {
        self.inner.focused
    }

    /// Swaps in the selected image. Returns the screen rect to repaint.
    pub fn request_focus(&mut self, tree: &mut ViewTree) -> Option<Rect> {
        if self.inner.focused {
            return None;
        }
        self.inner.focused = true;
        tree.update_image(self.inner.icon, self.selected.clone());
        Some(tree.screen_rect(self.inner.icon))
    }

    pub fn clear_focus(&mut self, tree: &mut ViewTree) -> Option<Rect> {
        if !self.inner.focused {
            return None;
        }
        self.inner.focused = false;
        tree.update_image(self.inner.icon, self.normal.clone());
        Some(tree.screen_rect(self.inner.icon))
    }
}

/// The screen header: icon and title on the theme's title gradient.
#[derive(Clone, Debug)]
pub struct TitleBar {
    root: ViewId,
    icon_view: IconView,
}

impl TitleBar {
    pub fn new(
        tree: &mut ViewTree,
        theme: &ThemeConfig,
        width: i32,
        icon: Option<Image>,
        label: &str,
        max_width: Option<i32>,
        ellipsize: bool,
    ) -> Result<Self, LayoutError> {
        let root = tree.create_sized(width, theme.title_bar_height());
        tree.set_background_image(root, theme.title_bar_background(width));
        let icon_view = IconView::new(
            tree,
            icon,
            label,
            theme.effects.title.clone(),
            IconViewOptions {
                align: LabelAlign::Right,
                label_left_padding: ITEM_GAP_SIZE / 2,
                max_width,
                ellipsize,
            },
        )?;
        tree.add_child(root, icon_view.id());
        tree.set_alignment(
            icon_view.id(),
            Some(root),
            SizeType::WrapContent,
            SizeType::WrapContent,
            HorizontalRule::ParentLeft(VerticalPosition::Center),
            VerticalRule::None,
        )?;
        Ok(Self { root, icon_view })
    }

    pub fn id(&self) -> ViewId {
        self.root
    }

    pub fn icon_view(&self) -> &IconView {
        &self.icon_view
    }

    pub fn update_icon(&self, tree: &mut ViewTree, icon: Image) {
        self.icon_view.update_icon(tree, icon);
    }
}

/// Soft shadow strip, usually aligned below a title bar.
pub struct ShadowBottomBorder;

impl ShadowBottomBorder {
    pub fn create(tree: &mut ViewTree, theme: &ThemeConfig, width: i32) -> ViewId {
        tree.create_image(theme.border_shadow(width), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{BORDER_SHADOW_WIDTH, ThemeFonts, ThemeImages, test_theme};
    use rice_core::Font;
    use rice_text::BlockFont;

    #[test]
    fn test_gap_negative_size_is_zero() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(50, 50);
        let gap = Gap::create(
            &mut tree,
            Some(root),
            Extent::Px(-5),
            Extent::Px(4),
            HorizontalRule::None,
            VerticalRule::None,
        )
        .unwrap();
        assert_eq!((tree.rect(gap).w, tree.rect(gap).h), (0, 4));
    }

    #[test]
    fn test_match_parent_divider() {
        let mut tree = ViewTree::new();
        let root = tree.create_sized(50, 50);
        tree.set_padding(root, rice_core::Insets::new(5, 0, 5, 0));
        let div = Divider::create(
            &mut tree,
            Some(root),
            Extent::MatchParent,
            Extent::Px(1),
            HorizontalRule::ParentLeft(VerticalPosition::Unset),
            VerticalRule::ParentBottom(HorizontalPosition::Unset),
            Orientation::Horizontal,
        )
        .unwrap();
        tree.add_child(root, div);
        tree.layout(root).unwrap();
        assert_eq!(tree.rect(div), Rect::new(5, 49, 40, 1));
    }

    #[test]
    fn test_icon_view_label_right() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let icon = Image::solid(16, 16, 0xFF00_FF00);
        let iv = IconView::new(
            &mut tree,
            Some(icon),
            "abc",
            theme.effects.default.clone(),
            IconViewOptions {
                label_left_padding: 4,
                ..Default::default()
            },
        )
        .unwrap();
        let root = iv.id();
        let screen = tree.create_sized(200, 100);
        tree.add_child(screen, root);
        tree.set_alignment(
            root,
            Some(screen),
            SizeType::WrapContent,
            SizeType::WrapContent,
            HorizontalRule::ParentLeft(VerticalPosition::Top),
            VerticalRule::None,
        )
        .unwrap();
        tree.layout(screen).unwrap();
        assert_eq!(tree.rect(iv.icon()), Rect::new(0, 0, 16, 16));
        // Label is 34 wide with its left padding, content centered on the icon.
        assert_eq!(tree.rect(iv.label()), Rect::new(16, 2, 34, 12));
        assert_eq!(tree.rect(root), Rect::new(0, 0, 50, 16));
    }

    #[test]
    fn test_icon_view_label_bottom() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let iv = IconView::new(
            &mut tree,
            Some(Image::solid(10, 10, 0xFF00_FF00)),
            "abcd",
            theme.effects.default.clone(),
            IconViewOptions {
                align: LabelAlign::Bottom,
                ..Default::default()
            },
        )
        .unwrap();
        tree.layout(iv.id()).unwrap();
        assert_eq!(tree.rect(iv.icon()), Rect::new(15, 0, 10, 10));
        assert_eq!(tree.rect(iv.label()), Rect::new(0, 10, 40, 12));
        assert_eq!(tree.rect(iv.id()).w, 40);
        assert_eq!(tree.rect(iv.id()).h, 22);
    }

    #[test]
    fn test_right_label_width_budget_excludes_icon() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let iv = IconView::new(
            &mut tree,
            Some(Image::solid(20, 10, 0xFF00_FF00)),
            "AAAA BBBB",
            theme.effects.default.clone(),
            IconViewOptions {
                max_width: Some(65),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(tree.rect(iv.label()).h, 24);
    }

    #[test]
    fn test_focus_uses_selected_background() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let mut iv = IconView::new(
            &mut tree,
            None,
            "ab",
            theme.effects.default.clone(),
            IconViewOptions::default(),
        )
        .unwrap();
        let patch = Image::solid(3, 3, 0xFF12_3456);
        iv.request_focus(&mut tree, Some(&patch));
        assert!(iv.is_focused());
        match tree.node(iv.id()).unwrap().background() {
            crate::view::Background::Image(img) => assert_eq!(img.size(), (20, 12)),
            other => panic!("unexpected background {other:?}"),
        }
        iv.clear_focus(&mut tree);
        assert!(matches!(
            tree.node(iv.id()).unwrap().background(),
            crate::view::Background::Color(TRANSPARENT)
        ));
    }

    #[test]
    fn test_update_icon_scales_to_content_box() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let iv = IconView::new(
            &mut tree,
            Some(Image::solid(16, 16, 0xFF00_FF00)),
            "x",
            theme.effects.default.clone(),
            IconViewOptions::default(),
        )
        .unwrap();
        iv.update_icon(&mut tree, Image::solid(64, 64, 0xFFFF_0000));
        assert_eq!(tree.rect(iv.icon()).w, 16);
        assert_eq!(tree.image(iv.icon()).unwrap().size(), (16, 16));
    }

    #[test]
    fn test_button_focus_swaps_image() {
        let font: Arc<dyn Font> = Arc::new(BlockFont::new(10, 12));
        let images = ThemeImages {
            button_normal: Some(Image::solid(30, 10, 0xFF00_0000)),
            button_selected: Some(Image::solid(30, 10, 0xFFFF_FFFF)),
            ..Default::default()
        };
        let theme = ThemeConfig::new(ThemeFonts::uniform(font), images);
        let mut tree = ViewTree::new();
        let effect = theme.effects.button.clone();
        let mut button = ButtonView::new(&mut tree, "ok", effect, &theme).unwrap();
        let icon = button.icon_view().icon();
        assert!(button.request_focus(&mut tree).is_some());
        assert!(button.request_focus(&mut tree).is_none());
        assert_eq!(tree.image(icon).unwrap().pixel(0, 0), Some(0xFFFF_FFFF));
        assert!(button.clear_focus(&mut tree).is_some());
        assert_eq!(tree.image(icon).unwrap().pixel(0, 0), Some(0xFF00_0000));
    }

    #[test]
    fn test_title_bar_centers_icon_view() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let icon = Image::solid(12, 12, 0xFF00_FF00);
        let bar = TitleBar::new(&mut tree, &theme, 120, Some(icon), "Apps", None, false).unwrap();
        tree.layout(bar.id()).unwrap();
        let r = tree.rect(bar.id());
        assert_eq!((r.w, r.h), (120, 18));
        // The shadowed 12px icon grows to 18px; the 15px label centers on it.
        assert_eq!(tree.rect(bar.icon_view().id()), Rect::new(0, 0, 66, 18));
        assert_eq!(tree.rect(bar.icon_view().label()), Rect::new(18, 2, 48, 15));
    }

    #[test]
    fn test_shadow_border_strip() {
        let theme = test_theme();
        let mut tree = ViewTree::new();
        let v = ShadowBottomBorder::create(&mut tree, &theme, 40);
        assert_eq!((tree.rect(v).w, tree.rect(v).h), (40, BORDER_SHADOW_WIDTH));
    }
}
