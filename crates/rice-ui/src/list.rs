//! # Lists
//!
//! A [`ListView`] is a [`ScrollView`] whose content container holds one
//! item view per adapter element, each followed by a one-pixel divider.
//!
//! Data changes go through [`ListView::edit`], which rebinds in place:
//!
//! - rows that exist on both sides of the change are rebound with
//!   [`ItemBinder::update`];
//! - new trailing rows are built with [`ItemBinder::create`];
//! - surplus trailing rows and their dividers are destroyed.
//!
//! An empty adapter shows a message instead of rows.

use std::sync::Arc;

use rice_core::{Insets, LayoutError};

use crate::content::Orientation;
use crate::scroll::ScrollView;
use crate::theme::{LIST_DIVIDER_HEIGHT, LIST_ITEM_PADDING, ThemeConfig};
use crate::view::{
    HorizontalPosition, HorizontalRule, SizeType, VerticalPosition, VerticalRule, ViewId, ViewTree,
};
use crate::widgets::{Divider, Extent};

/// Ordered backing data of a [`ListView`].
#[derive(Clone, Debug)]
pub struct ListAdapter<T> {
    items: Vec<T>,
}

impl<T> Default for ListAdapter<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ListAdapter<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index.min(self.items.len()), item);
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces every element.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }
}

impl<T> Extend<T> for ListAdapter<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

/// Builds and rebinds the views of one row.
pub trait ItemBinder<T> {
    /// Populates a fresh, empty row container. `content_width` is the width
    /// available inside the row's padding. Returns the row's content height.
    fn create(
        &mut self,
        tree: &mut ViewTree,
        item: &T,
        index: usize,
        container: ViewId,
        content_width: i32,
    ) -> i32;

    /// Rebinds an existing row to a (possibly different) element. Returns
    /// the row's new content height.
    fn update(&mut self, tree: &mut ViewTree, item: &T, index: usize, container: ViewId) -> i32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Row {
    item: ViewId,
    divider: ViewId,
}

pub struct ListView<T, B> {
    scroll: ScrollView,
    adapter: ListAdapter<T>,
    binder: B,
    rows: Vec<Row>,
    empty_view: ViewId,
    empty_shown: bool,
    /// Element count at the last rebuild; `None` before the first one.
    previous_count: Option<usize>,
    selected: Option<usize>,
    theme: Arc<ThemeConfig>,
}

impl<T, B: ItemBinder<T>> ListView<T, B> {
    /// Creates a detached `width x height` list and binds `adapter`.
    pub fn new(
        tree: &mut ViewTree,
        theme: Arc<ThemeConfig>,
        width: i32,
        height: i32,
        adapter: ListAdapter<T>,
        binder: B,
        empty_message: &str,
    ) -> Result<Self, LayoutError> {
        let scroll = ScrollView::new(tree, width, height);
        let empty_view = tree.create_text(empty_message, theme.effects.list_title.clone(), None, false);
        tree.set_padding(
            empty_view,
            Insets::new(
                LIST_ITEM_PADDING,
                LIST_ITEM_PADDING * 3,
                LIST_ITEM_PADDING,
                LIST_ITEM_PADDING,
            ),
        );
        let mut list = Self {
            scroll,
            adapter,
            binder,
            rows: Vec::new(),
            empty_view,
            empty_shown: false,
            previous_count: None,
            selected: None,
            theme,
        };
        list.on_data_set_changed(tree)?;
        Ok(list)
    }

    pub fn id(&self) -> ViewId {
        self.scroll.id()
    }

    pub fn scroll_view(&self) -> &ScrollView {
        &self.scroll
    }

    pub fn adapter(&self) -> &ListAdapter<T> {
        &self.adapter
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub fn binder_mut(&mut self) -> &mut B {
        &mut self.binder
    }

    /// Row container views, in order.
    pub fn item_views(&self) -> Vec<ViewId> {
        self.rows.iter().map(|r| r.item).collect()
    }

    pub fn empty_view(&self) -> ViewId {
        self.empty_view
    }

    pub fn is_initialized(&self) -> bool {
        self.previous_count.is_some()
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.adapter.get(index)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Mutates the adapter, then rebinds the rows.
    pub fn edit(
        &mut self,
        tree: &mut ViewTree,
        f: impl FnOnce(&mut ListAdapter<T>),
    ) -> Result<(), LayoutError> {
        f(&mut self.adapter);
        self.on_data_set_changed(tree)
    }

    /// Empties the adapter and forgets selection and scroll position.
    pub fn clear(&mut self, tree: &mut ViewTree) -> Result<(), LayoutError> {
        self.previous_count = None;
        self.selected = None;
        self.scroll.reset_scroll_position(tree);
        self.adapter.clear();
        self.on_data_set_changed(tree)
    }

    fn content_width(&self, tree: &ViewTree) -> i32 {
        let root = tree.node(self.scroll.id());
        root.map_or(0, |n| n.width() - n.padding().horizontal())
    }

    /// Rebuilds the rows after the adapter changed.
    pub fn on_data_set_changed(&mut self, tree: &mut ViewTree) -> Result<(), LayoutError> {
        let container = self.scroll.content();
        let mut height = 0;

        if self.adapter.is_empty() {
            for row in self.rows.drain(..) {
                tree.destroy(row.item);
                tree.destroy(row.divider);
            }
            if !self.empty_shown {
                tree.set_alignment(
                    self.empty_view,
                    Some(container),
                    SizeType::WrapContent,
                    SizeType::WrapContent,
                    HorizontalRule::ParentLeft(VerticalPosition::Unset),
                    VerticalRule::ParentTop(HorizontalPosition::Unset),
                )?;
                tree.add_child(container, self.empty_view);
                self.empty_shown = true;
            }
            height = tree.rect(self.empty_view).h;
            self.previous_count = Some(0);
        } else {
            if self.empty_shown {
                tree.remove_child(container, self.empty_view);
                self.empty_shown = false;
            }

            let keep = self.rows.len().min(self.adapter.len());
            for (i, row) in self.rows[..keep].iter().enumerate() {
                if let Some(item) = self.adapter.get(i) {
                    let h = self.binder.update(tree, item, i, row.item);
                    tree.set_content_height(row.item, h);
                }
                height += tree.rect(row.item).h + tree.rect(row.divider).h;
            }
            log::debug!("list: rebound {keep} rows");

            if self.rows.len() < self.adapter.len() {
                for i in self.rows.len()..self.adapter.len() {
                    let row = self.create_row(tree, i)?;
                    height += tree.rect(row.item).h + tree.rect(row.divider).h;
                    self.rows.push(row);
                }
            } else {
                for row in self.rows.drain(self.adapter.len()..) {
                    tree.destroy(row.item);
                    tree.destroy(row.divider);
                }
            }
            self.previous_count = Some(self.adapter.len());
        }

        tree.set_content_height(container, height);
        self.selected = match self.selected {
            Some(_) if self.adapter.is_empty() => None,
            Some(i) => Some(i.min(self.adapter.len() - 1)),
            None => None,
        };
        self.refresh_backgrounds(tree);
        if tree.parent(self.scroll.id()).is_some() {
            tree.layout(self.scroll.id())?;
        }
        Ok(())
    }

    fn create_row(&mut self, tree: &mut ViewTree, index: usize) -> Result<Row, LayoutError> {
        let container = self.scroll.content();
        let (target, h_rule, v_rule) = match self.rows.last() {
            None => (
                container,
                HorizontalRule::ParentLeft(VerticalPosition::Unset),
                VerticalRule::ParentTop(HorizontalPosition::Unset),
            ),
            Some(prev) => (
                prev.divider,
                HorizontalRule::LeftWith(VerticalPosition::Unset),
                VerticalRule::Below(HorizontalPosition::Unset),
            ),
        };

        let item = tree.create();
        tree.set_alignment(
            item,
            Some(target),
            SizeType::MatchParent,
            SizeType::WrapContent,
            h_rule,
            v_rule,
        )?;
        let content_width = self.content_width(tree) - 2 * LIST_ITEM_PADDING;
        tree.set_content_width(item, content_width);
        tree.set_padding(item, Insets::uniform(LIST_ITEM_PADDING));
        if let Some(element) = self.adapter.get(index) {
            let h = self.binder.create(tree, element, index, item, content_width);
            tree.set_content_height(item, h);
        }
        tree.add_child(container, item);

        let divider = Divider::create(
            tree,
            Some(item),
            Extent::MatchParent,
            Extent::Px(LIST_DIVIDER_HEIGHT),
            HorizontalRule::LeftWith(VerticalPosition::Unset),
            VerticalRule::Below(HorizontalPosition::Unset),
            Orientation::Horizontal,
        )?;
        tree.add_child(container, divider);
        Ok(Row { item, divider })
    }

    fn refresh_backgrounds(&self, tree: &mut ViewTree) {
        let width = self.content_width(tree);
        for (i, row) in self.rows.iter().enumerate() {
            let h = tree.rect(row.item).h;
            let bg = if self.selected == Some(i) {
                self.theme.list_item_selected_background(width, h)
            } else {
                self.theme.list_item_background(i, width, h)
            };
            tree.set_background_image(row.item, bg);
        }
    }

    fn select(&mut self, tree: &mut ViewTree, index: isize) {
        if self.adapter.is_empty() {
            return;
        }
        let index = index.clamp(0, self.adapter.len() as isize - 1) as usize;
        if self.selected == Some(index) {
            return;
        }
        self.selected = Some(index);
        if let Some(row) = self.rows.get(index) {
            let mut rect = tree.screen_rect(row.item);
            rect.h += LIST_DIVIDER_HEIGHT;
            self.scroll.scroll_to_rect(tree, rect);
        }
        self.refresh_backgrounds(tree);
    }

    /// Moves the selection down one row; from no selection, selects the
    /// first row.
    pub fn select_next(&mut self, tree: &mut ViewTree) {
        let next = self.selected.map_or(0, |i| i as isize + 1);
        self.select(tree, next);
    }

    pub fn select_previous(&mut self, tree: &mut ViewTree) {
        let prev = self.selected.map_or(-1, |i| i as isize - 1);
        self.select(tree, prev);
    }

    fn row_at(&self, tree: &ViewTree, x: i32, y: i32) -> Option<usize> {
        if self.adapter.is_empty() || !tree.contains(self.scroll.id(), x, y) {
            return None;
        }
        self.rows.iter().position(|r| tree.contains(r.item, x, y))
    }

    /// Pointer press: selects the row under the point, if any.
    pub fn select_at_point(&mut self, tree: &mut ViewTree, x: i32, y: i32) {
        if let Some(pressed) = self.row_at(tree, x, y)
            && self.selected != Some(pressed)
        {
            self.selected = Some(pressed);
            self.refresh_backgrounds(tree);
        }
    }

    /// Pointer release: the row under the point, but only when it is the
    /// selected one.
    pub fn clicked_item_index(&self, tree: &ViewTree, x: i32, y: i32) -> Option<usize> {
        self.row_at(tree, x, y).filter(|i| self.selected == Some(*i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::test_theme;

    #[derive(Default)]
    struct CountingBinder {
        created: Vec<usize>,
        updated: Vec<usize>,
    }

    impl ItemBinder<String> for CountingBinder {
        fn create(
            &mut self,
            tree: &mut ViewTree,
            item: &String,
            index: usize,
            container: ViewId,
            _content_width: i32,
        ) -> i32 {
            self.created.push(index);
            let theme = test_theme();
            let label = tree.create_text(item, theme.effects.default.clone(), None, false);
            tree.add_child(container, label);
            tree.set_alignment(
                label,
                Some(container),
                SizeType::Fixed,
                SizeType::Fixed,
                HorizontalRule::ParentLeft(VerticalPosition::Top),
                VerticalRule::None,
            )
            .unwrap();
            tree.rect(label).h
        }

        fn update(&mut self, tree: &mut ViewTree, item: &String, index: usize, container: ViewId) -> i32 {
            self.updated.push(index);
            let label = tree.children(container)[0];
            tree.update_text(label, item);
            tree.rect(label).h
        }
    }

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item {i}")).collect()
    }

    fn list(n: usize) -> (ViewTree, ListView<String, CountingBinder>) {
        let mut tree = ViewTree::new();
        let list = ListView::new(
            &mut tree,
            test_theme(),
            120,
            40,
            ListAdapter::new(items(n)),
            CountingBinder::default(),
            "Nothing here",
        )
        .unwrap();
        tree.layout(list.id()).unwrap();
        (tree, list)
    }

    #[test]
    fn test_rows_stack_below_dividers() {
        let (tree, list) = list(3);
        let rows = list.item_views();
        assert_eq!(rows.len(), 3);
        // Row: 12px text plus 3px padding each side, then a 1px divider.
        assert_eq!(tree.rect(rows[0]).y, 0);
        assert_eq!(tree.rect(rows[0]).h, 18);
        assert_eq!(tree.rect(rows[1]).y, 19);
        assert_eq!(tree.rect(rows[2]).y, 38);
        assert_eq!(tree.rect(rows[0]).w, 120);
        assert_eq!(tree.rect(list.scroll_view().content()).h, 57);
    }

    #[test]
    fn test_growth_rebinds_existing_rows() {
        let (mut tree, mut list) = list(5);
        let before = list.item_views();
        list.binder_mut().created.clear();
        list.edit(&mut tree, |a| a.set_items(items(8))).unwrap();
        assert_eq!(list.binder().updated, vec![0, 1, 2, 3, 4]);
        assert_eq!(list.binder().created, vec![5, 6, 7]);
        assert_eq!(&list.item_views()[..5], before.as_slice());
        assert_eq!(tree.children(list.scroll_view().content()).len(), 16);
    }

    #[test]
    fn test_shrink_destroys_trailing_rows() {
        let (mut tree, mut list) = list(8);
        let before = list.item_views();
        let views = tree.len();
        list.edit(&mut tree, |a| a.truncate(3)).unwrap();
        assert_eq!(list.item_views(), before[..3].to_vec());
        assert_eq!(list.binder().updated, vec![0, 1, 2]);
        // Each row is a container, a label and a divider.
        assert_eq!(views - tree.len(), 5 * 3);
        assert!(!tree.contains_view(before[7]));
        assert!(tree.contains_view(before[2]));
    }

    #[test]
    fn test_empty_adapter_shows_message() {
        let (mut tree, mut list) = list(2);
        list.edit(&mut tree, |a| a.clear()).unwrap();
        let content = list.scroll_view().content();
        assert_eq!(tree.children(content), &[list.empty_view()]);
        assert_eq!(tree.text(list.empty_view()), Some("Nothing here"));
        assert_eq!(tree.node(list.empty_view()).unwrap().padding(), Insets::new(3, 9, 3, 3));
        list.edit(&mut tree, |a| a.push("back".into())).unwrap();
        assert!(!tree.children(content).contains(&list.empty_view()));
        assert_eq!(list.item_views().len(), 1);
    }

    #[test]
    fn test_selection_clamps_and_scrolls() {
        let (mut tree, mut list) = list(4);
        list.select_previous(&mut tree);
        assert_eq!(list.selected_index(), Some(0));
        list.select_next(&mut tree);
        list.select_next(&mut tree);
        list.select_next(&mut tree);
        list.select_next(&mut tree);
        assert_eq!(list.selected_index(), Some(3));
        // Row 3 spans 57..75 plus its divider; the viewport is 40 high.
        assert_eq!(list.scroll_view().offset(&tree), -36);
    }

    #[test]
    fn test_selection_survives_shrink() {
        let (mut tree, mut list) = list(4);
        for _ in 0..4 {
            list.select_next(&mut tree);
        }
        list.edit(&mut tree, |a| a.truncate(2)).unwrap();
        assert_eq!(list.selected_index(), Some(1));
        list.clear(&mut tree).unwrap();
        assert_eq!(list.selected_index(), None);
        assert_eq!(list.scroll_view().offset(&tree), 0);
    }

    #[test]
    fn test_pointer_selection_and_click() {
        let (mut tree, mut list) = list(2);
        assert_eq!(list.clicked_item_index(&tree, 5, 25), None);
        list.select_at_point(&mut tree, 5, 25);
        assert_eq!(list.selected_index(), Some(1));
        assert_eq!(list.clicked_item_index(&tree, 5, 25), Some(1));
        assert_eq!(list.clicked_item_index(&tree, 5, 5), None);
        assert_eq!(list.clicked_item_index(&tree, 500, 5), None);
    }

    #[test]
    fn test_row_backgrounds_alternate() {
        let (tree, list) = list(2);
        let rows = list.item_views();
        let bg = |id| match tree.node(id).unwrap().background() {
            crate::view::Background::Image(img) => img.pixel(0, 0),
            _ => None,
        };
        assert_eq!(bg(rows[0]), Some(crate::theme::LIST_ITEM_EVEN_BGCOLOR_START));
        assert_eq!(bg(rows[1]), Some(crate::theme::LIST_ITEM_ODD_BGCOLOR_START));
    }
}
