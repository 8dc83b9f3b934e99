//! Renders the application list screen into a PNG.
//!
//! ```text
//! app_list [OUT.png] [FONT.ttf] [RESOURCE_DIR]
//! ```
//!
//! Without a font the fixed-advance block font is used.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use rice_canvas::Raster;
use rice_core::{Font, LayoutError};
use rice_platform::{Fetcher, Payload, Response, Runner, TaskError};
use rice_text::{BlockFont, GlyphFont};
use rice_ui::theme::{FORM_BGCOLOR, ITEM_GAP_SIZE, SCROLL_INDICATOR_WIDTH};
use rice_ui::*;

const SCREEN_W: i32 = 240;
const SCREEN_H: i32 = 320;

#[derive(Clone, Debug)]
struct AppInfo {
    name: String,
    version: String,
    vendor: String,
    downloads: u32,
}

fn parse_catalogue(body: &str) -> Vec<AppInfo> {
    body.lines()
        .filter_map(|line| {
            let mut f = line.split('|');
            Some(AppInfo {
                name: f.next()?.to_string(),
                version: f.next()?.to_string(),
                vendor: f.next()?.to_string(),
                downloads: f.next()?.trim().parse().ok()?,
            })
        })
        .collect()
}

/// Row layout: name, version and vendor stacked on the left, the download
/// count on the right.
struct AppBinder {
    theme: Arc<ThemeConfig>,
}

impl AppBinder {
    fn text(&self, tree: &mut ViewTree, text: &str, effect: Arc<Effect>, max_width: Option<i32>) -> ViewId {
        tree.create_text(text, effect, max_width, max_width.is_some())
    }

    fn align(
        tree: &mut ViewTree,
        id: ViewId,
        target: ViewId,
        h: HorizontalRule,
        v: VerticalRule,
    ) -> Result<(), LayoutError> {
        tree.set_alignment(id, Some(target), SizeType::WrapContent, SizeType::WrapContent, h, v)
    }

    fn build(
        &self,
        tree: &mut ViewTree,
        app: &AppInfo,
        container: ViewId,
        content_width: i32,
    ) -> Result<i32, LayoutError> {
        let effects = &self.theme.effects;
        tree.set_padding_right(container, SCROLL_INDICATOR_WIDTH * 3 / 2);

        let count = self.text(tree, &app.downloads.to_string(), effects.number.clone(), None);
        tree.add_child(container, count);
        Self::align(
            tree,
            count,
            container,
            HorizontalRule::ParentRight(VerticalPosition::Top),
            VerticalRule::None,
        )?;
        let label = self.text(tree, "Downloads ", effects.number_label.clone(), None);
        tree.add_child(container, label);
        Self::align(
            tree,
            label,
            count,
            HorizontalRule::LeftOf(VerticalPosition::Top),
            VerticalRule::None,
        )?;

        let reserved = tree.rect(count).w + tree.rect(label).w + ITEM_GAP_SIZE;
        let max_width = Some((content_width - reserved).max(0));

        let name = self.text(tree, &app.name, effects.list_title.clone(), max_width);
        tree.add_child(container, name);
        Self::align(
            tree,
            name,
            container,
            HorizontalRule::ParentLeft(VerticalPosition::Top),
            VerticalRule::None,
        )?;
        let version = self.text(tree, &format!("Version: {}", app.version), effects.list_summary.clone(), None);
        tree.add_child(container, version);
        Self::align(
            tree,
            version,
            name,
            HorizontalRule::None,
            VerticalRule::Below(HorizontalPosition::Left),
        )?;
        let vendor = self.text(tree, &format!("Vendor: {}", app.vendor), effects.list_summary.clone(), max_width);
        tree.add_child(container, vendor);
        Self::align(
            tree,
            vendor,
            version,
            HorizontalRule::None,
            VerticalRule::Below(HorizontalPosition::Left),
        )?;

        Ok(Self::stacked_height(tree, container))
    }

    fn stacked_height(tree: &ViewTree, container: ViewId) -> i32 {
        let children = tree.children(container);
        let left: i32 = children.iter().skip(2).map(|&c| tree.rect(c).h).sum();
        let right = children.first().map_or(0, |&c| tree.rect(c).h);
        left.max(right)
    }
}

impl ItemBinder<AppInfo> for AppBinder {
    fn create(
        &mut self,
        tree: &mut ViewTree,
        item: &AppInfo,
        _index: usize,
        container: ViewId,
        content_width: i32,
    ) -> i32 {
        self.build(tree, item, container, content_width)
            .unwrap_or_else(|e| {
                log::error!("cannot bind {}: {e}", item.name);
                0
            })
    }

    fn update(&mut self, tree: &mut ViewTree, item: &AppInfo, _index: usize, container: ViewId) -> i32 {
        let children = tree.children(container).to_vec();
        let texts = [
            item.downloads.to_string(),
            "Downloads ".to_string(),
            item.name.clone(),
            format!("Version: {}", item.version),
            format!("Vendor: {}", item.vendor),
        ];
        for (&view, text) in children.iter().zip(texts.iter()) {
            if tree.text(view) != Some(text.as_str()) {
                tree.update_text(view, text);
            }
        }
        Self::stacked_height(tree, container)
    }
}

struct AppList {
    list: ListView<AppInfo, AppBinder>,
}

/// Stands in for the store server.
fn catalogue_fetcher() -> Arc<dyn Fetcher> {
    Arc::new(|url: &str| -> Result<Response, TaskError> {
        log::info!("GET {url}");
        thread::sleep(Duration::from_millis(50));
        let body = [
            "Snake|1.2|Rice Games|10234",
            "Weather Now|2.0.1|Skyline Apps|8812",
            "Pocket Dictionary with an unusually long name|3.4|Lexica|5120",
            "Chess|0.9|Open Boards|4410",
            "Notes|1.0|Rice|320",
            "Unit Converter|1.1|Toolsmith|97",
        ]
        .join("\n");
        Ok(Response::new("text/plain; charset=utf-8", body))
    })
}

fn load_font(path: Option<&PathBuf>) -> anyhow::Result<Arc<dyn Font>> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let font = GlyphFont::from_bytes(bytes, 14.0).map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(Arc::new(font))
        }
        None => Ok(Arc::new(BlockFont::new(7, 12))),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let out = args.first().cloned().unwrap_or_else(|| PathBuf::from("app_list.png"));
    let font = load_font(args.get(1))?;
    let images = match args.get(2) {
        Some(dir) => ThemeImages::load(|p| std::fs::read(dir.join(p.trim_start_matches('/'))).ok()),
        None => ThemeImages::default(),
    };
    let theme = Arc::new(ThemeConfig::new(ThemeFonts::uniform(font), images));

    let mut tree = ViewTree::new();
    let root = tree.create_sized(SCREEN_W, SCREEN_H);
    tree.set_background_color(root, FORM_BGCOLOR);

    let icon = theme.images.app_icon.clone();
    let title = TitleBar::new(&mut tree, &theme, SCREEN_W, icon, "Rice App Store", None, true)?;
    tree.add_child(root, title.id());
    tree.set_alignment(
        title.id(),
        Some(root),
        SizeType::Fixed,
        SizeType::Fixed,
        HorizontalRule::ParentLeft(VerticalPosition::Top),
        VerticalRule::None,
    )?;

    let list_h = SCREEN_H - tree.rect(title.id()).h;
    let binder = AppBinder {
        theme: theme.clone(),
    };
    let list = ListView::new(
        &mut tree,
        theme.clone(),
        SCREEN_W,
        list_h,
        ListAdapter::new(Vec::new()),
        binder,
        "Loading...",
    )?;
    tree.add_child(root, list.id());
    tree.set_alignment(
        list.id(),
        Some(title.id()),
        SizeType::Fixed,
        SizeType::Fixed,
        HorizontalRule::LeftWith(VerticalPosition::Bottom),
        VerticalRule::None,
    )?;

    let shadow = ShadowBottomBorder::create(&mut tree, &theme, SCREEN_W);
    tree.add_child(root, shadow);
    tree.set_alignment(
        shadow,
        Some(title.id()),
        SizeType::WrapContent,
        SizeType::WrapContent,
        HorizontalRule::LeftWith(VerticalPosition::Bottom),
        VerticalRule::None,
    )?;

    let mut runner = Runner::new(tree, root, AppList { list }, 2);
    runner.pool_mut().get(
        catalogue_fetcher(),
        "http://store.example/app list",
        &[("page", "1"), ("size", "20")],
        |screen, result| match result {
            Ok(Payload::Text(body)) => {
                let apps = parse_catalogue(&body);
                log::info!("received {} apps", apps.len());
                let list = &mut screen.state.list;
                if let Err(e) = list.edit(&mut screen.tree, |a| a.set_items(apps)) {
                    log::error!("list rebuild failed: {e}");
                }
                list.select_next(&mut screen.tree);
            }
            Ok(other) => log::warn!("unexpected payload {other:?}"),
            Err(e) => log::error!("catalogue request failed: {e}"),
        },
    )?;

    let mut surface = Raster::new(SCREEN_W, SCREEN_H);
    for _ in 0..500 {
        let painted = runner.tick(&mut surface)?;
        if !painted && runner.pool_mut().in_flight() == 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    let screen = runner.screen();
    log::debug!("\n{}", rice_devtools::dump_tree(&screen.tree, screen.root));

    surface
        .to_image()
        .to_rgba8()
        .save(&out)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("wrote {}", out.display());
    Ok(())
}
